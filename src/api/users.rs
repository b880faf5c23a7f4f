use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    middleware::AuthenticatedUser,
    models::{AddUserRequest, CreateUserOutcome, DateRange, DocumentId, NewUser, Role, UserResponse},
    services::UserStore,
    utils::{time::deserialize_flexible, AppError},
};

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    #[serde(deserialize_with = "deserialize_flexible")]
    pub start: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_flexible")]
    pub end: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRoleQuery {
    pub role_in: String,
    pub role_out: String,
    #[serde(deserialize_with = "deserialize_flexible")]
    pub start: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_flexible")]
    pub end: DateTime<Utc>,
}

fn parse_role(raw: &str) -> Result<Role, AppError> {
    raw.parse::<Role>()
        .map_err(|e| AppError::invalid(format!("Invalid USER ROLE provided. ({}).", e)))
}

/// POST /api/Users/AddUser - Teachers register a new user and receive its API key
pub async fn add_user(
    user: web::ReqData<AuthenticatedUser>,
    store: web::Data<dyn UserStore>,
    body: web::Json<AddUserRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    log::info!(
        "📝 POST /Users/AddUser - {} as {} by {} ({})",
        request.email,
        request.role,
        user.email,
        user.role
    );

    let role = parse_role(&request.role)?;
    let user_name = request.user_name.trim().to_string();
    let email = request.email.trim().to_string();
    if user_name.is_empty() || email.is_empty() {
        return Err(AppError::invalid("userName and email must be provided"));
    }

    match store.create_user(NewUser { user_name, email, role }).await? {
        CreateUserOutcome::Created(created) => {
            log::info!("✅ User {} created with role {}", created.email, created.role);
            Ok(HttpResponse::Created().json(UserResponse::from(created)))
        }
        CreateUserOutcome::EmailTaken => Err(AppError::invalid(
            "Error. A user with this email already exists",
        )),
    }
}

/// DELETE /api/Users/DeleteUserById
pub async fn delete_user_by_id(
    user: web::ReqData<AuthenticatedUser>,
    store: web::Data<dyn UserStore>,
    query: web::Query<IdQuery>,
) -> Result<HttpResponse, AppError> {
    log::info!("🗑️ DELETE /Users/DeleteUserById - {} by {}", query.id, user.email);

    let id: DocumentId = query.id.parse()?;
    let affected = store.delete_user_by_id(id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": format!("Deleted user with Id: {}", id),
        "affected": affected
    })))
}

/// DELETE /api/Users/DeleteStudentsByDate - Removes students last seen inside the range
pub async fn delete_students_by_date(
    user: web::ReqData<AuthenticatedUser>,
    store: web::Data<dyn UserStore>,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse, AppError> {
    log::info!("🗑️ DELETE /Users/DeleteStudentsByDate - {} to {} by {}", query.start, query.end, user.email);

    let range = DateRange::inclusive(query.start, query.end)?;
    let affected = store.delete_students_by_date(range).await?;

    log::info!("✅ {} students deleted", affected);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Students deleted",
        "affected": affected
    })))
}

/// PATCH /api/Users/ChangeUsersRoleByDate - Moves users created inside the range to another role
pub async fn change_users_role_by_date(
    user: web::ReqData<AuthenticatedUser>,
    store: web::Data<dyn UserStore>,
    query: web::Query<ChangeRoleQuery>,
) -> Result<HttpResponse, AppError> {
    log::info!(
        "🔧 PATCH /Users/ChangeUsersRoleByDate - {} -> {} ({} to {}) by {}",
        query.role_in,
        query.role_out,
        query.start,
        query.end,
        user.email
    );

    let role_in = parse_role(&query.role_in)?;
    let role_out = parse_role(&query.role_out)?;
    if role_in == role_out {
        return Err(AppError::invalid("Invalid input: Roles Match."));
    }
    let range = DateRange::new(query.start, query.end)?;

    let affected = store.update_user_role_by_date(role_in, role_out, range).await?;

    log::info!("✅ {} users moved from {} to {}", affected, role_in, role_out);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": format!("Users changed from {} to {}", role_in, role_out),
        "affected": affected
    })))
}
