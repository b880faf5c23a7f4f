use super::Role;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

pub const USERS_COLLECTION: &str = "ApiUsers";

/// Stored field names in the `ApiUsers` collection
pub mod user_fields {
    pub const EMAIL: &str = "Email";
    pub const ROLE: &str = "Role";
    pub const API_KEY: &str = "ApiKey";
    pub const CREATED: &str = "Created";
    pub const LAST_ACCESS: &str = "LastAccess";
}

/// API user (stored in MongoDB)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiUser {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub user_name: String,

    pub email: String,

    /// Kept as the raw stored string: a value outside the known roles
    /// must fail authentication rather than fail deserialization.
    pub role: String,

    /// Generated at creation, never changed afterwards
    pub api_key: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created: DateTime<Utc>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub last_access: DateTime<Utc>,
}

impl ApiUser {
    /// Builds a fresh user with a new random API key, stamped with `now`.
    pub fn issue(new_user: NewUser, now: DateTime<Utc>) -> Self {
        ApiUser {
            id: None,
            user_name: new_user.user_name,
            email: new_user.email,
            role: new_user.role.to_string(),
            api_key: generate_api_key(),
            created: now,
            last_access: now,
        }
    }
}

pub fn generate_api_key() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Validated input for user creation
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_name: String,
    pub email: String,
    pub role: Role,
}

/// Request body for POST /api/Users/AddUser
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUserRequest {
    #[serde(alias = "username", alias = "UserName")]
    pub user_name: String,
    #[serde(alias = "Email")]
    pub email: String,
    #[serde(alias = "Role")]
    pub role: String,
}

/// Outcome of `UserStore::create_user`
#[derive(Debug, Clone)]
pub enum CreateUserOutcome {
    Created(ApiUser),
    EmailTaken,
}

/// User as returned by the API
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub obj_id: String,
    pub user_name: String,
    pub email: String,
    pub role: String,
    pub api_key: String,
    pub created: DateTime<Utc>,
    pub last_access: DateTime<Utc>,
}

impl From<ApiUser> for UserResponse {
    fn from(user: ApiUser) -> Self {
        UserResponse {
            obj_id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_name: user.user_name,
            email: user.email,
            role: user.role,
            api_key: user.api_key,
            created: user.created,
            last_access: user.last_access,
        }
    }
}
