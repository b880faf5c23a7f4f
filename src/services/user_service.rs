// ==================== USER STORE ====================
// API users live in the `ApiUsers` collection. Every request is authenticated
// against this store through the `apiKey` header.

use crate::{
    database::MongoDB,
    models::{
        role_is_allowed, user_fields::{API_KEY, CREATED, EMAIL, LAST_ACCESS, ROLE}, ApiUser,
        CreateUserOutcome, DateRange, DocumentId, NewUser, Role, USERS_COLLECTION,
    },
    utils::{time, AppError},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::Collection;

const DUPLICATE_KEY: i32 = 11000;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user unless the email is already registered.
    /// The API key and both timestamps are assigned here.
    async fn create_user(&self, new_user: NewUser) -> Result<CreateUserOutcome, AppError>;

    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<ApiUser>, AppError>;

    async fn update_last_access(&self, api_key: &str, at: DateTime<Utc>) -> Result<(), AppError>;

    /// Returns the number of deleted users (0 when the id is unknown).
    async fn delete_user_by_id(&self, id: DocumentId) -> Result<u64, AppError>;

    /// Deletes STUDENT users whose last access falls inside the range (inclusive).
    async fn delete_students_by_date(&self, range: DateRange) -> Result<u64, AppError>;

    /// Moves every `role_in` user created inside the range (inclusive) to `role_out`.
    async fn update_user_role_by_date(
        &self,
        role_in: Role,
        role_out: Role,
        range: DateRange,
    ) -> Result<u64, AppError>;

    /// Looks the key up and checks the stored role against `allowed`.
    /// `None` means the key is unknown or the role is not permitted.
    async fn authenticate_user(
        &self,
        api_key: &str,
        allowed: &[Role],
    ) -> Result<Option<ApiUser>, AppError> {
        let user = self.find_by_api_key(api_key).await?;
        Ok(user.filter(|u| role_is_allowed(&u.role, allowed)))
    }
}

pub fn students_by_last_access_filter(range: &DateRange) -> Document {
    doc! {
        ROLE: Role::Student.as_str(),
        LAST_ACCESS: { "$gte": time::to_bson(range.start()), "$lte": time::to_bson(range.end()) },
    }
}

pub fn role_by_created_filter(role: Role, range: &DateRange) -> Document {
    doc! {
        ROLE: role.as_str(),
        CREATED: { "$gte": time::to_bson(range.start()), "$lte": time::to_bson(range.end()) },
    }
}

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    matches!(
        e.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == DUPLICATE_KEY
    )
}

pub struct MongoUserStore {
    users: Collection<ApiUser>,
}

impl MongoUserStore {
    pub fn new(db: &MongoDB) -> Self {
        Self {
            users: db.collection::<ApiUser>(USERS_COLLECTION),
        }
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn create_user(&self, new_user: NewUser) -> Result<CreateUserOutcome, AppError> {
        if self
            .users
            .find_one(doc! { EMAIL: &new_user.email })
            .await?
            .is_some()
        {
            log::warn!("⚠️ User with email {} already exists", new_user.email);
            return Ok(CreateUserOutcome::EmailTaken);
        }

        let mut user = ApiUser::issue(new_user, time::now());

        match self.users.insert_one(&user).await {
            Ok(result) => {
                user.id = result.inserted_id.as_object_id();
                log::info!("✅ User created: {} ({})", user.email, user.role);
                Ok(CreateUserOutcome::Created(user))
            }
            // The unique index on Email catches a concurrent insert of the same address
            Err(e) if is_duplicate_key(&e) => {
                log::warn!("⚠️ Duplicate key inserting user {}: {}", user.email, e);
                Ok(CreateUserOutcome::EmailTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<ApiUser>, AppError> {
        Ok(self.users.find_one(doc! { API_KEY: api_key }).await?)
    }

    async fn update_last_access(&self, api_key: &str, at: DateTime<Utc>) -> Result<(), AppError> {
        self.users
            .update_one(
                doc! { API_KEY: api_key },
                doc! { "$set": { LAST_ACCESS: time::to_bson(at) } },
            )
            .await?;
        Ok(())
    }

    async fn delete_user_by_id(&self, id: DocumentId) -> Result<u64, AppError> {
        let result = self.users.delete_one(doc! { "_id": id.object_id() }).await?;
        Ok(result.deleted_count)
    }

    async fn delete_students_by_date(&self, range: DateRange) -> Result<u64, AppError> {
        let result = self
            .users
            .delete_many(students_by_last_access_filter(&range))
            .await?;
        Ok(result.deleted_count)
    }

    async fn update_user_role_by_date(
        &self,
        role_in: Role,
        role_out: Role,
        range: DateRange,
    ) -> Result<u64, AppError> {
        let result = self
            .users
            .update_many(
                role_by_created_filter(role_in, &range),
                doc! { "$set": { ROLE: role_out.as_str() } },
            )
            .await?;
        Ok(result.modified_count)
    }
}
