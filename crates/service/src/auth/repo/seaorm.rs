use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

use crate::auth::domain::{NewUser, UserRecord};
use crate::auth::errors::AuthError;
use crate::auth::repository::UserRepository;

/// Postgres-backed credential store. Email uniqueness is enforced by the
/// `user.email` unique index; violations surface as `DuplicateEmail`.
pub struct SeaOrmUserRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait::async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        let res = models::user::find_by_email(&self.db, email).await?;
        Ok(res.map(UserRecord::from))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AuthError> {
        let res = models::user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(UserRecord::from))
    }

    async fn list(&self) -> Result<Vec<UserRecord>, AuthError> {
        let rows = models::user::list_all(&self.db).await?;
        Ok(rows.into_iter().map(UserRecord::from).collect())
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, AuthError> {
        let created = models::user::create(&self.db, &user.name, &user.email, user.password_hash, user.is_admin).await?;
        Ok(created.into())
    }

    async fn save(&self, user: &UserRecord) -> Result<Option<UserRecord>, AuthError> {
        let updated = models::user::update(
            &self.db,
            user.id,
            user.name.clone(),
            user.email.clone(),
            user.password_hash.clone(),
            user.is_admin,
        )
        .await?;
        Ok(updated.map(UserRecord::from))
    }

    async fn delete_non_admin(&self, id: Uuid) -> Result<bool, AuthError> {
        let removed = models::user::delete_unless_admin(&self.db, id).await?;
        Ok(removed > 0)
    }
}
