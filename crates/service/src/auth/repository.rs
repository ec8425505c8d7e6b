use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{NewUser, UserRecord};
use super::errors::AuthError;

/// Credential store abstraction.
///
/// Implementations own the email uniqueness invariant: `insert` and `save`
/// must fail with `AuthError::DuplicateEmail` when another account already
/// holds the email, atomically with respect to concurrent writers.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AuthError>;
    async fn list(&self) -> Result<Vec<UserRecord>, AuthError>;
    async fn insert(&self, user: NewUser) -> Result<UserRecord, AuthError>;

    /// Persist name/email/password/admin flag. `Ok(None)` if the row is gone.
    async fn save(&self, user: &UserRecord) -> Result<Option<UserRecord>, AuthError>;

    /// Remove the row only when it is not an administrator; `true` if a row was removed.
    async fn delete_non_admin(&self, id: Uuid) -> Result<bool, AuthError>;
}

/// Simple in-memory repository for tests, benches and doc examples
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::{Mutex, MutexGuard};

    #[derive(Default)]
    pub struct MockUserRepository {
        users: Mutex<HashMap<Uuid, UserRecord>>, // key: user id
    }

    impl MockUserRepository {
        fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, UserRecord>>, AuthError> {
            self.users.lock().map_err(|_| AuthError::Repository("user store lock poisoned".into()))
        }

        /// Raw stored row, digest included.
        pub fn stored(&self, id: Uuid) -> Option<UserRecord> {
            self.users.lock().ok().and_then(|u| u.get(&id).cloned())
        }

        pub fn len(&self) -> usize {
            self.users.lock().map(|u| u.len()).unwrap_or(0)
        }

        pub fn is_empty(&self) -> bool { self.len() == 0 }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
            let users = self.lock()?;
            Ok(users.values().find(|u| u.email == email).cloned())
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AuthError> {
            let users = self.lock()?;
            Ok(users.get(&id).cloned())
        }

        async fn list(&self) -> Result<Vec<UserRecord>, AuthError> {
            let users = self.lock()?;
            let mut all: Vec<UserRecord> = users.values().cloned().collect();
            all.sort_by_key(|u| (u.created_at, u.id));
            Ok(all)
        }

        async fn insert(&self, user: NewUser) -> Result<UserRecord, AuthError> {
            let mut users = self.lock()?;
            if users.values().any(|u| u.email == user.email) {
                return Err(AuthError::DuplicateEmail);
            }
            let now = Utc::now();
            let record = UserRecord {
                id: Uuid::new_v4(),
                name: user.name,
                email: user.email,
                password_hash: user.password_hash,
                is_admin: user.is_admin,
                created_at: now,
                updated_at: now,
            };
            users.insert(record.id, record.clone());
            Ok(record)
        }

        async fn save(&self, user: &UserRecord) -> Result<Option<UserRecord>, AuthError> {
            let mut users = self.lock()?;
            if users.values().any(|u| u.id != user.id && u.email == user.email) {
                return Err(AuthError::DuplicateEmail);
            }
            let Some(existing) = users.get_mut(&user.id) else {
                return Ok(None);
            };
            existing.name = user.name.clone();
            existing.email = user.email.clone();
            existing.password_hash = user.password_hash.clone();
            existing.is_admin = user.is_admin;
            existing.updated_at = Utc::now();
            Ok(Some(existing.clone()))
        }

        async fn delete_non_admin(&self, id: Uuid) -> Result<bool, AuthError> {
            let mut users = self.lock()?;
            let deletable = users.get(&id).is_some_and(|u| !u.is_admin);
            if deletable {
                users.remove(&id);
            }
            Ok(deletable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockUserRepository;
    use super::*;

    fn new_user(email: &str, is_admin: bool) -> NewUser {
        NewUser { name: "N".into(), email: email.into(), password_hash: "$argon2id$x".into(), is_admin }
    }

    #[tokio::test]
    async fn mock_enforces_unique_email_on_insert_and_save() {
        let repo = MockUserRepository::default();
        let a = repo.insert(new_user("a@x.com", false)).await.unwrap();
        assert!(matches!(repo.insert(new_user("a@x.com", false)).await, Err(AuthError::DuplicateEmail)));

        let b = repo.insert(new_user("b@x.com", false)).await.unwrap();
        let mut clash = b.clone();
        clash.email = a.email.clone();
        assert!(matches!(repo.save(&clash).await, Err(AuthError::DuplicateEmail)));
        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn mock_conditional_delete_spares_admins() {
        let repo = MockUserRepository::default();
        let admin = repo.insert(new_user("root@x.com", true)).await.unwrap();
        let user = repo.insert(new_user("u@x.com", false)).await.unwrap();
        assert!(!repo.delete_non_admin(admin.id).await.unwrap());
        assert!(repo.delete_non_admin(user.id).await.unwrap());
        assert!(!repo.delete_non_admin(user.id).await.unwrap());
        assert!(repo.stored(admin.id).is_some());
    }

    #[tokio::test]
    async fn mock_save_of_missing_row_is_none() {
        let repo = MockUserRepository::default();
        let ghost = repo.insert(new_user("g@x.com", false)).await.unwrap();
        repo.delete_non_admin(ghost.id).await.unwrap();
        assert!(repo.save(&ghost).await.unwrap().is_none());
    }
}
