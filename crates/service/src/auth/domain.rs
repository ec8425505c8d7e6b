use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Self-service registration input
#[derive(Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login input
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Fields a caller may change on their own account. The administrative flag is
/// deliberately absent.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Fields an administrator may change on another account. Passwords are not
/// settable through this path. `isAdmin` is always applied and reads as
/// `false` when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl fmt::Debug for RegisterInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterInput")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for LoginInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginInput")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for ProfileUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileUpdate")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Row handed to the store on creation (password already hashed).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Stored account, including the password digest. Never serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<models::user::Model> for UserRecord {
    fn from(m: models::user::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            password_hash: m.password_hash,
            is_admin: m.is_admin,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
        }
    }
}

/// Client-safe projection returned by auth and profile endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

impl From<&UserRecord> for PublicProfile {
    fn from(u: &UserRecord) -> Self {
        Self { id: u.id, name: u.name.clone(), email: u.email.clone(), is_admin: u.is_admin }
    }
}

/// Administrative listing view: public fields plus timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&UserRecord> for UserSummary {
    fn from(u: &UserRecord) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
            is_admin: u.is_admin,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Signed token plus its absolute expiry, ready to be set as a cookie.
#[derive(Clone)]
pub struct SessionToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken").field("expires_at", &self.expires_at).finish_non_exhaustive()
    }
}

/// Login/registration result
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub profile: PublicProfile,
    pub token: SessionToken,
}

/// A caller whose token verified. Only the account service can mint one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    id: Uuid,
}

impl Caller {
    pub(crate) fn new(id: Uuid) -> Self { Self { id } }

    pub fn id(&self) -> Uuid { self.id }
}

/// A caller confirmed to hold the administrative flag at authorization time.
/// Required by every administrative operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCaller {
    id: Uuid,
    email: String,
}

impl AdminCaller {
    pub(crate) fn new(id: Uuid, email: String) -> Self { Self { id, email } }

    pub fn id(&self) -> Uuid { self.id }

    pub fn email(&self) -> &str { &self.email }
}
