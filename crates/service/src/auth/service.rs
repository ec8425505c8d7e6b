use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::domain::{
    AdminCaller, AdminUserUpdate, AuthSession, Caller, LoginInput, NewUser, ProfileUpdate, PublicProfile,
    RegisterInput, UserRecord, UserSummary,
};
use super::errors::AuthError;
use super::password::PasswordHasher;
use super::repository::UserRepository;
use super::token::TokenIssuer;
use super::validation::{check_email, check_name, check_password_strength, normalize_email, provided};

/// Account business service independent of web framework.
///
/// Callers move through three states: anonymous (no token), authenticated
/// (`Caller`, from a verified token) and authorized-admin (`AdminCaller`,
/// from `authorize_admin`). Administrative operations take an `AdminCaller`
/// and are therefore unreachable without that last step.
pub struct AccountService<R: UserRepository + ?Sized> {
    repo: Arc<R>,
    hasher: PasswordHasher,
    tokens: Arc<TokenIssuer>,
    // digest checked when the email is unknown so both login failures cost the same
    decoy: OnceCell<String>,
}

impl<R: UserRepository + ?Sized> AccountService<R> {
    pub fn new(repo: Arc<R>, hasher: PasswordHasher, tokens: Arc<TokenIssuer>) -> Self {
        Self { repo, hasher, tokens, decoy: OnceCell::new() }
    }

    pub fn tokens(&self) -> &TokenIssuer { &self.tokens }

    async fn hash_password(&self, plaintext: String) -> Result<String, AuthError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| AuthError::Hash(e.to_string()))?
    }

    async fn verify_password(&self, plaintext: String, digest: String) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &digest))
            .await
            .map_err(|e| AuthError::Hash(e.to_string()))
    }

    async fn decoy_digest(&self) -> Result<String, AuthError> {
        let digest = self
            .decoy
            .get_or_try_init(|| self.hash_password(Uuid::new_v4().to_string()))
            .await?;
        Ok(digest.clone())
    }

    /// Shared creation path for registration and administrative provisioning.
    async fn create_account(&self, input: RegisterInput, is_admin: bool) -> Result<UserRecord, AuthError> {
        check_password_strength(&input.password)?;
        check_name(&input.name)?;
        let email = normalize_email(&input.email);
        check_email(&email).map_err(|_| AuthError::InvalidRecord("invalid email".into()))?;

        if let Some(existing) = self.repo.find_by_email(&email).await? {
            debug!(user_id = %existing.id, "email already registered");
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = self.hash_password(input.password).await?;
        // the store's unique index settles any race past the check above
        self.repo
            .insert(NewUser { name: input.name.trim().to_string(), email, password_hash, is_admin })
            .await
    }

    /// Register a new, non-administrator account and issue a session token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AccountService, PasswordHasher, TokenIssuer, repository::mock::MockUserRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockUserRepository::default());
    /// let hasher = PasswordHasher::with_params(1024, 1, 1).unwrap();
    /// let svc = AccountService::new(repo, hasher, Arc::new(TokenIssuer::with_default_ttl(b"secret")));
    /// let input = RegisterInput { name: "Ann".into(), email: "ann@x.com".into(), password: "Aa1!aaaa".into() };
    /// let session = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(session.profile.email, "ann@x.com");
    /// assert!(!session.profile.is_admin);
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession, AuthError> {
        let user = self.create_account(input, false).await?;
        let token = self.tokens.issue(user.id)?;
        info!(user_id = %user.id, email = %user.email, "user_registered");
        Ok(AuthSession { profile: PublicProfile::from(&user), token })
    }

    /// Administrative create path: same validation as `register`, caller-chosen
    /// admin flag, no session issued.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn provision(&self, input: RegisterInput, is_admin: bool) -> Result<PublicProfile, AuthError> {
        let user = self.create_account(input, is_admin).await?;
        info!(user_id = %user.id, email = %user.email, is_admin, "user_provisioned");
        Ok(PublicProfile::from(&user))
    }

    /// Check credentials and issue a session token. Unknown email and wrong
    /// password fail identically.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn authenticate(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let email = normalize_email(&input.email);
        let found = self.repo.find_by_email(&email).await?;

        let digest = match &found {
            Some(user) => user.password_hash.clone(),
            None => self.decoy_digest().await?,
        };
        let matches = self.verify_password(input.password, digest).await?;

        let user = match found {
            Some(user) if matches => user,
            _ => {
                warn!("authentication_failed");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let token = self.tokens.issue(user.id)?;
        info!(user_id = %user.id, "user_authenticated");
        Ok(AuthSession { profile: PublicProfile::from(&user), token })
    }

    /// Resolve a presented token to a caller.
    pub fn authenticate_token(&self, token: &str) -> Result<Caller, AuthError> {
        self.tokens.verify(token).map(Caller::new).ok_or(AuthError::NotAuthenticated)
    }

    /// Logout has no server-side state to clear; this only records the event.
    pub fn logout(&self, token: Option<&str>) {
        match token.and_then(|t| self.tokens.verify(t)) {
            Some(user_id) => info!(%user_id, "user_logged_out"),
            None => debug!("logout without a valid session"),
        }
    }

    /// Promote an authenticated caller to `AdminCaller` if the stored account
    /// still exists and holds the administrative flag.
    pub async fn authorize_admin(&self, caller: &Caller) -> Result<AdminCaller, AuthError> {
        let user = self.repo.find_by_id(caller.id()).await?.ok_or(AuthError::NotAuthenticated)?;
        if !user.is_admin {
            warn!(user_id = %user.id, "admin_access_denied");
            return Err(AuthError::Forbidden);
        }
        Ok(AdminCaller::new(user.id, user.email))
    }

    #[instrument(skip(self), fields(user_id = %caller.id()))]
    pub async fn get_profile(&self, caller: &Caller) -> Result<PublicProfile, AuthError> {
        let user = self.repo.find_by_id(caller.id()).await?.ok_or(AuthError::NotFound)?;
        Ok(PublicProfile::from(&user))
    }

    /// Self-service update of name, email and password. Blank fields are ignored.
    #[instrument(skip(self, update), fields(user_id = %caller.id()))]
    pub async fn update_profile(&self, caller: &Caller, update: ProfileUpdate) -> Result<PublicProfile, AuthError> {
        let name = provided(update.name.as_deref()).map(str::to_string);
        if let Some(name) = &name {
            check_name(name)?;
        }
        let email = provided(update.email.as_deref()).map(normalize_email);
        if let Some(email) = &email {
            check_email(email)?;
        }
        let password = update.password.filter(|p| !p.is_empty());
        if let Some(password) = &password {
            check_password_strength(password)?;
        }

        let mut user = self.repo.find_by_id(caller.id()).await?.ok_or(AuthError::NotFound)?;
        if let Some(name) = name {
            user.name = name;
        }
        if let Some(email) = email {
            user.email = email;
        }
        let password_changed = password.is_some();
        if let Some(password) = password {
            user.password_hash = self.hash_password(password).await?;
        }

        let saved = self.repo.save(&user).await?.ok_or(AuthError::NotFound)?;
        info!(user_id = %saved.id, password_changed, "profile_updated");
        Ok(PublicProfile::from(&saved))
    }

    #[instrument(skip(self, admin), fields(admin_id = %admin.id()))]
    pub async fn list_users(&self, admin: &AdminCaller) -> Result<Vec<UserSummary>, AuthError> {
        let users = self.repo.list().await?;
        debug!(count = users.len(), "listed users");
        Ok(users.iter().map(UserSummary::from).collect())
    }

    #[instrument(skip(self, admin), fields(admin_id = %admin.id()))]
    pub async fn get_user_by_id(&self, admin: &AdminCaller, id: Uuid) -> Result<UserSummary, AuthError> {
        let user = self.repo.find_by_id(id).await?.ok_or(AuthError::NotFound)?;
        Ok(UserSummary::from(&user))
    }

    /// Administrative update of name, email and the admin flag. The flag is
    /// always written, so an update that omits it demotes the target.
    #[instrument(skip(self, admin), fields(admin_id = %admin.id()))]
    pub async fn update_user(&self, admin: &AdminCaller, id: Uuid, update: AdminUserUpdate) -> Result<PublicProfile, AuthError> {
        let name = provided(update.name.as_deref()).map(str::to_string);
        if let Some(name) = &name {
            check_name(name)?;
        }
        let email = provided(update.email.as_deref()).map(normalize_email);
        if let Some(email) = &email {
            check_email(email)?;
        }

        let mut user = self.repo.find_by_id(id).await?.ok_or(AuthError::NotFound)?;
        if let Some(name) = name {
            user.name = name;
        }
        if let Some(email) = email {
            user.email = email;
        }
        if update.is_admin != user.is_admin {
            info!(target_id = %user.id, is_admin = update.is_admin, "admin_flag_changed");
        }
        user.is_admin = update.is_admin;

        let saved = self.repo.save(&user).await?.ok_or(AuthError::NotFound)?;
        info!(target_id = %saved.id, "user_updated");
        Ok(PublicProfile::from(&saved))
    }

    /// Remove a non-administrator account. Administrators are never removed.
    #[instrument(skip(self, admin), fields(admin_id = %admin.id()))]
    pub async fn delete_user(&self, admin: &AdminCaller, id: Uuid) -> Result<(), AuthError> {
        let target = self.repo.find_by_id(id).await?.ok_or(AuthError::NotFound)?;
        if target.is_admin {
            return Err(AuthError::CannotDeleteAdmin);
        }
        if !self.repo.delete_non_admin(id).await? {
            // changed between the read and the delete
            return Err(match self.repo.find_by_id(id).await? {
                Some(u) if u.is_admin => AuthError::CannotDeleteAdmin,
                _ => AuthError::NotFound,
            });
        }
        info!(target_id = %id, "user_deleted");
        Ok(())
    }
}
