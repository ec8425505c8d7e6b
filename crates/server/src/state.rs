use std::sync::Arc;

use configs::AuthConfig;
use service::auth::repository::UserRepository;
use service::auth::AccountService;
use service::catalog::repository::ProductRepository;
use service::catalog::CatalogService;

/// How the session cookie is written back to clients.
#[derive(Clone, Debug)]
pub struct CookieSettings {
    pub name: String,
    pub secure: bool,
    pub max_age: time::Duration,
}

impl CookieSettings {
    pub fn from_config(auth: &AuthConfig) -> Self {
        Self {
            name: auth.cookie_name.clone(),
            secure: auth.cookie_secure,
            max_age: time::Duration::days(auth.token_ttl_days),
        }
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self { name: "jwt".to_string(), secure: false, max_age: time::Duration::days(30) }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService<dyn UserRepository>>,
    pub catalog: Arc<CatalogService<dyn ProductRepository>>,
    pub cookies: CookieSettings,
}

impl AppState {
    pub fn new(
        accounts: AccountService<dyn UserRepository>,
        catalog: CatalogService<dyn ProductRepository>,
        cookies: CookieSettings,
    ) -> Self {
        Self { accounts: Arc::new(accounts), catalog: Arc::new(catalog), cookies }
    }
}
