use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_default;
use configs::{AppConfig, BootstrapAdmin};
use dotenvy::dotenv;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use service::auth::domain::RegisterInput;
use service::auth::repo::seaorm::SeaOrmUserRepository;
use service::auth::repository::UserRepository;
use service::auth::{AccountService, AuthError, PasswordHasher, TokenIssuer};
use service::catalog::repository::{ProductRepository, SeaOrmProductRepository};
use service::catalog::CatalogService;

use crate::errors::StartupError;
use crate::routes;
use crate::state::{AppState, CookieSettings};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))
}

/// Wire the SeaORM stores and services into router state.
pub fn build_state(db: DatabaseConnection, cfg: &AppConfig) -> AppState {
    let users: Arc<dyn UserRepository> = Arc::new(SeaOrmUserRepository::new(db.clone()));
    let products: Arc<dyn ProductRepository> = Arc::new(SeaOrmProductRepository::new(db));
    let tokens = TokenIssuer::new(cfg.auth.jwt_secret.as_bytes(), chrono::Duration::days(cfg.auth.token_ttl_days));
    let accounts = AccountService::new(users, PasswordHasher::default(), Arc::new(tokens));
    AppState::new(accounts, CatalogService::new(products), CookieSettings::from_config(&cfg.auth))
}

/// Provision the configured administrator unless the email is already taken.
pub async fn bootstrap_admin(
    accounts: &AccountService<dyn UserRepository>,
    admin: &BootstrapAdmin,
) -> Result<(), StartupError> {
    let input = RegisterInput { name: admin.name.clone(), email: admin.email.clone(), password: admin.password.clone() };
    match accounts.provision(input, true).await {
        Ok(profile) => {
            info!(user_id = %profile.id, email = %profile.email, "bootstrap admin created");
            Ok(())
        }
        Err(AuthError::DuplicateEmail) => {
            info!(email = %admin.email, "bootstrap admin already present");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!(event = "shutdown_signal", "shutdown signal received, draining connections");
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> Result<(), StartupError> {
    dotenv().ok();
    init_logging_default();

    let cfg = AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;

    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None).await.map_err(anyhow::Error::from)?;
    info!("migrations applied");

    let state = build_state(db, &cfg);
    if let Some(admin) = &cfg.auth.bootstrap_admin {
        bootstrap_admin(&state.accounts, admin).await?;
    }

    let app: Router = routes::build_router(state, build_cors());

    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(anyhow::Error::from)?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)?;
    info!("server stopped");
    Ok(())
}
