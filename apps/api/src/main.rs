//! Tenura API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod bootstrap;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use tenura_core::AppError;
use tenura_infrastructure::Argon2PasswordHasher;
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::api_services::{
    RepositorySet, SecuritySettings, assemble_app_state, build_access_cache, build_redis_client,
    connect_and_migrate,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let pool =
        connect_and_migrate(config.database_url.as_str(), config.database_max_connections).await?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let repositories = RepositorySet::postgres(&pool);
    let redis_client = config
        .redis_url
        .as_deref()
        .map(build_redis_client)
        .transpose()?;
    let access_cache = build_access_cache(&config, redis_client.clone())?;

    if let Some(bootstrap_admin) = &config.bootstrap_admin {
        bootstrap::ensure_bootstrap_admin(
            &repositories,
            access_cache.as_ref(),
            &Argon2PasswordHasher::new(),
            bootstrap_admin,
        )
        .await?;
    }

    let mut app_state =
        assemble_app_state(&repositories, access_cache, &SecuritySettings::from(&config))?;
    app_state.postgres_pool = Some(pool);
    app_state.redis_client = redis_client;

    let app = api_router::build_router(app_state, config.frontend_url.as_str())?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind API listener: {error}")))?;

    info!(%address, "tenura-api listening");
    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("API server failed: {error}")))
}
