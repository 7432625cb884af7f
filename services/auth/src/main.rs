use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod identity;
mod middleware;
mod models;
mod oauth;
mod repositories;
mod routes;

use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
    token::{JwtConfig, JwtService},
};
use tokio::net::TcpListener;

use crate::{
    config::AuthSettings,
    oauth::OAuthClient,
    repositories::{UserRepository, UserStore},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub redis_pool: RedisPool,
    pub jwt_service: JwtService,
    pub oauth_client: OAuthClient,
    pub user_repository: Arc<dyn UserStore>,
    pub settings: Arc<AuthSettings>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting authentication service");

    let settings = AuthSettings::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool).await?;

    // Initialize JWT service
    let jwt_service = JwtService::new(JwtConfig::from_env()?)?;

    // Initialize Redis connection pool
    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;

    let oauth_client = OAuthClient::new_google(&settings)?;

    info!("Authentication service initialized successfully");

    let bind_address = settings.bind_address.clone();
    let app_state = AppState {
        redis_pool,
        jwt_service,
        oauth_client,
        user_repository: Arc::new(UserRepository::new(pool)),
        settings: Arc::new(settings),
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&bind_address).await?;
    info!("Authentication service listening on {}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
