use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod middleware;
mod models;
mod repositories;
mod routes;
mod schedule;
mod services;
mod state;
mod transition;

use common::{
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
    token::{JwtConfig, JwtService},
};
use tokio::net::TcpListener;

use crate::{config::ApiSettings, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting API service");

    let settings = ApiSettings::from_env()?;
    let schedule_offset = settings.schedule_offset()?;

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

    let jwt = JwtService::new(JwtConfig::from_env()?)?;

    info!("API service initialized successfully");

    let app = routes::create_router(AppState::new(pool, jwt, schedule_offset));

    let listener = TcpListener::bind(&settings.bind_address).await?;
    info!("API service listening on {}", settings.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
