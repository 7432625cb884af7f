//! Common library for the coaching backend
//!
//! This crate provides shared functionality used by the auth and api
//! services: database connectivity and migrations, the storage error
//! taxonomy, the Redis cache, and bearer-token handling.
//!
//! ```rust,no_run
//! use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env()?;
//!     let pool = init_pool(&config).await?;
//!     run_migrations(&pool).await?;
//!     println!("Database health check: {}", health_check(&pool).await?);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod database;
pub mod error;
pub mod principal;
pub mod token;

pub use principal::{Principal, Role};
