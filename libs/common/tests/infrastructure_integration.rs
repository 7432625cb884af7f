//! Integration tests for the infrastructure components
//!
//! These tests need a PostgreSQL database (`DATABASE_URL`) and a Redis
//! instance (`REDIS_URL`), so they are ignored by default.

use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
};
use serde::{Deserialize, Serialize};
use sqlx::Row;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct PendingLogin {
    verifier: String,
    created_at: i64,
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_database_migrations_apply() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    run_migrations(&pool).await?;
    // Running twice is a no-op
    run_migrations(&pool).await?;

    let row = sqlx::query(
        "SELECT COUNT(*) AS tables FROM information_schema.tables
         WHERE table_schema = 'public'
           AND table_name IN ('users', 'availabilities', 'slots', 'bookings', 'workout_plans', 'exercises')",
    )
    .fetch_one(&pool)
    .await?;

    let tables: i64 = row.get("tables");
    assert_eq!(tables, 6, "schema is missing tables");

    Ok(())
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn test_cached_value_is_consumed_once() -> Result<(), Box<dyn std::error::Error>> {
    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;

    assert!(
        redis_pool.health_check().await?,
        "Redis health check failed"
    );

    let key = "integration_test:pending_login";
    let value = PendingLogin {
        verifier: "verifier".to_string(),
        created_at: 1_700_000_000,
    };

    redis_pool.set_json(key, &value, 10).await?;

    let first: Option<PendingLogin> = redis_pool.take_json(key).await?;
    assert_eq!(first, Some(value));

    let second: Option<PendingLogin> = redis_pool.take_json(key).await?;
    assert_eq!(second, None, "value was readable twice");

    Ok(())
}
