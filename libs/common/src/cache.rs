//! Redis cache module
//!
//! Short-lived state that must survive between two HTTP requests (the OAuth
//! `state`/PKCE verifier pair) lives here. Values are stored as JSON with a
//! TTL and can be consumed exactly once with [`RedisPool::take_json`].

use anyhow::{Context, Result};
use redis::{AsyncCommands, Client};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info};

/// Configuration for Redis connection
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
}

impl RedisConfig {
    /// Create a new RedisConfig from environment variables
    ///
    /// # Environment Variables
    /// - `REDIS_URL`: Redis connection URL (default: "redis://localhost:6379")
    pub fn from_env() -> Result<Self> {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        Ok(RedisConfig { url })
    }
}

/// Redis client handle, cheap to clone
#[derive(Clone)]
pub struct RedisPool {
    client: Client,
}

impl RedisPool {
    /// Initialize a new Redis client
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.clone())
            .with_context(|| format!("invalid Redis URL: {}", config.url))?;
        info!("Redis client initialized");
        Ok(RedisPool { client })
    }

    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        let conn = self.client.get_multiplexed_async_connection().await?;
        Ok(conn)
    }

    /// Store a JSON-encoded value under `key`, expiring after `ttl_seconds`
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl_seconds: u64) -> Result<()> {
        let payload = serde_json::to_string(value)?;
        let mut conn = self.get_connection().await?;
        let _: () = conn.set_ex(key, payload, ttl_seconds).await?;
        debug!("Stored cache key {} (ttl {}s)", key, ttl_seconds);
        Ok(())
    }

    /// Atomically read and delete the value under `key`
    ///
    /// Returns `None` when the key is absent or already expired. A second call
    /// for the same key always returns `None`.
    pub async fn take_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut conn = self.get_connection().await?;
        let payload: Option<String> = redis::cmd("GETDEL")
            .arg(key)
            .query_async(&mut conn)
            .await?;

        payload
            .map(|raw| serde_json::from_str(&raw).context("corrupt cache payload"))
            .transpose()
    }

    /// Check if Redis is reachable
    pub async fn health_check(&self) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG")
    }
}
