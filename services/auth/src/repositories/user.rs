//! User repository for database operations

use async_trait::async_trait;
use common::{
    Role,
    error::{DatabaseError, DatabaseResult},
};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::{ExternalIdentity, User};

const USER_COLUMNS: &str =
    "id, email, name, external_auth_id, avatar_url, role, created_at, updated_at";

/// User lookups and writes needed by login and profile
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_external_id(&self, external_auth_id: &str) -> DatabaseResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>>;

    /// Attach the provider subject (and avatar, when given) to an existing user
    async fn link_external_identity(&self, user_id: Uuid, identity: &ExternalIdentity) -> DatabaseResult<User>;

    /// Insert a user with the default role
    async fn create(&self, identity: &ExternalIdentity) -> DatabaseResult<User>;

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>>;
}

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> DatabaseResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_external_id(&self, external_auth_id: &str) -> DatabaseResult<Option<User>> {
        self.find_one("external_auth_id", external_auth_id).await
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        self.find_one("email", email).await
    }

    async fn link_external_identity(&self, user_id: Uuid, identity: &ExternalIdentity) -> DatabaseResult<User> {
        info!("Linking external identity to user: {}", user_id);

        let sql = format!(
            r#"
            UPDATE users
            SET external_auth_id = $2, avatar_url = COALESCE($3, avatar_url), updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .bind(&identity.external_auth_id)
            .bind(&identity.avatar_url)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DatabaseError::NotFound)
    }

    async fn create(&self, identity: &ExternalIdentity) -> DatabaseResult<User> {
        info!("Creating new user: {}", identity.email);

        let sql = format!(
            r#"
            INSERT INTO users (email, name, external_auth_id, avatar_url, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&identity.email)
            .bind(&identity.name)
            .bind(&identity.external_auth_id)
            .bind(&identity.avatar_url)
            .bind(Role::default())
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}
