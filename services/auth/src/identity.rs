//! Mapping an external identity onto a local user account
//!
//! Lookup order: provider subject, then email (linking the subject to the
//! existing account), else a new account is created. The outcome is tagged
//! so callers and tests can tell the three paths apart.

use common::error::{DatabaseError, DatabaseResult};
use tracing::info;

use crate::{
    models::{ExternalIdentity, User},
    repositories::UserStore,
};

#[derive(Debug, Clone, PartialEq)]
pub enum IdentityResolution {
    /// Known by provider subject
    Found(User),
    /// Matched by email; the provider subject was attached
    Linked(User),
    /// First login, new account
    Created(User),
}

impl IdentityResolution {
    pub fn user(&self) -> &User {
        match self {
            IdentityResolution::Found(user)
            | IdentityResolution::Linked(user)
            | IdentityResolution::Created(user) => user,
        }
    }

    pub fn into_user(self) -> User {
        match self {
            IdentityResolution::Found(user)
            | IdentityResolution::Linked(user)
            | IdentityResolution::Created(user) => user,
        }
    }

    pub fn outcome(&self) -> &'static str {
        match self {
            IdentityResolution::Found(_) => "found",
            IdentityResolution::Linked(_) => "linked",
            IdentityResolution::Created(_) => "created",
        }
    }
}

pub async fn resolve_identity(
    store: &dyn UserStore,
    identity: &ExternalIdentity,
) -> DatabaseResult<IdentityResolution> {
    let resolution = match lookup(store, identity).await? {
        Some(resolution) => resolution,
        None => match store.create(identity).await {
            Ok(user) => IdentityResolution::Created(user),
            // A concurrent first login for the same account inserted it first
            Err(DatabaseError::Conflict(_)) => {
                lookup(store, identity).await?.ok_or(DatabaseError::NotFound)?
            }
            Err(e) => return Err(e),
        },
    };

    info!(
        "Resolved user {} for {} ({})",
        resolution.user().id,
        identity.email,
        resolution.outcome()
    );
    Ok(resolution)
}

async fn lookup(
    store: &dyn UserStore,
    identity: &ExternalIdentity,
) -> DatabaseResult<Option<IdentityResolution>> {
    if let Some(user) = store.find_by_external_id(&identity.external_auth_id).await? {
        return Ok(Some(IdentityResolution::Found(user)));
    }

    if let Some(user) = store.find_by_email(&identity.email).await? {
        let linked = store.link_external_identity(user.id, identity).await?;
        return Ok(Some(IdentityResolution::Linked(linked)));
    }

    Ok(None)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use common::Role;
    use std::sync::Mutex;
    use uuid::Uuid;

    /// In-memory user table with the same uniqueness rules as `users`
    #[derive(Default)]
    pub(crate) struct MemoryUsers {
        pub users: Mutex<Vec<User>>,
    }

    impl MemoryUsers {
        pub fn insert(&self, user: User) {
            self.users.lock().unwrap().push(user);
        }
    }

    #[async_trait]
    impl UserStore for MemoryUsers {
        async fn find_by_external_id(&self, external_auth_id: &str) -> DatabaseResult<Option<User>> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.external_auth_id.as_deref() == Some(external_auth_id))
                .cloned())
        }

        async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
            Ok(self.users.lock().unwrap().iter().find(|u| u.email == email).cloned())
        }

        async fn link_external_identity(&self, user_id: Uuid, identity: &ExternalIdentity) -> DatabaseResult<User> {
            let mut users = self.users.lock().unwrap();
            let user = users
                .iter_mut()
                .find(|u| u.id == user_id)
                .ok_or(DatabaseError::NotFound)?;
            user.external_auth_id = Some(identity.external_auth_id.clone());
            if identity.avatar_url.is_some() {
                user.avatar_url = identity.avatar_url.clone();
            }
            Ok(user.clone())
        }

        async fn create(&self, identity: &ExternalIdentity) -> DatabaseResult<User> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.email == identity.email) {
                return Err(DatabaseError::Conflict("email taken".to_string()));
            }
            let user = user_from(identity);
            users.push(user.clone());
            Ok(user)
        }

        async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
            Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
        }
    }

    pub(crate) fn user_from(identity: &ExternalIdentity) -> User {
        User {
            id: Uuid::new_v4(),
            email: identity.email.clone(),
            name: identity.name.clone(),
            external_auth_id: Some(identity.external_auth_id.clone()),
            avatar_url: identity.avatar_url.clone(),
            role: Role::Client,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn identity() -> ExternalIdentity {
        ExternalIdentity {
            external_auth_id: "google-42".to_string(),
            email: "lee@example.com".to_string(),
            name: "Lee".to_string(),
            avatar_url: Some("https://example.com/lee.png".to_string()),
        }
    }

    #[tokio::test]
    async fn unknown_identity_creates_a_client() {
        let store = MemoryUsers::default();

        let resolution = resolve_identity(&store, &identity()).await.unwrap();

        assert!(matches!(resolution, IdentityResolution::Created(_)));
        assert_eq!(resolution.user().role, Role::Client);
        assert_eq!(store.users.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn known_subject_is_found() {
        let store = MemoryUsers::default();
        let existing = user_from(&identity());
        store.insert(existing.clone());

        let resolution = resolve_identity(&store, &identity()).await.unwrap();

        assert_eq!(resolution, IdentityResolution::Found(existing));
    }

    #[tokio::test]
    async fn matching_email_is_linked() {
        let store = MemoryUsers::default();
        let mut existing = user_from(&identity());
        existing.external_auth_id = None;
        existing.avatar_url = None;
        existing.role = Role::Trainer;
        store.insert(existing.clone());

        let resolution = resolve_identity(&store, &identity()).await.unwrap();

        let IdentityResolution::Linked(user) = resolution else {
            panic!("expected a linked account, got {resolution:?}");
        };
        assert_eq!(user.id, existing.id);
        assert_eq!(user.role, Role::Trainer);
        assert_eq!(user.external_auth_id.as_deref(), Some("google-42"));
        assert_eq!(user.avatar_url, identity().avatar_url);
        assert_eq!(store.users.lock().unwrap().len(), 1);
    }
}
