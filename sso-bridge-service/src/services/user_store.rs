//! User store collaborator boundary.
//!
//! The host owns the user store; this service only looks up, creates, and
//! (best-effort) updates the privilege flag through this trait. The
//! in-memory implementation backs the standalone service and the tests.

use crate::models::LocalUser;
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("user store failure: {0}")]
    Backend(String),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Exact-name lookup; case sensitivity is the store's business.
    async fn find_by_name(&self, username: &str) -> Result<Option<LocalUser>, UserStoreError>;

    /// Create a user with `username` as the only seed attribute.
    async fn create(&self, username: &str) -> Result<LocalUser, UserStoreError>;

    /// Apply the admin flag to an existing user.
    async fn set_admin(&self, user_id: Uuid, is_admin: bool) -> Result<(), UserStoreError>;
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, LocalUser>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user directly; test and bootstrap helper.
    pub async fn insert(&self, username: &str, is_admin: bool) -> LocalUser {
        let user = LocalUser {
            id: Uuid::new_v4(),
            username: username.to_string(),
            is_admin,
        };
        self.users.write().await.insert(user.id, user.clone());
        user
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_name(&self, username: &str) -> Result<Option<LocalUser>, UserStoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn create(&self, username: &str) -> Result<LocalUser, UserStoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == username) {
            return Err(UserStoreError::Backend(format!(
                "user '{}' already exists",
                username
            )));
        }

        let user = LocalUser {
            id: Uuid::new_v4(),
            username: username.to_string(),
            is_admin: false,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn set_admin(&self, user_id: Uuid, is_admin: bool) -> Result<(), UserStoreError> {
        let mut users = self.users.write().await;
        match users.get_mut(&user_id) {
            Some(user) => {
                user.is_admin = is_admin;
                Ok(())
            }
            None => Err(UserStoreError::Backend(format!(
                "no user with id {}",
                user_id
            ))),
        }
    }
}
