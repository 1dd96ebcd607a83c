//! Durable registry of user accounts.
//!
//! Accounts exist so records can carry an ownership tag; authentication
//! transport is a front-end concern and never reaches this layer. Deleting
//! an account is not modeled: clearing removes a user's records, not the
//! user.

use crate::application::persistence::{load_collection, persist_collection};
use crate::domain::errors::{PersistenceError, UserError};
use crate::domain::ports::KeyValueStorage;
use crate::domain::types::User;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Storage key holding the serialized user list.
pub const USERS_KEY: &str = "evallog_users";

pub struct UserDirectory {
    storage: Arc<dyn KeyValueStorage>,
}

impl UserDirectory {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Register a new account. Usernames are unique within the directory.
    pub async fn register(&self, username: &str, email: Option<&str>) -> Result<User, UserError> {
        let mut users: Vec<User> = load_collection(self.storage.as_ref(), USERS_KEY).await?;

        if users.iter().any(|u| u.username == username) {
            return Err(UserError::DuplicateUsername(username.to_string()));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            email: email.map(str::to_string),
            created_at: Utc::now(),
        };

        users.push(user.clone());
        persist_collection(self.storage.as_ref(), USERS_KEY, &users).await?;

        info!("Registered user '{}'", user.username);
        Ok(user)
    }

    /// All accounts in registration order.
    pub async fn list(&self) -> Result<Vec<User>, PersistenceError> {
        load_collection(self.storage.as_ref(), USERS_KEY).await
    }

    pub async fn find(&self, username: &str) -> Result<Option<User>, PersistenceError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|u| u.username == username))
    }
}
