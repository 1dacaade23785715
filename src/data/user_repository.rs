use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::User;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace, warn};

#[derive(Default)]
struct UserTable {
    by_username: HashMap<String, User>,
    last_id: i64,
}

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    storage: Arc<RwLock<UserTable>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, password_hash))]
    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<User> {
        trace!("Acquiring write lock for user storage");
        let mut storage = self.storage.write().await;

        // checked under the write lock, so two inserts of one name cannot race
        if storage.by_username.contains_key(username) {
            warn!(username = username, "Username already present in storage");
            return Err(DomainError::AlreadyExists.into());
        }

        storage.last_id += 1;
        let user = User {
            id: storage.last_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        storage
            .by_username
            .insert(user.username.clone(), user.clone());

        debug!(
            user_id = user.id,
            username = %user.username,
            "User saved to memory storage"
        );
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        trace!("Acquiring read lock for user storage");
        let storage = self.storage.read().await;
        let user = storage.by_username.get(username).cloned();
        match &user {
            Some(u) => debug!(user_id = u.id, username = %u.username, "User found in storage"),
            None => trace!(username = username, "User not found in storage"),
        }
        Ok(user)
    }
}
