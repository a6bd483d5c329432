use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::User;

/// Persistence interface for users
///
/// Implementations must enforce username uniqueness themselves: `insert` and
/// `save` fail with [`UserError::DuplicateUsername`] when another record
/// already holds the username. Each method is a single atomic store operation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// All users, oldest first
    async fn find_all(&self) -> UserResult<Vec<User>>;

    /// Exact-match lookup by username
    async fn find_by_username(&self, username: &str) -> UserResult<Option<User>>;

    /// Get a user by ID
    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Insert a new user
    async fn insert(&self, user: User) -> UserResult<User>;

    /// Replace a stored user with this version of it
    async fn save(&self, user: User) -> UserResult<User>;

    /// Remove a single user, returning whether it existed
    async fn delete_by_id(&self, id: Uuid) -> UserResult<bool>;
}

/// In-memory implementation of UserStore (for development/testing)
///
/// The write lock makes the uniqueness check and the write one atomic step.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_all(&self) -> UserResult<Vec<User>> {
        let users = self.users.read().await;

        let mut result: Vec<User> = users.values().cloned().collect();
        // v7 ids sort in creation order
        result.sort_by_key(|user| user.id);

        Ok(result)
    }

    async fn find_by_username(&self, username: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.username == user.username) {
            return Err(UserError::DuplicateUsername(user.username));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, username = %user.username, "Inserted user");
        Ok(user)
    }

    async fn save(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id));
        }

        // Check for duplicate username (excluding this user)
        let taken = users
            .values()
            .any(|u| u.id != user.id && u.username == user.username);

        if taken {
            return Err(UserError::DuplicateUsername(user.username));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, "Saved user");
        Ok(user)
    }

    async fn delete_by_id(&self, id: Uuid) -> UserResult<bool> {
        let mut users = self.users.write().await;

        if users.remove(&id).is_some() {
            tracing::info!(user_id = %id, "Deleted user");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
