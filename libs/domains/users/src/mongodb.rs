//! MongoDB implementation of UserStore

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc, to_bson},
    options::IndexOptions,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{UserError, UserResult, is_duplicate_key};
use crate::models::User;
use crate::repository::UserStore;

/// Name of the unique index backing username uniqueness
pub const USERNAME_INDEX: &str = "username_unique";

/// MongoDB implementation of the UserStore
#[derive(Clone)]
pub struct MongoUserStore {
    collection: Collection<User>,
}

impl MongoUserStore {
    /// Create a new MongoUserStore over the `users` collection
    ///
    /// # Example
    /// ```ignore
    /// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
    /// let store = MongoUserStore::new(client.database("mydb"));
    /// store.create_indexes().await?;
    /// ```
    pub fn new(db: Database) -> Self {
        Self::with_collection(db, "users")
    }

    /// Create a new MongoUserStore with a custom collection name
    pub fn with_collection(db: Database, collection_name: &str) -> Self {
        let collection = db.collection::<User>(collection_name);
        Self { collection }
    }

    /// Get the underlying collection for advanced operations
    pub fn collection(&self) -> &Collection<User> {
        &self.collection
    }

    /// Create the unique username index.
    ///
    /// Must run before serving traffic: the directory's duplicate check is
    /// only advisory and this index is what rejects racing writes.
    pub async fn create_indexes(&self) -> UserResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "username": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name(USERNAME_INDEX.to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        Ok(())
    }

    fn id_filter(id: Uuid) -> Document {
        doc! { "_id": to_bson(&id).unwrap_or(Bson::Null) }
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    /// Oldest first. Ids are v7 UUIDs stored as binary, whose byte order is
    /// creation order, so the `_id` index serves the sort.
    #[instrument(skip(self))]
    async fn find_all(&self) -> UserResult<Vec<User>> {
        let cursor = self.collection.find(doc! {}).sort(doc! { "_id": 1 }).await?;
        let users: Vec<User> = cursor.try_collect().await?;

        Ok(users)
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> UserResult<Option<User>> {
        let user = self
            .collection
            .find_one(doc! { "username": username })
            .await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let user = self.collection.find_one(Self::id_filter(id)).await?;
        Ok(user)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id, username = %user.username))]
    async fn insert(&self, user: User) -> UserResult<User> {
        self.collection.insert_one(&user).await.map_err(|e| {
            if is_duplicate_key(&e) {
                UserError::DuplicateUsername(user.username.clone())
            } else {
                e.into()
            }
        })?;

        tracing::info!("User inserted");
        Ok(user)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id, username = %user.username))]
    async fn save(&self, user: User) -> UserResult<User> {
        let result = self
            .collection
            .replace_one(Self::id_filter(user.id), &user)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    UserError::DuplicateUsername(user.username.clone())
                } else {
                    e.into()
                }
            })?;

        if result.matched_count == 0 {
            return Err(UserError::NotFound(user.id));
        }

        tracing::info!("User saved");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: Uuid) -> UserResult<bool> {
        let result = self.collection.delete_one(Self::id_filter(id)).await?;

        if result.deleted_count == 0 {
            return Ok(false);
        }

        tracing::info!(user_id = %id, "User deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_filter_targets_primary_key() {
        let id = Uuid::now_v7();
        let filter = MongoUserStore::id_filter(id);
        assert!(filter.contains_key("_id"));
        assert_ne!(filter.get("_id"), Some(&Bson::Null));
    }

    #[test]
    fn test_user_document_shape() {
        let user = User::new("alice".into(), "hash".into(), vec!["editor".into()]);
        let document = mongodb::bson::to_document(&user).unwrap();

        assert!(document.contains_key("_id"));
        assert!(!document.contains_key("id"));
        for key in ["username", "credential_hash", "roles", "active"] {
            assert!(document.contains_key(key), "missing {}", key);
        }
    }
}
