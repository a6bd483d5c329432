//! User Directory - business rules for user accounts

use axum_helpers::errors::invalid_fields;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::error::{UserError, UserResult};
use crate::hasher::CredentialHasher;
use crate::models::{
    CreateUser, UpdateUser, User, UserConfirmation, UserResponse, normalize_roles,
};
use crate::repository::UserStore;

/// User directory providing the account operations
///
/// Validation, the advisory duplicate check and hashing happen here; the
/// store's own uniqueness constraint settles races between concurrent writes.
pub struct UserDirectory<S: UserStore, H: CredentialHasher> {
    store: Arc<S>,
    hasher: Arc<H>,
}

impl<S: UserStore, H: CredentialHasher> UserDirectory<S, H> {
    /// Create a new UserDirectory over the given store and hasher
    pub fn new(store: S, hasher: H) -> Self {
        Self {
            store: Arc::new(store),
            hasher: Arc::new(hasher),
        }
    }

    /// List all users without credentials, oldest first
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> UserResult<Vec<UserResponse>> {
        let users = self.store.find_all().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    /// Create a new user
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn create_user(&self, input: CreateUser) -> UserResult<UserConfirmation> {
        input.validate().map_err(rejected_fields)?;
        check_username(&input.username)?;
        let roles = check_roles(input.roles)?;

        if self
            .store
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(UserError::DuplicateUsername(input.username));
        }

        let credential_hash = self.hasher.hash(&input.password).await?;

        let user = User::new(input.username, credential_hash, roles);
        let created = self.store.insert(user).await?;

        tracing::info!(user_id = %created.id, "User created");
        Ok(UserConfirmation::created(&created))
    }

    /// Update a user's username, roles, active flag and optionally password
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn update_user(&self, id: Uuid, input: UpdateUser) -> UserResult<UserConfirmation> {
        input.validate().map_err(rejected_fields)?;
        check_username(&input.username)?;
        let roles = check_roles(input.roles)?;
        let active = input
            .active
            .ok_or_else(|| UserError::InvalidInput("active must be supplied".to_string()))?;

        let mut user = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        // A user keeping its own username is not a duplicate
        if let Some(holder) = self.store.find_by_username(&input.username).await? {
            if holder.id != id {
                return Err(UserError::DuplicateUsername(input.username));
            }
        }

        let new_credential_hash = match input.password.as_deref() {
            Some(password) if !password.is_empty() => Some(self.hasher.hash(password).await?),
            _ => None,
        };

        user.apply_update(input.username, roles, active, new_credential_hash);

        let updated = self.store.save(user).await?;

        tracing::info!(user_id = %updated.id, "User updated");
        Ok(UserConfirmation::updated(&updated))
    }

    /// Delete a single user by ID
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: Uuid) -> UserResult<UserConfirmation> {
        let user = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        // Removed by someone else since the lookup
        if !self.store.delete_by_id(id).await? {
            return Err(UserError::NotFound(id));
        }

        tracing::info!(user_id = %id, "User deleted");
        Ok(UserConfirmation::deleted(&user))
    }
}

impl<S: UserStore, H: CredentialHasher> Clone for UserDirectory<S, H> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            hasher: Arc::clone(&self.hasher),
        }
    }
}

/// Names the offending fields only; validator's own message embeds the rejected value.
fn rejected_fields(errors: ValidationErrors) -> UserError {
    UserError::InvalidInput(format!("invalid fields: {}", invalid_fields(&errors)))
}

fn check_username(username: &str) -> UserResult<()> {
    if username.trim().is_empty() {
        return Err(UserError::InvalidInput(
            "username must not be blank".to_string(),
        ));
    }
    Ok(())
}

fn check_roles(roles: Vec<String>) -> UserResult<Vec<String>> {
    match normalize_roles(roles) {
        Some(roles) if !roles.is_empty() => Ok(roles),
        Some(_) => Err(UserError::InvalidInput(
            "at least one role is required".to_string(),
        )),
        None => Err(UserError::InvalidInput(
            "role identifiers must not be blank".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::MockCredentialHasher;
    use crate::repository::MockUserStore;
    use mockall::predicate::eq;

    fn alice() -> User {
        User::new(
            "alice".to_string(),
            "$argon2id$stored".to_string(),
            vec!["editor".to_string()],
        )
    }

    fn create_input() -> CreateUser {
        CreateUser {
            username: "alice".to_string(),
            password: "s3cret!".to_string(),
            roles: vec!["editor".to_string()],
        }
    }

    fn update_input(password: Option<&str>) -> UpdateUser {
        UpdateUser {
            username: "alice".to_string(),
            password: password.map(str::to_string),
            roles: vec!["editor".to_string(), "viewer".to_string()],
            active: Some(false),
        }
    }

    #[tokio::test]
    async fn test_list_users_empty_is_ok() {
        let mut store = MockUserStore::new();
        store.expect_find_all().returning(|| Ok(vec![]));

        let directory = UserDirectory::new(store, MockCredentialHasher::new());
        let users = directory.list_users().await.unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn test_list_users_store_unavailable() {
        let mut store = MockUserStore::new();
        store
            .expect_find_all()
            .returning(|| Err(UserError::StoreUnavailable("connection refused".into())));

        let directory = UserDirectory::new(store, MockCredentialHasher::new());
        let result = directory.list_users().await;
        assert!(matches!(result, Err(UserError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_fields_before_store_access() {
        let cases = [
            CreateUser {
                username: String::new(),
                ..create_input()
            },
            CreateUser {
                username: "   ".to_string(),
                ..create_input()
            },
            CreateUser {
                password: String::new(),
                ..create_input()
            },
            CreateUser {
                roles: vec![],
                ..create_input()
            },
            CreateUser {
                roles: vec!["".to_string()],
                ..create_input()
            },
        ];

        // No expectations: any store or hasher call panics
        let directory = UserDirectory::new(MockUserStore::new(), MockCredentialHasher::new());
        for input in cases {
            let result = directory.create_user(input).await;
            assert!(matches!(result, Err(UserError::InvalidInput(_))));
        }
    }

    #[tokio::test]
    async fn test_create_duplicate_precheck_skips_hash_and_insert() {
        let mut store = MockUserStore::new();
        store
            .expect_find_by_username()
            .withf(|username| username == "alice")
            .returning(|_| Ok(Some(alice())));

        let directory = UserDirectory::new(store, MockCredentialHasher::new());
        let result = directory.create_user(create_input()).await;
        assert!(matches!(result, Err(UserError::DuplicateUsername(name)) if name == "alice"));
    }

    #[tokio::test]
    async fn test_create_race_lost_at_commit_is_duplicate() {
        let mut store = MockUserStore::new();
        store.expect_find_by_username().returning(|_| Ok(None));
        store
            .expect_insert()
            .times(1)
            .returning(|user| Err(UserError::DuplicateUsername(user.username)));

        let mut hasher = MockCredentialHasher::new();
        hasher
            .expect_hash()
            .returning(|_| Ok("$argon2id$fresh".to_string()));

        let directory = UserDirectory::new(store, hasher);
        let result = directory.create_user(create_input()).await;
        assert!(matches!(result, Err(UserError::DuplicateUsername(name)) if name == "alice"));
    }

    #[tokio::test]
    async fn test_create_stores_hash_not_password() {
        let mut store = MockUserStore::new();
        store.expect_find_by_username().returning(|_| Ok(None));
        store
            .expect_insert()
            .withf(|user| {
                user.credential_hash == "$argon2id$fresh"
                    && user.active
                    && user.roles == vec!["editor".to_string()]
            })
            .returning(Ok);

        let mut hasher = MockCredentialHasher::new();
        hasher
            .expect_hash()
            .withf(|plaintext| plaintext == "s3cret!")
            .times(1)
            .returning(|_| Ok("$argon2id$fresh".to_string()));

        let directory = UserDirectory::new(store, hasher);
        let confirmation = directory.create_user(create_input()).await.unwrap();
        assert_eq!(confirmation.username, "alice");
        assert!(confirmation.message.contains("alice"));
    }

    #[tokio::test]
    async fn test_create_hasher_failure_is_infrastructure_error() {
        let mut store = MockUserStore::new();
        store.expect_find_by_username().returning(|_| Ok(None));
        store.expect_insert().never();

        let mut hasher = MockCredentialHasher::new();
        hasher
            .expect_hash()
            .returning(|_| Err(UserError::StoreUnavailable("bad params".into())));

        let directory = UserDirectory::new(store, hasher);
        let result = directory.create_user(create_input()).await;
        assert!(matches!(result, Err(UserError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_update_requires_active() {
        let input = UpdateUser {
            active: None,
            ..update_input(None)
        };

        let directory = UserDirectory::new(MockUserStore::new(), MockCredentialHasher::new());
        let result = directory.update_user(Uuid::now_v7(), input).await;
        assert!(matches!(result, Err(UserError::InvalidInput(msg)) if msg.contains("active")));
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let id = Uuid::now_v7();
        let mut store = MockUserStore::new();
        store.expect_find_by_id().with(eq(id)).returning(|_| Ok(None));
        store.expect_save().never();

        let directory = UserDirectory::new(store, MockCredentialHasher::new());
        let result = directory.update_user(id, update_input(None)).await;
        assert!(matches!(result, Err(UserError::NotFound(missing)) if missing == id));
    }

    #[tokio::test]
    async fn test_update_username_taken_by_other_user() {
        let current = User::new("bob".into(), "hash".into(), vec!["viewer".into()]);
        let id = current.id;

        let mut store = MockUserStore::new();
        store
            .expect_find_by_id()
            .returning(move |_| Ok(Some(current.clone())));
        store
            .expect_find_by_username()
            .withf(|username| username == "alice")
            .returning(|_| Ok(Some(alice())));
        store.expect_save().never();

        let directory = UserDirectory::new(store, MockCredentialHasher::new());
        let result = directory.update_user(id, update_input(None)).await;
        assert!(matches!(result, Err(UserError::DuplicateUsername(_))));
    }

    #[tokio::test]
    async fn test_update_persists_fetched_record_without_rehash() {
        let current = alice();
        let id = current.id;
        let created_at = current.created_at;

        let mut store = MockUserStore::new();
        let fetched = current.clone();
        store
            .expect_find_by_id()
            .returning(move |_| Ok(Some(fetched.clone())));
        store
            .expect_find_by_username()
            .returning(move |_| Ok(Some(current.clone())));
        store
            .expect_save()
            .withf(move |user| {
                user.id == id
                    && user.created_at == created_at
                    && user.credential_hash == "$argon2id$stored"
                    && user.roles == vec!["editor".to_string(), "viewer".to_string()]
                    && !user.active
            })
            .returning(Ok);

        let mut hasher = MockCredentialHasher::new();
        hasher.expect_hash().never();

        let directory = UserDirectory::new(store, hasher);
        let confirmation = directory.update_user(id, update_input(Some(""))).await.unwrap();
        assert_eq!(confirmation.id, id);
        assert_eq!(confirmation.username, "alice");
    }

    #[tokio::test]
    async fn test_update_with_password_rehashes() {
        let current = alice();
        let id = current.id;

        let mut store = MockUserStore::new();
        store
            .expect_find_by_id()
            .returning(move |_| Ok(Some(current.clone())));
        store.expect_find_by_username().returning(|_| Ok(None));
        store
            .expect_save()
            .withf(|user| user.credential_hash == "$argon2id$rotated")
            .returning(Ok);

        let mut hasher = MockCredentialHasher::new();
        hasher
            .expect_hash()
            .withf(|plaintext| plaintext == "n3w-pass")
            .times(1)
            .returning(|_| Ok("$argon2id$rotated".to_string()));

        let directory = UserDirectory::new(store, hasher);
        directory
            .update_user(id, update_input(Some("n3w-pass")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_invalid_input_message_omits_password() {
        let input = CreateUser {
            password: format!("TOPSECRET{}", "x".repeat(130)),
            ..create_input()
        };

        let directory = UserDirectory::new(MockUserStore::new(), MockCredentialHasher::new());
        let result = directory.create_user(input).await;
        match result {
            Err(UserError::InvalidInput(msg)) => {
                assert_eq!(msg, "invalid fields: password");
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }

        let input = UpdateUser {
            password: Some(format!("TOPSECRET{}", "x".repeat(130))),
            ..update_input(None)
        };
        let result = directory.update_user(Uuid::now_v7(), input).await;
        assert!(matches!(result, Err(UserError::InvalidInput(msg)) if !msg.contains("TOPSECRET")));
    }

    #[tokio::test]
    async fn test_update_race_lost_at_commit_is_duplicate() {
        let current = User::new("bob".into(), "hash".into(), vec!["viewer".into()]);
        let id = current.id;

        let mut store = MockUserStore::new();
        store
            .expect_find_by_id()
            .returning(move |_| Ok(Some(current.clone())));
        store.expect_find_by_username().returning(|_| Ok(None));
        store
            .expect_save()
            .times(1)
            .returning(|user| Err(UserError::DuplicateUsername(user.username)));

        let directory = UserDirectory::new(store, MockCredentialHasher::new());
        let result = directory.update_user(id, update_input(None)).await;
        assert!(matches!(result, Err(UserError::DuplicateUsername(name)) if name == "alice"));
    }

    #[tokio::test]
    async fn test_update_hasher_failure_skips_save() {
        let current = alice();
        let id = current.id;

        let mut store = MockUserStore::new();
        store
            .expect_find_by_id()
            .returning(move |_| Ok(Some(current.clone())));
        store.expect_find_by_username().returning(|_| Ok(None));
        store.expect_save().never();

        let mut hasher = MockCredentialHasher::new();
        hasher
            .expect_hash()
            .times(1)
            .returning(|_| Err(UserError::StoreUnavailable("hashing task failed".into())));

        let directory = UserDirectory::new(store, hasher);
        let result = directory.update_user(id, update_input(Some("n3w-pass"))).await;
        assert!(matches!(result, Err(UserError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_user() {
        let mut store = MockUserStore::new();
        store.expect_find_by_id().returning(|_| Ok(None));
        store.expect_delete_by_id().never();

        let directory = UserDirectory::new(store, MockCredentialHasher::new());
        let result = directory.delete_user(Uuid::now_v7()).await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_only_target() {
        let current = alice();
        let id = current.id;

        let mut store = MockUserStore::new();
        store
            .expect_find_by_id()
            .returning(move |_| Ok(Some(current.clone())));
        store
            .expect_delete_by_id()
            .with(eq(id))
            .times(1)
            .returning(|_| Ok(true));
        store.expect_find_all().never();

        let directory = UserDirectory::new(store, MockCredentialHasher::new());
        let confirmation = directory.delete_user(id).await.unwrap();
        assert_eq!(confirmation.id, id);
        assert_eq!(confirmation.username, "alice");
    }

    #[tokio::test]
    async fn test_delete_lost_to_concurrent_delete() {
        let current = alice();

        let mut store = MockUserStore::new();
        store
            .expect_find_by_id()
            .returning(move |_| Ok(Some(current.clone())));
        store.expect_delete_by_id().returning(|_| Ok(false));

        let directory = UserDirectory::new(store, MockCredentialHasher::new());
        let result = directory.delete_user(Uuid::now_v7()).await;
        assert!(matches!(result, Err(UserError::NotFound(_))));
    }
}
