use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// User entity - the document persisted by a `UserStore`
///
/// Never serialized into API responses; handlers only see [`UserResponse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// Login name, unique across all users (exact match)
    pub username: String,
    /// Argon2 PHC string
    pub credential_hash: String,
    /// Role identifiers, deduplicated, never empty
    pub roles: Vec<String>,
    /// Whether the account is enabled
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User projection returned to callers (no credential hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            roles: user.roles,
            active: user.active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// DTO for creating a new user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
    #[validate(length(min = 1))]
    pub roles: Vec<String>,
}

/// DTO for replacing a user's mutable fields
///
/// `active` is optional only so that a missing value can be reported as
/// invalid input instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    /// New password; empty or absent keeps the current credential
    #[validate(length(max = 128))]
    pub password: Option<String>,
    #[validate(length(min = 1))]
    pub roles: Vec<String>,
    pub active: Option<bool>,
}

/// Confirmation returned by the mutating operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserConfirmation {
    pub id: Uuid,
    pub username: String,
    pub message: String,
}

impl UserConfirmation {
    pub fn created(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            message: format!("New user {} created.", user.username),
        }
    }

    pub fn updated(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            message: format!("{} updated successfully", user.username),
        }
    }

    pub fn deleted(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            message: format!("User {} with ID {} deleted", user.username, user.id),
        }
    }
}

impl User {
    /// Create a new active user (credential must already be hashed)
    pub fn new(username: String, credential_hash: String, roles: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            username,
            credential_hash,
            roles,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a validated update in place.
    ///
    /// The credential is only replaced when a freshly computed hash is given.
    pub fn apply_update(
        &mut self,
        username: String,
        roles: Vec<String>,
        active: bool,
        new_credential_hash: Option<String>,
    ) {
        self.username = username;
        self.roles = roles;
        self.active = active;
        if let Some(hash) = new_credential_hash {
            self.credential_hash = hash;
        }
        self.updated_at = Utc::now();
    }
}

/// Collapse duplicate roles, keeping first-occurrence order.
///
/// Returns `None` when a role identifier is blank.
pub fn normalize_roles(roles: Vec<String>) -> Option<Vec<String>> {
    let mut unique: Vec<String> = Vec::with_capacity(roles.len());
    for role in roles {
        if role.trim().is_empty() {
            return None;
        }
        if !unique.contains(&role) {
            unique.push(role);
        }
    }
    Some(unique)
}
