//! Users Domain
//!
//! This module provides the user directory: account creation, listing,
//! updates and deletion with unique usernames and Argon2-hashed credentials.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │   Handlers   │  ← HTTP endpoints
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐
//! │ UserDirectory│  ← Validation, duplicate pre-check, hashing
//! └──┬────────┬──┘
//!    │        │
//! ┌──▼─────┐ ┌▼────────────────┐
//! │UserStore│ │CredentialHasher │  ← Persistence / password hashing
//! └──┬─────┘ └─────────────────┘
//!    │
//! ┌──▼─────┐
//! │ Models │  ← Entities, DTOs
//! └────────┘
//! ```
//!
//! Username uniqueness is enforced by the store (a unique index in MongoDB);
//! the directory's lookup before writing only produces the friendlier error.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{
//!     Argon2Hasher, HasherConfig, MongoUserStore, UserDirectory, handlers,
//! };
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let store = MongoUserStore::new(client.database("mydb"));
//! store.create_indexes().await?;
//!
//! let hasher = Argon2Hasher::new(HasherConfig::default())?;
//! let directory = UserDirectory::new(store, hasher);
//!
//! let router = handlers::router(directory);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod hasher;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use hasher::{Argon2Hasher, CredentialHasher, HasherConfig};
pub use models::{CreateUser, UpdateUser, User, UserConfirmation, UserResponse};
pub use self::mongodb::MongoUserStore;
pub use repository::{InMemoryUserStore, UserStore};
pub use service::UserDirectory;
