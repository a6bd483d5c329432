//! Application state management.
//!
//! The state is only used by app-level routes such as readiness; the users
//! router carries its own `UserDirectory` state.

use mongodb::{Client, Database};

/// Shared application state.
///
/// Cloned for each handler (inexpensive, the MongoDB client shares its pool).
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// MongoDB client (cloneable, shares underlying connection pool)
    pub mongo_client: Client,
    /// MongoDB database instance
    pub db: Database,
}
