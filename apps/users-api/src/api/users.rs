//! Users API routes
//!
//! This module wires up the users domain to HTTP routes.

use axum::Router;
use domain_users::{Argon2Hasher, MongoUserStore, UserDirectory, handlers};

/// Create users router
pub fn router(store: MongoUserStore, hasher: Argon2Hasher) -> Router {
    let directory = UserDirectory::new(store, hasher);

    handlers::router(directory)
}
