use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_users::{Argon2Hasher, MongoUserStore};
use eyre::WrapErr;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    init_tracing(&config.environment);

    // Connect to MongoDB with retry
    let mongo_client = database::mongodb::connect_with_retry(&config.mongodb, &config.mongo_retry)
        .await
        .wrap_err("Failed to connect to MongoDB")?;

    let db = mongo_client.database(&config.mongodb.database);

    let state = AppState {
        config,
        mongo_client,
        db,
    };

    // The unique username index must exist before the first write
    let store = MongoUserStore::with_collection(state.db.clone(), &state.config.users_collection);
    store
        .create_indexes()
        .await
        .wrap_err("Failed to create user indexes")?;

    let hasher = Argon2Hasher::new(state.config.hasher)
        .map_err(|e| eyre::eyre!("Invalid Argon2 parameters: {}", e))?;

    // Build router with API routes
    let api_routes = api::routes(&state, store, hasher);

    // Create a router with OpenAPI docs
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;

    // Merge health endpoints
    let app = router.merge(health_router(state.config.app));

    info!("Starting Users API with production-ready shutdown (30s timeout)");

    let server_config = state.config.server;
    let mongo_client = state.mongo_client.clone();
    drop(state);

    create_production_app(
        app,
        &server_config,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: closing MongoDB connections");
            mongo_client.shutdown().await;
            info!("MongoDB connection closed successfully");
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Users API shutdown complete");
    Ok(())
}
