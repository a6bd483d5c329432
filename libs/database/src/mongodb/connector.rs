use mongodb::{Client, bson::doc};
use tracing::info;

use super::MongoConfig;
use crate::retry::{RetryPolicy, retry};

#[derive(Debug, thiserror::Error)]
pub enum MongoError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

/// Build a client from `config` and ping the server.
///
/// The driver connects lazily, so without the ping a bad URL or a down
/// server would only surface on the first request.
pub async fn connect(config: &MongoConfig) -> Result<Client, MongoError> {
    info!(url = %config.redacted_url(), "Connecting to MongoDB");

    let client = Client::with_options(config.client_options().await?)?;

    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| MongoError::ConnectionFailed(e.to_string()))?;

    info!(database = %config.database, "Connected to MongoDB");
    Ok(client)
}

/// [`connect`] under a retry policy; returns the last attempt's error.
pub async fn connect_with_retry(
    config: &MongoConfig,
    policy: &RetryPolicy,
) -> Result<Client, MongoError> {
    retry(policy, || connect(config)).await
}
