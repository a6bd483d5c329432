use mongodb::{Client, bson::doc};

use super::MongoError;

/// `ping` the deployment; used by readiness probes.
pub async fn check_health(client: &Client) -> Result<(), MongoError> {
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map(|_| ())
        .map_err(MongoError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::options::ClientOptions;
    use std::time::Duration;

    #[tokio::test]
    async fn test_check_health_unreachable() {
        let mut options = ClientOptions::parse("mongodb://127.0.0.1:1").await.unwrap();
        options.server_selection_timeout = Some(Duration::from_millis(100));
        let client = Client::with_options(options).unwrap();

        assert!(check_health(&client).await.is_err());
    }

    #[tokio::test]
    #[ignore = "requires MongoDB on localhost"]
    async fn test_check_health() {
        let client = Client::with_uri_str("mongodb://localhost:27017")
            .await
            .unwrap();
        assert!(check_health(&client).await.is_ok());
    }
}
