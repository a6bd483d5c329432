#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_first, env_parse};
use mongodb::options::ClientOptions;
use std::time::Duration;

use super::MongoError;

/// Connection settings for one MongoDB deployment and database.
///
/// ```ignore
/// use database::mongodb::MongoConfig;
///
/// let config = MongoConfig::new("mongodb://localhost:27017", "users").with_app_name("users-api");
/// let config = MongoConfig::from_env()?; // `config` feature
/// ```
#[derive(Clone, Debug)]
pub struct MongoConfig {
    /// `mongodb://[user:password@]host[:port][/?options]`; may carry credentials
    pub url: String,
    pub database: String,
    /// Reported to the server in its connection logs
    pub app_name: Option<String>,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub connect_timeout: Duration,
    pub server_selection_timeout: Duration,
}

impl MongoConfig {
    pub fn new(url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: database.into(),
            app_name: None,
            max_pool_size: 100,
            min_pool_size: 5,
            connect_timeout: Duration::from_secs(10),
            server_selection_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    /// URL with any `user:password@` section masked, safe for logs
    pub fn redacted_url(&self) -> String {
        match (self.url.find("://"), self.url.rfind('@')) {
            (Some(scheme_end), Some(at)) if at > scheme_end => {
                format!("{}://***@{}", &self.url[..scheme_end], &self.url[at + 1..])
            }
            _ => self.url.clone(),
        }
    }

    /// Parse the URL and layer the pool and timeout settings on top.
    ///
    /// Settings given here win over the same options in the URL query.
    pub async fn client_options(&self) -> Result<ClientOptions, MongoError> {
        let mut options = ClientOptions::parse(&self.url).await?;

        options.max_pool_size = Some(self.max_pool_size);
        options.min_pool_size = Some(self.min_pool_size);
        options.connect_timeout = Some(self.connect_timeout);
        options.server_selection_timeout = Some(self.server_selection_timeout);
        if let Some(app_name) = &self.app_name {
            options.app_name = Some(app_name.clone());
        }

        Ok(options)
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self::new("mongodb://localhost:27017", "users")
    }
}

/// Environment variables:
/// - `MONGODB_URL`, `MONGO_URL` or `MONGOURI` (required, first non-blank wins)
/// - `MONGODB_DATABASE` or `MONGO_DATABASE` (required)
/// - `MONGODB_APP_NAME`
/// - `MONGODB_MAX_POOL_SIZE` (default: 100), `MONGODB_MIN_POOL_SIZE` (default: 5)
/// - `MONGODB_CONNECT_TIMEOUT_SECS` (default: 10)
/// - `MONGODB_SERVER_SELECTION_TIMEOUT_SECS` (default: 30)
#[cfg(feature = "config")]
impl FromEnv for MongoConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url = env_first(&["MONGODB_URL", "MONGO_URL", "MONGOURI"])
            .ok_or_else(|| ConfigError::MissingEnvVar("MONGODB_URL".to_string()))?;
        let database = env_first(&["MONGODB_DATABASE", "MONGO_DATABASE"])
            .ok_or_else(|| ConfigError::MissingEnvVar("MONGODB_DATABASE".to_string()))?;

        let defaults = Self::new(url, database);
        let secs = |key: &str, default: Duration| {
            env_parse(key, default.as_secs()).map(Duration::from_secs)
        };

        Ok(Self {
            app_name: env_first(&["MONGODB_APP_NAME"]),
            max_pool_size: env_parse("MONGODB_MAX_POOL_SIZE", defaults.max_pool_size)?,
            min_pool_size: env_parse("MONGODB_MIN_POOL_SIZE", defaults.min_pool_size)?,
            connect_timeout: secs("MONGODB_CONNECT_TIMEOUT_SECS", defaults.connect_timeout)?,
            server_selection_timeout: secs(
                "MONGODB_SERVER_SELECTION_TIMEOUT_SECS",
                defaults.server_selection_timeout,
            )?,
            ..defaults
        })
    }
}
