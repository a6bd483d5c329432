use core_config::{AppInfo, FromEnv, app_info, env_or_default, server::ServerConfig};
use database::mongodb::MongoConfig;
use database::retry::RetryPolicy;
use domain_users::HasherConfig;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub mongo_retry: RetryPolicy,
    pub users_collection: String,
    pub hasher: HasherConfig,
    pub server: ServerConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mut mongodb = MongoConfig::from_env()?;
        let mongo_retry = RetryPolicy::from_env()?;
        let hasher = HasherConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let app = app_info!();

        if mongodb.app_name.is_none() {
            mongodb = mongodb.with_app_name(app.name);
        }

        Ok(Self {
            app,
            mongodb,
            mongo_retry,
            users_collection: env_or_default("USERS_COLLECTION", "users"),
            hasher,
            server,
            environment,
        })
    }
}
