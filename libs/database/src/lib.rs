//! MongoDB connection management
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB connector, config and health checks
//! - `config` - `core_config::FromEnv` for the config types
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb::{MongoConfig, connect_with_retry};
//! use database::retry::RetryPolicy;
//! use core_config::FromEnv;
//!
//! let config = MongoConfig::from_env()?;
//! let client = connect_with_retry(&config, &RetryPolicy::from_env()?).await?;
//! let db = client.database(&config.database);
//! ```

pub mod retry;

#[cfg(feature = "mongodb")]
pub mod mongodb;
