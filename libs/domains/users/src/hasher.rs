//! Password hashing
//!
//! Argon2id runs on the blocking thread pool so a hash never stalls the
//! async runtime.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_parse};

use crate::error::{UserError, UserResult};

/// One-way, salted credential hashing
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialHasher: Send + Sync {
    /// Derive a storable hash from a plaintext password
    async fn hash(&self, plaintext: &str) -> UserResult<String>;
}

/// Argon2 work factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HasherConfig {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl FromEnv for HasherConfig {
    /// Environment variables (all optional):
    /// - `ARGON2_MEMORY_KIB` (default: 19456)
    /// - `ARGON2_ITERATIONS` (default: 2)
    /// - `ARGON2_PARALLELISM` (default: 1)
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            memory_kib: env_parse("ARGON2_MEMORY_KIB", defaults.memory_kib)?,
            iterations: env_parse("ARGON2_ITERATIONS", defaults.iterations)?,
            parallelism: env_parse("ARGON2_PARALLELISM", defaults.parallelism)?,
        })
    }
}

/// Argon2id implementation of CredentialHasher
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Build a hasher, rejecting work factors Argon2 cannot use
    pub fn new(config: HasherConfig) -> Result<Self, argon2::Error> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )?;
        Ok(Self { params })
    }

    fn argon2(params: Params) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    }

    /// Check a plaintext password against a stored PHC hash
    pub async fn verify(&self, plaintext: &str, hash: &str) -> UserResult<bool> {
        let params = self.params.clone();
        let password = plaintext.to_owned();
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&hash)?;
            Ok::<_, argon2::password_hash::Error>(
                Self::argon2(params)
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok(),
            )
        })
        .await
        .map_err(|e| UserError::StoreUnavailable(format!("Password verify task failed: {}", e)))?
        .map_err(|e| UserError::StoreUnavailable(format!("Stored hash is unreadable: {}", e)))
    }
}

#[async_trait]
impl CredentialHasher for Argon2Hasher {
    async fn hash(&self, plaintext: &str) -> UserResult<String> {
        let params = self.params.clone();
        let password = plaintext.to_owned();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Self::argon2(params)
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
        })
        .await
        .map_err(|e| UserError::StoreUnavailable(format!("Password hashing task failed: {}", e)))?
        .map_err(|e| UserError::StoreUnavailable(format!("Password hashing failed: {}", e)))
    }
}
