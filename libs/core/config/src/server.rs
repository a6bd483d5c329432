use crate::{env_parse, ConfigError, FromEnv};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Listen address for the HTTP server
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl FromEnv for ServerConfig {
    /// - `HOST`: IP address to bind (default: 0.0.0.0)
    /// - `PORT`: default 8080
    ///
    /// Host names are rejected at startup rather than resolved at bind time.
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            host: env_parse("HOST", defaults.host)?,
            port: env_parse("PORT", defaults.port)?,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    #[test]
    fn test_defaults_bind_all_interfaces() {
        temp_env::with_vars([("HOST", None::<&str>), ("PORT", None)], || {
            let config = ServerConfig::from_env().unwrap();
            assert_eq!(config, ServerConfig::default());
            assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        });
    }

    #[test]
    fn test_ipv6_host() {
        temp_env::with_vars([("HOST", Some("::1")), ("PORT", Some("3000"))], || {
            let config = ServerConfig::from_env().unwrap();
            assert_eq!(config.host, IpAddr::V6(Ipv6Addr::LOCALHOST));
            assert_eq!(config.socket_addr().to_string(), "[::1]:3000");
        });
    }

    #[test]
    fn test_rejects_invalid_values() {
        let cases = [
            ("HOST", "localhost"),
            ("PORT", "not_a_number"),
            ("PORT", "99999"),
        ];

        for (key, value) in cases {
            temp_env::with_var(key, Some(value), || {
                let err = ServerConfig::from_env().unwrap_err();
                assert!(
                    matches!(err, ConfigError::ParseError { key: ref k, .. } if k == key),
                    "{key}={value} gave {err}"
                );
            });
        }
    }
}
