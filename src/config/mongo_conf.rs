use secrecy::SecretString;
use std::env;
use tracing::info;

use crate::config::{parsed_var, required_var, ConfigError};

const URI_SCHEMES: [&str; 2] = ["mongodb://", "mongodb+srv://"];

/// Username and password, only ever supplied as a pair.
#[derive(Debug, Clone)]
pub struct MongoCredentials {
    pub username: String,
    pub password: SecretString,
}

/// Connection settings for the storefront database.
#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub credentials: Option<MongoCredentials>,
    pub pool_size: u32,
    pub connection_timeout_secs: u64,
}

impl MongoConfig {
    /// Reads `MONGO_URI` and `MONGO_DATABASE` (required), `MONGO_USERNAME` +
    /// `MONGO_PASSWORD` (optional, together), `MONGO_POOL_SIZE` (10) and
    /// `MONGO_CONNECTION_TIMEOUT` seconds (5).
    pub fn from_env() -> Result<Self, ConfigError> {
        let credentials = match (env::var("MONGO_USERNAME").ok(), env::var("MONGO_PASSWORD").ok()) {
            (Some(username), Some(password)) => Some(MongoCredentials {
                username,
                password: SecretString::from(password),
            }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::ValidationError(
                    "MONGO_USERNAME and MONGO_PASSWORD must be set together".to_string(),
                ))
            }
        };

        let config = MongoConfig {
            uri: required_var("MONGO_URI")?,
            database: required_var("MONGO_DATABASE")?,
            credentials,
            pool_size: parsed_var("MONGO_POOL_SIZE", 10)?,
            connection_timeout_secs: parsed_var("MONGO_CONNECTION_TIMEOUT", 5)?,
        };
        config.validate()?;

        info!(database = %config.database, authenticated = config.credentials.is_some(), "MongoDB configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !URI_SCHEMES.iter().any(|scheme| self.uri.starts_with(scheme)) {
            return Err(ConfigError::ValidationError(
                "MONGO_URI must start with mongodb:// or mongodb+srv://".to_string(),
            ));
        }
        if self.database.trim().is_empty() {
            return Err(ConfigError::ValidationError("MongoDB database cannot be empty".to_string()));
        }
        if self.pool_size == 0 || self.connection_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "MongoDB pool size and connection timeout must be greater than 0".to_string(),
            ));
        }
        if self.credentials.as_ref().is_some_and(|c| c.username.is_empty()) {
            return Err(ConfigError::ValidationError("MONGO_USERNAME cannot be empty".to_string()));
        }
        Ok(())
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "storefront".to_string(),
            credentials: None,
            pool_size: 10,
            connection_timeout_secs: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_local_storefront() {
        let config = MongoConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.database, "storefront");
        assert!(config.credentials.is_none());
    }

    #[test]
    fn test_uri_scheme_is_checked() {
        let config = MongoConfig { uri: "mongodb+srv://cluster.example.net".to_string(), ..Default::default() };
        assert!(config.validate().is_ok());

        for uri in ["", "localhost:27017", "postgres://localhost"] {
            let config = MongoConfig { uri: uri.to_string(), ..Default::default() };
            assert!(config.validate().is_err(), "{uri}");
        }
    }

    #[test]
    fn test_zero_pool_or_timeout_rejected() {
        assert!(MongoConfig { pool_size: 0, ..Default::default() }.validate().is_err());
        assert!(MongoConfig { connection_timeout_secs: 0, ..Default::default() }.validate().is_err());
    }

    #[test]
    fn test_credentials_hide_password() {
        let config = MongoConfig {
            credentials: Some(MongoCredentials {
                username: "shop".to_string(),
                password: SecretString::from("hunter22".to_string()),
            }),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert!(!format!("{:?}", config).contains("hunter22"));
    }
}
