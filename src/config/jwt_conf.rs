use std::env;
use tracing::{debug, error, info, warn};

use crate::config::{required_var, ConfigError};

/// One week, the lifetime of a sign-in token
const DEFAULT_EXPIRY_MINUTES: i64 = 10080;

/// JWT configuration structure
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// JWT secret key for signing tokens
    pub jwt_secret: String,
    /// Token expiration time in minutes
    pub expiry_minutes: i64,
    /// JWT issuer (optional)
    pub jwt_issuer: Option<String>,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables
    ///
    /// Expected environment variables:
    /// - JWT_SECRET: Secret key for signing JWT tokens (required, 32+ chars)
    /// - JWT_EXPIRY_MINUTES: Token expiration in minutes (defaults to 10080 = 1 week)
    /// - JWT_ISSUER: JWT issuer (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading JWT configuration from environment variables");

        let jwt_secret = required_var("JWT_SECRET")?;
        debug!("JWT secret loaded (length: {} chars)", jwt_secret.len());

        let expiry_minutes = env::var("JWT_EXPIRY_MINUTES")
            .unwrap_or_else(|_| {
                warn!("JWT_EXPIRY_MINUTES not set, using default: {} minutes", DEFAULT_EXPIRY_MINUTES);
                DEFAULT_EXPIRY_MINUTES.to_string()
            })
            .parse::<i64>()
            .map_err(|e| {
                error!("Invalid JWT_EXPIRY_MINUTES value: {}", e);
                ConfigError::InvalidValue(format!("JWT_EXPIRY_MINUTES: {}", e))
            })?;

        let jwt_issuer = env::var("JWT_ISSUER").ok();

        let config = JwtConfig {
            jwt_secret,
            expiry_minutes,
            jwt_issuer,
        };
        config.validate()?;

        info!("JWT configuration loaded successfully");
        Ok(config)
    }

    /// Validate the JWT configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < 32 {
            error!("JWT secret is too short (minimum 32 characters required)");
            return Err(ConfigError::ValidationError("JWT secret must be at least 32 characters long".to_string()));
        }

        if self.expiry_minutes <= 0 {
            error!("Token expiration must be greater than 0");
            return Err(ConfigError::ValidationError("Token expiration must be greater than 0".to_string()));
        }

        Ok(())
    }
}

/// Create JWT configuration for testing with default values
impl Default for JwtConfig {
    fn default() -> Self {
        JwtConfig {
            jwt_secret: "test_secret_key_for_jwt_testing_should_be_long_enough_for_security_purposes".to_string(),
            expiry_minutes: DEFAULT_EXPIRY_MINUTES,
            jwt_issuer: Some("storefront-backend-test".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(JwtConfig::default().validate().is_ok());
    }

    #[test]
    fn test_short_secret_rejected() {
        let config = JwtConfig { jwt_secret: "short".to_string(), ..JwtConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_expiry_rejected() {
        let config = JwtConfig { expiry_minutes: 0, ..JwtConfig::default() };
        assert!(config.validate().is_err());
    }
}
