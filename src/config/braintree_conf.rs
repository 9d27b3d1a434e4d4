use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::config::{parsed_var, required_var, ConfigError};

/// Braintree account environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BraintreeEnvironment {
    Sandbox,
    Production,
}

impl BraintreeEnvironment {
    /// GraphQL endpoint for this environment
    pub fn graphql_url(&self) -> &'static str {
        match self {
            BraintreeEnvironment::Sandbox => "https://payments.sandbox.braintree-api.com/graphql",
            BraintreeEnvironment::Production => "https://payments.braintree-api.com/graphql",
        }
    }
}

impl FromStr for BraintreeEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(BraintreeEnvironment::Sandbox),
            "production" => Ok(BraintreeEnvironment::Production),
            other => Err(ConfigError::InvalidValue(format!("Unknown BRAINTREE_ENVIRONMENT: {}", other))),
        }
    }
}

impl fmt::Display for BraintreeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BraintreeEnvironment::Sandbox => write!(f, "sandbox"),
            BraintreeEnvironment::Production => write!(f, "production"),
        }
    }
}

/// Braintree merchant credentials
#[derive(Debug)]
pub struct BraintreeConfig {
    pub environment: BraintreeEnvironment,
    pub merchant_id: String,
    pub public_key: String,
    pub private_key: SecretString,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl BraintreeConfig {
    /// Load Braintree configuration from environment variables
    ///
    /// Expected environment variables:
    /// - BRAINTREE_ENVIRONMENT: `sandbox` or `production` (defaults to sandbox)
    /// - BRAINTREE_MERCHANT_ID, BRAINTREE_PUBLIC_KEY, BRAINTREE_PRIVATE_KEY (required)
    /// - BRAINTREE_TIMEOUT_SECS: request timeout (defaults to 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading Braintree configuration from environment variables");

        let environment = match env::var("BRAINTREE_ENVIRONMENT") {
            Ok(value) => value.parse()?,
            Err(_) => {
                warn!("BRAINTREE_ENVIRONMENT not set, using sandbox");
                BraintreeEnvironment::Sandbox
            }
        };
        debug!("Braintree environment: {}", environment);

        let merchant_id = required_var("BRAINTREE_MERCHANT_ID")?;
        let public_key = required_var("BRAINTREE_PUBLIC_KEY")?;
        let private_key = SecretString::from(required_var("BRAINTREE_PRIVATE_KEY")?);

        let timeout_secs = parsed_var("BRAINTREE_TIMEOUT_SECS", 30)?;

        let config = BraintreeConfig {
            environment,
            merchant_id,
            public_key,
            private_key,
            timeout_secs,
        };
        config.validate()?;

        info!("Braintree configuration loaded successfully");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.merchant_id.trim().is_empty() {
            return Err(ConfigError::ValidationError("Braintree merchant id cannot be empty".to_string()));
        }
        if self.public_key.trim().is_empty() {
            return Err(ConfigError::ValidationError("Braintree public key cannot be empty".to_string()));
        }
        if self.private_key.expose_secret().trim().is_empty() {
            return Err(ConfigError::ValidationError("Braintree private key cannot be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ValidationError("Braintree timeout must be greater than 0".to_string()));
        }
        Ok(())
    }
}
