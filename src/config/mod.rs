pub mod admin_user_conf;
pub mod app_conf;
pub mod braintree_conf;
pub mod jwt_conf;
pub mod mongo_conf;

pub use admin_user_conf::AdminUserConfig;
pub use app_conf::AppConfig;
pub use braintree_conf::{BraintreeConfig, BraintreeEnvironment};
pub use jwt_conf::JwtConfig;
pub use mongo_conf::MongoConfig;

/// Common configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Reads a required variable, failing with `EnvVarNotFound`.
pub(crate) fn required_var(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| {
        tracing::error!("{} environment variable not found", name);
        ConfigError::EnvVarNotFound(name.to_string())
    })
}

/// Reads and parses an optional variable, falling back to `default` when unset.
pub(crate) fn parsed_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|e| {
            tracing::error!("Invalid {} value: {}", name, e);
            ConfigError::InvalidValue(format!("{}: {}", name, e))
        }),
        Err(_) => Ok(default),
    }
}
