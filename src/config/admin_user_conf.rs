use serde::{Deserialize, Serialize};
use crate::config::{required_var, ConfigError};

/// Credentials of the admin account seeded on first start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUserConfig {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub address: String,
    pub answer: String,
}

impl AdminUserConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(AdminUserConfig {
            name: required_var("ADMIN_NAME")?,
            email: required_var("ADMIN_EMAIL")?,
            password: required_var("ADMIN_PASSWORD")?,
            phone: required_var("ADMIN_PHONE")?,
            address: required_var("ADMIN_ADDRESS")?,
            answer: required_var("ADMIN_ANSWER")?,
        })
    }
}
