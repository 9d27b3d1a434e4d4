use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::JwtConfig;

/// JWT token claims structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject (user ID, hex ObjectId)
    pub sub: String,
    pub email: String,
    /// 0 = customer, 1 = admin. Informational only; admin checks re-read the user.
    pub role: i32,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    pub jti: String,
}

/// Error types for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to encode JWT token: {0}")]
    EncodingFailed(String),
    #[error("Failed to decode JWT token: {0}")]
    DecodingFailed(String),
    #[error("Token has expired")]
    TokenExpired,
    #[error("Invalid token format")]
    InvalidToken,
}

pub trait JwtTokenUtils: Send + Sync {
    fn generate_token(&self, user_id: &str, email: &str, role: i32) -> Result<String, JwtError>;
    fn validate_token(&self, token: &str) -> Result<Claims, JwtError>;
    /// Accepts `Bearer <token>` as well as a bare token.
    fn extract_token_from_header(&self, auth_header: &str) -> Result<String, JwtError>;
}

#[derive(Debug, Clone)]
pub struct JwtTokenUtilsImpl {
    pub jwt_config: JwtConfig,
}

impl JwtTokenUtilsImpl {
    pub fn new(jwt_config: JwtConfig) -> Self {
        JwtTokenUtilsImpl { jwt_config }
    }
}

impl JwtTokenUtils for JwtTokenUtilsImpl {
    fn generate_token(&self, user_id: &str, email: &str, role: i32) -> Result<String, JwtError> {
        debug!("Generating token for user: {} with role: {}", user_id, role);

        let now = Utc::now();
        let expiration = now + Duration::minutes(self.jwt_config.expiry_minutes);

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            iss: self.jwt_config.jwt_issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        let header = Header::new(Algorithm::HS256);
        let encoding_key = EncodingKey::from_secret(self.jwt_config.jwt_secret.as_bytes());

        match encode(&header, &claims, &encoding_key) {
            Ok(token) => {
                info!("Successfully generated token for user: {}", user_id);
                Ok(token)
            }
            Err(err) => {
                error!("Failed to encode JWT token: {}", err);
                Err(JwtError::EncodingFailed(err.to_string()))
            }
        }
    }

    fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        debug!("Validating JWT token");

        let decoding_key = DecodingKey::from_secret(self.jwt_config.jwt_secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &self.jwt_config.jwt_issuer {
            validation.set_issuer(&[issuer]);
        }

        match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(token_data) => {
                let claims = token_data.claims;
                if claims.exp < Utc::now().timestamp() {
                    warn!("Token has expired for user: {}", claims.sub);
                    return Err(JwtError::TokenExpired);
                }
                debug!("Token validation successful for user: {}", claims.sub);
                Ok(claims)
            }
            Err(err) => match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    warn!("Token has expired");
                    Err(JwtError::TokenExpired)
                }
                _ => {
                    warn!("Failed to decode JWT token: {}", err);
                    Err(JwtError::DecodingFailed(err.to_string()))
                }
            },
        }
    }

    fn extract_token_from_header(&self, auth_header: &str) -> Result<String, JwtError> {
        let header = auth_header.trim_start();
        let token = match header.strip_prefix("Bearer") {
            Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest,
            _ => header,
        }
        .trim();

        if token.is_empty() {
            debug!("Empty token in authorization header");
            return Err(JwtError::InvalidToken);
        }
        Ok(token.to_string())
    }
}
