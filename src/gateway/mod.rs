//! Payment gateway abstraction.
//!
//! The checkout flow only needs two operations from a gateway: a client token
//! for the browser drop-in UI, and a sale that charges a tokenized payment
//! method. `PaymentGateway` is injected into the payment service so tests can
//! substitute a fake and deployments without credentials can run with
//! `DisabledGateway`.

pub mod braintree;

use async_trait::async_trait;
use serde_json::Value;

/// Errors raised by a payment gateway client
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The client could not even build the request (missing credentials, bad URL, ...)
    #[error("Gateway misconfigured: {0}")]
    Configuration(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Gateway API error: {status} - {message}")]
    Api { status: u16, message: String },
    /// The gateway answered but refused the operation
    #[error("Gateway rejected the request: {0}")]
    Rejected(String),
    #[error("Failed to parse gateway response: {0}")]
    Parse(String),
}

impl GatewayError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, GatewayError::Configuration(_))
    }
}

/// A single charge against a tokenized payment method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleRequest {
    /// Fixed two-decimal amount, e.g. `"30.00"`
    pub amount: String,
    pub payment_method_nonce: String,
    pub submit_for_settlement: bool,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn generate_client_token(&self) -> Result<String, GatewayError>;

    /// Returns the raw transaction payload reported by the gateway.
    async fn sale(&self, request: SaleRequest) -> Result<Value, GatewayError>;
}

/// Stand-in used when no gateway credentials are configured.
pub struct DisabledGateway;

#[async_trait]
impl PaymentGateway for DisabledGateway {
    async fn generate_client_token(&self) -> Result<String, GatewayError> {
        Err(GatewayError::Configuration("payment gateway is not configured".to_string()))
    }

    async fn sale(&self, _request: SaleRequest) -> Result<Value, GatewayError> {
        Err(GatewayError::Configuration("payment gateway is not configured".to_string()))
    }
}
