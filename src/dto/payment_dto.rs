use serde::Deserialize;
use serde_json::Value;

/// Checkout body. Kept loosely typed so that every malformed shape maps to the
/// same 400 instead of an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PaymentRequest {
    pub nonce: Option<Value>,
    pub cart: Option<Value>,
}
