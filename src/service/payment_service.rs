//! Checkout: cart validation, gateway sale, order persistence.
//!
//! Each attempt moves through validating, charging and persisting. A failure
//! at any step is terminal; a failed save after a successful charge leaves the
//! charge in place and is only logged.

use async_trait::async_trait;
use axum::http::StatusCode;
use bson::oid::ObjectId;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::dto::payment_dto::PaymentRequest;
use crate::gateway::{GatewayError, PaymentGateway, SaleRequest};
use crate::model::order::{Order, OrderStatus};
use crate::repository::order_repo::OrderRepository;
use crate::util::error::{HandlerError, HandlerErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("payment nonce and cart are required")]
    InvalidRequest,
    #[error("cart total is not a valid amount")]
    InvalidTotal,
    #[error("transaction could not be started: {0}")]
    Configuration(String),
    #[error("gateway sale failed: {0}")]
    Gateway(String),
    #[error("order not saved after transaction {transaction_id}: {reason}")]
    Persistence { transaction_id: String, reason: String },
}

impl PaymentError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PaymentError::InvalidRequest | PaymentError::InvalidTotal => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the caller. Internal detail stays in the logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            PaymentError::InvalidRequest => "Payment nonce and cart are required.",
            PaymentError::InvalidTotal => "Invalid cart total.",
            PaymentError::Configuration(_) => "Internal server error while starting transaction.",
            PaymentError::Gateway(_) => "Internal server error while processing transaction.",
            PaymentError::Persistence { .. } => "Internal server error while saving order after transaction.",
        }
    }
}

impl From<PaymentError> for HandlerError {
    fn from(err: PaymentError) -> Self {
        let kind = match err.status_code() {
            StatusCode::BAD_REQUEST => HandlerErrorKind::BadRequest,
            _ => HandlerErrorKind::Internal,
        };
        HandlerError::new(kind, err.public_message())
    }
}

/// A captured charge and the order recorded for it.
#[derive(Debug, Clone)]
pub struct Checkout {
    pub transaction: Value,
    pub order_id: String,
}

#[async_trait]
pub trait PaymentService: Send + Sync {
    async fn client_token(&self) -> Result<String, GatewayError>;
    async fn checkout(&self, buyer: ObjectId, request: PaymentRequest) -> Result<Checkout, PaymentError>;
}

pub struct PaymentServiceImpl {
    gateway: Arc<dyn PaymentGateway>,
    order_repo: Arc<dyn OrderRepository>,
}

impl PaymentServiceImpl {
    pub fn new(gateway: Arc<dyn PaymentGateway>, order_repo: Arc<dyn OrderRepository>) -> Self {
        Self { gateway, order_repo }
    }
}

/// Nonce and cart items, or `InvalidRequest` when either is missing or empty.
pub fn validate_request(request: PaymentRequest) -> Result<(String, Vec<Value>), PaymentError> {
    let nonce = match request.nonce {
        Some(Value::String(nonce)) if !nonce.trim().is_empty() => nonce,
        _ => return Err(PaymentError::InvalidRequest),
    };
    match request.cart {
        Some(Value::Array(items)) if !items.is_empty() => Ok((nonce, items)),
        _ => Err(PaymentError::InvalidRequest),
    }
}

/// Sums the `price` of every item in decimal arithmetic.
pub fn cart_total(items: &[Value]) -> Result<Decimal, PaymentError> {
    let mut total = Decimal::ZERO;
    for item in items {
        let price = match item.get("price") {
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(PaymentError::InvalidTotal),
        };
        let price = Decimal::from_str(&price)
            .or_else(|_| Decimal::from_scientific(&price))
            .map_err(|_| PaymentError::InvalidTotal)?;
        total = total.checked_add(price).ok_or(PaymentError::InvalidTotal)?;
    }
    if total.is_sign_negative() && !total.is_zero() {
        return Err(PaymentError::InvalidTotal);
    }
    Ok(total)
}

/// Two-decimal amount string, half away from zero at the cent.
pub fn format_amount(total: Decimal) -> String {
    let mut amount = total.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    amount.rescale(2);
    amount.to_string()
}

/// Cart items as order line items, with any inline photo dropped.
fn line_items(items: Vec<Value>) -> Result<Vec<bson::Document>, bson::ser::Error> {
    items
        .into_iter()
        .map(|item| {
            let mut item = item;
            if let Some(object) = item.as_object_mut() {
                object.remove("photo");
            }
            bson::to_document(&item)
        })
        .collect()
}

fn transaction_id(result: &Value) -> String {
    result
        .pointer("/transaction/id")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string()
}

#[async_trait]
impl PaymentService for PaymentServiceImpl {
    async fn client_token(&self) -> Result<String, GatewayError> {
        let result = self.gateway.generate_client_token().await;
        match &result {
            Ok(_) => info!("Client token generated"),
            Err(e @ (GatewayError::Rejected(_) | GatewayError::Api { .. })) => {
                error!("Gateway rejected client token request: {e}")
            }
            Err(e) => error!("Internal error while generating client token: {e}"),
        }
        result
    }

    #[instrument(skip(self, request), fields(buyer = %buyer))]
    async fn checkout(&self, buyer: ObjectId, request: PaymentRequest) -> Result<Checkout, PaymentError> {
        let (nonce, items) = validate_request(request).map_err(|e| {
            warn!("Rejected checkout: {e}");
            e
        })?;
        let amount = format_amount(cart_total(&items).map_err(|e| {
            warn!("Rejected checkout: {e}");
            e
        })?);
        let products = line_items(items).map_err(|e| {
            warn!("Rejected checkout, cart cannot be stored: {e}");
            PaymentError::InvalidRequest
        })?;
        info!("Charging {}", amount);

        let sale = SaleRequest { amount, payment_method_nonce: nonce, submit_for_settlement: true };
        let result = self.gateway.sale(sale).await.map_err(|e| {
            error!("Transaction failed: {e}");
            if e.is_configuration() {
                PaymentError::Configuration(e.to_string())
            } else {
                PaymentError::Gateway(e.to_string())
            }
        })?;

        let transaction_id = transaction_id(&result);
        info!("Transaction {} captured", transaction_id);

        let persistence_error = |reason: String| {
            error!(
                "Transaction {} captured but order was not saved: {}. Manual reconciliation required.",
                transaction_id, reason
            );
            PaymentError::Persistence { transaction_id: transaction_id.clone(), reason }
        };

        let payment = bson::to_bson(&result).map_err(|e| persistence_error(e.to_string()))?;
        let order = Order {
            id: None,
            products,
            payment,
            buyer,
            status: Some(OrderStatus::NotProcessed),
            created_at: None,
            updated_at: None,
        };

        let saved = self.order_repo.create(order).await.map_err(|e| persistence_error(e.to_string()))?;
        let order_id = saved.id.map(|id| id.to_hex()).unwrap_or_default();
        info!("Order {} saved for transaction {}", order_id, transaction_id);

        Ok(Checkout { transaction: result, order_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(nonce: Value, cart: Value) -> PaymentRequest {
        PaymentRequest { nonce: Some(nonce), cart: Some(cart) }
    }

    #[test]
    fn test_total_of_simple_cart() {
        let items = vec![json!({"price": 10}), json!({"price": 20})];
        assert_eq!(format_amount(cart_total(&items).unwrap()), "30.00");
    }

    #[test]
    fn test_total_avoids_binary_float_drift() {
        let items = vec![json!({"price": 0.1}), json!({"price": 0.2})];
        assert_eq!(format_amount(cart_total(&items).unwrap()), "0.30");
    }

    #[test]
    fn test_amount_rounds_half_away_from_zero() {
        assert_eq!(format_amount(Decimal::new(1005, 3)), "1.01");
        assert_eq!(format_amount(Decimal::new(1004, 3)), "1.00");
        assert_eq!(format_amount(Decimal::new(7, 0)), "7.00");
    }

    #[test]
    fn test_non_numeric_price_is_invalid_total() {
        for item in [json!({"price": "10"}), json!({"name": "no price"}), json!({"price": null}), json!(5)] {
            let items = vec![json!({"price": 1}), item];
            assert!(matches!(cart_total(&items), Err(PaymentError::InvalidTotal)));
        }
    }

    #[test]
    fn test_negative_total_is_invalid() {
        let items = vec![json!({"price": 5}), json!({"price": -10})];
        assert!(matches!(cart_total(&items), Err(PaymentError::InvalidTotal)));
    }

    #[test]
    fn test_missing_or_empty_inputs_are_invalid_requests() {
        let cases = vec![
            PaymentRequest::default(),
            request(json!("n1"), json!([])),
            request(json!("n1"), json!({"price": 1})),
            request(json!(""), json!([{"price": 1}])),
            request(json!(42), json!([{"price": 1}])),
            PaymentRequest { nonce: Some(json!("n1")), cart: None },
        ];
        for case in cases {
            assert!(matches!(validate_request(case), Err(PaymentError::InvalidRequest)));
        }
    }

    #[test]
    fn test_line_items_drop_photo() {
        let items = line_items(vec![json!({"name": "Lamp", "price": 10, "photo": {"data": "..."}})]).unwrap();
        assert!(items[0].get("photo").is_none());
        assert_eq!(items[0].get_str("name").unwrap(), "Lamp");
    }

    #[test]
    fn test_line_items_reject_values_bson_cannot_hold() {
        assert!(line_items(vec![json!({"price": 10, "sku": u64::MAX})]).is_err());
    }

    #[test]
    fn test_error_messages_and_statuses() {
        assert_eq!(PaymentError::InvalidTotal.status_code(), StatusCode::BAD_REQUEST);
        let err = PaymentError::Persistence { transaction_id: "t".into(), reason: "down".into() };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let handler_error = HandlerError::from(err);
        assert_eq!(handler_error.message, "Internal server error while saving order after transaction.");
    }
}
