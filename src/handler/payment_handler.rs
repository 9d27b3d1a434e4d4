use axum::{
    extract::{rejection::JsonRejection, Extension, Json, State},
    response::IntoResponse,
};
use std::sync::Arc;

use crate::dto::payment_dto::PaymentRequest;
use crate::middlewares::auth_middleware::caller_id;
use crate::service::payment_service::{PaymentError, PaymentService};
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;
use crate::util::response::ApiResponse;

pub async fn braintree_token_handler(
    State(service): State<Arc<dyn PaymentService>>,
) -> Result<impl IntoResponse, HandlerError> {
    let token = service
        .client_token()
        .await
        .map_err(|_| HandlerError::internal("Failed to generate payment token."))?;
    Ok(ApiResponse::ok().with("clientToken", token))
}

pub async fn braintree_payment_handler(
    State(service): State<Arc<dyn PaymentService>>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<PaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let buyer = caller_id(&claims)?;
    let Json(payload) = payload.map_err(|_| PaymentError::InvalidRequest)?;

    let checkout = service.checkout(buyer, payload).await?;
    Ok(ApiResponse::ok()
        .message("Payment successful and order created.")
        .with("transaction", checkout.transaction)
        .with("orderId", checkout.order_id))
}
