use axum::{
    extract::{rejection::JsonRejection, Extension, Json, Path, State},
    response::IntoResponse,
};
use std::sync::Arc;
use validator::Validate;

use crate::dto::order_dto::UpdateOrderStatusRequest;
use crate::handler::parse_id;
use crate::middlewares::auth_middleware::caller_id;
use crate::service::order_service::OrderService;
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;
use crate::util::response::ApiResponse;

pub async fn my_orders_handler(
    State(service): State<Arc<dyn OrderService>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, HandlerError> {
    let orders = service.buyer_orders(&caller_id(&claims)?).await?;
    Ok(ApiResponse::ok().with("orders", orders))
}

pub async fn all_orders_handler(
    State(service): State<Arc<dyn OrderService>>,
) -> Result<impl IntoResponse, HandlerError> {
    let orders = service.all_orders().await?;
    Ok(ApiResponse::ok().with("orders", orders))
}

pub async fn order_status_handler(
    State(service): State<Arc<dyn OrderService>>,
    Path(order_id): Path<String>,
    payload: Result<Json<UpdateOrderStatusRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&order_id, "order")?;
    let Json(payload) = payload?;
    payload.validate().map_err(HandlerError::validation)?;

    let order = service.update_status(id, &payload.status).await?;
    Ok(ApiResponse::ok().message("Order status updated").with("order", order))
}
