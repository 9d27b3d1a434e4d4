use axum::{extract::State, response::IntoResponse};
use std::sync::Arc;

use crate::service::user_service::UserService;
use crate::util::error::HandlerError;
use crate::util::response::ApiResponse;

pub async fn list_users_handler(
    State(service): State<Arc<dyn UserService>>,
) -> Result<impl IntoResponse, HandlerError> {
    let users = service.list_users().await?;
    Ok(ApiResponse::ok().message("All users").with("users", users))
}
