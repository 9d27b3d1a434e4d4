use axum::{
    extract::{rejection::JsonRejection, Extension, Json, State},
    response::IntoResponse,
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::dto::auth_dto::{ForgotPasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest};
use crate::middlewares::auth_middleware::caller_id;
use crate::service::user_service::UserService;
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;
use crate::util::response::ApiResponse;

pub async fn register_handler(
    State(service): State<Arc<dyn UserService>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Json(payload) = payload?;
    payload.validate().map_err(HandlerError::validation)?;

    let user = service.register(payload).await?;
    Ok(ApiResponse::created().message("User registered successfully").with("user", user))
}

pub async fn login_handler(
    State(service): State<Arc<dyn UserService>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Json(payload) = payload?;
    payload.validate().map_err(HandlerError::validation)?;

    let session = service.login(&payload.email, &payload.password).await?;
    Ok(ApiResponse::ok()
        .message("Login successful")
        .with("user", session.user)
        .with("token", session.token))
}

pub async fn forgot_password_handler(
    State(service): State<Arc<dyn UserService>>,
    payload: Result<Json<ForgotPasswordRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Json(payload) = payload?;
    payload.validate().map_err(HandlerError::validation)?;

    service.forgot_password(payload).await?;
    Ok(ApiResponse::ok().message("Password reset successfully"))
}

/// Reached only through the auth middleware chain; a 200 means the chain passed.
pub async fn auth_check_handler() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

pub async fn profile_handler(
    State(service): State<Arc<dyn UserService>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, HandlerError> {
    let user = service.profile(&caller_id(&claims)?).await?;
    Ok(ApiResponse::ok().with("user", user))
}

pub async fn update_profile_handler(
    State(service): State<Arc<dyn UserService>>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Json(payload) = payload?;
    payload.validate().map_err(HandlerError::validation)?;

    let user = service.update_profile(&caller_id(&claims)?, payload).await?;
    info!("Profile updated for {}", claims.sub);
    Ok(ApiResponse::ok().message("Profile updated successfully").with("updatedUser", user))
}
