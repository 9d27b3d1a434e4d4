use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use std::sync::Arc;
use tracing::{error, warn};

use crate::middlewares::auth_middleware::{caller_id, AuthState};
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;

/// Must run after `require_sign_in`. The role is read from the stored user,
/// not from the token.
pub async fn is_admin(
    State(state): State<Arc<AuthState>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| HandlerError::unauthorized("Unauthorized access"))?;
    let user_id = caller_id(claims)?;

    let user = state.user_repo.find_by_id(&user_id).await.map_err(|e| {
        error!("Failed to load user for admin check: {}", e);
        HandlerError::unauthorized("Unauthorized access")
    })?;

    match user {
        Some(user) if user.is_admin() => Ok(next.run(req).await),
        _ => {
            warn!("Non-admin access attempt by {}", user_id);
            Err(HandlerError::unauthorized("Unauthorized access"))
        }
    }
}
