use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::debug;

use crate::repository::user_repo::UserRepository;
use crate::util::error::HandlerError;
use crate::util::jwt::{Claims, JwtTokenUtils};

/// Shared by `require_sign_in` and `is_admin`.
pub struct AuthState {
    pub jwt_utils: Arc<dyn JwtTokenUtils>,
    pub user_repo: Arc<dyn UserRepository>,
}

/// Verifies the token in `Authorization` and attaches its `Claims` to the request.
pub async fn require_sign_in(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| HandlerError::unauthorized("Authorization token is required"))?;

    let token = state
        .jwt_utils
        .extract_token_from_header(auth_header)
        .map_err(|_| HandlerError::unauthorized("Authorization token is required"))?;

    let claims = state.jwt_utils.validate_token(&token).map_err(|e| {
        debug!("Rejected token: {}", e);
        HandlerError::unauthorized("Invalid or expired token")
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// User id of the signed-in caller.
pub fn caller_id(claims: &Claims) -> Result<ObjectId, HandlerError> {
    ObjectId::parse_str(&claims.sub).map_err(|_| HandlerError::unauthorized("Invalid or expired token"))
}
