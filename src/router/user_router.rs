use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use crate::handler::user_handler::list_users_handler;
use crate::middlewares::admin_middleware::is_admin;
use crate::middlewares::auth_middleware::{require_sign_in, AuthState};
use crate::service::user_service::UserService;

pub fn user_router(service: Arc<dyn UserService>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/all", get(list_users_handler))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), is_admin))
        .route_layer(middleware::from_fn_with_state(auth_state, require_sign_in))
        .with_state(service)
}
