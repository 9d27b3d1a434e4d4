use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::handler::auth_handler::{
    auth_check_handler, forgot_password_handler, login_handler, profile_handler, register_handler,
    update_profile_handler,
};
use crate::handler::order_handler::{all_orders_handler, my_orders_handler, order_status_handler};
use crate::middlewares::admin_middleware::is_admin;
use crate::middlewares::auth_middleware::{require_sign_in, AuthState};
use crate::service::order_service::OrderService;
use crate::service::user_service::UserService;

pub fn auth_router(
    user_service: Arc<dyn UserService>,
    order_service: Arc<dyn OrderService>,
    auth_state: Arc<AuthState>,
) -> Router {
    let public = Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/forgot-password", post(forgot_password_handler));

    let signed_in = Router::new()
        .route("/user-auth", get(auth_check_handler))
        .route("/profile", get(profile_handler).put(update_profile_handler))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), require_sign_in));

    let admin = Router::new()
        .route("/admin-auth", get(auth_check_handler))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), is_admin))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), require_sign_in));

    let orders = Router::new()
        .route("/orders", get(my_orders_handler))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), require_sign_in));

    let admin_orders = Router::new()
        .route("/all-orders", get(all_orders_handler))
        .route("/order-status/{orderId}", put(order_status_handler))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), is_admin))
        .route_layer(middleware::from_fn_with_state(auth_state, require_sign_in));

    public
        .merge(signed_in)
        .merge(admin)
        .with_state(user_service)
        .merge(orders.merge(admin_orders).with_state(order_service))
}
