use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::handler::category_handler::{
    create_category_handler, delete_category_handler, list_categories_handler, single_category_handler,
    update_category_handler,
};
use crate::middlewares::admin_middleware::is_admin;
use crate::middlewares::auth_middleware::{require_sign_in, AuthState};
use crate::service::category_service::CategoryService;

pub fn category_router(service: Arc<dyn CategoryService>, auth_state: Arc<AuthState>) -> Router {
    let public = Router::new()
        .route("/get-category", get(list_categories_handler))
        .route("/single-category/{slug}", get(single_category_handler));

    let admin = Router::new()
        .route("/create-category", post(create_category_handler))
        .route("/update-category/{id}", put(update_category_handler))
        .route("/delete-category/{id}", delete(delete_category_handler))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), is_admin))
        .route_layer(middleware::from_fn_with_state(auth_state, require_sign_in));

    public.merge(admin).with_state(service)
}
