use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::handler::payment_handler::{braintree_payment_handler, braintree_token_handler};
use crate::handler::product_handler::{
    create_product_handler, delete_product_handler, list_products_handler, product_category_handler,
    product_count_handler, product_filters_handler, product_list_handler, product_photo_handler,
    related_product_handler, search_product_handler, single_product_handler, update_product_handler,
};
use crate::middlewares::admin_middleware::is_admin;
use crate::middlewares::auth_middleware::{require_sign_in, AuthState};
use crate::service::payment_service::PaymentService;
use crate::service::product_service::ProductService;

pub fn product_router(
    product_service: Arc<dyn ProductService>,
    payment_service: Arc<dyn PaymentService>,
    auth_state: Arc<AuthState>,
) -> Router {
    let public = Router::new()
        .route("/get-product", get(list_products_handler))
        .route("/get-product/{slug}", get(single_product_handler))
        .route("/product-photo/{pid}", get(product_photo_handler))
        .route("/product-filters", post(product_filters_handler))
        .route("/product-count", get(product_count_handler))
        .route("/product-list/{page}", get(product_list_handler))
        .route("/search/{keyword}", get(search_product_handler))
        .route("/related-product/{pid}/{cid}", get(related_product_handler))
        .route("/product-category/{slug}", get(product_category_handler));

    let admin = Router::new()
        .route("/create-product", post(create_product_handler))
        .route("/update-product/{pid}", put(update_product_handler))
        .route("/delete-product/{pid}", delete(delete_product_handler))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), is_admin))
        .route_layer(middleware::from_fn_with_state(auth_state.clone(), require_sign_in));

    let payment_public = Router::new().route("/braintree/token", get(braintree_token_handler));
    let payment_signed_in = Router::new()
        .route("/braintree/payment", post(braintree_payment_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_sign_in));

    public
        .merge(admin)
        .with_state(product_service)
        .merge(payment_public.merge(payment_signed_in).with_state(payment_service))
}
