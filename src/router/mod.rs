pub mod auth_router;
pub mod category_router;
pub mod product_router;
pub mod user_router;
