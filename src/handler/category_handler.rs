use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    response::IntoResponse,
};
use std::sync::Arc;
use validator::Validate;

use crate::dto::category_dto::{CategoryRequest, CategoryResponse};
use crate::handler::parse_id;
use crate::service::category_service::CategoryService;
use crate::util::error::HandlerError;
use crate::util::response::ApiResponse;

pub async fn create_category_handler(
    State(service): State<Arc<dyn CategoryService>>,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Json(payload) = payload?;
    payload.validate().map_err(HandlerError::validation)?;

    let category = service.create(&payload.name).await?;
    Ok(ApiResponse::created()
        .message("New category created")
        .with("category", CategoryResponse::from(&category)))
}

pub async fn update_category_handler(
    State(service): State<Arc<dyn CategoryService>>,
    Path(id): Path<String>,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "category")?;
    let Json(payload) = payload?;
    payload.validate().map_err(HandlerError::validation)?;

    let category = service.update(id, &payload.name).await?;
    Ok(ApiResponse::ok()
        .message("Category updated successfully")
        .with("category", CategoryResponse::from(&category)))
}

pub async fn list_categories_handler(
    State(service): State<Arc<dyn CategoryService>>,
) -> Result<impl IntoResponse, HandlerError> {
    let categories: Vec<CategoryResponse> = service.list().await?.iter().map(CategoryResponse::from).collect();
    Ok(ApiResponse::ok().message("All categories list").with("category", categories))
}

pub async fn single_category_handler(
    State(service): State<Arc<dyn CategoryService>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let category = service.get_by_slug(&slug).await?;
    Ok(ApiResponse::ok()
        .message("Get single category successfully")
        .with("category", CategoryResponse::from(&category)))
}

pub async fn delete_category_handler(
    State(service): State<Arc<dyn CategoryService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&id, "category")?;
    service.delete(id).await?;
    Ok(ApiResponse::ok().message("Category deleted successfully"))
}
