use axum::{
    extract::{rejection::JsonRejection, Json, Multipart, Path, State},
    http::{header::CONTENT_TYPE, HeaderValue},
    response::IntoResponse,
};
use bytes::BytesMut;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::dto::product_dto::{FilterRequest, PhotoUpload, ProductFields};
use crate::handler::parse_id;
use crate::model::product::MAX_PHOTO_BYTES;
use crate::service::product_service::ProductService;
use crate::util::error::HandlerError;
use crate::util::response::ApiResponse;

/// Collects the product form. Text fields by name, the file under `photo`.
async fn read_product_fields(mut multipart: Multipart) -> Result<ProductFields, HandlerError> {
    let mut fields = ProductFields::default();

    while let Some(mut field) = multipart.next_field().await.map_err(|e| {
        error!("Error getting next multipart field: {}", e);
        HandlerError::bad_request("Invalid form data").with_details(e.body_text())
    })? {
        let name = field.name().map(str::to_string).unwrap_or_default();
        debug!("Processing field: {}", name);

        if name == "photo" {
            let content_type = field
                .content_type()
                .map(str::to_string)
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let mut buf = BytesMut::new();
            while let Some(chunk) = field.chunk().await.map_err(|e| {
                error!("Error reading photo chunk: {}", e);
                HandlerError::bad_request("Failed to read photo")
            })? {
                buf.extend_from_slice(&chunk);
                // Past the limit; keep one extra byte so validation reports it.
                if buf.len() > MAX_PHOTO_BYTES {
                    break;
                }
            }
            if !buf.is_empty() {
                fields.photo = Some(PhotoUpload { content_type, content: buf.to_vec() });
            }
        } else {
            let value = field.text().await.map_err(|e| {
                error!("Failed to read field {}: {}", name, e);
                HandlerError::bad_request(format!("Failed to read field {}", name))
            })?;
            fields.set(&name, value);
        }
    }
    Ok(fields)
}

pub async fn create_product_handler(
    State(service): State<Arc<dyn ProductService>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let form = read_product_fields(multipart).await?.into_form().map_err(HandlerError::bad_request)?;
    let product = service.create(form).await?;
    info!("Product {} created", product.slug);
    Ok(ApiResponse::created().message("Product created successfully").with("products", product))
}

pub async fn update_product_handler(
    State(service): State<Arc<dyn ProductService>>,
    Path(pid): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&pid, "product")?;
    let form = read_product_fields(multipart).await?.into_form().map_err(HandlerError::bad_request)?;
    let product = service.update(id, form).await?;
    Ok(ApiResponse::ok().message("Product updated successfully").with("products", product))
}

pub async fn list_products_handler(
    State(service): State<Arc<dyn ProductService>>,
) -> Result<impl IntoResponse, HandlerError> {
    let products = service.latest().await?;
    Ok(ApiResponse::ok()
        .message("All products")
        .with("countTotal", products.len())
        .with("products", products))
}

pub async fn single_product_handler(
    State(service): State<Arc<dyn ProductService>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let product = service.get_by_slug(&slug).await?;
    Ok(ApiResponse::ok().message("Single product fetched").with("product", product))
}

pub async fn product_photo_handler(
    State(service): State<Arc<dyn ProductService>>,
    Path(pid): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&pid, "product")?;
    let photo = service.photo(&id).await?;
    let content_type = HeaderValue::from_str(&photo.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    Ok(([(CONTENT_TYPE, content_type)], photo.data.bytes))
}

pub async fn delete_product_handler(
    State(service): State<Arc<dyn ProductService>>,
    Path(pid): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_id(&pid, "product")?;
    service.delete(id).await?;
    Ok(ApiResponse::ok().message("Product deleted successfully"))
}

pub async fn product_filters_handler(
    State(service): State<Arc<dyn ProductService>>,
    payload: Result<Json<FilterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let Json(payload) = payload?;
    let products = service.filter(payload).await?;
    Ok(ApiResponse::ok().with("products", products))
}

pub async fn product_count_handler(
    State(service): State<Arc<dyn ProductService>>,
) -> Result<impl IntoResponse, HandlerError> {
    let total = service.count().await?;
    Ok(ApiResponse::ok().with("total", total))
}

pub async fn product_list_handler(
    State(service): State<Arc<dyn ProductService>>,
    Path(page): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let page: u64 = page.parse().map_err(|_| HandlerError::bad_request("Page must be a positive integer"))?;
    let products = service.page(page).await?;
    Ok(ApiResponse::ok().with("products", products))
}

pub async fn search_product_handler(
    State(service): State<Arc<dyn ProductService>>,
    Path(keyword): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let products = service.search(&keyword).await?;
    Ok(ApiResponse::ok().with("products", products))
}

pub async fn related_product_handler(
    State(service): State<Arc<dyn ProductService>>,
    Path((pid, cid)): Path<(String, String)>,
) -> Result<impl IntoResponse, HandlerError> {
    let product_id = parse_id(&pid, "product")?;
    let category_id = parse_id(&cid, "category")?;
    let products = service.related(product_id, category_id).await?;
    Ok(ApiResponse::ok().with("products", products))
}

pub async fn product_category_handler(
    State(service): State<Arc<dyn ProductService>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let (category, products) = service.by_category(&slug).await?;
    Ok(ApiResponse::ok().with("category", category).with("products", products))
}
