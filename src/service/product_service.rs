use async_trait::async_trait;
use bson::{oid::ObjectId, spec::BinarySubtype, Binary};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::dto::category_dto::CategoryResponse;
use crate::dto::product_dto::{FilterRequest, ProductForm, ProductResponse};
use crate::model::category::Category;
use crate::model::product::{Product, ProductPhoto};
use crate::repository::category_repo::CategoryRepository;
use crate::repository::product_repo::{PriceRange, ProductQuery, ProductRepository};
use crate::util::error::ServiceError;
use crate::util::slug::slugify;

/// Products shown on the catalogue front page
pub const LATEST_LIMIT: i64 = 12;
pub const PAGE_SIZE: i64 = 6;
pub const RELATED_LIMIT: i64 = 3;

#[async_trait]
pub trait ProductService: Send + Sync {
    async fn create(&self, form: ProductForm) -> Result<ProductResponse, ServiceError>;
    async fn update(&self, id: ObjectId, form: ProductForm) -> Result<ProductResponse, ServiceError>;
    async fn latest(&self) -> Result<Vec<ProductResponse>, ServiceError>;
    async fn get_by_slug(&self, slug: &str) -> Result<ProductResponse, ServiceError>;
    async fn photo(&self, id: &ObjectId) -> Result<ProductPhoto, ServiceError>;
    async fn delete(&self, id: ObjectId) -> Result<(), ServiceError>;
    async fn filter(&self, request: FilterRequest) -> Result<Vec<ProductResponse>, ServiceError>;
    async fn count(&self) -> Result<u64, ServiceError>;
    /// 1-based page of `PAGE_SIZE` products, newest first.
    async fn page(&self, page: u64) -> Result<Vec<ProductResponse>, ServiceError>;
    async fn search(&self, keyword: &str) -> Result<Vec<ProductResponse>, ServiceError>;
    async fn related(&self, product_id: ObjectId, category_id: ObjectId) -> Result<Vec<ProductResponse>, ServiceError>;
    async fn by_category(&self, slug: &str) -> Result<(CategoryResponse, Vec<ProductResponse>), ServiceError>;
}

pub struct ProductServiceImpl {
    product_repo: Arc<dyn ProductRepository>,
    category_repo: Arc<dyn CategoryRepository>,
}

impl ProductServiceImpl {
    pub fn new(product_repo: Arc<dyn ProductRepository>, category_repo: Arc<dyn CategoryRepository>) -> Self {
        Self { product_repo, category_repo }
    }

    async fn category_index(&self) -> Result<HashMap<ObjectId, Category>, ServiceError> {
        let categories = self.category_repo.list().await?;
        Ok(categories.into_iter().filter_map(|c| c.id.map(|id| (id, c))).collect())
    }

    async fn populate(&self, products: &[Product]) -> Result<Vec<ProductResponse>, ServiceError> {
        let categories = self.category_index().await?;
        Ok(products.iter().map(|p| ProductResponse::new(p, &categories)).collect())
    }

    async fn populate_one(&self, product: &Product) -> Result<ProductResponse, ServiceError> {
        let categories = self.category_index().await?;
        Ok(ProductResponse::new(product, &categories))
    }

    async fn query(&self, query: ProductQuery) -> Result<Vec<ProductResponse>, ServiceError> {
        let products = self.product_repo.list(&query).await?;
        self.populate(&products).await
    }

    async fn to_product(&self, form: ProductForm) -> Result<Product, ServiceError> {
        if self.category_repo.find_by_id(&form.category).await?.is_none() {
            return Err(ServiceError::InvalidInput("Category not found".to_string()));
        }
        Ok(Product {
            id: None,
            slug: slugify(&form.name),
            name: form.name,
            description: form.description,
            price: form.price,
            category: form.category,
            quantity: form.quantity,
            shipping: form.shipping,
            photo: form.photo.map(|upload| ProductPhoto {
                data: Binary { subtype: BinarySubtype::Generic, bytes: upload.content },
                content_type: upload.content_type,
            }),
            created_at: None,
            updated_at: None,
        })
    }
}

/// Builds the listing criteria for the filter endpoint.
pub fn filter_query(request: &FilterRequest) -> Result<ProductQuery, ServiceError> {
    let categories = request
        .checked
        .iter()
        .map(|id| {
            ObjectId::parse_str(id).map_err(|_| ServiceError::InvalidInput(format!("Invalid category id: {}", id)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let price = match request.radio.as_slice() {
        [] => None,
        [a, b] if a.is_finite() && b.is_finite() => Some(PriceRange::new(*a, *b)),
        _ => {
            return Err(ServiceError::InvalidInput(
                "Price range must contain exactly two numbers".to_string(),
            ))
        }
    };

    Ok(ProductQuery { categories, price, ..Default::default() })
}

#[async_trait]
impl ProductService for ProductServiceImpl {
    #[instrument(skip(self, form), fields(name = %form.name))]
    async fn create(&self, form: ProductForm) -> Result<ProductResponse, ServiceError> {
        let product = self.to_product(form).await?;
        let result = self.product_repo.insert(product).await;
        match &result {
            Ok(p) => info!("Product created: {}", p.slug),
            Err(e) => error!("Failed to create product: {e}"),
        }
        self.populate_one(&result?).await
    }

    #[instrument(skip(self, form), fields(name = %form.name))]
    async fn update(&self, id: ObjectId, form: ProductForm) -> Result<ProductResponse, ServiceError> {
        let product = self.to_product(form).await?;
        let result = self.product_repo.update(id, product).await;
        match &result {
            Ok(_) => info!("Product updated"),
            Err(e) => error!("Failed to update product: {e}"),
        }
        self.populate_one(&result?).await
    }

    async fn latest(&self) -> Result<Vec<ProductResponse>, ServiceError> {
        self.query(ProductQuery { limit: Some(LATEST_LIMIT), ..Default::default() }).await
    }

    async fn get_by_slug(&self, slug: &str) -> Result<ProductResponse, ServiceError> {
        let product = self
            .product_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;
        self.populate_one(&product).await
    }

    async fn photo(&self, id: &ObjectId) -> Result<ProductPhoto, ServiceError> {
        self.product_repo
            .find_photo(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Photo not found".to_string()))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> Result<(), ServiceError> {
        self.product_repo.delete(id).await?;
        info!("Product deleted");
        Ok(())
    }

    #[instrument(skip(self, request))]
    async fn filter(&self, request: FilterRequest) -> Result<Vec<ProductResponse>, ServiceError> {
        let query = filter_query(&request)?;
        self.query(query).await
    }

    async fn count(&self) -> Result<u64, ServiceError> {
        Ok(self.product_repo.count().await?)
    }

    async fn page(&self, page: u64) -> Result<Vec<ProductResponse>, ServiceError> {
        if page == 0 {
            return Err(ServiceError::InvalidInput("Page must be at least 1".to_string()));
        }
        let skip = (page - 1).saturating_mul(PAGE_SIZE as u64);
        self.query(ProductQuery { skip, limit: Some(PAGE_SIZE), ..Default::default() }).await
    }

    #[instrument(skip(self))]
    async fn search(&self, keyword: &str) -> Result<Vec<ProductResponse>, ServiceError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(ServiceError::InvalidInput("Keyword is required".to_string()));
        }
        self.query(ProductQuery { keyword: Some(keyword.to_string()), ..Default::default() }).await
    }

    async fn related(&self, product_id: ObjectId, category_id: ObjectId) -> Result<Vec<ProductResponse>, ServiceError> {
        self.query(ProductQuery {
            categories: vec![category_id],
            exclude: Some(product_id),
            limit: Some(RELATED_LIMIT),
            ..Default::default()
        })
        .await
    }

    async fn by_category(&self, slug: &str) -> Result<(CategoryResponse, Vec<ProductResponse>), ServiceError> {
        let category = self
            .category_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Category not found".to_string()))?;
        let id = category
            .id
            .ok_or_else(|| ServiceError::InternalError("Stored category has no id".to_string()))?;
        let products = self.query(ProductQuery { categories: vec![id], ..Default::default() }).await?;
        Ok((CategoryResponse::from(&category), products))
    }
}
