use crate::model::product::{Product, ProductPhoto};
use crate::repository::mongo::{self, PRODUCTS};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::stream::TryStreamExt;
use mongodb::options::{FindOneOptions, FindOptions};
use mongodb::Database;
use tracing::{error, info};

/// Inclusive price bounds, always stored with `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    min: f64,
    max: f64,
}

impl PriceRange {
    /// Inverted bounds are swapped rather than rejected.
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            PriceRange { min: a, max: b }
        } else {
            PriceRange { min: b, max: a }
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

/// Catalogue listing criteria. Every list endpoint is expressed as one of these.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    pub categories: Vec<ObjectId>,
    pub price: Option<PriceRange>,
    /// Raw user input; escaped before it reaches the database
    pub keyword: Option<String>,
    pub exclude: Option<ObjectId>,
    pub skip: u64,
    pub limit: Option<i64>,
}

impl ProductQuery {
    pub fn to_filter(&self) -> Document {
        let mut filter = Document::new();
        if !self.categories.is_empty() {
            filter.insert("category", doc! { "$in": self.categories.clone() });
        }
        if let Some(range) = self.price {
            filter.insert("price", doc! { "$gte": range.min(), "$lte": range.max() });
        }
        if let Some(keyword) = self.keyword.as_deref().filter(|k| !k.is_empty()) {
            let pattern = regex::escape(keyword);
            filter.insert(
                "$or",
                vec![
                    doc! { "name": { "$regex": pattern.clone(), "$options": "i" } },
                    doc! { "description": { "$regex": pattern, "$options": "i" } },
                ],
            );
        }
        if let Some(id) = self.exclude {
            filter.insert("_id", doc! { "$ne": id });
        }
        filter
    }
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert(&self, product: Product) -> RepositoryResult<Product>;
    async fn update(&self, id: ObjectId, product: Product) -> RepositoryResult<Product>;
    async fn find_by_slug(&self, slug: &str) -> RepositoryResult<Option<Product>>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Product>>;
    async fn find_photo(&self, id: &ObjectId) -> RepositoryResult<Option<ProductPhoto>>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
    /// Newest first, photos excluded.
    async fn list(&self, query: &ProductQuery) -> RepositoryResult<Vec<Product>>;
    async fn count(&self) -> RepositoryResult<u64>;
}

pub struct MongoProductRepository {
    collection: mongodb::Collection<Product>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        MongoProductRepository {
            collection: db.collection::<Product>(PRODUCTS),
        }
    }

    fn without_photo() -> Document {
        doc! { "photo": 0 }
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[tracing::instrument(skip(self, product), fields(slug = %product.slug))]
    async fn insert(&self, mut product: Product) -> RepositoryResult<Product> {
        product.id = Some(ObjectId::new());
        let now = mongo::now();
        product.created_at = Some(now.clone());
        product.updated_at = Some(now);
        match self.collection.insert_one(&product, None).await {
            Ok(_) => {
                info!("Product created");
                Ok(product)
            }
            Err(e) => {
                error!("Failed to create product: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    #[tracing::instrument(skip(self, product), fields(id = %id))]
    async fn update(&self, id: ObjectId, mut product: Product) -> RepositoryResult<Product> {
        product.updated_at = Some(mongo::now());
        let mut doc = bson::to_document(&product)?;
        doc.remove("_id");
        doc.remove("createdAt");
        let result = self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$set": doc }, None)
            .await?;
        if result.matched_count == 0 {
            error!("No product found to update for ID: {}", id);
            return Err(RepositoryError::not_found(format!("No product found to update for ID: {}", id)));
        }
        product.id = Some(id);
        info!("Product updated");
        Ok(product)
    }

    async fn find_by_slug(&self, slug: &str) -> RepositoryResult<Option<Product>> {
        let options = FindOneOptions::builder().projection(Self::without_photo()).build();
        Ok(self.collection.find_one(doc! { "slug": slug }, options).await?)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Product>> {
        let options = FindOneOptions::builder().projection(Self::without_photo()).build();
        Ok(self.collection.find_one(doc! { "_id": id }, options).await?)
    }

    async fn find_photo(&self, id: &ObjectId) -> RepositoryResult<Option<ProductPhoto>> {
        let product = self.collection.find_one(doc! { "_id": id }, None).await?;
        Ok(product.and_then(|p| p.photo))
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("No product found to delete for ID: {}", id)));
        }
        info!("Product deleted");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self, query: &ProductQuery) -> RepositoryResult<Vec<Product>> {
        let options = FindOptions::builder()
            .projection(Self::without_photo())
            .sort(doc! { "createdAt": -1 })
            .skip(query.skip)
            .limit(query.limit)
            .build();
        let cursor = self.collection.find(query.to_filter(), options).await?;
        let products: Vec<Product> = cursor.try_collect().await?;
        info!("Fetched {} products", products.len());
        Ok(products)
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.collection.estimated_document_count(None).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_range_swaps_inverted_bounds() {
        let range = PriceRange::new(500.0, 100.0);
        assert_eq!(range.min(), 100.0);
        assert_eq!(range.max(), 500.0);
        assert_eq!(range, PriceRange::new(100.0, 500.0));
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let range = PriceRange::new(100.0, 500.0);
        assert!(range.contains(100.0));
        assert!(range.contains(500.0));
        assert!(!range.contains(500.01));
    }

    #[test]
    fn test_reversed_bounds_build_identical_filters() {
        let category = ObjectId::new();
        let forward = ProductQuery {
            categories: vec![category],
            price: Some(PriceRange::new(100.0, 500.0)),
            ..ProductQuery::default()
        };
        let reversed = ProductQuery {
            categories: vec![category],
            price: Some(PriceRange::new(500.0, 100.0)),
            ..ProductQuery::default()
        };
        assert_eq!(forward.to_filter(), reversed.to_filter());
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert!(ProductQuery::default().to_filter().is_empty());
    }

    #[test]
    fn test_keyword_is_escaped() {
        let query = ProductQuery {
            keyword: Some("a.b*(c)".to_string()),
            ..ProductQuery::default()
        };
        let filter = query.to_filter();
        let clauses = filter.get_array("$or").unwrap();
        let name = clauses[0].as_document().unwrap().get_document("name").unwrap();
        assert_eq!(name.get_str("$regex").unwrap(), r"a\.b\*\(c\)");
        assert_eq!(name.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn test_exclude_adds_not_equal_clause() {
        let id = ObjectId::new();
        let query = ProductQuery { exclude: Some(id), ..ProductQuery::default() };
        let filter = query.to_filter();
        assert_eq!(filter.get_document("_id").unwrap().get_object_id("$ne").unwrap(), id);
    }
}
