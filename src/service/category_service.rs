use async_trait::async_trait;
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::model::category::Category;
use crate::repository::category_repo::CategoryRepository;
use crate::repository::repository_error::RepositoryError;
use crate::util::error::ServiceError;
use crate::util::slug::slugify;

const ALREADY_EXISTS: &str = "Category already exists";

#[async_trait]
pub trait CategoryService: Send + Sync {
    async fn create(&self, name: &str) -> Result<Category, ServiceError>;
    async fn update(&self, id: ObjectId, name: &str) -> Result<Category, ServiceError>;
    async fn list(&self) -> Result<Vec<Category>, ServiceError>;
    async fn get_by_slug(&self, slug: &str) -> Result<Category, ServiceError>;
    async fn delete(&self, id: ObjectId) -> Result<(), ServiceError>;
}

pub struct CategoryServiceImpl {
    category_repo: Arc<dyn CategoryRepository>,
}

impl CategoryServiceImpl {
    pub fn new(category_repo: Arc<dyn CategoryRepository>) -> Self {
        Self { category_repo }
    }

    /// Trimmed name and its slug, or `InvalidInput` for a blank name.
    fn name_and_slug(name: &str) -> Result<(String, String), ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::InvalidInput("Name is required".to_string()));
        }
        Ok((name.to_string(), slugify(name)))
    }
}

fn conflict_on_duplicate(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::AlreadyExists(_) => ServiceError::Conflict(ALREADY_EXISTS.to_string()),
        other => ServiceError::from(other),
    }
}

#[async_trait]
impl CategoryService for CategoryServiceImpl {
    #[instrument(skip(self))]
    async fn create(&self, name: &str) -> Result<Category, ServiceError> {
        let (name, slug) = Self::name_and_slug(name)?;
        if self.category_repo.find_by_slug(&slug).await?.is_some() {
            info!("Category {} already exists", slug);
            return Err(ServiceError::Conflict(ALREADY_EXISTS.to_string()));
        }

        let category = Category { id: None, name, slug, created_at: None, updated_at: None };
        let result = self.category_repo.insert(category).await.map_err(conflict_on_duplicate);
        match &result {
            Ok(c) => info!("Category created: {}", c.slug),
            Err(e) => error!("Failed to create category: {e}"),
        }
        result
    }

    #[instrument(skip(self))]
    async fn update(&self, id: ObjectId, name: &str) -> Result<Category, ServiceError> {
        let (name, slug) = Self::name_and_slug(name)?;
        if let Some(existing) = self.category_repo.find_by_slug(&slug).await? {
            if existing.id != Some(id) {
                return Err(ServiceError::Conflict(ALREADY_EXISTS.to_string()));
            }
        }
        self.category_repo.update(id, &name, &slug).await.map_err(conflict_on_duplicate)
    }

    async fn list(&self) -> Result<Vec<Category>, ServiceError> {
        Ok(self.category_repo.list().await?)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Category, ServiceError> {
        self.category_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Category not found".to_string()))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> Result<(), ServiceError> {
        self.category_repo.delete(id).await?;
        info!("Category deleted");
        Ok(())
    }
}
