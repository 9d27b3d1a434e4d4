use crate::model::category::Category;
use crate::repository::mongo::{self, CATEGORIES};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::Database;
use tracing::{error, info};

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn insert(&self, category: Category) -> RepositoryResult<Category>;
    async fn update(&self, id: ObjectId, name: &str, slug: &str) -> RepositoryResult<Category>;
    async fn find_by_slug(&self, slug: &str) -> RepositoryResult<Option<Category>>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Category>>;
    async fn list(&self) -> RepositoryResult<Vec<Category>>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
}

pub struct MongoCategoryRepository {
    collection: mongodb::Collection<Category>,
}

impl MongoCategoryRepository {
    pub fn new(db: &Database) -> Self {
        MongoCategoryRepository {
            collection: db.collection::<Category>(CATEGORIES),
        }
    }
}

#[async_trait]
impl CategoryRepository for MongoCategoryRepository {
    #[tracing::instrument(skip(self), fields(slug = %category.slug))]
    async fn insert(&self, mut category: Category) -> RepositoryResult<Category> {
        category.id = Some(ObjectId::new());
        let now = mongo::now();
        category.created_at = Some(now.clone());
        category.updated_at = Some(now);
        match self.collection.insert_one(&category, None).await {
            Ok(_) => {
                info!("Category created");
                Ok(category)
            }
            Err(e) => {
                error!("Failed to create category: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id, slug = %slug))]
    async fn update(&self, id: ObjectId, name: &str, slug: &str) -> RepositoryResult<Category> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let update = doc! { "$set": { "name": name, "slug": slug, "updatedAt": mongo::now() } };
        self.collection
            .find_one_and_update(doc! { "_id": id }, update, options)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("No category found to update for ID: {}", id)))
    }

    async fn find_by_slug(&self, slug: &str) -> RepositoryResult<Option<Category>> {
        Ok(self.collection.find_one(doc! { "slug": slug }, None).await?)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Category>> {
        Ok(self.collection.find_one(doc! { "_id": id }, None).await?)
    }

    async fn list(&self) -> RepositoryResult<Vec<Category>> {
        let options = FindOptions::builder().sort(doc! { "name": 1 }).build();
        let cursor = self.collection.find(None, options).await?;
        Ok(cursor.try_collect().await?)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        if result.deleted_count == 0 {
            error!("No category found to delete for ID: {}", id);
            return Err(RepositoryError::not_found(format!("No category found to delete for ID: {}", id)));
        }
        info!("Category deleted");
        Ok(())
    }
}
