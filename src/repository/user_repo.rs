use crate::model::user::User;
use crate::repository::mongo::{self, USERS};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::TryStreamExt;
use mongodb::{options::FindOptions, Database};
use tracing::{error, info};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: User) -> RepositoryResult<User>;
    async fn update(&self, id: ObjectId, user: User) -> RepositoryResult<User>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>>;
    async fn find_by_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<User>>;
    async fn list(&self) -> RepositoryResult<Vec<User>>;
}

pub struct UserRepositoryImpl {
    collection: mongodb::Collection<User>,
}

impl UserRepositoryImpl {
    pub fn new(db: &Database) -> Self {
        UserRepositoryImpl {
            collection: db.collection::<User>(USERS),
        }
    }
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    #[tracing::instrument(skip(self, user), fields(email = %user.email))]
    async fn insert(&self, mut user: User) -> RepositoryResult<User> {
        user.id = Some(ObjectId::new());
        let now = mongo::now();
        user.created_at = Some(now.clone());
        user.updated_at = Some(now);
        match self.collection.insert_one(&user, None).await {
            Ok(_) => {
                info!("User inserted");
                Ok(user)
            }
            Err(e) => {
                error!("Failed to insert user: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    #[tracing::instrument(skip(self, user), fields(id = %id))]
    async fn update(&self, id: ObjectId, mut user: User) -> RepositoryResult<User> {
        user.updated_at = Some(mongo::now());
        let mut doc = bson::to_document(&user)?;
        doc.remove("_id");
        doc.remove("createdAt");
        let result = self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$set": doc }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to update user: {}", e)))?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("No user found to update for ID: {}", id)));
        }
        user.id = Some(id);
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        self.collection
            .find_one(doc! { "email": email }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to find user by email: {}", e)))
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to find user by id: {}", e)))
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<User>> {
        let cursor = self.collection.find(doc! { "_id": { "$in": ids.to_vec() } }, None).await?;
        Ok(cursor.try_collect().await?)
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self) -> RepositoryResult<Vec<User>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        let cursor = self.collection.find(None, options).await?;
        let users: Vec<User> = cursor.try_collect().await?;
        info!("Fetched {} users", users.len());
        Ok(users)
    }
}
