use crate::model::order::{Order, OrderStatus};
use crate::repository::mongo::{self, ORDERS};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::Database;
use tracing::{error, info};

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, order: Order) -> RepositoryResult<Order>;
    async fn find_by_buyer(&self, buyer: &ObjectId) -> RepositoryResult<Vec<Order>>;
    async fn list_all(&self) -> RepositoryResult<Vec<Order>>;
    async fn update_status(&self, id: ObjectId, status: OrderStatus) -> RepositoryResult<Order>;
}

pub struct MongoOrderRepository {
    collection: mongodb::Collection<Order>,
}

impl MongoOrderRepository {
    pub fn new(db: &Database) -> Self {
        MongoOrderRepository {
            collection: db.collection::<Order>(ORDERS),
        }
    }

    fn newest_first() -> FindOptions {
        FindOptions::builder().sort(doc! { "createdAt": -1 }).build()
    }
}

#[async_trait]
impl OrderRepository for MongoOrderRepository {
    #[tracing::instrument(skip(self, order), fields(buyer = %order.buyer))]
    async fn create(&self, mut order: Order) -> RepositoryResult<Order> {
        order.id = Some(ObjectId::new());
        order.status = Some(order.status.unwrap_or_default());
        let now = mongo::now();
        order.created_at = Some(now.clone());
        order.updated_at = Some(now);
        match self.collection.insert_one(&order, None).await {
            Ok(_) => {
                info!("Order created");
                Ok(order)
            }
            Err(e) => {
                error!("Failed to create order: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    async fn find_by_buyer(&self, buyer: &ObjectId) -> RepositoryResult<Vec<Order>> {
        let cursor = self.collection.find(doc! { "buyer": buyer }, Self::newest_first()).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn list_all(&self) -> RepositoryResult<Vec<Order>> {
        let cursor = self.collection.find(None, Self::newest_first()).await?;
        Ok(cursor.try_collect().await?)
    }

    #[tracing::instrument(skip(self), fields(id = %id, status = %status))]
    async fn update_status(&self, id: ObjectId, status: OrderStatus) -> RepositoryResult<Order> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let update = doc! { "$set": { "status": status.as_str(), "updatedAt": mongo::now() } };
        match self.collection.find_one_and_update(doc! { "_id": id }, update, options).await? {
            Some(order) => {
                info!("Order status updated");
                Ok(order)
            }
            None => {
                error!("No order found to update status for ID: {}", id);
                Err(RepositoryError::not_found(format!("No order found for ID: {}", id)))
            }
        }
    }
}
