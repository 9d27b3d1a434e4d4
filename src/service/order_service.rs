use async_trait::async_trait;
use bson::oid::ObjectId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::dto::order_dto::OrderResponse;
use crate::model::order::{Order, OrderStatus};
use crate::repository::order_repo::OrderRepository;
use crate::repository::user_repo::UserRepository;
use crate::util::error::ServiceError;

#[async_trait]
pub trait OrderService: Send + Sync {
    async fn buyer_orders(&self, buyer: &ObjectId) -> Result<Vec<OrderResponse>, ServiceError>;
    /// Every order, newest first.
    async fn all_orders(&self) -> Result<Vec<OrderResponse>, ServiceError>;
    async fn update_status(&self, id: ObjectId, status: &str) -> Result<OrderResponse, ServiceError>;
}

pub struct OrderServiceImpl {
    order_repo: Arc<dyn OrderRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl OrderServiceImpl {
    pub fn new(order_repo: Arc<dyn OrderRepository>, user_repo: Arc<dyn UserRepository>) -> Self {
        Self { order_repo, user_repo }
    }

    /// Attaches buyer names.
    async fn populate(&self, orders: &[Order]) -> Result<Vec<OrderResponse>, ServiceError> {
        let mut buyer_ids: Vec<ObjectId> = orders.iter().map(|o| o.buyer).collect();
        buyer_ids.sort();
        buyer_ids.dedup();

        let buyers: HashMap<ObjectId, _> = self
            .user_repo
            .find_by_ids(&buyer_ids)
            .await?
            .into_iter()
            .filter_map(|u| u.id.map(|id| (id, u)))
            .collect();

        Ok(orders.iter().map(|o| OrderResponse::new(o, buyers.get(&o.buyer))).collect())
    }
}

#[async_trait]
impl OrderService for OrderServiceImpl {
    async fn buyer_orders(&self, buyer: &ObjectId) -> Result<Vec<OrderResponse>, ServiceError> {
        let orders = self.order_repo.find_by_buyer(buyer).await?;
        self.populate(&orders).await
    }

    async fn all_orders(&self) -> Result<Vec<OrderResponse>, ServiceError> {
        let orders = self.order_repo.list_all().await?;
        self.populate(&orders).await
    }

    #[instrument(skip(self))]
    async fn update_status(&self, id: ObjectId, status: &str) -> Result<OrderResponse, ServiceError> {
        let status: OrderStatus = status.parse().map_err(ServiceError::InvalidInput)?;
        let order = self.order_repo.update_status(id, status).await?;
        info!("Order status set to {}", status);
        let buyer = self.user_repo.find_by_id(&order.buyer).await?;
        Ok(OrderResponse::new(&order, buyer.as_ref()))
    }
}
