use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::dto::non_blank;
use crate::model::order::{Order, OrderStatus};
use crate::model::user::User;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateOrderStatusRequest {
    #[validate(custom(function = "non_blank", message = "Status is required"))]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuyerResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum BuyerRef {
    Populated(BuyerResponse),
    Id(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub products: Vec<Value>,
    pub payment: Value,
    pub buyer: BuyerRef,
    pub status: OrderStatus,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl OrderResponse {
    /// `buyer` populates the buyer name when the user still exists.
    pub fn new(order: &Order, buyer: Option<&User>) -> Self {
        let buyer = match buyer {
            Some(user) => BuyerRef::Populated(BuyerResponse {
                id: order.buyer.to_hex(),
                name: user.name.clone(),
            }),
            None => BuyerRef::Id(order.buyer.to_hex()),
        };
        OrderResponse {
            id: order.id.map(|id| id.to_hex()).unwrap_or_default(),
            products: order
                .products
                .iter()
                .map(|item| bson::Bson::Document(item.clone()).into_relaxed_extjson())
                .collect(),
            payment: order.payment.clone().into_relaxed_extjson(),
            buyer,
            status: order.status.unwrap_or_default(),
            created_at: order.created_at.clone(),
            updated_at: order.updated_at.clone(),
        }
    }
}
