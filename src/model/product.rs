use bson::{oid::ObjectId, Binary};
use serde::{Deserialize, Serialize};

/// Largest accepted product photo, in bytes
pub const MAX_PHOTO_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPhoto {
    pub data: Binary,
    pub content_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: f64,
    pub category: ObjectId,
    pub quantity: i64,
    #[serde(default)]
    pub shipping: bool,
    /// Omitted from list queries; absent on update means "keep the stored photo"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<ProductPhoto>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}
