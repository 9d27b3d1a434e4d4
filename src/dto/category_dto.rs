use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::non_blank;
use crate::model::category::Category;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CategoryRequest {
    #[validate(custom(function = "non_blank", message = "Name is required"))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: String,
}

impl From<&Category> for CategoryResponse {
    fn from(category: &Category) -> Self {
        CategoryResponse {
            id: category.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: category.name.clone(),
            slug: category.slug.clone(),
        }
    }
}
