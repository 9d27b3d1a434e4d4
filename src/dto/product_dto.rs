use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::dto::category_dto::CategoryResponse;
use crate::model::category::Category;
use crate::model::product::{Product, MAX_PHOTO_BYTES};

#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub content_type: String,
    pub content: Vec<u8>,
}

/// Raw multipart text fields of the product form, before validation.
#[derive(Debug, Clone, Default)]
pub struct ProductFields {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<String>,
    pub shipping: Option<String>,
    pub photo: Option<PhotoUpload>,
}

impl ProductFields {
    /// Stores a text field by its form name; unknown names are ignored.
    pub fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "name" => &mut self.name,
            "description" => &mut self.description,
            "price" => &mut self.price,
            "category" => &mut self.category,
            "quantity" => &mut self.quantity,
            "shipping" => &mut self.shipping,
            _ => return,
        };
        *slot = Some(value);
    }

    /// Checks every field and converts to typed values. The error is the
    /// message returned to the caller.
    pub fn into_form(self) -> Result<ProductForm, String> {
        let name = required(self.name, "Name is required")?;
        let description = required(self.description, "Description is required")?;

        let price = required(self.price, "Price is required")?
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p >= 0.0)
            .ok_or_else(|| "Price must be a non-negative number".to_string())?;

        let category = required(self.category, "Category is required")?;
        let category = ObjectId::parse_str(&category).map_err(|_| "Category is invalid".to_string())?;

        let quantity = required(self.quantity, "Quantity is required")?
            .parse::<i64>()
            .ok()
            .filter(|q| *q >= 0)
            .ok_or_else(|| "Quantity must be a non-negative integer".to_string())?;

        let shipping = match self.shipping.as_deref().map(str::trim) {
            None | Some("") | Some("0") | Some("false") | Some("no") => false,
            Some(_) => true,
        };

        if let Some(photo) = &self.photo {
            if photo.content.len() > MAX_PHOTO_BYTES {
                return Err("Photo should be less than 1MB".to_string());
            }
        }

        Ok(ProductForm { name, description, price, category, quantity, shipping, photo: self.photo })
    }
}

fn required(value: Option<String>, message: &str) -> Result<String, String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| message.to_string())
}

/// Validated product form, ready for the service.
#[derive(Debug, Clone)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: ObjectId,
    pub quantity: i64,
    pub shipping: bool,
    pub photo: Option<PhotoUpload>,
}

/// `checked`: category ids; `radio`: `[min, max]` price bounds or empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterRequest {
    pub checked: Vec<String>,
    pub radio: Vec<f64>,
}

/// Populated category when known, otherwise the bare id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CategoryRef {
    Populated(CategoryResponse),
    Id(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: f64,
    pub category: CategoryRef,
    pub quantity: i64,
    pub shipping: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl ProductResponse {
    pub fn new(product: &Product, categories: &HashMap<ObjectId, Category>) -> Self {
        let category = match categories.get(&product.category) {
            Some(category) => CategoryRef::Populated(CategoryResponse::from(category)),
            None => CategoryRef::Id(product.category.to_hex()),
        };
        ProductResponse {
            id: product.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: product.name.clone(),
            slug: product.slug.clone(),
            description: product.description.clone(),
            price: product.price,
            category,
            quantity: product.quantity,
            shipping: product.shipping,
            created_at: product.created_at.clone(),
            updated_at: product.updated_at.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> ProductFields {
        let mut fields = ProductFields::default();
        fields.set("name", "Desk Lamp".to_string());
        fields.set("description", "Warm light".to_string());
        fields.set("price", "24.5".to_string());
        fields.set("category", ObjectId::new().to_hex());
        fields.set("quantity", "3".to_string());
        fields.set("shipping", "1".to_string());
        fields
    }

    #[test]
    fn test_valid_form() {
        let form = fields().into_form().unwrap();
        assert_eq!(form.name, "Desk Lamp");
        assert_eq!(form.price, 24.5);
        assert_eq!(form.quantity, 3);
        assert!(form.shipping);
        assert!(form.photo.is_none());
    }

    #[test]
    fn test_missing_name() {
        let mut f = fields();
        f.name = Some("   ".to_string());
        assert_eq!(f.into_form().unwrap_err(), "Name is required");
    }

    #[test]
    fn test_negative_or_non_numeric_price() {
        let mut f = fields();
        f.set("price", "-1".to_string());
        assert!(f.into_form().is_err());
        let mut f = fields();
        f.set("price", "ten".to_string());
        assert!(f.into_form().is_err());
    }

    #[test]
    fn test_fractional_quantity_rejected() {
        let mut f = fields();
        f.set("quantity", "1.5".to_string());
        assert_eq!(f.into_form().unwrap_err(), "Quantity must be a non-negative integer");
    }

    #[test]
    fn test_oversized_photo_rejected() {
        let mut f = fields();
        f.photo = Some(PhotoUpload { content_type: "image/png".to_string(), content: vec![0; MAX_PHOTO_BYTES + 1] });
        assert_eq!(f.into_form().unwrap_err(), "Photo should be less than 1MB");
    }

    #[test]
    fn test_shipping_defaults_to_false() {
        let mut f = fields();
        f.shipping = None;
        assert!(!f.into_form().unwrap().shipping);
    }
}
