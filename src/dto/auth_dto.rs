use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::{non_blank, trimmed_email};
use crate::model::user::User;

/// Missing fields deserialize as empty strings so they surface as validation
/// errors instead of extractor rejections.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterRequest {
    #[validate(custom(function = "non_blank", message = "Name is required"))]
    pub name: String,
    #[validate(custom(function = "trimmed_email", message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    #[validate(custom(function = "non_blank", message = "Phone number is required"))]
    pub phone: String,
    #[validate(custom(function = "non_blank", message = "Address is required"))]
    pub address: String,
    #[validate(custom(function = "non_blank", message = "Answer is required"))]
    pub answer: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(custom(function = "non_blank", message = "Invalid email or password"))]
    pub email: String,
    #[validate(custom(function = "non_blank", message = "Invalid email or password"))]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    #[validate(custom(function = "non_blank", message = "Email is required"))]
    pub email: String,
    #[validate(custom(function = "non_blank", message = "Answer is required"))]
    pub answer: String,
    #[validate(length(min = 6, message = "New password must be at least 6 characters long"))]
    pub new_password: String,
}

/// Profile edit. Email is not editable; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    #[validate(length(min = 6, message = "Password is required and must be at least 6 characters long"))]
    pub password: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Public view of a user: no password hash, no security answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub role: i32,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        UserResponse {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            address: user.address.clone(),
            role: user.role,
            created_at: user.created_at.clone(),
            updated_at: user.updated_at.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_missing_fields_fail_validation() {
        let request: RegisterRequest = serde_json::from_str(r#"{"name": "  ", "email": "jane@example.com"}"#).unwrap();
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("answer"));
        assert!(!fields.contains_key("email"));
    }

    #[test]
    fn test_register_email_is_checked_after_trimming() {
        let request: RegisterRequest = serde_json::from_str(r#"{"email": " Jane@Example.com "}"#).unwrap();
        assert!(!request.validate().unwrap_err().field_errors().contains_key("email"));

        let request: RegisterRequest = serde_json::from_str(r#"{"email": " not-an-email "}"#).unwrap();
        assert!(request.validate().unwrap_err().field_errors().contains_key("email"));
    }

    #[test]
    fn test_short_profile_password_rejected() {
        let request = UpdateProfileRequest { password: Some("12345".to_string()), ..Default::default() };
        assert!(request.validate().is_err());
        let request = UpdateProfileRequest { name: Some("Jane".to_string()), ..Default::default() };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_user_response_hides_secrets() {
        let user = User {
            id: Some(bson::oid::ObjectId::new()),
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            password: "$argon2id$hash".to_string(),
            phone: "555".to_string(),
            address: "1 Main St".to_string(),
            answer: "football".to_string(),
            role: 0,
            created_at: None,
            updated_at: None,
        };
        let json = serde_json::to_value(UserResponse::from(&user)).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("answer").is_none());
        assert_eq!(json["_id"].as_str().map(str::len), Some(24));
    }
}
