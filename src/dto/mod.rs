pub mod auth_dto;
pub mod category_dto;
pub mod order_dto;
pub mod payment_dto;
pub mod product_dto;

use validator::{ValidateEmail, ValidationError};

/// Rejects strings that are empty after trimming.
pub(crate) fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Email check on the trimmed value; storage trims and lower-cases.
pub(crate) fn trimmed_email(value: &str) -> Result<(), ValidationError> {
    if !value.trim().validate_email() {
        return Err(ValidationError::new("email"));
    }
    Ok(())
}
