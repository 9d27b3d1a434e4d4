pub mod auth_handler;
pub mod category_handler;
pub mod order_handler;
pub mod payment_handler;
pub mod product_handler;
pub mod user_handler;

use bson::oid::ObjectId;

use crate::util::error::HandlerError;

/// Parses a path id, naming the resource in the 400 message.
pub(crate) fn parse_id(raw: &str, resource: &str) -> Result<ObjectId, HandlerError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| HandlerError::bad_request(format!("Invalid {} id", resource)))
}
