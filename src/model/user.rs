use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

pub const ROLE_CUSTOMER: i32 = 0;
pub const ROLE_ADMIN: i32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string, never the plain password
    pub password: String,
    pub phone: String,
    pub address: String,
    /// Security answer used by the forgot-password flow
    pub answer: String,
    #[serde(default)]
    pub role: i32,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}
