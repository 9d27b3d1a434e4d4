pub mod error;
pub mod jwt;
pub mod logger;
pub mod password;
pub mod response;
pub mod slug;
