//! Entity models.

pub mod message;
pub mod notification;
pub mod user;
