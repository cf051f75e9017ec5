//! HTTP handlers for the chat service.

pub mod chat;
pub mod health;

pub use chat::chat;
pub use health::{health_check, metrics, ping};
