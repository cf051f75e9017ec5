//! Request and response bodies for the chat API.

pub mod chat;

pub use chat::{ChatRequest, ChatResponse, ReplySource};
