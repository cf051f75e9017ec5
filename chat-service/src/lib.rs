//! chat-service: relays visitor questions to Gemini and falls back to canned
//! replies when Gemini is unavailable.

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

pub use startup::{build_router, AppState, Application};
