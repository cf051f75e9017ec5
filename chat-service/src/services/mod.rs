pub mod chat;
pub mod fallback;
pub mod metrics;
pub mod prompts;
pub mod providers;

pub use chat::{ChatOutcome, ChatService};
