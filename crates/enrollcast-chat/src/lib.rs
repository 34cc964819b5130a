//! Conversational interface for Enrollcast.
//!
//! Provides the chat orchestrator that talks to the forecasting backend,
//! the offline intent parser it falls back on, canned replies, and the
//! archive of past conversations.

pub mod error;
pub mod history;
pub mod orchestrator;
pub mod parser;
pub mod response;

pub use error::ChatError;
pub use history::{ConversationHistory, DayGroup};
pub use orchestrator::ChatOrchestrator;
pub use parser::{Intent, IntentParser};
pub use response::{FallbackReply, CLEARED_GREETING, WELCOME_GREETING};
