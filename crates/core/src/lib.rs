//! Deterministic domain core for the sijang market chatbot.
//!
//! Everything in this crate is pure, synchronous logic with no I/O:
//! the intent category vocabulary, the fixed produce catalog and its
//! resolver, the Korean relative-date resolver, the bounded per-user
//! conversation context, and application configuration.
//!
//! The LLM is strictly a classifier of last resort. It never extracts
//! items or dates and never produces prices; those are deterministic
//! decisions made here.

pub mod catalog;
pub mod category;
pub mod config;
pub mod context;
pub mod dates;

pub use catalog::{Catalog, ProduceGroup};
pub use category::Category;
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use context::{ContextStore, ConversationTurn};
