//! Intent classification and price-query extraction.
//!
//! This crate decides, for every inbound utterance, which response strategy
//! handles it, and for price lookups extracts the structured entities
//! (catalog item, date bounds) the price handler needs:
//!
//! 1. **Context short-circuit** (`classify`) — a "yes" right after the bot
//!    offered the full item list skips classification entirely.
//! 2. **Rule detectors** (`classify`) — fixed keyword rules for the
//!    product-list and product-check intents.
//! 3. **LLM delegation** (`classify` + `llm`) — everything else goes to the
//!    completion service with a versioned single-token prompt; unrecognized
//!    replies and transport failures both degrade to the search category.
//! 4. **Entity extraction** (`extract`) — item and date resolution run
//!    independently so the router can report each failure precisely.
//!
//! The completion service is strictly a classifier of last resort. It never
//! extracts items or dates; those are deterministic rules in `sijang-core`.

pub mod classify;
pub mod extract;
pub mod llm;

pub use classify::IntentClassifier;
pub use extract::{PriceQuery, PriceQueryExtractor};
pub use llm::{CompletionRequest, LlmClient};
