use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

pub mod chat_log;
pub mod memory;
pub mod price_history;

pub use chat_log::SqlChatLogRepository;
pub use memory::{InMemoryChatLogRepository, InMemoryPriceHistoryRepository};
pub use price_history::SqlPriceHistoryRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// One logged conversation turn. `kind` is the routed category token,
/// e.g. `price` or `faq`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLogEntry {
    pub user_id: String,
    pub kind: String,
    pub user_message: String,
    pub bot_response: String,
    pub created_at: DateTime<Utc>,
}

/// Read access to the daily wholesale price observations.
///
/// Dates are stored as compact `YYYYMMDD` strings; callers work in
/// `NaiveDate` and the implementations translate at the boundary.
#[async_trait]
pub trait PriceHistoryRepository: Send + Sync {
    /// All unit prices (won per kg) recorded for `item` on `date`.
    async fn unit_prices(
        &self,
        item: &str,
        date: NaiveDate,
    ) -> Result<Vec<i64>, RepositoryError>;

    /// Most recent date with at least one price row for `item`.
    async fn latest_priced_date(
        &self,
        item: &str,
    ) -> Result<Option<NaiveDate>, RepositoryError>;
}

#[async_trait]
pub trait ChatLogRepository: Send + Sync {
    async fn append(&self, entry: ChatLogEntry) -> Result<(), RepositoryError>;
}
