use std::collections::HashMap;

use chrono::NaiveDate;
use tokio::sync::RwLock;

use super::{
    ChatLogEntry, ChatLogRepository, PriceHistoryRepository, RepositoryError,
};

#[derive(Default)]
pub struct InMemoryPriceHistoryRepository {
    rows: RwLock<HashMap<String, Vec<(NaiveDate, i64)>>>,
}

impl InMemoryPriceHistoryRepository {
    pub async fn record(&self, item: &str, date: NaiveDate, unit_price: i64) {
        let mut rows = self.rows.write().await;
        rows.entry(item.to_string()).or_default().push((date, unit_price));
    }
}

#[async_trait::async_trait]
impl PriceHistoryRepository for InMemoryPriceHistoryRepository {
    async fn unit_prices(
        &self,
        item: &str,
        date: NaiveDate,
    ) -> Result<Vec<i64>, RepositoryError> {
        let rows = self.rows.read().await;
        Ok(rows
            .get(item)
            .map(|entries| {
                entries.iter().filter(|(d, _)| *d == date).map(|(_, p)| *p).collect()
            })
            .unwrap_or_default())
    }

    async fn latest_priced_date(
        &self,
        item: &str,
    ) -> Result<Option<NaiveDate>, RepositoryError> {
        let rows = self.rows.read().await;
        Ok(rows.get(item).and_then(|entries| entries.iter().map(|(d, _)| *d).max()))
    }
}

#[derive(Default)]
pub struct InMemoryChatLogRepository {
    entries: RwLock<Vec<ChatLogEntry>>,
}

impl InMemoryChatLogRepository {
    pub async fn entries(&self) -> Vec<ChatLogEntry> {
        self.entries.read().await.clone()
    }
}

#[async_trait::async_trait]
impl ChatLogRepository for InMemoryChatLogRepository {
    async fn append(&self, entry: ChatLogEntry) -> Result<(), RepositoryError> {
        let mut entries = self.entries.write().await;
        entries.push(entry);
        Ok(())
    }
}
