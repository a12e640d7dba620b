use chrono::NaiveDate;
use sqlx::Row;

use sijang_core::dates;

use super::{PriceHistoryRepository, RepositoryError};
use crate::DbPool;

pub struct SqlPriceHistoryRepository {
    pool: DbPool,
}

impl SqlPriceHistoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PriceHistoryRepository for SqlPriceHistoryRepository {
    async fn unit_prices(
        &self,
        item: &str,
        date: NaiveDate,
    ) -> Result<Vec<i64>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT unit_price
            FROM price_history
            WHERE item_name = ?1 AND recorded_date = ?2
            ORDER BY id ASC
            "#,
        )
        .bind(item)
        .bind(dates::compact(date))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(|row| Ok(row.try_get::<i64, _>("unit_price")?)).collect()
    }

    async fn latest_priced_date(
        &self,
        item: &str,
    ) -> Result<Option<NaiveDate>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT MAX(recorded_date) AS latest
            FROM price_history
            WHERE item_name = ?1
            "#,
        )
        .bind(item)
        .fetch_one(&self.pool)
        .await?;

        let latest: Option<String> = row.try_get("latest")?;
        latest
            .map(|raw| {
                NaiveDate::parse_from_str(&raw, "%Y%m%d").map_err(|e| {
                    RepositoryError::Decode(format!("invalid recorded_date `{raw}`: {e}"))
                })
            })
            .transpose()
    }
}
