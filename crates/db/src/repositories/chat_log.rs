use super::{ChatLogEntry, ChatLogRepository, RepositoryError};
use crate::DbPool;

pub struct SqlChatLogRepository {
    pool: DbPool,
}

impl SqlChatLogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ChatLogRepository for SqlChatLogRepository {
    async fn append(&self, entry: ChatLogEntry) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO chat_log (user_id, kind, user_message, bot_response, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&entry.user_id)
        .bind(&entry.kind)
        .bind(&entry.user_message)
        .bind(&entry.bot_response)
        .bind(entry.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sqlx::Row;

    use super::SqlChatLogRepository;
    use crate::repositories::{ChatLogEntry, ChatLogRepository};
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup_pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:?cache=shared", 1, 30)
            .await
            .expect("connect test pool");
        migrations::run_pending(&pool).await.expect("run migrations");
        pool
    }

    #[tokio::test]
    async fn sql_chat_log_appends_rows() {
        let pool = setup_pool().await;
        let repo = SqlChatLogRepository::new(pool.clone());
        let now = Utc::now();

        repo.append(ChatLogEntry {
            user_id: "u-1".to_string(),
            kind: "price".to_string(),
            user_message: "배추 가격 알려줘".to_string(),
            bot_response: "배추 가격은...".to_string(),
            created_at: now,
        })
        .await
        .expect("append entry");

        let row = sqlx::query(
            "SELECT user_id, kind, user_message, created_at FROM chat_log WHERE user_id = 'u-1'",
        )
        .fetch_one(&pool)
        .await
        .expect("fetch logged row");

        assert_eq!(row.get::<String, _>("kind"), "price");
        assert_eq!(row.get::<String, _>("user_message"), "배추 가격 알려줘");
        assert_eq!(row.get::<String, _>("created_at"), now.to_rfc3339());

        pool.close().await;
    }
}
