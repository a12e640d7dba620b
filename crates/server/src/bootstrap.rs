use std::sync::Arc;
use std::time::Duration;

use sijang_core::catalog::Catalog;
use sijang_core::config::{AppConfig, ConfigError, LoadOptions};
use sijang_core::context::ContextStore;
use sijang_db::{connect_with_settings, migrations, DbPool};
use thiserror::Error;
use tracing::info;

use crate::clients::{OpenAiChatClient, TavilyClient};
use crate::router::ChatRouter;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub context: Arc<ContextStore>,
    pub chat_router: Arc<ChatRouter>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("http client construction failed: {0}")]
    HttpClient(#[source] reqwest::Error),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    let llm_http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.llm.timeout_secs))
        .build()
        .map_err(BootstrapError::HttpClient)?;
    let search_http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.search.timeout_secs))
        .build()
        .map_err(BootstrapError::HttpClient)?;

    let llm = Arc::new(OpenAiChatClient::new(llm_http, &config.llm));
    let search = Arc::new(TavilyClient::new(search_http, &config.search));
    let context = Arc::new(ContextStore::new());

    let chat_router = Arc::new(ChatRouter::new(
        Arc::new(Catalog::new()),
        context.clone(),
        llm,
        search,
        Arc::new(sijang_db::SqlPriceHistoryRepository::new(db_pool.clone())),
        Arc::new(sijang_db::SqlChatLogRepository::new(db_pool.clone())),
        config.search.max_results,
    ));

    info!(event_name = "system.bootstrap.completed", "application bootstrap completed");

    Ok(Application { config, db_pool, context, chat_router })
}
