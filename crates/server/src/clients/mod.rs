//! Outbound collaborator clients: the completion service and the web
//! search service, both reqwest-backed JSON APIs.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

pub mod openai;
pub mod tavily;

pub use openai::OpenAiChatClient;
pub use tavily::TavilyClient;

/// One ranked web search result.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
}

#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}
