use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use sijang_core::config::SearchConfig;

use super::{SearchClient, SearchHit};

/// Tavily-style web search client.
pub struct TavilyClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl TavilyClient {
    pub fn new(http: reqwest::Client, config: &SearchConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }
}

#[derive(Serialize)]
struct SearchBody<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'static str,
    include_answer: bool,
    include_raw_content: bool,
    max_results: usize,
}

#[derive(Deserialize)]
struct SearchReply {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[async_trait]
impl SearchClient for TavilyClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        let api_key =
            self.api_key.as_ref().ok_or_else(|| anyhow!("search api key is not configured"))?;

        let body = SearchBody {
            api_key: api_key.expose_secret(),
            query,
            search_depth: "advanced",
            include_answer: false,
            include_raw_content: false,
            max_results,
        };

        let response = self
            .http
            .post(format!("{}/search", self.base_url))
            .json(&body)
            .send()
            .await
            .context("search request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            bail!("search service returned {status}: {detail}");
        }

        let reply: SearchReply =
            response.json().await.context("search response was not valid JSON")?;
        Ok(reply.results)
    }
}
