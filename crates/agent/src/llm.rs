use anyhow::Result;
use async_trait::async_trait;

/// One completion call. Sampling differs per call site: categorical intent
/// classification runs at temperature 0 with a tiny token budget, while
/// search-result compression runs warmer with room for a few sentences.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn deterministic(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self { prompt: prompt.into(), max_tokens, temperature: 0.0 }
    }

    pub fn sampled(prompt: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self { prompt: prompt.into(), max_tokens, temperature }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}
