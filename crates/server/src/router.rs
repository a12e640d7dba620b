//! Category dispatch for one chat turn.
//!
//! Classifies the utterance, runs the matching handler, then records the
//! exchange in the per-user context window and the chat log. All clocks run
//! on Seoul time.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Datelike, FixedOffset, Utc};
use sijang_agent::llm::{CompletionRequest, LlmClient};
use sijang_agent::{IntentClassifier, PriceQueryExtractor};
use sijang_core::catalog::Catalog;
use sijang_core::context::ContextStore;
use sijang_core::dates;
use sijang_core::Category;
use sijang_db::repositories::{ChatLogEntry, ChatLogRepository, PriceHistoryRepository};

use crate::clients::SearchClient;
use crate::handlers::{faq, price, product_check, product_list, search};

const SIMPLE_INFO_PROMPT: &str = "\
아래 사용자의 질문에 대해 친절하고 자연스럽게 답변해줘.
만약 날짜가 필요하면 {date}, 시간이 필요하면 {time} 토큰을 답변에 포함해. 실제 값은 시스템이 자동으로 채워줘.
질문: \"{utterance}\"";

const SIMPLE_INFO_MAX_TOKENS: u32 = 200;
const SIMPLE_INFO_TEMPERATURE: f32 = 0.5;

pub fn seoul_offset() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).expect("UTC+9 is a valid offset")
}

/// One handled turn: the reply text plus the category it was answered as.
#[derive(Clone, Debug)]
pub struct ChatReply {
    pub response: String,
    pub kind: Category,
}

pub struct ChatRouter {
    classifier: IntentClassifier,
    extractor: PriceQueryExtractor,
    catalog: Arc<Catalog>,
    context: Arc<ContextStore>,
    llm: Arc<dyn LlmClient>,
    search: Arc<dyn SearchClient>,
    prices: Arc<dyn PriceHistoryRepository>,
    chat_log: Arc<dyn ChatLogRepository>,
    max_search_results: usize,
}

impl ChatRouter {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        catalog: Arc<Catalog>,
        context: Arc<ContextStore>,
        llm: Arc<dyn LlmClient>,
        search: Arc<dyn SearchClient>,
        prices: Arc<dyn PriceHistoryRepository>,
        chat_log: Arc<dyn ChatLogRepository>,
        max_search_results: usize,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(llm.clone()),
            extractor: PriceQueryExtractor::new(catalog.clone()),
            catalog,
            context,
            llm,
            search,
            prices,
            chat_log,
            max_search_results,
        }
    }

    pub async fn handle_turn(&self, user_id: &str, utterance: &str) -> Result<ChatReply> {
        let now = Utc::now().with_timezone(&seoul_offset());
        self.handle_turn_at(user_id, utterance, now).await
    }

    /// Clock-injected variant of [`handle_turn`](Self::handle_turn).
    pub async fn handle_turn_at(
        &self,
        user_id: &str,
        utterance: &str,
        now: DateTime<FixedOffset>,
    ) -> Result<ChatReply> {
        let last_turn = self.context.last(user_id);
        let category = self.classifier.classify(utterance, last_turn.as_ref()).await;
        tracing::debug!(
            event_name = "router.classified",
            user_id,
            category = %category,
            "dispatching turn"
        );

        let response = match category {
            Category::SimpleInfo => self.simple_info(utterance, now).await?,
            Category::Price => {
                let turns = self.context.all(user_id);
                let query = self.extractor.extract(utterance, &turns, now.date_naive());
                price::handle(
                    self.prices.as_ref(),
                    &self.catalog,
                    utterance,
                    &query,
                    now.date_naive(),
                )
                .await?
            }
            Category::Faq => faq::handle(utterance),
            Category::ProductList => product_list::handle(&self.catalog),
            Category::ProductCheck => product_check::handle(&self.catalog, utterance),
            Category::Policy => {
                search::handle_policy(self.search.as_ref(), self.llm.as_ref(), utterance, now.year())
                    .await
            }
            Category::Product | Category::Search => {
                search::handle_search(
                    self.search.as_ref(),
                    self.llm.as_ref(),
                    utterance,
                    self.max_search_results,
                )
                .await
            }
        };

        self.context.append(user_id, utterance, &response);
        self.log_exchange(user_id, category, utterance, &response).await;

        Ok(ChatReply { response, kind: category })
    }

    /// Free-form answer with `{date}`/`{time}` tokens the completion service
    /// may emit, substituted with the Seoul clock afterwards.
    async fn simple_info(&self, utterance: &str, now: DateTime<FixedOffset>) -> Result<String> {
        let prompt = SIMPLE_INFO_PROMPT.replace("{utterance}", utterance);
        let reply = self
            .llm
            .complete(CompletionRequest::sampled(
                prompt,
                SIMPLE_INFO_MAX_TOKENS,
                SIMPLE_INFO_TEMPERATURE,
            ))
            .await?;

        let weekday = dates::korean_weekday(now.date_naive());
        let today = format!("{} ({weekday})", now.format("%Y년 %m월 %d일"));
        let time = format!("{} {weekday} {}", now.format("%Y년 %m월 %d일"), now.format("%H:%M"));
        Ok(reply.trim().replace("{date}", &today).replace("{time}", &time))
    }

    /// Chat log writes never fail a turn.
    async fn log_exchange(&self, user_id: &str, kind: Category, utterance: &str, response: &str) {
        let entry = ChatLogEntry {
            user_id: user_id.to_string(),
            kind: kind.as_str().to_string(),
            user_message: utterance.to_string(),
            bot_response: response.to_string(),
            created_at: Utc::now(),
        };
        if let Err(error) = self.chat_log.append(entry).await {
            tracing::warn!(
                event_name = "router.chat_log_failed",
                user_id,
                error = %error,
                "dropping chat log entry"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;

    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{DateTime, FixedOffset};
    use sijang_agent::llm::{CompletionRequest, LlmClient};
    use sijang_core::catalog::Catalog;
    use sijang_core::context::ContextStore;
    use sijang_core::Category;
    use sijang_db::repositories::{
        InMemoryChatLogRepository, InMemoryPriceHistoryRepository,
    };
    use tokio::sync::Mutex;

    use super::{seoul_offset, ChatRouter};
    use crate::clients::{SearchClient, SearchHit};

    struct ScriptedLlm {
        replies: Mutex<VecDeque<String>>,
    }

    impl ScriptedLlm {
        fn with(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            })
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn complete(&self, _request: CompletionRequest) -> Result<String> {
            self.replies
                .lock()
                .await
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("no scripted reply left"))
        }
    }

    struct NoSearch;

    #[async_trait]
    impl SearchClient for NoSearch {
        async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<SearchHit>> {
            Ok(Vec::new())
        }
    }

    fn noon(y: i32, m: u32, d: u32) -> DateTime<FixedOffset> {
        chrono::NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .expect("valid datetime")
            .and_local_timezone(seoul_offset())
            .single()
            .expect("unambiguous local time")
    }

    fn router(llm: Arc<ScriptedLlm>) -> (ChatRouter, Arc<InMemoryPriceHistoryRepository>, Arc<InMemoryChatLogRepository>) {
        let prices = Arc::new(InMemoryPriceHistoryRepository::default());
        let chat_log = Arc::new(InMemoryChatLogRepository::default());
        let router = ChatRouter::new(
            Arc::new(Catalog::new()),
            Arc::new(ContextStore::new()),
            llm,
            Arc::new(NoSearch),
            prices.clone(),
            chat_log.clone(),
            3,
        );
        (router, prices, chat_log)
    }

    #[tokio::test]
    async fn faq_turn_is_answered_and_logged() {
        let (router, _, chat_log) = router(ScriptedLlm::with(&["faq"]));

        let reply = router
            .handle_turn_at("u-1", "반품은 어떻게 하나요?", noon(2025, 6, 20))
            .await
            .unwrap();

        assert_eq!(reply.kind, Category::Faq);
        assert!(reply.response.contains("반품"));

        let entries = chat_log.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, "faq");
        assert_eq!(entries[0].user_message, "반품은 어떻게 하나요?");
    }

    #[tokio::test]
    async fn price_turn_reads_item_from_earlier_context() {
        let (router, prices, _) = router(ScriptedLlm::with(&["price", "price"]));
        prices
            .record("배추", chrono::NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(), 3200)
            .await;

        let first = router
            .handle_turn_at("u-1", "배추 오늘 시세 알려줘", noon(2025, 6, 20))
            .await
            .unwrap();
        assert_eq!(first.kind, Category::Price);
        assert!(first.response.contains("배추"));

        // Item omitted; resolved from the previous turn.
        let second = router
            .handle_turn_at("u-1", "오늘 시세 얼마야", noon(2025, 6, 20))
            .await
            .unwrap();
        assert!(second.response.contains("배추 가격은 3200원입니다"));
    }

    #[tokio::test]
    async fn simple_info_substitutes_clock_tokens() {
        let (router, _, _) = router(ScriptedLlm::with(&[
            "simple_info",
            "오늘은 {date}이고 지금은 {time}입니다.",
        ]));

        let reply = router
            .handle_turn_at("u-1", "오늘 무슨 요일이야?", noon(2025, 6, 20))
            .await
            .unwrap();

        assert_eq!(reply.kind, Category::SimpleInfo);
        assert_eq!(
            reply.response,
            "오늘은 2025년 06월 20일 (금요일)이고 지금은 2025년 06월 20일 금요일 12:00입니다."
        );
    }

    #[tokio::test]
    async fn affirmative_after_list_offer_returns_full_listing() {
        let (router, _, _) = router(ScriptedLlm::with(&[]));

        // The check detector fires without an LLM call, and the unknown item
        // reply ends with the list offer.
        let first = router
            .handle_turn_at("u-1", "고등어도 팔아?", noon(2025, 6, 20))
            .await
            .unwrap();
        assert_eq!(first.kind, Category::ProductCheck);
        assert!(first.response.ends_with("취급 중인 상품 목록을 알려드릴까요?"));

        let second = router.handle_turn_at("u-1", "네", noon(2025, 6, 20)).await.unwrap();
        assert_eq!(second.kind, Category::ProductList);
        assert!(second.response.contains("총 105가지의 농산물을 취급하고 있습니다."));
    }

    #[tokio::test]
    async fn empty_search_reports_nothing_found() {
        let (router, _, chat_log) = router(ScriptedLlm::with(&["search"]));

        let reply = router
            .handle_turn_at("u-1", "요즘 농산물 수출 동향", noon(2025, 6, 20))
            .await
            .unwrap();

        assert_eq!(reply.kind, Category::Search);
        assert_eq!(reply.response, "관련 정보가 검색되지 않았습니다.");
        assert_eq!(chat_log.entries().await.len(), 1);
    }
}
