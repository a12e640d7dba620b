use std::sync::Arc;

use sijang_core::catalog::hangul_tokens;
use sijang_core::context::ConversationTurn;
use sijang_core::Category;

use crate::llm::{CompletionRequest, LlmClient};

/// Versioned classification prompt. The category vocabulary here must stay
/// in lockstep with [`Category::from_token`]; the reply is one lower-case
/// token and anything else collapses to the search category.
pub const CLASSIFY_PROMPT_V1: &str = "\
아래 질문을 가장 적합한 카테고리로 분류해줘.
- simple_info: 오늘 날짜, 현재 시간, 인사(안녕, 반가워 등), 오늘 기분이 어때? 등
- product_list: 전체 품목 안내, 판매 품목, 상품 리스트, 모든 상품, 취급 품목 등
- product_check: 품목 판매 여부 확인(고추도 팔아?, 망고도 있나요?, 고등어는 안팔아? 등)
- faq: 고객센터, 반품, 배송, 결제, 등록 제한, 판매자 구매, 상품 등록 유의사항, 금지된 상품 등
- price: 시세, 가격, 금액, 단가 등
- product: 농산물 정보, 제철, 보관법, 재배법, 요즘 딸기가 나와? 등
- policy: 정책, 제도, 지원, 법령, 수출입 등
- 기타: 위에 해당하지 않는 경우

질문: \"{utterance}\"
카테고리(영어 소문자만, 예: simple_info/product_list/product_check/faq/price/product/policy/other)로만 답해줘:";

const CLASSIFY_MAX_TOKENS: u32 = 10;

/// Bot offer whose acceptance short-circuits classification, compared after
/// stripping whitespace and terminal punctuation from the previous bot turn.
const LIST_OFFER_PHRASE: &str = "취급중인상품목록을알려드릴까요";

const AFFIRMATIVES: [&str; 12] = [
    "응", "네", "좋아", "알려줘", "보여줘", "그래", "좋다", "어", "좋아요", "네요", "알려주세요",
    "보여주세요",
];

const LIST_SINGLE_PHRASES: [&str; 5] =
    ["상품 리스트", "품목 목록", "전부 뭐야", "무엇을 판매", "뭐 팔아"];
const LIST_QUANTIFIERS: [&str; 6] = ["판매", "취급", "파는", "전체", "모든", "전부"];
const LIST_NOUNS: [&str; 5] = ["품목", "상품", "리스트", "목록", "종류"];

const CHECK_BIGRAMS: [&str; 6] = ["도 팔", "도 있", "도 판매", "도 취급", "도 구입", "도 구매"];
const CHECK_VERB_SUFFIXES: [&str; 6] = ["팔아", "있", "판매", "취급", "구입", "구매"];

/// Decides the category for one utterance. Never fails: an unreachable or
/// incoherent completion service degrades to [`Category::Search`].
pub struct IntentClassifier {
    llm: Arc<dyn LlmClient>,
}

impl IntentClassifier {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn classify(&self, utterance: &str, last_turn: Option<&ConversationTurn>) -> Category {
        if accepts_list_offer(utterance, last_turn) {
            return Category::ProductList;
        }
        if is_product_list_query(utterance) {
            return Category::ProductList;
        }
        if is_product_check_query(utterance) {
            return Category::ProductCheck;
        }

        let prompt = CLASSIFY_PROMPT_V1.replace("{utterance}", utterance);
        match self
            .llm
            .complete(CompletionRequest::deterministic(prompt, CLASSIFY_MAX_TOKENS))
            .await
        {
            Ok(reply) => Category::from_token(&reply),
            Err(error) => {
                tracing::warn!(
                    event_name = "agent.classify.llm_unavailable",
                    error = %error,
                    "completion service failed, degrading to search"
                );
                Category::Search
            }
        }
    }
}

/// The previous bot turn offered the full item list and the user said yes.
fn accepts_list_offer(utterance: &str, last_turn: Option<&ConversationTurn>) -> bool {
    let Some(turn) = last_turn else {
        return false;
    };
    if !strip_terminal_noise(&turn.bot_text).ends_with(LIST_OFFER_PHRASE) {
        return false;
    }
    AFFIRMATIVES.iter().any(|token| utterance.contains(token))
}

fn strip_terminal_noise(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace() && !matches!(c, '?' | '!' | '.')).collect()
}

/// Whole-catalog listing intent: a fixed single phrase, or a quantifier
/// word co-occurring with an item-list noun anywhere in the utterance.
pub fn is_product_list_query(utterance: &str) -> bool {
    if LIST_SINGLE_PHRASES.iter().any(|phrase| utterance.contains(phrase)) {
        return true;
    }
    LIST_QUANTIFIERS.iter().any(|quantifier| utterance.contains(quantifier))
        && LIST_NOUNS.iter().any(|noun| utterance.contains(noun))
}

/// "Do you also sell X" intent: the 도+verb bigrams, or any word token
/// ending with one of the carry/sell verb stems.
pub fn is_product_check_query(utterance: &str) -> bool {
    if CHECK_BIGRAMS.iter().any(|bigram| utterance.contains(bigram)) {
        return true;
    }
    hangul_tokens(utterance)
        .iter()
        .any(|token| CHECK_VERB_SUFFIXES.iter().any(|suffix| token.ends_with(suffix)))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use anyhow::Result;
    use async_trait::async_trait;
    use sijang_core::context::ConversationTurn;
    use sijang_core::Category;

    use super::{is_product_list_query, is_product_check_query, IntentClassifier};
    use crate::llm::{CompletionRequest, LlmClient};

    struct ScriptedLlm {
        reply: Result<&'static str, &'static str>,
        calls: AtomicUsize,
    }

    impl ScriptedLlm {
        fn replying(reply: &'static str) -> Arc<Self> {
            Arc::new(Self { reply: Ok(reply), calls: AtomicUsize::new(0) })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self { reply: Err("connection refused"), calls: AtomicUsize::new(0) })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn complete(&self, _request: CompletionRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Ok(reply) => Ok(reply.to_string()),
                Err(message) => Err(anyhow::anyhow!(message)),
            }
        }
    }

    fn offer_turn() -> ConversationTurn {
        ConversationTurn {
            user_text: "고추도 팔아?".to_string(),
            bot_text: "네, 고추 판매중입니다. 취급중인 상품 목록을 알려드릴까요?".to_string(),
        }
    }

    #[tokio::test]
    async fn affirmative_after_list_offer_short_circuits_without_llm_call() {
        let llm = ScriptedLlm::replying("price");
        let classifier = IntentClassifier::new(llm.clone());

        let turn = offer_turn();
        let category = classifier.classify("네", Some(&turn)).await;

        assert_eq!(category, Category::ProductList);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn list_offer_without_affirmative_falls_through() {
        let llm = ScriptedLlm::replying("price");
        let classifier = IntentClassifier::new(llm.clone());

        let turn = offer_turn();
        let category = classifier.classify("배추 시세 궁금해", Some(&turn)).await;

        assert_eq!(category, Category::Price);
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn rule_detectors_run_before_delegation() {
        let llm = ScriptedLlm::replying("search");
        let classifier = IntentClassifier::new(llm.clone());

        assert_eq!(classifier.classify("판매 품목 알려줘", None).await, Category::ProductList);
        assert_eq!(classifier.classify("망고도 있나요?", None).await, Category::ProductCheck);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn unrecognized_reply_degrades_to_search() {
        let classifier = IntentClassifier::new(ScriptedLlm::replying("무엇이든"));
        assert_eq!(classifier.classify("요즘 경기 어때", None).await, Category::Search);
    }

    #[tokio::test]
    async fn llm_failure_degrades_to_search() {
        let classifier = IntentClassifier::new(ScriptedLlm::failing());
        assert_eq!(classifier.classify("요즘 경기 어때", None).await, Category::Search);
    }

    #[tokio::test]
    async fn reply_whitespace_and_case_are_tolerated() {
        let classifier = IntentClassifier::new(ScriptedLlm::replying(" Policy \n"));
        assert_eq!(classifier.classify("수출 지원 제도", None).await, Category::Policy);
    }

    #[test]
    fn product_list_rule_examples() {
        assert!(is_product_list_query("판매 품목 알려줘"));
        assert!(is_product_list_query("전체 상품 종류가 궁금해"));
        assert!(is_product_list_query("상품 리스트 줘"));
        assert!(!is_product_list_query("배추 가격 얼마야"));
    }

    #[test]
    fn product_check_rule_examples() {
        assert!(is_product_check_query("고추도 팔아?"));
        assert!(is_product_check_query("망고도 있나요?"));
        assert!(is_product_check_query("감자 팔아?"));
        assert!(!is_product_check_query("오늘 날짜 알려줘"));
    }
}
