//! Web-search-backed answers for the search, product, and policy categories.
//!
//! Results are stripped of promotional lines, summarized by the completion
//! service, and assembled into a numbered list with source links. The policy
//! flow has a canned fallback so the caller always gets something useful.

use sijang_agent::llm::{CompletionRequest, LlmClient};

use crate::clients::{SearchClient, SearchHit};

/// Lines containing any of these are dropped from result content and
/// summaries. The list targets shop listings and order/CS boilerplate that
/// dominate Korean produce search results.
const AD_KEYWORDS: [&str; 23] = [
    "예약", "안전", "판매", "주문", "농부", "고객님", "화학비료", "유기물", "배송", "구매",
    "블로그", "프로필", "문의", "상담", "신청", "이벤트", "할인", "특가", "무료", "배송비",
    "포장", "직거래", "도화농부",
];

const SUMMARY_MAX_TOKENS: u32 = 400;
const SUMMARY_TEMPERATURE: f32 = 0.5;
const MAX_TRIES: usize = 5;
const POLICY_RESULT_COUNT: usize = 5;

const SEARCH_UNAVAILABLE: &str = "검색 서비스를 이용할 수 없습니다. 잠시 후 다시 시도해주세요.";
const NOTHING_FOUND: &str = "관련 정보가 검색되지 않았습니다.";

/// General search: keep fetching until `max_results` hits survive the ad and
/// keyword filters, up to [`MAX_TRIES`] attempts.
pub async fn handle_search(
    search: &dyn SearchClient,
    llm: &dyn LlmClient,
    query: &str,
    max_results: usize,
) -> String {
    let keywords = words(query);
    let mut kept: Vec<(String, String, String)> = Vec::new();
    let mut seen_urls: Vec<String> = Vec::new();
    let mut transport_failed = false;

    for attempt in 0..MAX_TRIES {
        if kept.len() >= max_results {
            break;
        }
        let hits = match search.search(query, max_results * 2).await {
            Ok(hits) => hits,
            Err(error) => {
                tracing::warn!(
                    event_name = "handlers.search.fetch_failed",
                    attempt,
                    error = %error,
                    "search request failed"
                );
                transport_failed = true;
                continue;
            }
        };

        let mut progressed = false;
        for hit in hits {
            if seen_urls.contains(&hit.url) {
                continue;
            }
            seen_urls.push(hit.url.clone());
            progressed = true;

            let content = filter_ad_lines(&hit.content);
            let summary = if content.is_empty() {
                String::new()
            } else {
                summarize(llm, &search_summary_prompt(query, &content), &content).await
            };
            if !keywords.iter().any(|k| summary.contains(k)) {
                continue;
            }
            kept.push((hit.title, summary, hit.url));
            if kept.len() >= max_results {
                break;
            }
        }
        if !progressed {
            break;
        }
    }

    if kept.is_empty() {
        if transport_failed {
            return SEARCH_UNAVAILABLE.to_string();
        }
        return NOTHING_FOUND.to_string();
    }
    numbered_list(&kept)
}

/// Policy search: one fetch with the current year appended to the query,
/// preferring hits that mention the current or previous year. Any failure
/// falls back to [`fallback_policy_info`].
pub async fn handle_policy(
    search: &dyn SearchClient,
    llm: &dyn LlmClient,
    query: &str,
    year: i32,
) -> String {
    let enhanced = format!("{query} {year}년 최신 정책");
    let hits = match search.search(&enhanced, POLICY_RESULT_COUNT).await {
        Ok(hits) => hits,
        Err(error) => {
            tracing::warn!(
                event_name = "handlers.policy.fetch_failed",
                error = %error,
                "search request failed"
            );
            return fallback_policy_info(year);
        }
    };
    if hits.is_empty() {
        return fallback_policy_info(year);
    }

    let this_year = year.to_string();
    let last_year = (year - 1).to_string();
    let mut recent: Vec<SearchHit> = hits
        .iter()
        .filter(|hit| {
            [&hit.title, &hit.content]
                .iter()
                .any(|text| text.contains(&this_year) || text.contains(&last_year))
        })
        .cloned()
        .collect();
    if recent.is_empty() {
        recent = hits.into_iter().take(3).collect();
    }

    let mut kept = Vec::with_capacity(recent.len());
    for hit in recent {
        let content = filter_ad_lines(&hit.content);
        let summary = if content.is_empty() {
            String::new()
        } else {
            summarize(llm, &policy_summary_prompt(year, &content), &content).await
        };
        kept.push((hit.title, summary, hit.url));
    }

    if kept.is_empty() {
        return fallback_policy_info(year);
    }
    numbered_list(&kept)
}

/// Shipped when the search collaborator is unreachable or returns nothing.
pub fn fallback_policy_info(year: i32) -> String {
    format!(
        "현재 농업인을 위한 주요 정책 정보를 안내드립니다:

1. **{year}년 농업인 직불금**: 소득보전직불금, 경영이전직불금 등 다양한 직불금 지원
2. **농업기계 구입 지원**: 농기계 구입 시 최대 50%까지 지원
3. **스마트팜 지원**: ICT 기술을 활용한 첨단 농업시설 구축 지원
4. **농업인 교육**: 농업기술센터를 통한 전문 교육 프로그램
5. **농산물 브랜드화**: 지역 특산품 브랜드 개발 및 마케팅 지원

더 자세한 정보는 농림축산식품부 홈페이지나 지역 농협을 통해 문의하시기 바랍니다."
    )
}

pub fn filter_ad_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !AD_KEYWORDS.iter().any(|keyword| line.contains(keyword)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Alphanumeric and hangul runs longer than one character.
fn words(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if c.is_alphanumeric() || ('가'..='힣').contains(&c) {
            current.push(c);
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens.retain(|token| token.chars().count() > 1);
    tokens
}

fn search_summary_prompt(query: &str, content: &str) -> String {
    format!(
        "아래 내용을 '{query}'와 직접적으로 관련된 부분만 3~4문장으로 요약해줘. 관련 없는 뉴스, 광고, 기타 정보는 절대 포함하지 마.\n\n{content}"
    )
}

fn policy_summary_prompt(year: i32, content: &str) -> String {
    format!(
        "아래 내용을 3~4문장으로, 핵심 정보만 요약해줘. {year}년, {}년 최신 정책 정보를 우선적으로 포함하고, 광고, 예약, 판매, 블로그 안내, 농장명, 브랜드명, 고객 안내, 이벤트, 할인, 후기, 포장, 배송, 주문, 신청, 문의 등은 절대 포함하지 마.\n\n{content}",
        year - 1
    )
}

/// Compresses one result to a few sentences. On completion failure the raw
/// content's first 400 characters stand in.
async fn summarize(llm: &dyn LlmClient, prompt: &str, content: &str) -> String {
    match llm
        .complete(CompletionRequest::sampled(
            prompt.to_string(),
            SUMMARY_MAX_TOKENS,
            SUMMARY_TEMPERATURE,
        ))
        .await
    {
        Ok(summary) => filter_ad_lines(summary.trim()),
        Err(error) => {
            tracing::warn!(
                event_name = "handlers.search.summary_failed",
                error = %error,
                "falling back to raw content prefix"
            );
            content.chars().take(400).collect()
        }
    }
}

fn numbered_list(entries: &[(String, String, String)]) -> String {
    let mut answer = String::new();
    for (i, (title, summary, url)) in entries.iter().enumerate() {
        answer.push_str(&format!(
            "{}. [{title}] {summary}\n출처: <a href='{url}' target='_blank'>{url}</a>\n\n",
            i + 1
        ));
    }
    answer.trim().to_string()
}
