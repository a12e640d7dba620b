//! Wholesale price answers backed by the price history repository.
//!
//! Single-date queries report the day's high/low per kg; range queries
//! compare the per-day averages. A today query with no rows falls back to
//! yesterday, then to the most recently priced date on record.

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use sijang_agent::extract::PriceQuery;
use sijang_core::catalog::{hangul_tokens, Catalog};
use sijang_core::dates;
use sijang_db::repositories::PriceHistoryRepository;

use super::product_list;

pub async fn handle(
    prices: &dyn PriceHistoryRepository,
    catalog: &Catalog,
    utterance: &str,
    query: &PriceQuery,
    today: NaiveDate,
) -> Result<String> {
    let (Some(date_from), Some(date_to)) = (query.date_from, query.date_to) else {
        return Ok("날짜를 인식하지 못했습니다. 입력하신 날짜 표현을 다시 확인해 주세요.".to_string());
    };

    let Some(item) = query.item.as_deref() else {
        return Ok(unknown_item_reply(catalog, utterance));
    };

    if query.is_range {
        return compare_dates(prices, item, date_from, date_to).await;
    }

    let rows = prices.unit_prices(item, date_from).await?;
    if let Some(detail) = day_detail(&rows) {
        return Ok(format!("{} 기준 {item} {detail}", dates::korean(date_from)));
    }

    if date_from == today {
        let yesterday = today - Duration::days(1);
        let rows = prices.unit_prices(item, yesterday).await?;
        if let Some(detail) = day_detail(&rows) {
            return Ok(format!(
                "시세 데이터는 00시 자정에 업데이트 되므로 최신 데이터는 어제 날짜 데이터입니다.\n{}(어제) 기준 {item} {detail}",
                dates::korean(yesterday)
            ));
        }
        if let Some(latest) = prices.latest_priced_date(item).await? {
            let rows = prices.unit_prices(item, latest).await?;
            if let Some(detail) = day_detail(&rows) {
                return Ok(format!(
                    "{} {item} 가격 정보를 찾을 수 없습니다.\n가장 최근의 {item} 가격 정보 업데이트일은 {}입니다.\n{} 기준 {item} {detail}",
                    dates::korean(date_from),
                    dates::korean(latest),
                    dates::korean(latest)
                ));
            }
        }
        return Ok(format!("2015년부터 현재까지 {item} 가격 정보가 한 건도 없습니다."));
    }

    Ok(format!(
        "{} 기준 {item} 가격 정보를 찾을 수 없습니다.",
        dates::korean(date_from)
    ))
}

async fn compare_dates(
    prices: &dyn PriceHistoryRepository,
    item: &str,
    date_from: NaiveDate,
    date_to: NaiveDate,
) -> Result<String> {
    if date_from == date_to {
        let Some(avg) = average(prices, item, date_from).await? else {
            return Ok(format!(
                "{} 기준 {item} 가격 정보를 찾을 수 없습니다.",
                dates::korean(date_from)
            ));
        };
        return Ok(format!(
            "{} 기준 {item} 평균가는 {avg:.2}원입니다. (동일 날짜 비교, 변동 없음)",
            dates::korean(date_from)
        ));
    }

    let (earlier, later) = if date_from <= date_to {
        (date_from, date_to)
    } else {
        (date_to, date_from)
    };
    let (Some(v1), Some(v2)) = (
        average(prices, item, earlier).await?,
        average(prices, item, later).await?,
    ) else {
        return Ok(format!(
            "{item}의 가격 정보가 없는 날짜가 있어 비교 정보를 출력 할 수 없습니다."
        ));
    };

    let diff = v2 - v1;
    let updown = if diff > 0.0 {
        "올랐습니다."
    } else if diff < 0.0 {
        "내렸습니다."
    } else {
        "변동이 없습니다."
    };
    Ok(format!(
        "{} 기준 {item} 평균가는 {v1:.2}원, {} 기준 {item} 평균가는 {v2:.2}원으로 {:.2}원 {updown}\n(해당 날짜의 모든 데이터 평균가 기준)",
        dates::korean(earlier),
        dates::korean(later),
        diff.abs()
    ))
}

async fn average(
    prices: &dyn PriceHistoryRepository,
    item: &str,
    date: NaiveDate,
) -> Result<Option<f64>> {
    let rows = prices.unit_prices(item, date).await?;
    if rows.is_empty() {
        return Ok(None);
    }
    Ok(Some(rows.iter().sum::<i64>() as f64 / rows.len() as f64))
}

/// Per-kg summary for one day's rows, without the date prefix.
fn day_detail(rows: &[i64]) -> Option<String> {
    let max = rows.iter().max()?;
    let min = rows.iter().min()?;
    if max == min {
        Some(format!("가격은 {max}원입니다. (kg당 가격)"))
    } else {
        Some(format!(
            "최고가는 {max}원, 최저가는 {min}원입니다. (kg당 가격)\n(가격 차이가 많이 나는 경우 원산지가 달라 생기는 차이 일 수 있습니다.)"
        ))
    }
}

fn unknown_item_reply(catalog: &Catalog, utterance: &str) -> String {
    let tokens = hangul_tokens(utterance);
    let term = tokens.first().map(String::as_str).unwrap_or(utterance);
    format!(
        "{term}는 사이트에서 취급하지 않습니다.\n저희 사이트에서 취급하는 주요 상품 목록입니다:\n\n{}",
        product_list::grouped_listing(catalog)
    )
}
