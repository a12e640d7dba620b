use std::sync::Arc;

use chrono::NaiveDate;
use sijang_core::catalog::Catalog;
use sijang_core::context::ConversationTurn;
use sijang_core::dates;

/// Fully structured price query, consumed immediately by the price handler.
/// `None` bounds mean a mentioned date phrase failed to resolve; `None`
/// item means no catalog entry matched the utterance or recent context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriceQuery {
    pub item: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub is_range: bool,
}

/// Composes the catalog resolver and the date resolver into one structured
/// query. Item and date resolution are independent so their failures can be
/// reported separately.
pub struct PriceQueryExtractor {
    catalog: Arc<Catalog>,
}

impl PriceQueryExtractor {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn extract(
        &self,
        utterance: &str,
        context: &[ConversationTurn],
        reference: NaiveDate,
    ) -> PriceQuery {
        let item = self.catalog.resolve(utterance, context).map(str::to_string);

        let phrases = dates::extract_phrases(utterance);
        let (date_from, date_to, is_range) = match phrases.as_slice() {
            [] => (Some(reference), Some(reference), false),
            [only] => {
                let date = dates::resolve_phrase(only, reference);
                (date, date, false)
            }
            // Two or more mentions are an explicit range even when both
            // resolve to the same day. Extra mentions beyond the first two
            // are ignored.
            [first, second, ..] => {
                let first = dates::resolve_phrase(first, reference);
                let second = dates::resolve_phrase(second, reference);
                match (first, second) {
                    (Some(a), Some(b)) if a <= b => (Some(a), Some(b), true),
                    (Some(a), Some(b)) => (Some(b), Some(a), true),
                    // Either bound unresolved poisons the whole range.
                    _ => (None, None, true),
                }
            }
        };

        PriceQuery { item, date_from, date_to, is_range }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use sijang_core::catalog::Catalog;
    use sijang_core::context::ConversationTurn;

    use super::PriceQueryExtractor;

    fn extractor() -> PriceQueryExtractor {
        PriceQueryExtractor::new(Arc::new(Catalog::new()))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // A Monday, so "저번주 금요일" and "이번주 금요일" straddle it.
    fn monday() -> NaiveDate {
        date(2025, 6, 16)
    }

    #[test]
    fn no_date_vocabulary_defaults_both_bounds_to_reference() {
        let query = extractor().extract("배추 가격 얼마야", &[], monday());
        assert_eq!(query.item.as_deref(), Some("배추"));
        assert_eq!(query.date_from, Some(monday()));
        assert_eq!(query.date_to, Some(monday()));
        assert!(!query.is_range);
    }

    #[test]
    fn single_phrase_sets_both_bounds_equal() {
        let query = extractor().extract("어제 감자 가격", &[], monday());
        assert_eq!(query.item.as_deref(), Some("감자"));
        assert_eq!(query.date_from, Some(date(2025, 6, 15)));
        assert_eq!(query.date_to, Some(date(2025, 6, 15)));
        assert!(!query.is_range);
    }

    #[test]
    fn two_phrases_form_a_chronological_range() {
        let query = extractor().extract(
            "저번주 금요일이랑 이번주 금요일 배추 가격 비교해줘",
            &[],
            monday(),
        );
        assert_eq!(query.item.as_deref(), Some("배추"));
        assert!(query.is_range);
        assert_eq!(query.date_from, Some(date(2025, 6, 13)));
        assert_eq!(query.date_to, Some(date(2025, 6, 20)));
    }

    #[test]
    fn mention_order_does_not_affect_chronological_order() {
        let query = extractor().extract(
            "이번주 금요일이랑 저번주 금요일 배추 가격 비교해줘",
            &[],
            monday(),
        );
        assert!(query.is_range);
        assert_eq!(query.date_from, Some(date(2025, 6, 13)));
        assert_eq!(query.date_to, Some(date(2025, 6, 20)));
    }

    #[test]
    fn equal_resolved_dates_still_count_as_a_range() {
        let query = extractor().extract("오늘이랑 6월 16일 무 가격 비교", &[], monday());
        assert!(query.is_range);
        assert_eq!(query.date_from, Some(monday()));
        assert_eq!(query.date_to, Some(monday()));
    }

    #[test]
    fn unresolvable_phrase_leaves_bounds_unset() {
        // "13월 40일" carries date vocabulary but is not a calendar date.
        let query = extractor().extract("13월 40일 배추 가격", &[], monday());
        assert_eq!(query.item.as_deref(), Some("배추"));
        assert_eq!(query.date_from, None);
        assert_eq!(query.date_to, None);
    }

    #[test]
    fn item_falls_back_to_recent_context() {
        let context = vec![ConversationTurn {
            user_text: "당근 가격 알려줘".to_string(),
            bot_text: "당근 가격 안내".to_string(),
        }];
        let query = extractor().extract("어제는 얼마였어?", &context, monday());
        assert_eq!(query.item.as_deref(), Some("당근"));
        assert_eq!(query.date_from, Some(date(2025, 6, 15)));
    }

    #[test]
    fn unknown_item_reports_none_independently_of_dates() {
        let query = extractor().extract("어제 고등어 가격", &[], monday());
        assert_eq!(query.item, None);
        assert_eq!(query.date_from, Some(date(2025, 6, 15)));
    }
}
