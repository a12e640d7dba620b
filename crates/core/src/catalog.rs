use crate::context::ConversationTurn;

/// Catalog groups, in site listing order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProduceGroup {
    GrainTuber,
    Vegetable,
    Specialty,
    Fruit,
}

impl ProduceGroup {
    pub fn label(self) -> &'static str {
        match self {
            Self::GrainTuber => "식량작물",
            Self::Vegetable => "채소류",
            Self::Specialty => "특용작물",
            Self::Fruit => "과일류",
        }
    }
}

const GRAIN_TUBER: &[&str] = &[
    "쌀", "찹쌀", "혼합곡", "기장", "콩", "팥", "녹두", "메밀", "고구마", "감자", "귀리", "보리",
    "수수", "옥수수", "율무",
];

const VEGETABLES: &[&str] = &[
    "배추", "양배추", "시금치", "상추", "얼갈이배추", "갓", "연근", "우엉", "수박", "참외",
    "오이", "호박", "토마토", "딸기", "무", "당근", "열무", "건고추", "풋고추", "붉은고추",
    "피마늘", "양파", "파", "생강", "고춧가루", "가지", "미나리", "깻잎", "부추", "피망",
    "파프리카", "멜론", "깐마늘(국산)", "깐마늘(수입)", "브로콜리", "양상추", "청경채", "케일",
    "콩나물", "절임배추", "쑥", "달래", "두릅", "로메인 상추", "취나물", "쥬키니호박",
    "청양고추", "대파", "고사리", "쪽파", "다발무", "겨울 배추", "알배기배추", "방울토마토",
];

const SPECIALTY: &[&str] = &[
    "참깨", "들깨", "땅콩", "느타리버섯", "팽이버섯", "새송이버섯", "호두", "아몬드",
    "양송이버섯", "표고버섯", "더덕",
];

const FRUITS: &[&str] = &[
    "바나나", "참다래", "파인애플", "오렌지", "자몽", "레몬", "체리", "건포도", "건블루베리",
    "망고", "블루베리", "아보카도", "레드향", "매실", "무화과", "복분자", "샤인머스켓", "곶감",
    "골드키위", "사과", "배", "복숭아", "포도", "감귤", "단감",
];

/// Fixed reference list of every produce name the site carries, loaded once
/// at process start. Resolution works on whitespace-stripped forms so that
/// compound names typed with an internal space (방울 토마토) still match the
/// canonical entry (방울토마토).
#[derive(Debug)]
pub struct Catalog {
    // Canonical names sorted by stripped length, longest first. Longer names
    // must win before any shorter name they contain (수수 inside 옥수수).
    by_length: Vec<&'static str>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        let mut by_length: Vec<&'static str> =
            Self::groups().iter().flat_map(|(_, names)| names.iter().copied()).collect();
        by_length.sort_by(|a, b| {
            strip_spaces(b).chars().count().cmp(&strip_spaces(a).chars().count()).then(a.cmp(b))
        });
        Self { by_length }
    }

    pub fn groups() -> [(ProduceGroup, &'static [&'static str]); 4] {
        [
            (ProduceGroup::GrainTuber, GRAIN_TUBER),
            (ProduceGroup::Vegetable, VEGETABLES),
            (ProduceGroup::Specialty, SPECIALTY),
            (ProduceGroup::Fruit, FRUITS),
        ]
    }

    pub fn len(&self) -> usize {
        self.by_length.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_length.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_length.contains(&name)
    }

    /// Names related to `term` by substring, for the product-check answer.
    pub fn related(&self, term: &str) -> Vec<&'static str> {
        let mut related: Vec<&'static str> =
            self.by_length.iter().copied().filter(|name| name.contains(term)).collect();
        related.sort();
        related
    }

    /// Maps utterance text to a unique canonical item name.
    ///
    /// Layered precedence trades recall for precision: whole-message matches
    /// are trusted first, then longest-name substring matches, then word
    /// tokens, then a scan of recent user turns. Each step runs only when
    /// the previous one failed.
    pub fn resolve(&self, utterance: &str, context: &[ConversationTurn]) -> Option<&'static str> {
        let stripped = strip_spaces(utterance);

        // 1. Whole message equals a catalog name once spaces are removed.
        if let Some(name) =
            self.by_length.iter().find(|name| strip_spaces(name) == stripped).copied()
        {
            return Some(name);
        }

        // 2. Whole message equals a catalog name verbatim.
        if let Some(name) = self.by_length.iter().find(|name| **name == utterance).copied() {
            return Some(name);
        }

        // 3. Longest-name-first substring match, skipping a name when a
        //    longer catalog name containing it is also present.
        for name in &self.by_length {
            let needle = strip_spaces(name);
            if !stripped.contains(needle.as_str()) {
                continue;
            }
            let shadowed = self.by_length.iter().any(|longer| {
                let longer_stripped = strip_spaces(longer);
                longer_stripped.len() > needle.len()
                    && longer_stripped.contains(needle.as_str())
                    && stripped.contains(longer_stripped.as_str())
            });
            if shadowed {
                continue;
            }
            return Some(name);
        }

        // 4. Individual word tokens checked for exact equality.
        for token in hangul_tokens(utterance) {
            if let Some(name) = self.by_length.iter().find(|name| **name == token).copied() {
                return Some(name);
            }
        }

        // 5. Fall back to item mentions in recent user turns, newest first.
        for turn in context.iter().rev() {
            for name in &self.by_length {
                if turn.user_text.contains(name) {
                    return Some(name);
                }
            }
        }

        None
    }
}

pub fn strip_spaces(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn is_hangul(c: char) -> bool {
    ('가'..='힣').contains(&c)
}

/// Runs of Hangul syllables, the word tokens used for exact-name matching.
pub fn hangul_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if is_hangul(c) {
            current.push(c);
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::{hangul_tokens, Catalog};
    use crate::context::ConversationTurn;

    fn turn(user_text: &str) -> ConversationTurn {
        ConversationTurn { user_text: user_text.to_string(), bot_text: "안내".to_string() }
    }

    #[test]
    fn resolved_names_are_always_catalog_members() {
        let catalog = Catalog::new();
        for utterance in ["배추 가격", "방울 토마토 시세", "모르는말", "깐마늘(국산) 얼마야"] {
            if let Some(name) = catalog.resolve(utterance, &[]) {
                assert!(catalog.contains(name), "{name} not in catalog");
            }
        }
    }

    #[test]
    fn exact_match_wins_even_with_internal_space() {
        let catalog = Catalog::new();
        assert_eq!(catalog.resolve("방울 토마토", &[]), Some("방울토마토"));
        assert_eq!(catalog.resolve("방울토마토", &[]), Some("방울토마토"));
    }

    #[test]
    fn corn_does_not_match_sorghum() {
        let catalog = Catalog::new();
        assert_eq!(catalog.resolve("옥수수", &[]), Some("옥수수"));
        assert_eq!(catalog.resolve("옥수수 가격 알려줘", &[]), Some("옥수수"));
    }

    #[test]
    fn sorghum_still_matches_on_its_own() {
        let catalog = Catalog::new();
        assert_eq!(catalog.resolve("수수 시세", &[]), Some("수수"));
    }

    #[test]
    fn longer_compound_names_win_over_their_parts() {
        let catalog = Catalog::new();
        assert_eq!(catalog.resolve("얼갈이배추 얼마야", &[]), Some("얼갈이배추"));
        assert_eq!(catalog.resolve("알배기배추 시세", &[]), Some("알배기배추"));
    }

    #[test]
    fn word_token_match_catches_spaced_sentences() {
        let catalog = Catalog::new();
        assert_eq!(catalog.resolve("오늘 사과 얼마예요", &[]), Some("사과"));
    }

    #[test]
    fn falls_back_to_most_recent_context_mention() {
        let catalog = Catalog::new();
        let context = vec![turn("감자 가격 알려줘"), turn("배추 가격은?")];
        assert_eq!(catalog.resolve("어제는 얼마였어?", &context), Some("배추"));
    }

    #[test]
    fn no_match_returns_none() {
        let catalog = Catalog::new();
        assert_eq!(catalog.resolve("고등어 팔아요?", &[]), None);
    }

    #[test]
    fn related_lists_substring_family() {
        let catalog = Catalog::new();
        let related = catalog.related("배추");
        assert!(related.contains(&"배추"));
        assert!(related.contains(&"얼갈이배추"));
        assert!(!related.contains(&"상추"));
    }

    #[test]
    fn hangul_tokens_split_on_non_hangul() {
        assert_eq!(hangul_tokens("6월 30일 배추 가격"), vec!["월", "일", "배추", "가격"]);
        assert!(hangul_tokens("2024-06-30").is_empty());
    }
}
