//! "Do you (also) sell X?" answers, including negated forms
//! ("배추는 안팔아?"), resolved against exact catalog membership first and
//! substring-related catalog names second.

use sijang_core::catalog::Catalog;

const CHECK_VERB_STEMS: [&str; 6] = ["팔", "있", "판매", "취급", "구입", "구매"];

/// Offered after a "we do not carry that" answer; the classifier treats an
/// affirmative follow-up to this exact phrase as a product-list request.
const LIST_OFFER: &str = "취급 중인 상품 목록을 알려드릴까요?";

pub fn handle(catalog: &Catalog, utterance: &str) -> String {
    let Some(item) = extract_item_term(utterance) else {
        return "확인할 품목명을 찾지 못했습니다.".to_string();
    };
    let negative = asks_in_negative(utterance);

    if catalog.contains(&item) {
        return if negative {
            format!("아니오, {item}는(은) 판매하고 있습니다.")
        } else {
            format!("네, {item} 판매중입니다.")
        };
    }

    let related = catalog.related(&item);
    if !related.is_empty() {
        let related = related.join(", ");
        return if negative {
            format!("아니오, {item} 관련 품목({related})을 판매하고 있습니다.")
        } else {
            format!("네, {item} 관련 품목({related})을 판매중입니다.")
        };
    }

    if negative {
        format!("네, {item}는(은) 판매하지 않습니다.\n{LIST_OFFER}")
    } else {
        format!("아니오, {item}는(은) 판매하지 않습니다.\n{LIST_OFFER}")
    }
}

/// Item term extraction, three patterns in precedence order:
/// `<item>도 <verb>`, `<item><particle> 안<verb>`, bare `<item> <verb>`.
/// A single space is tolerated before the verb stem in every pattern.
pub fn extract_item_term(utterance: &str) -> Option<String> {
    let chars: Vec<char> = utterance.chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if *c != '도' {
            continue;
        }
        if !verb_follows(&chars, i + 1) {
            continue;
        }
        let item = hangul_run_ending_at(&chars, i);
        if !item.is_empty() {
            return Some(item);
        }
    }

    for (i, c) in chars.iter().enumerate() {
        if !matches!(c, '는' | '은' | '이' | '가') {
            continue;
        }
        let mut j = i + 1;
        if chars.get(j) == Some(&' ') {
            j += 1;
        }
        if chars.get(j) != Some(&'안') {
            continue;
        }
        if !verb_follows(&chars, j + 1) {
            continue;
        }
        let item = hangul_run_ending_at(&chars, i);
        if !item.is_empty() {
            return Some(item);
        }
    }

    for i in 0..chars.len() {
        if !starts_with_stem(&chars[i..]) {
            continue;
        }
        let mut end = i;
        if end > 0 && chars[end - 1] == ' ' {
            end -= 1;
        }
        let item = hangul_run_ending_at(&chars, end);
        if !item.is_empty() {
            return Some(item);
        }
    }

    None
}

/// Whether the utterance asks in the negative ("안 팔아?", "안판매해?").
fn asks_in_negative(utterance: &str) -> bool {
    let chars: Vec<char> = utterance.chars().collect();
    chars
        .iter()
        .enumerate()
        .any(|(i, c)| *c == '안' && verb_follows(&chars, i + 1))
}

fn verb_follows(chars: &[char], mut index: usize) -> bool {
    if chars.get(index) == Some(&' ') {
        index += 1;
    }
    index < chars.len() && starts_with_stem(&chars[index..])
}

fn starts_with_stem(tail: &[char]) -> bool {
    CHECK_VERB_STEMS.iter().any(|stem| {
        let stem: Vec<char> = stem.chars().collect();
        tail.len() >= stem.len() && tail[..stem.len()] == stem[..]
    })
}

fn hangul_run_ending_at(chars: &[char], end: usize) -> String {
    let mut start = end;
    while start > 0 && ('가'..='힣').contains(&chars[start - 1]) {
        start -= 1;
    }
    chars[start..end].iter().collect()
}
