//! Korean relative/absolute date phrases resolved against a reference date.
//!
//! The vocabulary is the one users actually type at the market: day
//! literals (오늘/어제/그제), week-relative weekdays (이번주 금요일,
//! 저번주 화요일), month-relative days (지난달 15일), explicit month/day
//! with an optional year, and ISO-ish numerics. Resolution is first-match
//! in a fixed precedence order; a phrase either resolves to exactly one
//! calendar date or to nothing.

use chrono::{Datelike, Days, NaiveDate};

const WEEKDAYS: [&str; 7] =
    ["월요일", "화요일", "수요일", "목요일", "금요일", "토요일", "일요일"];

const THIS_WEEK: &str = "이번주";
const LAST_WEEK: [&str; 2] = ["저번주", "지난주"];
const LAST_MONTH: [&str; 3] = ["저번달", "지난달", "이전달"];
const DAY_LITERALS: [(&str, u64); 3] = [("오늘", 0), ("어제", 1), ("그제", 2)];

/// Resolves one date phrase. Precedence is fixed; the first matching rule
/// wins and later rules are never consulted.
pub fn resolve_phrase(phrase: &str, reference: NaiveDate) -> Option<NaiveDate> {
    // 1. Day literals.
    for (literal, offset) in DAY_LITERALS {
        if phrase.contains(literal) {
            return reference.checked_sub_days(Days::new(offset));
        }
    }

    // 2. Weekday in the Monday-starting week containing the reference date.
    for (index, weekday) in WEEKDAYS.iter().enumerate() {
        if contains_marker_weekday(phrase, THIS_WEEK, weekday) {
            return monday_of(reference).checked_add_days(Days::new(index as u64));
        }
    }

    // 3. Weekday in the week immediately preceding it.
    for (index, weekday) in WEEKDAYS.iter().enumerate() {
        for marker in LAST_WEEK {
            if contains_marker_weekday(phrase, marker, weekday) {
                return monday_of(reference)
                    .checked_sub_days(Days::new(7))?
                    .checked_add_days(Days::new(index as u64));
            }
        }
    }

    // 4. Previous month, with an optional explicit day.
    if let Some(marker_end) = LAST_MONTH
        .iter()
        .find_map(|marker| phrase.find(marker).map(|start| start + marker.len()))
    {
        let last_of_previous = reference.with_day(1)?.checked_sub_days(Days::new(1))?;
        let day = match day_following(&phrase[marker_end..]) {
            Some(day) => day,
            None => reference.day().min(last_of_previous.day()),
        };
        return NaiveDate::from_ymd_opt(last_of_previous.year(), last_of_previous.month(), day);
    }

    let runs = number_runs(phrase);

    // 5. Explicit "<month>월 <day>일", year defaulting to the reference year.
    for pair in runs.windows(2) {
        if pair[0].unit == Some('월') && pair[1].unit == Some('일') {
            let year = runs
                .iter()
                .find(|run| run.unit == Some('년'))
                .map(|run| run.value as i32)
                .unwrap_or_else(|| reference.year());
            return NaiveDate::from_ymd_opt(year, pair[0].value, pair[1].value);
        }
    }

    // 6. ISO-ish numerics with a 2000-2099 year.
    for (index, run) in runs.iter().enumerate() {
        if run.digits == 8 && (2000..=2099).contains(&(run.value / 10_000)) {
            let (year, rest) = (run.value / 10_000, run.value % 10_000);
            return NaiveDate::from_ymd_opt(year as i32, rest / 100, rest % 100);
        }
        if run.digits == 4 && (2000..=2099).contains(&run.value) {
            if let [month, day, ..] = &runs[index + 1..] {
                if month.digits <= 2 && day.digits <= 2 {
                    return NaiveDate::from_ymd_opt(run.value as i32, month.value, day.value);
                }
            }
        }
    }

    None
}

/// Candidate date phrases in utterance order. Whitespace words carrying
/// date vocabulary are grouped into phrases; once a phrase is saturated
/// (it already denotes one date), the next date word opens a new phrase.
/// Fragments shorter than 2 characters are dropped as noise.
pub fn extract_phrases(utterance: &str) -> Vec<String> {
    let mut phrases: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    // `saturated`: the current group already resolves to one date.
    // `month_open`: a bare previous-month marker may still absorb a day.
    let mut saturated = false;
    let mut month_open = false;

    for word in utterance.split_whitespace() {
        if !is_date_word(word) {
            flush(&mut phrases, &mut current);
            saturated = false;
            month_open = false;
            continue;
        }

        let absorbs_day = month_open && has_unit(word, '일') && !is_phrase_head(word);
        if !current.is_empty() && saturated && !absorbs_day {
            flush(&mut phrases, &mut current);
            saturated = false;
            month_open = false;
        }
        current.push(word);

        if absorbs_day {
            month_open = false;
        } else if DAY_LITERALS.iter().any(|(literal, _)| word.contains(literal)) {
            saturated = true;
        } else if word.contains(THIS_WEEK) || LAST_WEEK.iter().any(|m| word.contains(m)) {
            saturated = WEEKDAYS.iter().any(|weekday| word.contains(weekday));
        } else if LAST_MONTH.iter().any(|m| word.contains(m)) {
            saturated = true;
            month_open = !has_unit(word, '일');
        } else if WEEKDAYS.iter().any(|weekday| word.contains(weekday)) {
            saturated = true;
        } else if has_unit(word, '일') || is_iso_word(word) {
            saturated = true;
        }
    }
    flush(&mut phrases, &mut current);

    phrases.retain(|phrase| phrase.chars().count() > 1);
    phrases
}

/// Compact 8-digit form (YYYYMMDD), the wire shape of a resolved date.
pub fn compact(date: NaiveDate) -> String {
    format!("{:04}{:02}{:02}", date.year(), date.month(), date.day())
}

/// Human-facing Korean form without zero padding, e.g. "2025년 6월 3일".
pub fn korean(date: NaiveDate) -> String {
    format!("{}년 {}월 {}일", date.year(), date.month(), date.day())
}

/// Full Korean weekday name for a date, e.g. "금요일".
pub fn korean_weekday(date: NaiveDate) -> &'static str {
    WEEKDAYS[date.weekday().num_days_from_monday() as usize]
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    date - chrono::Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

fn contains_marker_weekday(phrase: &str, marker: &str, weekday: &str) -> bool {
    phrase.contains(&format!("{marker} {weekday}")) || phrase.contains(&format!("{marker}{weekday}"))
}

/// Day number immediately following a month marker, e.g. "지난달 15일".
fn day_following(rest: &str) -> Option<u32> {
    let trimmed = rest.trim_start();
    let digits: String = trimmed.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() || !trimmed[digits.len()..].starts_with('일') {
        return None;
    }
    digits.parse().ok()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct NumberRun {
    value: u32,
    digits: usize,
    unit: Option<char>,
}

/// Digit runs with the calendar unit character that immediately follows,
/// if any. Runs longer than 8 digits are discarded as non-dates.
fn number_runs(text: &str) -> Vec<NumberRun> {
    let mut runs = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        let Some(first) = c.to_digit(10) else { continue };
        let mut value = u64::from(first);
        let mut digits = 1usize;
        while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
            value = value * 10 + u64::from(d);
            digits += 1;
            chars.next();
            if digits > 8 {
                break;
            }
        }
        let unit = chars.peek().copied().filter(|u| matches!(u, '년' | '월' | '일'));
        if unit.is_some() {
            chars.next();
        }
        if digits <= 8 {
            runs.push(NumberRun { value: value as u32, digits, unit });
        }
    }
    runs
}

fn has_unit(word: &str, unit: char) -> bool {
    number_runs(word).iter().any(|run| run.unit == Some(unit))
}

fn is_date_word(word: &str) -> bool {
    is_phrase_head(word)
        || WEEKDAYS.iter().any(|weekday| word.contains(weekday))
        || number_runs(word).iter().any(|run| run.unit.is_some())
        || is_iso_word(word)
}

/// Relative markers and day literals always begin a phrase of their own.
fn is_phrase_head(word: &str) -> bool {
    DAY_LITERALS.iter().any(|(literal, _)| word.contains(literal))
        || word.contains(THIS_WEEK)
        || LAST_WEEK.iter().any(|marker| word.contains(marker))
        || LAST_MONTH.iter().any(|marker| word.contains(marker))
}

/// A single word that already spells out year, month, and day, e.g.
/// "2024-06-30" or "20240630". A bare "2024년" is not complete.
fn is_iso_word(word: &str) -> bool {
    let runs = number_runs(word);
    if runs.iter().any(|run| run.digits == 8 && (2000..=2099).contains(&(run.value / 10_000))) {
        return true;
    }
    runs.windows(3).any(|window| {
        window[0].digits == 4
            && (2000..=2099).contains(&window[0].value)
            && window[1].digits <= 2
            && window[2].digits <= 2
    })
}

fn flush(phrases: &mut Vec<String>, current: &mut Vec<&str>) {
    if !current.is_empty() {
        phrases.push(current.join(" "));
        current.clear();
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{compact, extract_phrases, korean, korean_weekday, resolve_phrase};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2025-06-16 is a Monday.
    const REF: (i32, u32, u32) = (2025, 6, 16);

    fn reference() -> NaiveDate {
        date(REF.0, REF.1, REF.2)
    }

    #[test]
    fn day_literals_resolve_exactly() {
        assert_eq!(resolve_phrase("오늘", reference()), Some(date(2025, 6, 16)));
        assert_eq!(resolve_phrase("어제", reference()), Some(date(2025, 6, 15)));
        assert_eq!(resolve_phrase("그제", reference()), Some(date(2025, 6, 14)));
    }

    #[test]
    fn day_literals_match_inside_longer_phrases() {
        assert_eq!(resolve_phrase("어제는 얼마였어", reference()), Some(date(2025, 6, 15)));
    }

    #[test]
    fn this_week_weekday_uses_monday_start() {
        assert_eq!(resolve_phrase("이번주 금요일", reference()), Some(date(2025, 6, 20)));
        assert_eq!(resolve_phrase("이번주월요일", reference()), Some(date(2025, 6, 16)));
        // Mid-week reference stays inside the same Monday-starting week.
        let wednesday = date(2025, 6, 18);
        assert_eq!(resolve_phrase("이번주 일요일", wednesday), Some(date(2025, 6, 22)));
    }

    #[test]
    fn last_week_weekday_is_previous_week() {
        assert_eq!(resolve_phrase("저번주 금요일", reference()), Some(date(2025, 6, 13)));
        assert_eq!(resolve_phrase("지난주 화요일", reference()), Some(date(2025, 6, 10)));
        assert_eq!(resolve_phrase("지난주화요일", reference()), Some(date(2025, 6, 10)));
    }

    #[test]
    fn last_month_with_explicit_day() {
        assert_eq!(resolve_phrase("저번달 3일", reference()), Some(date(2025, 5, 3)));
        assert_eq!(resolve_phrase("지난달 31일", reference()), Some(date(2025, 5, 31)));
    }

    #[test]
    fn last_month_without_day_clamps_to_shorter_month() {
        // Reference day 31 does not exist in the previous month.
        let end_of_july = date(2025, 7, 31);
        assert_eq!(resolve_phrase("지난달", end_of_july), Some(date(2025, 6, 30)));
        assert_eq!(resolve_phrase("이전달", reference()), Some(date(2025, 5, 16)));
    }

    #[test]
    fn explicit_month_day_defaults_to_reference_year() {
        assert_eq!(resolve_phrase("6월 30일", reference()), Some(date(2025, 6, 30)));
        assert_eq!(resolve_phrase("12월 1일 가격", reference()), Some(date(2025, 12, 1)));
    }

    #[test]
    fn explicit_month_day_honors_year_prefix() {
        assert_eq!(resolve_phrase("2024년 6월 30일", reference()), Some(date(2024, 6, 30)));
    }

    #[test]
    fn invalid_calendar_dates_do_not_resolve() {
        assert_eq!(resolve_phrase("2월 30일", reference()), None);
        assert_eq!(resolve_phrase("13월 1일", reference()), None);
    }

    #[test]
    fn iso_like_forms_resolve() {
        assert_eq!(resolve_phrase("2024-06-30", reference()), Some(date(2024, 6, 30)));
        assert_eq!(resolve_phrase("2024.6.3", reference()), Some(date(2024, 6, 3)));
        assert_eq!(resolve_phrase("20240630", reference()), Some(date(2024, 6, 30)));
    }

    #[test]
    fn years_outside_2000_2099_are_rejected() {
        assert_eq!(resolve_phrase("1999-06-30", reference()), None);
        assert_eq!(resolve_phrase("2100-01-01", reference()), None);
    }

    #[test]
    fn unrelated_text_does_not_resolve() {
        assert_eq!(resolve_phrase("배추 가격 알려줘", reference()), None);
        assert_eq!(resolve_phrase("", reference()), None);
    }

    #[test]
    fn precedence_prefers_day_literal_over_explicit_date() {
        // Both vocabularies present; rule 1 wins.
        assert_eq!(resolve_phrase("오늘 6월 30일", reference()), Some(reference()));
    }

    #[test]
    fn extract_returns_empty_without_date_vocabulary() {
        assert!(extract_phrases("배추 가격 얼마야").is_empty());
        assert!(extract_phrases("판매 품목 알려줘").is_empty());
    }

    #[test]
    fn extract_finds_single_phrase() {
        assert_eq!(extract_phrases("어제 배추 가격"), vec!["어제"]);
        assert_eq!(extract_phrases("배추 6월 30일 가격"), vec!["6월 30일"]);
    }

    #[test]
    fn extract_splits_adjacent_relative_phrases() {
        let phrases = extract_phrases("저번주 금요일이랑 이번주 금요일 배추 가격 비교해줘");
        assert_eq!(phrases, vec!["저번주 금요일이랑", "이번주 금요일"]);
    }

    #[test]
    fn extract_splits_two_explicit_dates() {
        let phrases = extract_phrases("6월 1일이랑 6월 15일 당근 가격 비교");
        assert_eq!(phrases, vec!["6월 1일이랑", "6월 15일"]);
    }

    #[test]
    fn extract_splits_adjacent_day_literals() {
        assert_eq!(extract_phrases("오늘 어제 비교해줘"), vec!["오늘", "어제"]);
    }

    #[test]
    fn extracted_relative_phrases_resolve_despite_particles() {
        let phrases = extract_phrases("저번주 금요일이랑 이번주 금요일 비교");
        assert_eq!(resolve_phrase(&phrases[0], reference()), Some(date(2025, 6, 13)));
        assert_eq!(resolve_phrase(&phrases[1], reference()), Some(date(2025, 6, 20)));
    }

    #[test]
    fn formatting_helpers() {
        assert_eq!(compact(date(2025, 6, 3)), "20250603");
        assert_eq!(korean(date(2025, 6, 3)), "2025년 6월 3일");
        assert_eq!(korean_weekday(date(2025, 6, 16)), "월요일");
        assert_eq!(korean_weekday(date(2025, 6, 20)), "금요일");
    }
}
