// File: ./src/model/resolver.rs
//! Natural-language date/time recognition.
//!
//! The interpreter only depends on the [`DateResolver`] trait. Any recognizer
//! that honours forward-dating (relative expressions never resolve before the
//! reference instant) can be plugged in; [`EnglishDateResolver`] is the bundled
//! word-based implementation.
use crate::model::recurrence::add_months_clamped;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use std::ops::Range;

/// A single date/time expression found in a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMatch {
    /// Byte range of the expression inside the searched text.
    pub span: Range<usize>,
    pub instant: NaiveDateTime,
    /// True when an hour was stated, as opposed to a bare date.
    pub has_time: bool,
}

pub trait DateResolver: Send + Sync {
    /// Finds the first date/time expression in `text`, resolved against `reference`.
    fn resolve(&self, text: &str, reference: NaiveDateTime) -> Option<DateMatch>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EnglishDateResolver;

impl DateResolver for EnglishDateResolver {
    fn resolve(&self, text: &str, reference: NaiveDateTime) -> Option<DateMatch> {
        let words = split_words(text);
        (0..words.len()).find_map(|i| match_at(&words, i, reference))
    }
}

struct Word {
    start: usize,
    end: usize,
    /// Lowercased, trailing punctuation stripped.
    norm: String,
}

fn split_words(text: &str) -> Vec<Word> {
    let mut words = Vec::new();
    let mut start = None;
    for (idx, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                words.push(make_word(text, s, idx));
            }
        } else if start.is_none() {
            start = Some(idx);
        }
    }
    if let Some(s) = start {
        words.push(make_word(text, s, text.len()));
    }
    words
}

fn make_word(text: &str, start: usize, end: usize) -> Word {
    let norm = text[start..end]
        .trim_end_matches([',', '.', ';', ':', '?', '!'])
        .to_lowercase();
    Word { start, end, norm }
}

/// A recognized date, plus the time it implies when the expression is
/// precise to the minute (`in 2 hours`).
struct DateHit {
    date: NaiveDate,
    time: Option<NaiveTime>,
    consumed: usize,
}

fn match_at(words: &[Word], i: usize, reference: NaiveDateTime) -> Option<DateMatch> {
    let span_of = |last: usize| words[i].start..words[last].end;

    // Time first: "at 2pm", "2pm tomorrow"
    if let Some((time, n)) = parse_time_at(words, i) {
        if let Some(hit) = parse_date_at(words, i + n, reference) {
            return Some(DateMatch {
                span: span_of(i + n + hit.consumed - 1),
                instant: hit.date.and_time(time),
                has_time: true,
            });
        }
        let mut date = reference.date();
        if time < reference.time() {
            date = date.succ_opt()?;
        }
        return Some(DateMatch {
            span: span_of(i + n - 1),
            instant: date.and_time(time),
            has_time: true,
        });
    }

    let hit = parse_date_at(words, i, reference)?;
    let mut last = i + hit.consumed - 1;
    let mut time = hit.time;
    if time.is_none()
        && let Some((t, n)) = parse_time_at(words, last + 1)
    {
        time = Some(t);
        last += n;
    }
    Some(DateMatch {
        span: span_of(last),
        instant: hit.date.and_time(time.unwrap_or(NaiveTime::MIN)),
        has_time: time.is_some(),
    })
}

// --- TIME ---

fn parse_time_string(s: &str) -> Option<NaiveTime> {
    match s {
        "noon" | "midday" => return NaiveTime::from_hms_opt(12, 0, 0),
        "midnight" => return NaiveTime::from_hms_opt(0, 0, 0),
        _ => {}
    }

    let parse_12h = |s: &str, is_pm: bool| -> Option<NaiveTime> {
        let (h, m) = if let Some((h_str, m_str)) = s.split_once(':') {
            (h_str.parse::<u32>().ok()?, m_str.parse::<u32>().ok()?)
        } else {
            (s.parse::<u32>().ok()?, 0)
        };
        if !(1..=12).contains(&h) || m > 59 {
            return None;
        }
        let h_24 = match (h, is_pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
        NaiveTime::from_hms_opt(h_24, m, 0)
    };

    if let Some(stripped) = s.strip_suffix("am") {
        return parse_12h(stripped, false);
    }
    if let Some(stripped) = s.strip_suffix("pm") {
        return parse_12h(stripped, true);
    }

    let (h_str, m_str) = s.split_once(':')?;
    if h_str.is_empty() || h_str.len() > 2 || m_str.len() != 2 {
        return None;
    }
    NaiveTime::from_hms_opt(h_str.parse().ok()?, m_str.parse().ok()?, 0)
}

/// Parses `[at] <time>` starting at word `i`. Returns the time and the number of
/// words consumed.
fn parse_time_at(words: &[Word], i: usize) -> Option<(NaiveTime, usize)> {
    let mut idx = i;
    if words.get(idx)?.norm == "at" {
        idx += 1;
    }
    let word = &words.get(idx)?.norm;
    if let Some(t) = parse_time_string(word) {
        return Some((t, idx - i + 1));
    }
    // "2 pm"
    if let Some(next) = words.get(idx + 1)
        && (next.norm == "am" || next.norm == "pm")
        && word.chars().all(|c| c.is_ascii_digit() || c == ':')
        && let Some(t) = parse_time_string(&format!("{}{}", word, next.norm))
    {
        return Some((t, idx - i + 2));
    }
    None
}

// --- DATES ---

fn parse_weekday(s: &str) -> Option<Weekday> {
    match s {
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tues" | "tuesday" => Some(Weekday::Tue),
        "wed" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thur" | "thurs" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

fn parse_month(s: &str) -> Option<u32> {
    let m = match s {
        "jan" | "january" => 1,
        "feb" | "february" => 2,
        "mar" | "march" => 3,
        "apr" | "april" => 4,
        "may" => 5,
        "jun" | "june" => 6,
        "jul" | "july" => 7,
        "aug" | "august" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "october" => 10,
        "nov" | "november" => 11,
        "dec" | "december" => 12,
        _ => return None,
    };
    Some(m)
}

fn parse_english_number(s: &str) -> Option<u32> {
    match s {
        "a" | "an" | "one" => Some(1),
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        "six" => Some(6),
        "seven" => Some(7),
        "eight" => Some(8),
        "nine" => Some(9),
        "ten" => Some(10),
        "eleven" => Some(11),
        "twelve" => Some(12),
        _ => s.parse::<u32>().ok(),
    }
}

/// Parses a day-of-month like `5`, `5th`, `21st`.
fn parse_day_of_month(s: &str) -> Option<u32> {
    let digits = s
        .strip_suffix("st")
        .or_else(|| s.strip_suffix("nd"))
        .or_else(|| s.strip_suffix("rd"))
        .or_else(|| s.strip_suffix("th"))
        .unwrap_or(s);
    let day = digits.parse::<u32>().ok()?;
    (1..=31).contains(&day).then_some(day)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Unit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

fn parse_unit(s: &str) -> Option<Unit> {
    match s {
        "min" | "mins" | "minute" | "minutes" => Some(Unit::Minute),
        "h" | "hr" | "hrs" | "hour" | "hours" => Some(Unit::Hour),
        "d" | "day" | "days" => Some(Unit::Day),
        "w" | "wk" | "wks" | "week" | "weeks" => Some(Unit::Week),
        "mo" | "month" | "months" => Some(Unit::Month),
        "y" | "yr" | "yrs" | "year" | "years" => Some(Unit::Year),
        _ => None,
    }
}

/// Parses `3 days` (two words) or `3d` (compact). Returns amount, unit and words consumed.
fn parse_amount_and_unit(words: &[Word], i: usize) -> Option<(u32, Unit, usize)> {
    let first = &words.get(i)?.norm;
    if let Some(amount) = parse_english_number(first)
        && let Some(unit) = words.get(i + 1).and_then(|w| parse_unit(&w.norm))
    {
        return Some((amount, unit, 2));
    }
    let idx = first.find(|c: char| !c.is_ascii_digit())?;
    let (amt_str, unit_str) = first.split_at(idx);
    let amount = amt_str.parse::<u32>().ok()?;
    Some((amount, parse_unit(unit_str)?, 1))
}

/// Days from `from` until the next `target` weekday. With `strict`, today
/// does not count.
fn days_until(from: NaiveDate, target: Weekday, strict: bool) -> i64 {
    let current = from.weekday().num_days_from_sunday() as i64;
    let wanted = target.num_days_from_sunday() as i64;
    let ahead = (wanted - current).rem_euclid(7);
    if ahead == 0 && strict { 7 } else { ahead }
}

fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
}

fn parse_date_at(words: &[Word], i: usize, reference: NaiveDateTime) -> Option<DateHit> {
    let today = reference.date();
    let word = words.get(i)?.norm.as_str();
    let next = words.get(i + 1).map(|w| w.norm.as_str());

    let day_hit = |date: NaiveDate, consumed: usize| DateHit {
        date,
        time: None,
        consumed,
    };

    match word {
        "today" | "tonight" => return Some(day_hit(today, 1)),
        "tomorrow" => return Some(day_hit(today.succ_opt()?, 1)),
        "next" => {
            let next = next?;
            if let Some(wd) = parse_weekday(next) {
                return Some(day_hit(add_days(today, days_until(today, wd, true))?, 2));
            }
            let date = match next {
                "week" => add_days(today, 7)?,
                "month" => add_months_clamped(today, 1)?,
                "year" => add_months_clamped(today, 12)?,
                _ => return None,
            };
            return Some(day_hit(date, 2));
        }
        "this" | "on" => {
            let wd = parse_weekday(next?)?;
            return Some(day_hit(add_days(today, days_until(today, wd, false))?, 2));
        }
        "in" => {
            let (amount, unit, n) = parse_amount_and_unit(words, i + 1)?;
            let amount = amount as i64;
            let hit = match unit {
                Unit::Minute | Unit::Hour => {
                    let delta = if unit == Unit::Minute {
                        Duration::minutes(amount)
                    } else {
                        Duration::hours(amount)
                    };
                    let at = reference.checked_add_signed(delta)?;
                    DateHit {
                        date: at.date(),
                        time: Some(at.time()),
                        consumed: n + 1,
                    }
                }
                Unit::Day => day_hit(add_days(today, amount)?, n + 1),
                Unit::Week => day_hit(add_days(today, amount * 7)?, n + 1),
                Unit::Month => day_hit(add_months_clamped(today, amount as u32)?, n + 1),
                Unit::Year => {
                    let months = (amount as u32).checked_mul(12)?;
                    day_hit(add_months_clamped(today, months)?, n + 1)
                }
            };
            return Some(hit);
        }
        _ => {}
    }

    // Bare weekdays must be spelled out, "sun" or "sat" alone are ordinary words.
    if let Some(wd) = parse_weekday(word).filter(|_| word.ends_with("day")) {
        return Some(day_hit(add_days(today, days_until(today, wd, false))?, 1));
    }

    if let Ok(date) = NaiveDate::parse_from_str(word, "%Y-%m-%d") {
        return Some(day_hit(date, 1));
    }

    if let Some(date) = parse_slash_date(word, today) {
        return Some(day_hit(date, 1));
    }

    // "march 5", "mar 5th 2026"
    if let Some(month) = parse_month(word) {
        let day = parse_day_of_month(next?)?;
        if let Some(year) = words
            .get(i + 2)
            .filter(|w| w.norm.len() == 4)
            .and_then(|w| w.norm.parse::<i32>().ok())
        {
            return Some(day_hit(NaiveDate::from_ymd_opt(year, month, day)?, 3));
        }
        return Some(day_hit(forward_month_day(today, month, day)?, 2));
    }

    None
}

/// `3/14` (forward-dated) or `3/14/2026`.
fn parse_slash_date(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let mut parts = s.split('/');
    let month = parts.next()?.parse::<u32>().ok()?;
    let day = parts.next()?.parse::<u32>().ok()?;
    match parts.next() {
        Some(y) if y.len() == 4 && parts.next().is_none() => {
            NaiveDate::from_ymd_opt(y.parse().ok()?, month, day)
        }
        Some(_) => None,
        None => forward_month_day(today, month, day),
    }
}

/// The first `month`/`day` falling on or after `today`. Feb 29 waits for a leap year.
fn forward_month_day(today: NaiveDate, month: u32, day: u32) -> Option<NaiveDate> {
    (today.year()..=today.year() + 8)
        .filter_map(|y| NaiveDate::from_ymd_opt(y, month, day))
        .find(|d| *d >= today)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn time_strings() {
        assert_eq!(parse_time_string("2pm"), NaiveTime::from_hms_opt(14, 0, 0));
        assert_eq!(parse_time_string("12am"), NaiveTime::from_hms_opt(0, 0, 0));
        assert_eq!(
            parse_time_string("9:45am"),
            NaiveTime::from_hms_opt(9, 45, 0)
        );
        assert_eq!(
            parse_time_string("17:05"),
            NaiveTime::from_hms_opt(17, 5, 0)
        );
        assert_eq!(parse_time_string("13pm"), None);
        assert_eq!(parse_time_string("3"), None);
        assert_eq!(parse_time_string("1:2"), None);
    }

    #[test]
    fn words_keep_punctuation_in_span() {
        let words = split_words("call  tomorrow, ok");
        assert_eq!(words.len(), 3);
        assert_eq!(words[1].norm, "tomorrow");
        assert_eq!(words[1].start, 6);
        assert_eq!(words[1].end, 15);
    }

    #[test]
    fn weekday_distance() {
        // 2025-03-05 is a Wednesday
        let wed = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        assert_eq!(days_until(wed, Weekday::Wed, false), 0);
        assert_eq!(days_until(wed, Weekday::Wed, true), 7);
        assert_eq!(days_until(wed, Weekday::Mon, false), 5);
        assert_eq!(days_until(wed, Weekday::Fri, true), 2);
    }

    #[test]
    fn month_day_rolls_forward() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        assert_eq!(
            forward_month_day(today, 3, 1),
            NaiveDate::from_ymd_opt(2026, 3, 1)
        );
        assert_eq!(
            forward_month_day(today, 2, 29),
            NaiveDate::from_ymd_opt(2028, 2, 29)
        );
        assert_eq!(forward_month_day(today, 6, 10), Some(today));
    }

    #[test]
    fn compact_amounts() {
        let reference = at(2025, 3, 5, 9, 0);
        let m = EnglishDateResolver.resolve("in 3d", reference).unwrap();
        assert_eq!(m.instant.date(), NaiveDate::from_ymd_opt(2025, 3, 8).unwrap());
        assert!(!m.has_time);
    }
}
