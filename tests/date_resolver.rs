use chrono::{NaiveDate, NaiveDateTime};
use quickcap::model::{
    DateMatch, DateResolver, EnglishDateResolver, extract_date_time, interpret_with,
};

// Wednesday, 9 in the morning
fn reference() -> NaiveDateTime {
    at(2025, 3, 5, 9, 0)
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn resolve(text: &str) -> Option<DateMatch> {
    EnglishDateResolver.resolve(text, reference())
}

fn resolve_date(text: &str) -> NaiveDate {
    resolve(text)
        .unwrap_or_else(|| panic!("no date in '{}'", text))
        .instant
        .date()
}

#[test]
fn test_relative_days() {
    assert_eq!(resolve_date("today"), date(2025, 3, 5));
    assert_eq!(resolve_date("tonight"), date(2025, 3, 5));
    assert_eq!(resolve_date("Tomorrow"), date(2025, 3, 6));
}

#[test]
fn test_weekdays_are_forward_dated() {
    assert_eq!(resolve_date("friday"), date(2025, 3, 7));
    assert_eq!(resolve_date("monday"), date(2025, 3, 10));
    assert_eq!(resolve_date("on mon"), date(2025, 3, 10));
    // Today is Wednesday
    assert_eq!(resolve_date("wednesday"), date(2025, 3, 5));
    assert_eq!(resolve_date("this wednesday"), date(2025, 3, 5));
    assert_eq!(resolve_date("next wednesday"), date(2025, 3, 12));
    assert_eq!(resolve_date("next fri"), date(2025, 3, 7));
}

#[test]
fn test_next_units() {
    assert_eq!(resolve_date("next week"), date(2025, 3, 12));
    assert_eq!(resolve_date("next month"), date(2025, 4, 5));
    assert_eq!(resolve_date("next year"), date(2026, 3, 5));

    let end_of_jan = at(2023, 1, 31, 12, 0);
    let m = EnglishDateResolver.resolve("next month", end_of_jan).unwrap();
    assert_eq!(m.instant.date(), date(2023, 2, 28));
}

#[test]
fn test_in_amounts() {
    assert_eq!(resolve_date("in 3 days"), date(2025, 3, 8));
    assert_eq!(resolve_date("in two weeks"), date(2025, 3, 19));
    assert_eq!(resolve_date("in a month"), date(2025, 4, 5));
    assert_eq!(resolve_date("in 1 year"), date(2026, 3, 5));

    let m = resolve("in 2 hours").unwrap();
    assert_eq!(m.instant, at(2025, 3, 5, 11, 0));
    assert!(m.has_time);

    let m = resolve("in 45 minutes").unwrap();
    assert_eq!(m.instant, at(2025, 3, 5, 9, 45));
}

#[test]
fn test_absolute_dates() {
    assert_eq!(resolve_date("2025-12-25"), date(2025, 12, 25));
    assert_eq!(resolve_date("12/25"), date(2025, 12, 25));
    assert_eq!(resolve_date("1/15"), date(2026, 1, 15));
    assert_eq!(resolve_date("1/15/2027"), date(2027, 1, 15));
    assert_eq!(resolve_date("march 5th"), date(2025, 3, 5));
    assert_eq!(resolve_date("mar 1"), date(2026, 3, 1));
    assert_eq!(resolve_date("Dec 24 2030"), date(2030, 12, 24));
}

#[test]
fn test_dates_with_times() {
    let m = resolve("tomorrow at 2pm").unwrap();
    assert_eq!(m.instant, at(2025, 3, 6, 14, 0));
    assert!(m.has_time);

    let m = resolve("2pm tomorrow").unwrap();
    assert_eq!(m.instant, at(2025, 3, 6, 14, 0));

    let m = resolve("friday 9:30am").unwrap();
    assert_eq!(m.instant, at(2025, 3, 7, 9, 30));

    let m = resolve("noon friday").unwrap();
    assert_eq!(m.instant, at(2025, 3, 7, 12, 0));

    let m = resolve("next monday at 18:15").unwrap();
    assert_eq!(m.instant, at(2025, 3, 10, 18, 15));

    let m = resolve("today at 3 pm").unwrap();
    assert_eq!(m.instant, at(2025, 3, 5, 15, 0));
}

#[test]
fn test_bare_date_has_no_time() {
    let m = resolve("tomorrow").unwrap();
    assert!(!m.has_time);
    assert_eq!(m.instant, at(2025, 3, 6, 0, 0));
}

#[test]
fn test_bare_times_roll_forward() {
    let m = resolve("at 5pm").unwrap();
    assert_eq!(m.instant, at(2025, 3, 5, 17, 0));

    let m = resolve("at 8am").unwrap();
    assert_eq!(m.instant, at(2025, 3, 6, 8, 0));

    // Exactly now still counts as today
    let m = resolve("9am").unwrap();
    assert_eq!(m.instant, at(2025, 3, 5, 9, 0));
}

#[test]
fn test_never_resolves_into_the_past() {
    let inputs = [
        "today", "tomorrow", "monday", "wednesday", "next wednesday", "this sunday",
        "next week", "next month", "in 2 days", "at 8am", "midnight", "jan 1", "3/1",
    ];
    for input in inputs {
        let m = resolve(input).unwrap_or_else(|| panic!("no date in '{}'", input));
        assert!(
            m.instant.date() >= reference().date(),
            "'{}' resolved to {}",
            input,
            m.instant
        );
    }
}

#[test]
fn test_ordinary_words_are_not_dates() {
    for text in [
        "Read this book",
        "Sit in the sun",
        "Sat on the chair",
        "in the morning",
        "next steps",
        "buy 2 apples",
        "may the force",
        "version 1.2",
    ] {
        assert_eq!(resolve(text), None, "text: {}", text);
    }
}

#[test]
fn test_span_covers_date_and_time() {
    let text = "call mom tomorrow at 2pm please";
    let m = resolve(text).unwrap();
    assert_eq!(&text[m.span.clone()], "tomorrow at 2pm");
}

#[test]
fn test_first_expression_wins() {
    let text = "friday or maybe today";
    let m = resolve(text).unwrap();
    assert_eq!(m.span, 0..6);
    assert_eq!(m.instant.date(), date(2025, 3, 7));
}

#[test]
fn test_trailing_punctuation_is_removed_with_the_date() {
    let (d, t, rest) = extract_date_time(
        "Call mom tomorrow, then relax",
        reference(),
        &EnglishDateResolver,
    );
    assert_eq!(d, Some(date(2025, 3, 6)));
    assert_eq!(t, None);
    assert_eq!(rest, "Call mom then relax");
}

/// Always claims the word "someday" and dates it a week out.
struct SomedayResolver;

impl DateResolver for SomedayResolver {
    fn resolve(&self, text: &str, reference: NaiveDateTime) -> Option<DateMatch> {
        let start = text.find("someday")?;
        Some(DateMatch {
            span: start..start + "someday".len(),
            instant: reference + chrono::Duration::days(7),
            has_time: false,
        })
    }
}

/// Returns a span that does not fit the text.
struct BrokenResolver;

impl DateResolver for BrokenResolver {
    fn resolve(&self, _text: &str, reference: NaiveDateTime) -> Option<DateMatch> {
        Some(DateMatch {
            span: 500..510,
            instant: reference,
            has_time: true,
        })
    }
}

#[test]
fn test_custom_resolver_is_used() {
    let t = interpret_with("Learn piano someday #hobby", reference(), &SomedayResolver);
    assert_eq!(t.title, "Learn piano");
    assert_eq!(t.due_date, Some(date(2025, 3, 12)));
    assert_eq!(t.categories, vec!["hobby"]);

    // The bundled recognizer would have taken "tomorrow"
    let t = interpret_with("tomorrow someday", reference(), &SomedayResolver);
    assert_eq!(t.title, "tomorrow");
}

#[test]
fn test_out_of_range_span_is_ignored() {
    let t = interpret_with("Pack bags", reference(), &BrokenResolver);
    assert_eq!(t.title, "Pack bags");
    assert_eq!(t.due_date, None);
    assert_eq!(t.due_time, None);
}
