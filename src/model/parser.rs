// File: src/model/parser.rs
use crate::model::item::{ParsedTask, Priority};
use crate::model::resolver::{DateResolver, EnglishDateResolver};
use chrono::{Local, NaiveDate, NaiveDateTime};
use regex::{Captures, Regex};
use std::ops::Range;
use std::sync::LazyLock;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum SyntaxType {
    Text,
    Priority,
    Category,
    Context,
    DueDate,
}

#[derive(Debug, PartialEq)]
pub struct SyntaxToken {
    pub kind: SyntaxType,
    pub start: usize,
    pub end: usize,
}

// --- PRIORITY ---

struct PriorityRule {
    pattern: &'static str,
    level: fn(&Captures) -> Option<Priority>,
}

fn level_word(caps: &Captures) -> Option<Priority> {
    Priority::from_keyword(&caps[1])
}

fn level_shorthand(caps: &Captures) -> Option<Priority> {
    caps[1].parse::<u8>().ok().and_then(Priority::from_shorthand)
}

fn level_urgent(_: &Captures) -> Option<Priority> {
    Some(Priority::Urgent)
}

fn level_high(_: &Captures) -> Option<Priority> {
    Some(Priority::High)
}

/// Tried top to bottom; the first rule that matches anywhere in the text wins.
const PRIORITY_RULES: &[PriorityRule] = &[
    PriorityRule {
        pattern: r"(?i)!(urgent|high|medium|low)\b",
        level: level_word,
    },
    PriorityRule {
        pattern: r"(?i)\bp([1-4])\b",
        level: level_shorthand,
    },
    PriorityRule {
        pattern: r"!{3,}",
        level: level_urgent,
    },
    // Runs of three or more were ruled out above, so any pair here stands alone.
    PriorityRule {
        pattern: r"!!",
        level: level_high,
    },
];

static COMPILED_PRIORITY_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    PRIORITY_RULES
        .iter()
        .map(|rule| Regex::new(rule.pattern).expect("priority pattern"))
        .collect()
});

static CATEGORY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([\w-]+)").expect("category pattern"));

static CONTEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([\w-]+)").expect("context pattern"));

static DATE_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(today|tonight|tomorrow|monday|tuesday|wednesday|thursday|friday|saturday|sunday|next|this|in\s+\d+)\b",
    )
    .expect("date word pattern")
});

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Finds the first priority marker, following rule precedence. Returns the
/// level and the byte range of the marker.
fn find_priority(text: &str) -> Option<(Priority, Range<usize>)> {
    PRIORITY_RULES
        .iter()
        .zip(COMPILED_PRIORITY_RULES.iter())
        .find_map(|(rule, re)| {
            let caps = re.captures(text)?;
            let level = (rule.level)(&caps)?;
            let whole = caps.get(0)?;
            Some((level, whole.range()))
        })
}

pub fn extract_priority(text: &str) -> (Option<Priority>, String) {
    match find_priority(text) {
        Some((level, range)) => {
            let rest = format!("{} {}", &text[..range.start], &text[range.end..]);
            (Some(level), collapse_whitespace(&rest))
        }
        None => (None, text.to_string()),
    }
}

// --- TAGS ---

fn extract_tags(re: &Regex, text: &str) -> (Vec<String>, String) {
    let tags: Vec<String> = re
        .captures_iter(text)
        .map(|c| c[1].to_lowercase())
        .collect();
    if tags.is_empty() {
        return (tags, text.to_string());
    }
    let rest = re.replace_all(text, "");
    (tags, collapse_whitespace(&rest))
}

/// Pulls every `#tag` out of the text, lowercased, in order of appearance.
/// Repeated tags are kept.
pub fn extract_categories(text: &str) -> (Vec<String>, String) {
    extract_tags(&CATEGORY_RE, text)
}

/// Same as [`extract_categories`] for `@tag` contexts.
pub fn extract_contexts(text: &str) -> (Vec<String>, String) {
    extract_tags(&CONTEXT_RE, text)
}

// --- DATES ---

pub fn extract_date_time(
    text: &str,
    reference: NaiveDateTime,
    resolver: &dyn DateResolver,
) -> (Option<NaiveDate>, Option<String>, String) {
    let Some(found) = resolver.resolve(text, reference) else {
        return (None, None, text.to_string());
    };
    let (Some(before), Some(after)) = (text.get(..found.span.start), text.get(found.span.end..))
    else {
        log::warn!(
            "Date resolver returned span {:?} outside of '{}', ignoring it",
            found.span,
            text
        );
        return (None, None, text.to_string());
    };
    let time = found
        .has_time
        .then(|| found.instant.format("%H:%M").to_string());
    let rest = format!("{}{}", before, after);
    (Some(found.instant.date()), time, collapse_whitespace(&rest))
}

// --- INTERPRETER ---

/// Interprets one line of capture text with the bundled English date
/// recognizer. `reference` defaults to the current local time.
pub fn interpret(input: &str, reference: Option<NaiveDateTime>) -> ParsedTask {
    let reference = reference.unwrap_or_else(|| Local::now().naive_local());
    interpret_with(input, reference, &EnglishDateResolver)
}

/// Runs the extraction stages in fixed order (priority, categories,
/// contexts, date/time), each one working on what the previous left behind.
pub fn interpret_with(
    input: &str,
    reference: NaiveDateTime,
    resolver: &dyn DateResolver,
) -> ParsedTask {
    let (priority, rest) = extract_priority(input);
    let (categories, rest) = extract_categories(&rest);
    let (contexts, rest) = extract_contexts(&rest);
    let (due_date, due_time, rest) = extract_date_time(&rest, reference, resolver);

    log::debug!(
        "Interpreted '{}': priority={:?} categories={:?} contexts={:?} due={:?} {:?}",
        input,
        priority,
        categories,
        contexts,
        due_date,
        due_time
    );

    let remainder = collapse_whitespace(&rest);
    let title = if remainder.is_empty() {
        input.trim().to_string()
    } else {
        remainder
    };

    ParsedTask {
        title,
        due_date,
        due_time,
        priority,
        categories,
        contexts,
        raw_input: input.to_string(),
    }
}

/// Cheap check for anything the interpreter might pick up. Only used to
/// decide whether a preview is worth showing, so it may over- or under-report.
pub fn has_nlp_tokens(input: &str) -> bool {
    CATEGORY_RE.is_match(input)
        || CONTEXT_RE.is_match(input)
        || find_priority(input).is_some()
        || DATE_WORD_RE.is_match(input)
}

// --- SYNTAX HIGHLIGHTING ---

/// Splits the raw input into contiguous spans tagged with what the
/// interpreter would extract from them. Everything else is `Text`.
pub fn tokenize_capture(
    input: &str,
    reference: NaiveDateTime,
    resolver: &dyn DateResolver,
) -> Vec<SyntaxToken> {
    let mut marks: Vec<(Range<usize>, SyntaxType)> = Vec::new();

    if let Some((_, range)) = find_priority(input) {
        marks.push((range, SyntaxType::Priority));
    }
    let overlaps = |marks: &[(Range<usize>, SyntaxType)], r: &Range<usize>| {
        marks
            .iter()
            .any(|(m, _)| m.start < r.end && r.start < m.end)
    };
    for m in CATEGORY_RE.find_iter(input) {
        if !overlaps(&marks, &m.range()) {
            marks.push((m.range(), SyntaxType::Category));
        }
    }
    for m in CONTEXT_RE.find_iter(input) {
        if !overlaps(&marks, &m.range()) {
            marks.push((m.range(), SyntaxType::Context));
        }
    }
    // Resolve dates on a copy with the other markers blanked out, so byte
    // offsets still line up with the raw input.
    let mut blanked = input.to_string();
    for (range, _) in &marks {
        blanked.replace_range(range.clone(), &" ".repeat(range.len()));
    }
    if let Some(found) = resolver.resolve(&blanked, reference)
        && found.span.end <= input.len()
        && input.is_char_boundary(found.span.start)
        && input.is_char_boundary(found.span.end)
        && !overlaps(&marks, &found.span)
    {
        marks.push((found.span, SyntaxType::DueDate));
    }
    marks.sort_by_key(|(r, _)| r.start);

    let mut tokens = Vec::new();
    let mut cursor = 0;
    for (range, kind) in marks {
        if range.start > cursor {
            tokens.push(SyntaxToken {
                kind: SyntaxType::Text,
                start: cursor,
                end: range.start,
            });
        }
        tokens.push(SyntaxToken {
            kind,
            start: range.start,
            end: range.end,
        });
        cursor = range.end;
    }
    if cursor < input.len() {
        tokens.push(SyntaxToken {
            kind: SyntaxType::Text,
            start: cursor,
            end: input.len(),
        });
    }
    tokens
}
