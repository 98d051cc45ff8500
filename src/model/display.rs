// File: ./src/model/display.rs
use crate::model::item::ParsedTask;
use crate::model::recurrence::RecurrenceRule;
use chrono::{NaiveTime, Timelike};

pub const PREVIEW_SEPARATOR: &str = " · ";

/// `14:00` -> `2pm`, `09:30` -> `9:30am`.
fn format_time_short(t: NaiveTime) -> String {
    let (is_pm, hour) = t.hour12();
    let suffix = if is_pm { "pm" } else { "am" };
    if t.minute() == 0 {
        format!("{}{}", hour, suffix)
    } else {
        format!("{}:{:02}{}", hour, t.minute(), suffix)
    }
}

fn preview_parts(task: &ParsedTask) -> Vec<String> {
    let mut parts = Vec::new();

    if let Some(date) = task.due_date {
        let mut s = date.format("%a, %b %-d").to_string();
        if let Some(t) = task
            .due_time
            .as_deref()
            .and_then(|raw| NaiveTime::parse_from_str(raw, "%H:%M").ok())
        {
            s.push_str(&format!(" at {}", format_time_short(t)));
        }
        parts.push(s);
    }
    if let Some(p) = task.priority {
        parts.push(p.to_string());
    }
    for cat in &task.categories {
        parts.push(format!("#{}", cat));
    }
    for ctx in &task.contexts {
        parts.push(format!("@{}", ctx));
    }
    parts
}

/// One-line summary of what was recognized, e.g.
/// `Tue, Mar 4 at 2pm · High · #health · @phone`.
pub fn format_preview(task: &ParsedTask) -> String {
    preview_parts(task).join(PREVIEW_SEPARATOR)
}

/// Like [`format_preview`], with the repeat schedule appended.
pub fn format_preview_with_rule(task: &ParsedTask, rule: Option<&RecurrenceRule>) -> String {
    let mut parts = preview_parts(task);
    if let Some(r) = rule {
        parts.push(format!("↻ {}", r));
    }
    parts.join(PREVIEW_SEPARATOR)
}
