// File: ./src/model/item.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::EnumIter;

// --- PRIORITY ---

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Lowercase marker word, as typed after `!` in capture text.
    pub fn keyword(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "urgent" => Some(Priority::Urgent),
            _ => None,
        }
    }

    /// Maps the `p1`..`p4` shorthand digit, 1 being the most pressing.
    pub fn from_shorthand(level: u8) -> Option<Self> {
        match level {
            1 => Some(Priority::Urgent),
            2 => Some(Priority::High),
            3 => Some(Priority::Medium),
            4 => Some(Priority::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "Low"),
            Priority::Medium => write!(f, "Medium"),
            Priority::High => write!(f, "High"),
            Priority::Urgent => write!(f, "Urgent"),
        }
    }
}

// --- PARSED CAPTURE ---

/// Structured fields recovered from one line of capture text.
///
/// Built fresh for every capture and handed straight to the caller, which
/// turns it into a task-creation request against its own store.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTask {
    pub title: String,
    pub due_date: Option<NaiveDate>,
    /// Zero-padded 24-hour `HH:MM`, only set when the capture named a time.
    pub due_time: Option<String>,
    pub priority: Option<Priority>,
    pub categories: Vec<String>,
    pub contexts: Vec<String>,
    pub raw_input: String,
}

impl ParsedTask {
    pub fn has_due(&self) -> bool {
        self.due_date.is_some()
    }

    /// Renders the parse back into capture text, e.g.
    /// `Call dentist !high #health @phone 2025-03-04 14:00`.
    pub fn to_capture_string(&self) -> String {
        let mut s = self.title.clone();
        if let Some(p) = self.priority {
            s.push_str(&format!(" !{}", p.keyword()));
        }
        for cat in &self.categories {
            s.push_str(&format!(" #{}", cat));
        }
        for ctx in &self.contexts {
            s.push_str(&format!(" @{}", ctx));
        }
        if let Some(d) = self.due_date {
            s.push_str(&format!(" {}", d.format("%Y-%m-%d")));
            if let Some(t) = &self.due_time {
                s.push_str(&format!(" {}", t));
            }
        }
        s
    }
}
