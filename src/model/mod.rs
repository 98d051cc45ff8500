// File: ./src/model/mod.rs
pub mod display;
pub mod item;
pub mod parser;
pub mod recurrence;
pub mod resolver;

pub use display::{format_preview, format_preview_with_rule};
pub use item::{ParsedTask, Priority};
pub use parser::{
    SyntaxToken, SyntaxType, extract_categories, extract_contexts, extract_date_time,
    extract_priority, has_nlp_tokens, interpret, interpret_with, tokenize_capture,
};
pub use recurrence::{
    Frequency, RecurrenceEngine, RecurrenceRule, parse_recurrence_rule, serialize_recurrence_rule,
};
pub use resolver::{DateMatch, DateResolver, EnglishDateResolver};
