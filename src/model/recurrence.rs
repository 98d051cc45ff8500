// File: ./src/model/recurrence.rs
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::EnumIter;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// How successive due dates of a repeating task are derived.
///
/// `days_of_week` uses 0 = Sunday .. 6 = Saturday and only matters for
/// [`Frequency::Weekly`]. A weekly rule without days repeats every 7 days.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<u8>>,
}

impl RecurrenceRule {
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            days_of_week: None,
        }
    }

    pub fn weekly_on(days: &[u8]) -> Self {
        Self {
            frequency: Frequency::Weekly,
            days_of_week: Some(days.to_vec()),
        }
    }

    /// Selected weekdays, ascending and deduplicated. Empty when none are set.
    fn sorted_days(&self) -> Vec<u8> {
        let mut days = self.days_of_week.clone().unwrap_or_default();
        days.sort_unstable();
        days.dedup();
        days
    }
}

const DAY_ABBREVIATIONS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.frequency {
            Frequency::Daily => write!(f, "every day"),
            Frequency::Weekly => {
                let days = self.sorted_days();
                if days.is_empty() {
                    return write!(f, "every week");
                }
                let names: Vec<&str> = days
                    .iter()
                    .filter_map(|d| DAY_ABBREVIATIONS.get(*d as usize).copied())
                    .collect();
                write!(f, "every week on {}", names.join(", "))
            }
            Frequency::Monthly => write!(f, "every month"),
            Frequency::Yearly => write!(f, "every year"),
        }
    }
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next_first - first).num_days() as u32)
}

/// Adds calendar months. When the original day does not exist in the target
/// month (Jan 31 + 1 month), the result is that month's last day instead of
/// spilling into the following one.
pub(crate) fn add_months_clamped(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    let total = date.month0() as i64 + months as i64;
    let year = i32::try_from(date.year() as i64 + total.div_euclid(12)).ok()?;
    let month = (total.rem_euclid(12) + 1) as u32;
    let day = date.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

pub struct RecurrenceEngine;

impl RecurrenceEngine {
    /// Calculates the due date following `current` under `rule`, keeping the
    /// time of day.
    ///
    /// Returns `None` only when the result would leave the representable
    /// calendar range.
    pub fn next_due_date(current: NaiveDateTime, rule: &RecurrenceRule) -> Option<NaiveDateTime> {
        let next = Self::next_due_date_on(current.date(), rule)?;
        Some(next.and_time(current.time()))
    }

    /// Date-only variant of [`RecurrenceEngine::next_due_date`].
    pub fn next_due_date_on(current: NaiveDate, rule: &RecurrenceRule) -> Option<NaiveDate> {
        match rule.frequency {
            Frequency::Daily => current.succ_opt(),
            Frequency::Weekly => {
                let days = rule.sorted_days();
                let Some(&first) = days.first() else {
                    return current.checked_add_signed(Duration::days(7));
                };
                let weekday = current.weekday().num_days_from_sunday() as i64;
                let advance = match days.iter().find(|d| **d as i64 > weekday) {
                    Some(later) => *later as i64 - weekday,
                    // Past the last selected day: first selected day of next week
                    None => 7 - weekday + first as i64,
                };
                current.checked_add_signed(Duration::days(advance))
            }
            Frequency::Monthly => add_months_clamped(current, 1),
            Frequency::Yearly => add_months_clamped(current, 12),
        }
    }

    /// Successive due dates after `start`, each one derived from the previous.
    pub fn occurrences(
        start: NaiveDateTime,
        rule: &RecurrenceRule,
    ) -> impl Iterator<Item = NaiveDateTime> + '_ {
        std::iter::successors(Self::next_due_date(start, rule), move |prev| {
            Self::next_due_date(*prev, rule)
        })
    }
}

/// Decodes a stored rule. Anything that is not a JSON object with a known
/// string `frequency` (and, if present, a list of weekdays 0-6) is treated as
/// "not recurring".
pub fn parse_recurrence_rule(raw: &str) -> Option<RecurrenceRule> {
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            log::debug!("Ignoring malformed recurrence rule '{}': {}", raw, e);
            return None;
        }
    };
    let obj = value.as_object()?;
    if !obj.get("frequency").is_some_and(|f| f.is_string()) {
        log::debug!("Recurrence rule without a string frequency: '{}'", raw);
        return None;
    }
    // Absent and null days both mean "no days selected"
    let rule: RecurrenceRule = match serde_json::from_value(value) {
        Ok(rule) => rule,
        Err(e) => {
            log::debug!("Unsupported recurrence rule '{}': {}", raw, e);
            return None;
        }
    };
    if let Some(days) = &rule.days_of_week
        && days.iter().any(|d| *d > 6)
    {
        log::debug!("Recurrence rule with weekday out of range: '{}'", raw);
        return None;
    }
    Some(rule)
}

pub fn serialize_recurrence_rule(rule: &RecurrenceRule) -> String {
    // Serializing a plain struct of enums and integers cannot fail.
    serde_json::to_string(rule).unwrap_or_default()
}
