//! Condition evaluator for the dojo query language
//!
//! Conditions compare text-coerced column values, except `>=` and `<`,
//! which compare numerically, and `hourofday()`, which reads a timestamp.

use std::collections::HashSet;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};

use crate::core::record::Record;
use crate::core::value::{parse_number, Value};
use crate::ql::ast::{Condition, HourOperator};
use crate::ql::parser::parse_condition;

/// Parse `condition` and test it against a single record
pub fn evaluate(record: &Record, condition: &str) -> bool {
    parse_condition(condition).matches(record)
}

/// Keep the rows selected by `condition`.
///
/// Rows come back in selection order: an `or` lists the rows of its first
/// disjunct, then the rows only later disjuncts match. A row matched
/// several times appears once.
pub fn filter(rows: Vec<Record>, condition: &Condition) -> Vec<Record> {
    let all: Vec<usize> = (0..rows.len()).collect();
    let selected = condition.select(&rows, &all);

    let mut slots: Vec<Option<Record>> = rows.into_iter().map(Some).collect();
    selected.into_iter().filter_map(|i| slots[i].take()).collect()
}

impl Condition {
    /// Test the condition against one record
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Condition::And(parts) => parts.iter().all(|c| c.matches(record)),
            Condition::Or(parts) => parts.iter().any(|c| c.matches(record)),
            Condition::Contains { field, value } => {
                record.text(field).to_lowercase().contains(&value.to_lowercase())
            }
            Condition::Equals { field, value } => record.text(field) == *value,
            Condition::NotEquals { field, value } => record.text(field) != *value,
            Condition::GreaterOrEqual { field, value } => {
                numeric(record, field) >= parse_number(value)
            }
            Condition::LessThan { field, value } => numeric(record, field) < parse_number(value),
            Condition::In { field, values } => {
                let text = record.text(field);
                values.iter().any(|v| *v == text)
            }
            Condition::HourOfDay { field, operator, hour } => {
                let Some(actual) = parse_timestamp(&record.text(field)).map(|t| i64::from(t.hour())) else {
                    return false;
                };
                match operator {
                    HourOperator::GreaterOrEqual => actual >= *hour,
                    HourOperator::LessThan => actual < *hour,
                    HourOperator::Equal => actual == *hour,
                    HourOperator::Unsupported => false,
                }
            }
            Condition::Unrecognized(_) => false,
        }
    }

    /// Indices of `candidates` selected by the condition, in selection order
    fn select(&self, rows: &[Record], candidates: &[usize]) -> Vec<usize> {
        match self {
            Condition::And(parts) => parts
                .iter()
                .fold(candidates.to_vec(), |remaining, part| part.select(rows, &remaining)),
            Condition::Or(parts) => {
                let mut seen = HashSet::new();
                let mut selected = Vec::new();
                for part in parts {
                    for i in part.select(rows, candidates) {
                        if seen.insert(i) {
                            selected.push(i);
                        }
                    }
                }
                selected
            }
            leaf => candidates
                .iter()
                .copied()
                .filter(|&i| leaf.matches(&rows[i]))
                .collect(),
        }
    }
}

fn numeric(record: &Record, field: &str) -> f64 {
    record.get(field).map_or(f64::NAN, Value::to_number)
}

/// Parse a timestamp column. Values without an offset are read as UTC.
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(text) {
        return Some(t.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(text, format) {
            return Some(t.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc())
}
