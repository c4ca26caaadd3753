//! Stage executor for the dojo query language

use std::collections::HashSet;

use crate::core::record::Record;
use crate::core::value::Value;
use crate::ql::aggregate::summarize;
use crate::ql::ast::{SortDirection, Stage};
use crate::ql::evaluator::filter;

/// Apply one stage to the current result set
pub fn apply_stage(stage: &Stage, rows: Vec<Record>) -> Vec<Record> {
    match stage {
        Stage::Where(condition) => filter(rows, condition),
        Stage::Project(columns) => project(rows, columns),
        Stage::Count => {
            let mut record = Record::with_capacity(1);
            record.insert("Count", rows.len());
            vec![record]
        }
        Stage::Limit(n) => limit(rows, *n),
        Stage::Sort { column, direction } => sort(rows, column, *direction),
        Stage::Distinct(column) => distinct(rows, column),
        Stage::Summarize(plan) => summarize(rows, plan),
        Stage::Passthrough => rows,
    }
}

/// Keep the listed columns that exist in each row, in the listed order
fn project(rows: Vec<Record>, columns: &[String]) -> Vec<Record> {
    rows.iter()
        .map(|row| {
            columns
                .iter()
                .filter_map(|c| row.get(c).map(|v| (c.as_str(), v.clone())))
                .collect()
        })
        .collect()
}

/// Keep the first `n` rows. A negative `n` drops that many rows from the end.
fn limit(mut rows: Vec<Record>, n: i64) -> Vec<Record> {
    let keep = if n >= 0 {
        usize::try_from(n).unwrap_or(usize::MAX)
    } else {
        let dropped = usize::try_from(n.unsigned_abs()).unwrap_or(usize::MAX);
        rows.len().saturating_sub(dropped)
    };
    rows.truncate(keep);
    rows
}

/// Stable sort on the text value of a column
fn sort(rows: Vec<Record>, column: &str, direction: SortDirection) -> Vec<Record> {
    let mut keyed: Vec<(String, Record)> = rows.into_iter().map(|r| (r.text(column), r)).collect();
    match direction {
        SortDirection::Ascending => keyed.sort_by(|(a, _), (b, _)| a.cmp(b)),
        SortDirection::Descending => keyed.sort_by(|(a, _), (b, _)| b.cmp(a)),
    }
    keyed.into_iter().map(|(_, r)| r).collect()
}

/// First row per distinct text value of `column`, reduced to that column
fn distinct(rows: Vec<Record>, column: &str) -> Vec<Record> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter(|row| seen.insert(row.text(column)))
        .map(|row| {
            let mut record = Record::with_capacity(1);
            record.insert(column, row.get(column).cloned().unwrap_or(Value::Null));
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ql::parser::parse_stage;

    fn event(time: &str, id: i64, account: &str) -> Record {
        vec![
            ("TimeGenerated", Value::from(time)),
            ("EventID", Value::Integer(id)),
            ("Account", Value::from(account)),
        ]
        .into_iter()
        .collect()
    }

    fn sample() -> Vec<Record> {
        vec![
            event("2024-01-15T09:05:00Z", 4625, "bob"),
            event("2024-01-15T09:00:00Z", 4624, "alice"),
            event("2024-01-15T09:15:00Z", 4672, "admin"),
            event("2024-01-15T09:10:00Z", 4624, "bob"),
        ]
    }

    fn run(stage: &str, rows: Vec<Record>) -> Vec<Record> {
        apply_stage(&parse_stage(stage), rows)
    }

    fn column(rows: &[Record], name: &str) -> Vec<String> {
        rows.iter().map(|r| r.text(name)).collect()
    }

    #[test]
    fn test_count() {
        let out = run("count", sample());
        assert_eq!(out, vec![vec![("Count", Value::Integer(4))].into_iter().collect::<Record>()]);

        let empty = run("count", Vec::new());
        assert_eq!(empty[0].get("Count"), Some(&Value::Integer(0)));
    }

    #[test]
    fn test_project_omits_missing_columns() {
        let out = run("project Account, Nope, EventID", sample());
        assert_eq!(out[0].columns().collect::<Vec<_>>(), vec!["Account", "EventID"]);
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn test_limit_and_take() {
        assert_eq!(run("take 2", sample()).len(), 2);
        assert_eq!(run("limit 10", sample()).len(), 4);
        assert_eq!(run("limit 0", sample()).len(), 0);
        assert_eq!(column(&run("limit -1", sample()), "Account"), vec!["bob", "alice", "admin"]);
    }

    #[test]
    fn test_sort_directions() {
        let asc = run("order by TimeGenerated", sample());
        assert_eq!(column(&asc, "EventID"), vec!["4624", "4625", "4624", "4672"]);

        let desc = run("sort by TimeGenerated desc", sample());
        assert_eq!(column(&desc, "EventID"), vec!["4672", "4624", "4625", "4624"]);
    }

    #[test]
    fn test_sort_is_textual_and_stable() {
        let rows = vec![event("a", 9, "x"), event("b", 10, "y"), event("c", 9, "z")];
        let out = run("order by EventID", rows);
        // "10" < "9" as text; the two 9s keep their order
        assert_eq!(column(&out, "TimeGenerated"), vec!["b", "a", "c"]);

        let rows = vec![event("a", 9, "x"), event("b", 10, "y"), event("c", 9, "z")];
        let out = run("order by EventID desc", rows);
        assert_eq!(column(&out, "TimeGenerated"), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_distinct_keeps_first_seen() {
        let out = run("distinct Account", sample());
        assert_eq!(column(&out, "Account"), vec!["bob", "alice", "admin"]);
        assert!(out.iter().all(|r| r.len() == 1));
    }

    #[test]
    fn test_distinct_on_missing_column() {
        let out = run("distinct Nope", sample());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].get("Nope"), Some(&Value::Null));
    }

    #[test]
    fn test_passthrough_leaves_rows() {
        assert_eq!(run("extend Foo = 1", sample()), sample());
    }
}
