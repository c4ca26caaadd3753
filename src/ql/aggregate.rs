//! `summarize` aggregation

use std::collections::{HashMap, HashSet};

use crate::core::record::Record;
use crate::core::value::Value;
use crate::ql::ast::Summarize;
use crate::ql::parser::DEFAULT_COUNT_ALIAS;

/// Apply a `summarize` stage.
///
/// Ungrouped, only `count()` is understood and yields `{count_: n}`; any
/// other ungrouped expression leaves the rows as they are. Grouped, each
/// group emits its key as text, then `count()` and `dcount()` under their
/// aliases.
pub fn summarize(rows: Vec<Record>, plan: &Summarize) -> Vec<Record> {
    let Some(group_by) = &plan.group_by else {
        return match plan.count {
            Some(_) => {
                let mut record = Record::with_capacity(1);
                record.insert(DEFAULT_COUNT_ALIAS, rows.len());
                vec![record]
            }
            None => rows,
        };
    };

    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<Record>> = HashMap::new();
    for row in rows {
        let key = row.text(group_by);
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(row);
    }

    order
        .into_iter()
        .map(|key| {
            let members = groups.remove(&key).unwrap_or_default();
            let mut record = Record::with_capacity(3);
            record.insert(group_by.as_str(), Value::String(key));

            if let Some(alias) = &plan.count {
                record.insert(alias.as_str(), members.len());
            }
            if let Some(dcount) = &plan.distinct_count {
                let distinct: HashSet<String> = members.iter().map(|r| r.text(&dcount.column)).collect();
                record.insert(dcount.alias.as_str(), distinct.len());
            }
            record
        })
        .collect()
}
