//! Parser for the dojo query language
//!
//! A query is line oriented: the first significant line names the table and
//! every later line starting with `|` holds a stage. Stages and conditions are
//! recognized by keyword, in a fixed order, rather than by a full grammar;
//! whatever is not recognized parses to a no-op stage or a condition that
//! never matches.

use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::core::errors::QueryError;
use crate::ql::ast::{
    Condition, DistinctCount, HourOperator, Script, SortDirection, Stage, Summarize,
};

/// Output column of an unaliased or ungrouped `count()`
pub const DEFAULT_COUNT_ALIAS: &str = "count_";

const IN_PATTERN: &str = r"(\w+)\s+in\s*\(([^)]+)\)";
const HOUR_PATTERN: &str = r"hourofday\((\w+)\)\s*([><=!]+)\s*([0-9]+)";
const BY_PATTERN: &str = r"(.+)\s+by\s+(.+)";
const COUNT_PATTERN: &str = r"(\w+)\s*=\s*count\(\)";
const DCOUNT_PATTERN: &str = r"(\w+)\s*=\s*dcount\((\w+)\)";

static IN_RE: OnceLock<Regex> = OnceLock::new();
static HOUR_RE: OnceLock<Regex> = OnceLock::new();
static BY_RE: OnceLock<Regex> = OnceLock::new();
static COUNT_RE: OnceLock<Regex> = OnceLock::new();
static DCOUNT_RE: OnceLock<Regex> = OnceLock::new();

type Result<T> = std::result::Result<T, QueryError>;

/// Split a query into its table reference and stage texts
pub fn parse_script(input: &str) -> Result<Script> {
    let lines: Vec<&str> = input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("//"))
        .collect();

    let (first, rest) = lines.split_first().ok_or(QueryError::EmptyQuery)?;

    // The first line may carry stages inline: `Table | where ... | count`
    let mut segments = split_pipes(first).into_iter();
    let table = segments.next().map(str::trim).unwrap_or_default().to_string();
    let mut stages: Vec<String> = segments.map(|s| s.trim().to_string()).collect();

    for line in rest {
        if !line.starts_with('|') {
            debug!("Skipping non-stage line: {}", line);
            continue;
        }
        stages.extend(split_pipes(line).into_iter().skip(1).map(|s| s.trim().to_string()));
    }

    Ok(Script { table, stages })
}

/// Split a line on `|` characters that are not inside a quoted literal.
/// Either quote character opens a literal, which only the same character
/// closes.
fn split_pipes(line: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in line.char_indices() {
        match (c, quote) {
            ('"' | '\'', None) => quote = Some(c),
            (_, Some(open)) if c == open => quote = None,
            ('|', None) => {
                segments.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&line[start..]);
    segments
}

/// Parse one stage (pipe already stripped).
///
/// The first matching verb wins. A stage whose argument does not parse
/// becomes `Stage::Passthrough`.
pub fn parse_stage(text: &str) -> Stage {
    let op = text.trim();

    if let Some(condition) = op.strip_prefix("where ") {
        return Stage::Where(parse_condition(condition));
    }

    if let Some(columns) = op.strip_prefix("project ") {
        let columns = columns.split(',').map(|c| c.trim().to_string()).collect();
        return Stage::Project(columns);
    }

    if op == "count" {
        return Stage::Count;
    }

    if op.starts_with("limit ") || op.starts_with("take ") {
        return match op.split(' ').nth(1).and_then(parse_leading_int) {
            Some(n) => Stage::Limit(n),
            None => Stage::Passthrough,
        };
    }

    if op.starts_with("order by ") || op.starts_with("sort by ") {
        let rest = op.replacen("order by ", "", 1).replacen("sort by ", "", 1);
        let mut parts = rest.trim().split(' ');
        let column = parts.next().unwrap_or_default().to_string();
        let direction = match parts.next() {
            Some(d) if d.eq_ignore_ascii_case("desc") => SortDirection::Descending,
            _ => SortDirection::Ascending,
        };
        return Stage::Sort { column, direction };
    }

    if let Some(column) = op.strip_prefix("distinct ") {
        return Stage::Distinct(column.trim().to_string());
    }

    if let Some(expression) = op.strip_prefix("summarize ") {
        return Stage::Summarize(parse_summarize(expression.trim()));
    }

    debug!("Unrecognized stage ignored: {}", op);
    Stage::Passthrough
}

/// Parse a `where` condition.
///
/// Rules are tried in order and the first whose keyword occurs anywhere in
/// the text wins: ` and `, ` or `, ` contains `, ` == `, ` != `, ` >= `,
/// ` < `, `in (...)`, `hourofday(...)`. There is no precedence and no
/// parenthesization; `a or b and c` splits on ` and ` first.
pub fn parse_condition(text: &str) -> Condition {
    let text = text.trim();

    if text.contains(" and ") {
        let parts = text.split(" and ").map(parse_condition).collect();
        return Condition::And(parts);
    }

    if text.contains(" or ") {
        let parts = text.split(" or ").map(parse_condition).collect();
        return Condition::Or(parts);
    }

    if text.contains(" contains ") {
        let (field, value) = split_operands(text, " contains ", true);
        return Condition::Contains { field, value };
    }

    if text.contains(" == ") {
        let (field, value) = split_operands(text, " == ", true);
        return Condition::Equals { field, value };
    }

    if text.contains(" != ") {
        let (field, value) = split_operands(text, " != ", true);
        return Condition::NotEquals { field, value };
    }

    if text.contains(" >= ") {
        let (field, value) = split_operands(text, " >= ", false);
        return Condition::GreaterOrEqual { field, value };
    }

    if text.contains(" < ") {
        let (field, value) = split_operands(text, " < ", false);
        return Condition::LessThan { field, value };
    }

    if text.contains(" in ") {
        if let Some(caps) = compiled(&IN_RE, IN_PATTERN).captures(text) {
            let values = caps[2]
                .split(',')
                .map(|v| v.trim().replace(|c: char| c == '"' || c == '\'', ""))
                .collect();
            return Condition::In { field: caps[1].to_string(), values };
        }
    }

    if text.contains("hourofday(") {
        if let Some(caps) = compiled(&HOUR_RE, HOUR_PATTERN).captures(text) {
            let operator = match &caps[2] {
                ">=" => HourOperator::GreaterOrEqual,
                "<" => HourOperator::LessThan,
                "==" => HourOperator::Equal,
                _ => HourOperator::Unsupported,
            };
            // Hours beyond i64 saturate, so `<` still holds for every timestamp
            let hour = parse_leading_int(&caps[3]).unwrap_or(i64::MAX);
            return Condition::HourOfDay { field: caps[1].to_string(), operator, hour };
        }
    }

    debug!("Unrecognized condition, no row will match: {}", text);
    Condition::Unrecognized(text.to_string())
}

/// Parse the argument of `summarize`
fn parse_summarize(expression: &str) -> Summarize {
    let Some(caps) = compiled(&BY_RE, BY_PATTERN).captures(expression) else {
        // Ungrouped: only a bare count is understood, always as `count_`
        return Summarize {
            count: expression.contains("count()").then(|| DEFAULT_COUNT_ALIAS.to_string()),
            distinct_count: None,
            group_by: None,
        };
    };

    let aggregations = caps[1].trim();
    let group_by = caps[2].trim().to_string();

    let count = if aggregations.contains("count()") {
        let alias = compiled(&COUNT_RE, COUNT_PATTERN)
            .captures(aggregations)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| DEFAULT_COUNT_ALIAS.to_string());
        Some(alias)
    } else {
        None
    };

    let distinct_count = if aggregations.contains("dcount(") {
        compiled(&DCOUNT_RE, DCOUNT_PATTERN).captures(aggregations).map(|c| DistinctCount {
            alias: c[1].to_string(),
            column: c[2].to_string(),
        })
    } else {
        None
    };

    Summarize { count, distinct_count, group_by: Some(group_by) }
}

/// Split `field <op> value`, keeping only the first two operands
fn split_operands(text: &str, operator: &str, strip_quotes: bool) -> (String, String) {
    let mut operands = text.split(operator).map(|s| {
        let s = s.trim();
        if strip_quotes { s.replace('"', "") } else { s.to_string() }
    });
    let field = operands.next().unwrap_or_default();
    let value = operands.next().unwrap_or_default();
    (field, value)
}

/// Read the integer at the start of `text`, ignoring anything after it.
/// Magnitudes beyond `i64` saturate.
fn parse_leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let end = body.find(|c: char| !c.is_ascii_digit()).unwrap_or(body.len());
    let digits = &body[..end];
    if digits.is_empty() {
        return None;
    }
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

fn compiled(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("built-in pattern is valid"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_value(field: &str, value: &str) -> (String, String) {
        (field.to_string(), value.to_string())
    }

    #[test]
    fn test_script_skips_blank_comment_and_stray_lines() {
        let script = parse_script(
            "// find the flag\n\n  SecurityEvent  \nnot a stage\n| where Activity contains \"FLAG\"\n// done\n|count",
        )
        .unwrap();

        assert_eq!(script.table, "SecurityEvent");
        assert_eq!(script.stages, vec!["where Activity contains \"FLAG\"", "count"]);
    }

    #[test]
    fn test_script_empty() {
        assert_eq!(parse_script(""), Err(QueryError::EmptyQuery));
        assert_eq!(parse_script("   \n// comment only"), Err(QueryError::EmptyQuery));
    }

    #[test]
    fn test_script_inline_pipes() {
        let script = parse_script("Sample | where B == \"x\" | count").unwrap();
        assert_eq!(script.table, "Sample");
        assert_eq!(script.stages, vec!["where B == \"x\"", "count"]);

        let script = parse_script("Sample\n| where B == \"x\" | take 1").unwrap();
        assert_eq!(script.stages, vec!["where B == \"x\"", "take 1"]);
    }

    #[test]
    fn test_pipes_inside_quotes_do_not_split() {
        let script = parse_script("Sample\n| where B contains \"a|b\"").unwrap();
        assert_eq!(script.stages, vec!["where B contains \"a|b\""]);

        let script = parse_script("Sample | where S in ('a|b', \"c'd\") | count").unwrap();
        assert_eq!(script.stages, vec!["where S in ('a|b', \"c'd\")", "count"]);
    }

    #[test]
    fn test_stage_verbs() {
        assert_eq!(parse_stage("count"), Stage::Count);
        assert_eq!(parse_stage("take 5"), Stage::Limit(5));
        assert_eq!(parse_stage("limit 10rows"), Stage::Limit(10));
        assert_eq!(
            parse_stage("project TimeGenerated, UserPrincipalName ,IPAddress"),
            Stage::Project(vec![
                "TimeGenerated".to_string(),
                "UserPrincipalName".to_string(),
                "IPAddress".to_string(),
            ])
        );
        assert_eq!(
            parse_stage("order by TimeGenerated DESC"),
            Stage::Sort { column: "TimeGenerated".to_string(), direction: SortDirection::Descending }
        );
        assert_eq!(
            parse_stage("sort by Account"),
            Stage::Sort { column: "Account".to_string(), direction: SortDirection::Ascending }
        );
        assert_eq!(parse_stage("distinct  Caller "), Stage::Distinct("Caller".to_string()));
    }

    #[test]
    fn test_unparseable_or_unknown_stages_pass_through() {
        assert_eq!(parse_stage("take many"), Stage::Passthrough);
        assert_eq!(parse_stage("limit  5"), Stage::Passthrough);
        assert_eq!(parse_stage("count rows"), Stage::Passthrough);
        assert_eq!(parse_stage("extend x = 1"), Stage::Passthrough);
        assert_eq!(parse_stage("summarize"), Stage::Passthrough);
        assert_eq!(parse_stage("where"), Stage::Passthrough);
    }

    #[test]
    fn test_condition_operators() {
        let (f, v) = field_value("Activity", "FLAG");
        assert_eq!(parse_condition("Activity contains \"FLAG\""), Condition::Contains { field: f, value: v });

        let (f, v) = field_value("ResultType", "50126");
        assert_eq!(parse_condition("ResultType == 50126"), Condition::Equals { field: f, value: v });

        let (f, v) = field_value("Account", "system");
        assert_eq!(parse_condition("Account != \"system\""), Condition::NotEquals { field: f, value: v });

        let (f, v) = field_value("DestPort_d", "1024");
        assert_eq!(parse_condition("DestPort_d >= 1024"), Condition::GreaterOrEqual { field: f, value: v });

        let (f, v) = field_value("DestPort_d", "\"80\"");
        assert_eq!(parse_condition("DestPort_d < \"80\""), Condition::LessThan { field: f, value: v });
    }

    #[test]
    fn test_condition_in_list() {
        assert_eq!(
            parse_condition("EventID in (4624, \"4625\", '4672')"),
            Condition::In {
                field: "EventID".to_string(),
                values: vec!["4624".to_string(), "4625".to_string(), "4672".to_string()],
            }
        );
    }

    #[test]
    fn test_condition_hourofday() {
        assert_eq!(
            parse_condition("hourofday(TimeGenerated)<4"),
            Condition::HourOfDay {
                field: "TimeGenerated".to_string(),
                operator: HourOperator::LessThan,
                hour: 4,
            }
        );
        assert_eq!(
            parse_condition("hourofday(TimeGenerated) > 4"),
            Condition::HourOfDay {
                field: "TimeGenerated".to_string(),
                operator: HourOperator::Unsupported,
                hour: 4,
            }
        );
    }

    #[test]
    fn test_spaced_hourofday_comparison_is_numeric() {
        // ` >= ` is recognized before hourofday(), so this compares the
        // literal column "hourofday(TimeGenerated)"
        assert_eq!(
            parse_condition("hourofday(TimeGenerated) >= 0"),
            Condition::GreaterOrEqual {
                field: "hourofday(TimeGenerated)".to_string(),
                value: "0".to_string(),
            }
        );
    }

    #[test]
    fn test_oversized_hour_saturates() {
        assert_eq!(
            parse_condition("hourofday(TimeGenerated)<99999999999999999999"),
            Condition::HourOfDay {
                field: "TimeGenerated".to_string(),
                operator: HourOperator::LessThan,
                hour: i64::MAX,
            }
        );
    }

    #[test]
    fn test_built_in_patterns_compile() {
        for (cell, source) in [
            (&IN_RE, IN_PATTERN),
            (&HOUR_RE, HOUR_PATTERN),
            (&BY_RE, BY_PATTERN),
            (&COUNT_RE, COUNT_PATTERN),
            (&DCOUNT_RE, DCOUNT_PATTERN),
        ] {
            assert_eq!(compiled(cell, source).as_str(), source);
        }
    }

    #[test]
    fn test_and_splits_before_everything() {
        // Keywords are found by substring, even inside quotes
        match parse_condition("A == \"x and y\"") {
            Condition::And(parts) => assert_eq!(parts.len(), 2),
            other => panic!("expected And, got {:?}", other),
        }

        match parse_condition("A == 1 or B == 2 and C == 3") {
            Condition::And(parts) => assert!(matches!(parts[0], Condition::Or(_))),
            other => panic!("expected And, got {:?}", other),
        }
    }

    #[test]
    fn test_unrecognized_condition() {
        assert_eq!(
            parse_condition("FooBarBaz(X)"),
            Condition::Unrecognized("FooBarBaz(X)".to_string())
        );
        // ` in ` without a parenthesized list falls through
        assert!(matches!(parse_condition("A in B"), Condition::Unrecognized(_)));
    }

    #[test]
    fn test_summarize_grouped() {
        let stage = parse_stage(
            "summarize UniquePortsScanned = dcount(DestPort_d), TotalConnections = count() by SrcIP_s",
        );

        assert_eq!(
            stage,
            Stage::Summarize(Summarize {
                count: Some("TotalConnections".to_string()),
                distinct_count: Some(DistinctCount {
                    alias: "UniquePortsScanned".to_string(),
                    column: "DestPort_d".to_string(),
                }),
                group_by: Some("SrcIP_s".to_string()),
            })
        );
    }

    #[test]
    fn test_summarize_defaults() {
        assert_eq!(
            parse_stage("summarize count() by B"),
            Stage::Summarize(Summarize {
                count: Some(DEFAULT_COUNT_ALIAS.to_string()),
                distinct_count: None,
                group_by: Some("B".to_string()),
            })
        );
        // Ungrouped aliases are ignored
        assert_eq!(
            parse_stage("summarize Total = count()"),
            Stage::Summarize(Summarize {
                count: Some(DEFAULT_COUNT_ALIAS.to_string()),
                distinct_count: None,
                group_by: None,
            })
        );
        // dcount without an alias is dropped
        assert_eq!(
            parse_stage("summarize dcount(A) by B"),
            Stage::Summarize(Summarize { count: None, distinct_count: None, group_by: Some("B".to_string()) })
        );
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(parse_leading_int("42"), Some(42));
        assert_eq!(parse_leading_int(" -3x"), Some(-3));
        assert_eq!(parse_leading_int("x3"), None);
        assert_eq!(parse_leading_int("99999999999999999999"), Some(i64::MAX));
    }
}
