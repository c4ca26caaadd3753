//! Abstract Syntax Tree for the dojo query language
//!
//! This module defines the structures a query is parsed into: the table
//! reference, the pipeline stages and the conditions of `where` stages.

/// A query split into its table reference and raw stage texts
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    /// Table the pipeline starts from
    pub table: String,
    /// Stage texts, pipe stripped, in pipeline order
    pub stages: Vec<String>,
}

/// One pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Keep rows matching a condition
    Where(Condition),
    /// Keep only the named columns
    Project(Vec<String>),
    /// Collapse to a single `{Count: n}` row
    Count,
    /// Keep the first rows; negative counts drop rows from the end
    Limit(i64),
    /// Sort by the text value of a column
    Sort {
        column: String,
        direction: SortDirection,
    },
    /// First row per distinct text value, reduced to that column
    Distinct(String),
    /// Aggregate, optionally grouped
    Summarize(Summarize),
    /// Anything not understood; leaves the rows untouched
    Passthrough,
}

/// Sort order of a `sort by` / `order by` stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A boolean filter expression.
///
/// Variants follow the order in which they are recognized; see the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Every part must hold
    And(Vec<Condition>),
    /// Any part may hold
    Or(Vec<Condition>),
    /// Case-insensitive substring match
    Contains { field: String, value: String },
    /// Exact text equality
    Equals { field: String, value: String },
    /// Text inequality
    NotEquals { field: String, value: String },
    /// Numeric `>=`
    GreaterOrEqual { field: String, value: String },
    /// Numeric `<`
    LessThan { field: String, value: String },
    /// Membership in a literal set
    In { field: String, values: Vec<String> },
    /// UTC hour of a timestamp column compared with an integer
    HourOfDay {
        field: String,
        operator: HourOperator,
        hour: i64,
    },
    /// Never matches
    Unrecognized(String),
}

/// Comparison applied by `hourofday(...)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HourOperator {
    GreaterOrEqual,
    LessThan,
    Equal,
    /// Any other operator; never matches
    Unsupported,
}

/// A parsed `summarize` expression
#[derive(Debug, Clone, PartialEq)]
pub struct Summarize {
    /// Output column of `count()`, when present
    pub count: Option<String>,
    /// `alias = dcount(column)`, when present
    pub distinct_count: Option<DistinctCount>,
    /// Grouping column
    pub group_by: Option<String>,
}

/// A `dcount(column)` aggregation
#[derive(Debug, Clone, PartialEq)]
pub struct DistinctCount {
    pub alias: String,
    pub column: String,
}
