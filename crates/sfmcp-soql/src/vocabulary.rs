//! Fixed SOQL vocabulary: function names, comparison operators, sort
//! directions and relative date literals.

use crate::error::SoqlError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Aggregate functions that compute a value over a group of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
    CountDistinct,
}

impl AggregateFunction {
    pub const ALL: [AggregateFunction; 6] = [
        AggregateFunction::Count,
        AggregateFunction::Sum,
        AggregateFunction::Avg,
        AggregateFunction::Min,
        AggregateFunction::Max,
        AggregateFunction::CountDistinct,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
            AggregateFunction::CountDistinct => "COUNT_DISTINCT",
        }
    }
}

/// Date functions usable for grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DateFunction {
    CalendarYear,
    CalendarMonth,
    CalendarQuarter,
    FiscalYear,
    FiscalQuarter,
}

impl DateFunction {
    pub const ALL: [DateFunction; 5] = [
        DateFunction::CalendarYear,
        DateFunction::CalendarMonth,
        DateFunction::CalendarQuarter,
        DateFunction::FiscalYear,
        DateFunction::FiscalQuarter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DateFunction::CalendarYear => "CALENDAR_YEAR",
            DateFunction::CalendarMonth => "CALENDAR_MONTH",
            DateFunction::CalendarQuarter => "CALENDAR_QUARTER",
            DateFunction::FiscalYear => "FISCAL_YEAR",
            DateFunction::FiscalQuarter => "FISCAL_QUARTER",
        }
    }

    /// Render the function applied to a field, e.g. `CALENDAR_YEAR(CreatedDate)`.
    pub fn apply(&self, field: &str) -> String {
        format!("{}({})", self.as_str(), field)
    }
}

impl fmt::Display for DateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every function name the field validator recognizes as a call.
pub fn function_names() -> impl Iterator<Item = &'static str> {
    AggregateFunction::ALL
        .iter()
        .map(AggregateFunction::as_str)
        .chain(DateFunction::ALL.iter().map(DateFunction::as_str))
}

/// Comparison operators accepted in structured conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    LtGt,
    Lt,
    Gt,
    Le,
    Ge,
    Like,
    In,
    NotIn,
    Includes,
    Excludes,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::LtGt => "<>",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Le => "<=",
            Operator::Ge => ">=",
            Operator::Like => "LIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Includes => "INCLUDES",
            Operator::Excludes => "EXCLUDES",
        }
    }

    /// Set-membership operators take a parenthesized value list.
    pub fn is_set(&self) -> bool {
        matches!(
            self,
            Operator::In | Operator::NotIn | Operator::Includes | Operator::Excludes
        )
    }

    /// Operators that may be compared against NULL.
    pub fn accepts_null(&self) -> bool {
        matches!(self, Operator::Eq | Operator::Ne | Operator::LtGt)
    }
}

impl FromStr for Operator {
    type Err = SoqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
        match normalized.as_str() {
            "=" => Ok(Operator::Eq),
            "!=" => Ok(Operator::Ne),
            "<>" => Ok(Operator::LtGt),
            "<" => Ok(Operator::Lt),
            ">" => Ok(Operator::Gt),
            "<=" => Ok(Operator::Le),
            ">=" => Ok(Operator::Ge),
            "LIKE" => Ok(Operator::Like),
            "IN" => Ok(Operator::In),
            "NOT IN" => Ok(Operator::NotIn),
            "INCLUDES" => Ok(Operator::Includes),
            "EXCLUDES" => Ok(Operator::Excludes),
            _ => Err(SoqlError::invalid_operator(s)),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction for ORDER BY entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", rename_all = "UPPERCASE")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }

    /// Parse a direction keyword, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("ASC") {
            Some(Direction::Asc)
        } else if s.eq_ignore_ascii_case("DESC") {
            Some(Direction::Desc)
        } else {
            None
        }
    }
}

impl TryFrom<String> for Direction {
    type Error = SoqlError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Direction::parse(&value)
            .ok_or_else(|| SoqlError::invalid_order_by(&value, "direction must be ASC or DESC"))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relative date literals that take no argument.
pub const DATE_LITERALS: &[&str] = &[
    "YESTERDAY",
    "TODAY",
    "TOMORROW",
    "LAST_WEEK",
    "THIS_WEEK",
    "NEXT_WEEK",
    "LAST_MONTH",
    "THIS_MONTH",
    "NEXT_MONTH",
    "LAST_90_DAYS",
    "NEXT_90_DAYS",
    "THIS_QUARTER",
    "LAST_QUARTER",
    "NEXT_QUARTER",
    "THIS_YEAR",
    "LAST_YEAR",
    "NEXT_YEAR",
    "THIS_FISCAL_QUARTER",
    "LAST_FISCAL_QUARTER",
    "NEXT_FISCAL_QUARTER",
    "THIS_FISCAL_YEAR",
    "LAST_FISCAL_YEAR",
    "NEXT_FISCAL_YEAR",
];

/// Relative date literals of the form `NAME:n`.
pub const PARAMETERIZED_DATE_LITERALS: &[&str] = &[
    "LAST_N_DAYS",
    "NEXT_N_DAYS",
    "N_DAYS_AGO",
    "LAST_N_WEEKS",
    "NEXT_N_WEEKS",
    "N_WEEKS_AGO",
    "LAST_N_MONTHS",
    "NEXT_N_MONTHS",
    "N_MONTHS_AGO",
    "LAST_N_QUARTERS",
    "NEXT_N_QUARTERS",
    "N_QUARTERS_AGO",
    "LAST_N_YEARS",
    "NEXT_N_YEARS",
    "N_YEARS_AGO",
    "LAST_N_FISCAL_QUARTERS",
    "NEXT_N_FISCAL_QUARTERS",
    "N_FISCAL_QUARTERS_AGO",
    "LAST_N_FISCAL_YEARS",
    "NEXT_N_FISCAL_YEARS",
    "N_FISCAL_YEARS_AGO",
];

/// Canonicalize a relative date literal, or `None` if it is not one.
pub fn parse_date_literal(s: &str) -> Option<String> {
    let upper = s.trim().to_uppercase();
    if DATE_LITERALS.contains(&upper.as_str()) {
        return Some(upper);
    }
    let (name, n) = upper.split_once(':')?;
    if !PARAMETERIZED_DATE_LITERALS.contains(&name) {
        return None;
    }
    if n.is_empty() || !n.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(format!("{}:{}", name, n))
}

/// Words that cannot be used as a field alias.
pub const RESERVED_WORDS: &[&str] = &[
    "AND", "ASC", "BY", "DESC", "EXCLUDES", "FIRST", "FOR", "FROM", "GROUP", "HAVING", "IN",
    "INCLUDES", "LAST", "LIKE", "LIMIT", "NOT", "NULL", "NULLS", "OFFSET", "OR", "ORDER",
    "SELECT", "TYPEOF", "UPDATE", "USING", "WHERE", "WITH",
];
