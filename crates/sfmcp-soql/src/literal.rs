//! Type-aware serialization of condition values into SOQL literal syntax.

use crate::error::SoqlError;
use crate::validator::escape_string_literal;
use crate::vocabulary::{parse_date_literal, Operator};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::{Number, Value};

/// A condition value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    String(String),
    Number(Number),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    /// Relative date literal such as `LAST_N_DAYS:30`, already canonical.
    DateLiteral(String),
    List(Vec<Literal>),
}

impl Literal {
    /// Map a JSON tool argument to a literal.
    ///
    /// `None` means the value was omitted and is rejected; it is never
    /// treated as NULL. Dates are passed as single-key objects:
    /// `{"date": "2024-01-31"}`, `{"datetime": "2024-01-31T10:00:00Z"}` or
    /// `{"dateLiteral": "LAST_N_DAYS:30"}`.
    pub fn from_json(field: &str, value: Option<&Value>) -> Result<Self, SoqlError> {
        let value = value.ok_or_else(|| SoqlError::undefined_value(field))?;
        match value {
            Value::Null => Ok(Literal::Null),
            Value::Bool(b) => Ok(Literal::Boolean(*b)),
            Value::Number(n) => Ok(Literal::Number(n.clone())),
            Value::String(s) => Ok(Literal::String(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| Literal::from_json(field, Some(item)))
                .collect::<Result<Vec<_>, _>>()
                .map(Literal::List),
            Value::Object(map) => {
                let mut entries = map.iter();
                let (key, inner) = match (entries.next(), entries.next()) {
                    (Some(entry), None) => entry,
                    _ => {
                        return Err(SoqlError::unsupported_value_type(
                            &value.to_string(),
                            "objects must have exactly one key: date, datetime or dateLiteral",
                        ));
                    }
                };
                let text = inner
                    .as_str()
                    .ok_or_else(|| SoqlError::type_mismatch(&inner.to_string(), "a string"))?;
                match key.as_str() {
                    "date" => NaiveDate::parse_from_str(text, "%Y-%m-%d")
                        .map(Literal::Date)
                        .map_err(|_| SoqlError::invalid_literal(text, "expected YYYY-MM-DD")),
                    "datetime" => DateTime::parse_from_rfc3339(text)
                        .map(|dt| Literal::DateTime(dt.with_timezone(&Utc)))
                        .map_err(|_| SoqlError::invalid_literal(text, "expected an RFC 3339 timestamp")),
                    "dateLiteral" => parse_date_literal(text)
                        .map(Literal::DateLiteral)
                        .ok_or_else(|| SoqlError::invalid_literal(text, "unknown relative date literal")),
                    other => Err(SoqlError::unsupported_value_type(
                        &value.to_string(),
                        &format!("unknown value tag '{}'", other),
                    )),
                }
            }
        }
    }

    /// Serialize as SOQL text. `operator` is the operator the literal is
    /// compared with; lists are only accepted for set operators.
    pub fn serialize(&self, operator: Option<Operator>) -> Result<String, SoqlError> {
        match self {
            Literal::Null => Ok("NULL".to_string()),
            Literal::String(s) => Ok(format!("'{}'", escape_string_literal(s)?)),
            Literal::Number(n) => Ok(n.to_string()),
            Literal::Boolean(true) => Ok("TRUE".to_string()),
            Literal::Boolean(false) => Ok("FALSE".to_string()),
            Literal::Date(d) => Ok(d.format("%Y-%m-%d").to_string()),
            Literal::DateTime(dt) => Ok(dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Literal::DateLiteral(s) => Ok(s.clone()),
            Literal::List(items) => {
                let op = operator.filter(Operator::is_set).ok_or_else(|| {
                    SoqlError::operator_value_mismatch(
                        "<value>",
                        operator.map(|o| o.as_str()).unwrap_or("(none)"),
                        "a list requires IN, NOT IN, INCLUDES or EXCLUDES",
                    )
                })?;
                if items.is_empty() {
                    return Err(SoqlError::invalid_literal("()", "value list is empty"));
                }
                let parts = items
                    .iter()
                    .map(|item| match item {
                        Literal::String(_) | Literal::Number(_) => item.serialize(Some(op)),
                        other => Err(SoqlError::unsupported_value_type(
                            &other.describe(),
                            "list elements must be strings or numbers",
                        )),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("({})", parts.join(", ")))
            }
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Literal::List(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }

    fn describe(&self) -> String {
        match self {
            Literal::Null => "null".to_string(),
            Literal::String(s) => format!("{:?}", s),
            Literal::Number(n) => n.to_string(),
            Literal::Boolean(b) => b.to_string(),
            Literal::Date(d) => d.to_string(),
            Literal::DateTime(dt) => dt.to_rfc3339(),
            Literal::DateLiteral(s) => s.clone(),
            Literal::List(_) => "a nested list".to_string(),
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::String(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Number(value.into())
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Boolean(value)
    }
}

impl From<NaiveDate> for Literal {
    fn from(value: NaiveDate) -> Self {
        Literal::Date(value)
    }
}

/// Serialize a possibly-omitted value. Omission fails with `UndefinedValue`.
pub fn serialize_literal(
    value: Option<&Literal>,
    operator: Option<Operator>,
) -> Result<String, SoqlError> {
    match value {
        Some(literal) => literal.serialize(operator),
        None => Err(SoqlError::undefined_value("<value>")),
    }
}
