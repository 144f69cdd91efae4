//! Lexical validation of identifiers and string literals.
//!
//! Each function here decides whether a single token is safe to embed in a
//! query. Whole-query shape rules (relationship depth, subquery structure,
//! GROUP BY consistency) live in the assemblers.

use crate::error::SoqlError;
use crate::vocabulary::{function_names, AggregateFunction, RESERVED_WORDS};
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;

/// Maximum length of an object or field name.
pub const MAX_FIELD_NAME_LENGTH: usize = 255;

/// Maximum length of a free-text WHERE or HAVING clause.
pub const MAX_WHERE_CLAUSE_LENGTH: usize = 5000;

/// Maximum length of a complete query string.
pub const MAX_QUERY_LENGTH: usize = 10000;

/// Row ceiling of a single SOQL query on the platform. Keep in sync with
/// the Salesforce query limits.
pub const MAX_QUERY_LIMIT: u32 = 50_000;

const PATH: &str = r"[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*";
const ALIAS: &str = r"[A-Za-z_][A-Za-z0-9_]*";

static OBJECT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(?:__c)?$").expect("object name pattern")
});

static FIELD_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{PATH}$")).expect("field path pattern"));

static ALIASED_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*({PATH})\s+({ALIAS})\s*$")).expect("aliased path pattern")
});

static FUNCTION_CALL: LazyLock<Regex> = LazyLock::new(|| {
    let names = function_names().collect::<Vec<_>>().join("|");
    Regex::new(&format!(
        r"(?i)^({names})\(\s*({PATH})?\s*\)(?:\s+({ALIAS}))?$"
    ))
    .expect("function call pattern")
});

/// The accepted shape of a validated select-list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldShape {
    /// Plain field or dotted relationship path.
    Path,
    /// Aggregate or date function call.
    Function {
        name: &'static str,
        argument: Option<String>,
        alias: Option<String>,
        aggregate: bool,
    },
    /// Parenthesized child-relationship subquery, accepted as-is.
    Subquery,
}

/// A field that passed lexical validation, in normalized form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedField {
    normalized: String,
    shape: FieldShape,
}

impl ValidatedField {
    /// The normalized text to embed in a query.
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    pub fn shape(&self) -> &FieldShape {
        &self.shape
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self.shape, FieldShape::Function { aggregate: true, .. })
    }

    pub fn is_subquery(&self) -> bool {
        matches!(self.shape, FieldShape::Subquery)
    }

    pub fn has_alias(&self) -> bool {
        match &self.shape {
            FieldShape::Path => self.normalized.contains(' '),
            FieldShape::Function { alias, .. } => alias.is_some(),
            FieldShape::Subquery => false,
        }
    }

    /// The dotted field path this entry reads, if any.
    pub fn path(&self) -> Option<&str> {
        match &self.shape {
            FieldShape::Path => Some(self.base()),
            FieldShape::Function { argument, .. } => argument.as_deref(),
            FieldShape::Subquery => None,
        }
    }

    /// The entry with any trailing alias stripped.
    pub fn base(&self) -> &str {
        base_field(&self.normalized)
    }

    pub fn into_string(self) -> String {
        self.normalized
    }
}

impl fmt::Display for ValidatedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

/// Reject input longer than `max` characters before any parsing.
pub fn check_length(what: &str, value: &str, max: usize) -> Result<(), SoqlError> {
    let len = value.chars().count();
    if len > max {
        return Err(SoqlError::input_too_long(what, len, max));
    }
    Ok(())
}

/// Validate an sObject API name such as `Account` or `Invoice__c`.
pub fn validate_object_name(name: &str) -> Result<&str, SoqlError> {
    check_length("Object name", name, MAX_FIELD_NAME_LENGTH)?;
    if OBJECT_NAME.is_match(name) {
        Ok(name)
    } else {
        Err(SoqlError::invalid_identifier(name))
    }
}

/// Validate one select-list entry.
///
/// Shapes are tried in priority order: function call, subquery, then plain
/// or relationship field. A function name followed by `(` anywhere in the
/// input commits it to the strict function grammar, so `DISCOUNT(x)` fails
/// with `InvalidFunctionSyntax` rather than `InvalidFieldName`.
pub fn validate_field_name(field: &str) -> Result<ValidatedField, SoqlError> {
    if field.starts_with('(') {
        check_length("Subquery", field, MAX_QUERY_LENGTH)?;
    } else {
        check_length("Field name", field, MAX_FIELD_NAME_LENGTH)?;
    }

    if contains_function_call(field) {
        return parse_function_call(field);
    }

    if field.starts_with('(') {
        // Keyword presence only; structure is checked by the assembler.
        if field.ends_with(')') && field.contains("SELECT") && field.contains("FROM") {
            return Ok(ValidatedField {
                normalized: field.to_string(),
                shape: FieldShape::Subquery,
            });
        }
        return Err(SoqlError::invalid_subquery(
            field,
            "expected a parenthesized SELECT ... FROM ... query",
        ));
    }

    if FIELD_PATH.is_match(field) {
        Ok(ValidatedField {
            normalized: field.to_string(),
            shape: FieldShape::Path,
        })
    } else {
        Err(SoqlError::invalid_field_name(field))
    }
}

/// Validate a plain field followed by an alias, e.g. `StageName stage`.
///
/// Only aggregate select lists accept this form. The alias follows the same
/// rules as a function alias.
pub fn validate_aliased_field(field: &str) -> Result<ValidatedField, SoqlError> {
    check_length("Field name", field, MAX_FIELD_NAME_LENGTH)?;
    let caps = ALIASED_PATH
        .captures(field)
        .ok_or_else(|| SoqlError::invalid_field_name(field))?;
    if is_reserved_word(&caps[2]) {
        return Err(SoqlError::invalid_field_name(field));
    }
    Ok(ValidatedField {
        normalized: format!("{} {}", &caps[1], &caps[2]),
        shape: FieldShape::Path,
    })
}

fn is_reserved_word(alias: &str) -> bool {
    RESERVED_WORDS.iter().any(|w| w.eq_ignore_ascii_case(alias))
}

fn parse_function_call(field: &str) -> Result<ValidatedField, SoqlError> {
    let caps = FUNCTION_CALL
        .captures(field)
        .ok_or_else(|| SoqlError::invalid_function_syntax(field))?;

    let upper_name = caps[1].to_uppercase();
    let name = function_names()
        .find(|n| *n == upper_name)
        .ok_or_else(|| SoqlError::invalid_function_syntax(field))?;
    let argument = caps.get(2).map(|m| m.as_str().to_string());
    let alias = caps.get(3).map(|m| m.as_str().to_string());

    // Only COUNT() may be called without an argument.
    if argument.is_none() && name != AggregateFunction::Count.as_str() {
        return Err(SoqlError::invalid_function_syntax(field));
    }
    if let Some(alias) = &alias
        && is_reserved_word(alias)
    {
        return Err(SoqlError::invalid_function_syntax(field));
    }

    let mut normalized = format!("{}({})", name, argument.as_deref().unwrap_or(""));
    if let Some(alias) = &alias {
        normalized.push(' ');
        normalized.push_str(alias);
    }

    Ok(ValidatedField {
        normalized,
        shape: FieldShape::Function {
            name,
            argument,
            alias,
            aggregate: AggregateFunction::ALL.iter().any(|f| f.as_str() == name),
        },
    })
}

/// Cheap pre-filter: does the text contain `FUNC(` for any known function?
pub fn contains_function_call(text: &str) -> bool {
    let upper = text.to_uppercase();
    function_names().any(|name| upper.contains(&format!("{name}(")))
}

/// Does the text contain `FUNC(` for an aggregate function?
pub fn is_aggregate_call(text: &str) -> bool {
    let upper = text.to_uppercase();
    AggregateFunction::ALL
        .iter()
        .any(|f| upper.contains(&format!("{}(", f.as_str())))
}

/// Are the parentheses in `text` balanced outside single-quoted literals?
///
/// A quote left open counts as unbalanced. `on_close` sees the byte index of
/// every closing parenthesis and the depth after it; returning `false` stops
/// the scan and fails it.
pub(crate) fn scan_parens(text: &str, mut on_close: impl FnMut(usize, usize) -> bool) -> bool {
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '\'' {
                in_quote = false;
            }
            continue;
        }
        match c {
            '\'' => in_quote = true,
            '(' => depth += 1,
            ')' => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
                if !on_close(i, depth) {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0 && !in_quote
}

/// First whitespace-delimited token, i.e. the entry without its alias.
pub fn base_field(entry: &str) -> &str {
    entry.split_whitespace().next().unwrap_or("")
}

/// Escape a string for use inside a single-quoted SOQL literal.
///
/// Substitutions are backslash, single quote, newline, carriage return and
/// tab, applied as if in that order (backslash first, so the escapes added
/// for the others are never doubled). Backspace and form feed are escaped
/// as `\b` and `\f`; any other control character is rejected.
pub fn escape_string_literal(value: &str) -> Result<String, SoqlError> {
    let mut escaped = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\u{8}' => escaped.push_str("\\b"),
            '\u{c}' => escaped.push_str("\\f"),
            c if c.is_control() => {
                return Err(SoqlError::invalid_literal(
                    &format!("{:?}", value),
                    &format!("contains control character U+{:04X}", c as u32),
                ));
            }
            c => escaped.push(c),
        }
    }
    Ok(escaped)
}

/// Escape a JSON value that must be a string.
pub fn escape_json_string(value: &Value) -> Result<String, SoqlError> {
    match value {
        Value::String(s) => escape_string_literal(s),
        other => Err(SoqlError::type_mismatch(&other.to_string(), "a string")),
    }
}

/// Validate a LIMIT value.
pub fn validate_limit(limit: i64) -> Result<u32, SoqlError> {
    if limit < 1 || limit > i64::from(MAX_QUERY_LIMIT) {
        return Err(SoqlError::invalid_limit(limit, MAX_QUERY_LIMIT));
    }
    Ok(limit as u32)
}

/// Validate a LIMIT given as a JSON number. Integral floats such as `10.0`
/// are accepted; `1.5` is not.
pub fn limit_from_json(value: &Value) -> Result<u32, SoqlError> {
    if let Some(n) = value.as_i64() {
        return validate_limit(n);
    }
    match value.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() <= f64::from(MAX_QUERY_LIMIT) + 1.0 => {
            validate_limit(f as i64)
        }
        _ => Err(SoqlError::invalid_limit(value, MAX_QUERY_LIMIT)),
    }
}
