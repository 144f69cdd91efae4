//! SOSL search construction.

use crate::builder::{check_relationship_depth, OrderBy};
use crate::condition::{render_conditions, Condition};
use crate::error::SoqlError;
use crate::validator::{
    check_length, validate_field_name, validate_limit, validate_object_name, FieldShape,
    MAX_QUERY_LENGTH, MAX_WHERE_CLAUSE_LENGTH,
};
use serde::Deserialize;
use std::fmt;

/// Row ceiling of a single SOSL search.
pub const MAX_SEARCH_LIMIT: u32 = 2000;

/// Characters with special meaning inside a SOSL search term. The `*` and
/// `?` wildcards are left unescaped so callers can use them.
const RESERVED: &[char] = &[
    '&', '|', '!', '{', '}', '[', ']', '(', ')', '^', '~', ':', '\\', '"', '\'', '+', '-',
];

/// Which field group a search term is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchScope {
    #[default]
    AllFields,
    NameFields,
    EmailFields,
    PhoneFields,
}

impl fmt::Display for SearchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SearchScope::AllFields => "ALL FIELDS",
            SearchScope::NameFields => "NAME FIELDS",
            SearchScope::EmailFields => "EMAIL FIELDS",
            SearchScope::PhoneFields => "PHONE FIELDS",
        })
    }
}

/// One object in the RETURNING list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturningObject {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default, rename = "where")]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub order_by: Vec<OrderBy>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl ReturningObject {
    pub fn new<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by.push(order_by);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    fn render(&self) -> Result<String, SoqlError> {
        let name = validate_object_name(&self.name)?;
        let has_options =
            !self.conditions.is_empty() || !self.order_by.is_empty() || self.limit.is_some();
        if self.fields.is_empty() {
            if has_options {
                return Err(SoqlError::field_not_allowed(
                    name,
                    "WHERE, ORDER BY and LIMIT in RETURNING require a field list",
                ));
            }
            return Ok(name.to_string());
        }

        let fields = self
            .fields
            .iter()
            .map(|field| {
                let validated = validate_field_name(field)?;
                if *validated.shape() != FieldShape::Path {
                    return Err(SoqlError::field_not_allowed(
                        field,
                        "search results can only return plain or relationship fields",
                    ));
                }
                check_relationship_depth(validated.as_str())?;
                Ok(validated.into_string())
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut spec = fields.join(", ");
        if let Some(conditions) = render_conditions(&self.conditions)? {
            spec.push_str(&format!(" WHERE {}", conditions));
        }
        if !self.order_by.is_empty() {
            let entries = self
                .order_by
                .iter()
                .map(|o| o.render(None))
                .collect::<Result<Vec<_>, _>>()?;
            spec.push_str(&format!(" ORDER BY {}", entries.join(", ")));
        }
        if let Some(limit) = self.limit {
            spec.push_str(&format!(" LIMIT {}", search_limit(limit)?));
        }
        Ok(format!("{}({})", name, spec))
    }
}

/// Arguments of a SOSL search.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub term: String,
    #[serde(default)]
    pub scope: SearchScope,
    #[serde(default)]
    pub returning: Vec<ReturningObject>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl SearchRequest {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Default::default()
        }
    }

    pub fn in_scope(mut self, scope: SearchScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn returning(mut self, object: ReturningObject) -> Self {
        self.returning.push(object);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Escape a search term for use between the braces of `FIND {...}`.
pub fn escape_search_term(term: &str) -> Result<String, SoqlError> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        return Err(SoqlError::invalid_literal("\"\"", "search term is empty"));
    }
    check_length("Search term", trimmed, MAX_WHERE_CLAUSE_LENGTH)?;

    let mut escaped = String::with_capacity(trimmed.len() + 8);
    for ch in trimmed.chars() {
        if ch.is_control() {
            return Err(SoqlError::invalid_literal(
                &format!("{:?}", term),
                &format!("contains control character U+{:04X}", ch as u32),
            ));
        }
        if RESERVED.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    Ok(escaped)
}

fn search_limit(limit: i64) -> Result<u32, SoqlError> {
    let limit = validate_limit(limit)?;
    if limit > MAX_SEARCH_LIMIT {
        return Err(SoqlError::invalid_limit(limit, MAX_SEARCH_LIMIT));
    }
    Ok(limit)
}

pub(crate) fn build(request: &SearchRequest) -> Result<String, SoqlError> {
    let term = escape_search_term(&request.term)?;
    let mut search = format!("FIND {{{}}} IN {}", term, request.scope);

    if !request.returning.is_empty() {
        let objects = request
            .returning
            .iter()
            .map(ReturningObject::render)
            .collect::<Result<Vec<_>, _>>()?;
        search.push_str(&format!(" RETURNING {}", objects.join(", ")));
    }

    if let Some(limit) = request.limit {
        search.push_str(&format!(" LIMIT {}", search_limit(limit)?));
    }

    check_length("Search", &search, MAX_QUERY_LENGTH)?;
    tracing::debug!(search = %search, "Built SOSL search");
    Ok(search)
}
