//! Query assembly for simple SELECT statements.
//!
//! The assembler consumes caller-supplied fragments, runs every identifier
//! and value through the lexical validator, applies the whole-query shape
//! rules (relationship depth, subquery structure, ORDER BY allow-list) and
//! concatenates the result in a fixed clause order.

use crate::aggregate::AggregateRequest;
use crate::condition::{render_conditions, Condition};
use crate::error::SoqlError;
use crate::sanitizer::{SanitizedClause, WhereSanitizer};
use crate::sosl::SearchRequest;
use crate::validator::{
    check_length, scan_parens, validate_field_name, validate_limit, validate_object_name,
    FieldShape, MAX_QUERY_LENGTH, MAX_WHERE_CLAUSE_LENGTH,
};
use crate::vocabulary::Direction;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Maximum number of `.`-separated segments in a relationship path.
pub const MAX_RELATIONSHIP_DEPTH: usize = 5;

static SUBQUERY_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\(SELECT.*FROM.*\)$").expect("subquery shape pattern"));

/// Capability for building queries from structured, untrusted arguments.
///
/// Every identifier and value passes through the lexical validator. There
/// is no raw-text path here except a [`SanitizedClause`], which callers can
/// only obtain from a [`crate::BestEffortSanitizer`].
pub trait SafeBuilder {
    fn build_query(&self, request: &QueryRequest) -> Result<String, SoqlError>;
    fn build_aggregate_query(&self, request: &AggregateRequest) -> Result<String, SoqlError>;
    fn build_search(&self, request: &SearchRequest) -> Result<String, SoqlError>;
}

/// Reject relationship paths with an empty segment or more than
/// [`MAX_RELATIONSHIP_DEPTH`] segments.
pub fn check_relationship_depth(path: &str) -> Result<(), SoqlError> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(SoqlError::invalid_relationship(path, "contains an empty segment"));
    }
    if segments.len() > MAX_RELATIONSHIP_DEPTH {
        return Err(SoqlError::invalid_relationship(
            path,
            &format!(
                "{} segments exceeds the maximum depth of {}",
                segments.len(),
                MAX_RELATIONSHIP_DEPTH
            ),
        ));
    }
    Ok(())
}

/// Check that a subquery is a single parenthesized `SELECT ... FROM ...`.
///
/// Beyond the shape pattern, the opening parenthesis must be closed by the
/// final character (quoted text skipped), so `(SELECT Id FROM A) x (y)` is
/// rejected.
pub fn check_subquery_shape(subquery: &str) -> Result<(), SoqlError> {
    if !SUBQUERY_SHAPE.is_match(subquery) {
        return Err(SoqlError::invalid_subquery(
            subquery,
            "must have the form (SELECT ... FROM ...)",
        ));
    }
    if !outer_parens_enclose_all(subquery) {
        return Err(SoqlError::invalid_subquery(
            subquery,
            "parentheses must be balanced and enclose the whole subquery",
        ));
    }
    Ok(())
}

fn outer_parens_enclose_all(text: &str) -> bool {
    scan_parens(text, |i, depth| depth > 0 || i + 1 == text.len())
}

/// Validate one select-list entry including its query-shape rules.
pub(crate) fn select_entry(field: &str) -> Result<String, SoqlError> {
    let validated = validate_field_name(field)?;
    if validated.is_subquery() {
        check_subquery_shape(validated.as_str())?;
    } else if let Some(path) = validated.path() {
        check_relationship_depth(path)?;
    }
    Ok(validated.into_string())
}

/// Split a trailing `ASC`/`DESC` keyword off an ORDER BY entry.
pub(crate) fn split_direction(entry: &str) -> (&str, Option<Direction>) {
    let entry = entry.trim();
    if let Some((head, last)) = entry.rsplit_once(char::is_whitespace)
        && let Some(direction) = Direction::parse(last)
    {
        return (head.trim_end(), Some(direction));
    }
    (entry, None)
}

/// One ORDER BY entry of a simple query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    #[serde(default)]
    pub direction: Direction,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }

    /// Parse `"Name DESC, CreatedDate"` into entries.
    pub fn parse_list(text: &str) -> Result<Vec<OrderBy>, SoqlError> {
        check_length("ORDER BY clause", text, MAX_WHERE_CLAUSE_LENGTH)?;
        text.split(',')
            .map(|entry| {
                let (field, direction) = split_direction(entry);
                if field.is_empty() {
                    return Err(SoqlError::invalid_order_by(entry, "entry is empty"));
                }
                Ok(OrderBy {
                    field: field.to_string(),
                    direction: direction.unwrap_or_default(),
                })
            })
            .collect()
    }

    pub(crate) fn render(&self, orderable: Option<&[String]>) -> Result<String, SoqlError> {
        let field = validate_field_name(&self.field)?;
        match field.shape() {
            FieldShape::Path => {}
            FieldShape::Function { .. } | FieldShape::Subquery => {
                return Err(SoqlError::invalid_order_by(
                    &self.field,
                    "only plain and relationship fields can be sorted on outside an aggregate query",
                ));
            }
        }
        check_relationship_depth(field.as_str())?;

        if let Some(allowed) = orderable
            && !allowed.iter().any(|entry| allows(entry, field.as_str(), self.direction))
        {
            return Err(SoqlError::invalid_order_by(
                &self.field,
                &format!("not in the list of orderable fields ({})", allowed.join(", ")),
            ));
        }

        Ok(format!("{} {}", field, self.direction))
    }
}

/// Allow-list entries are either `Field` or `Field DIRECTION`.
fn allows(entry: &str, field: &str, direction: Direction) -> bool {
    match split_direction(entry) {
        (name, None) => name == field,
        (name, Some(d)) => name == field && d == direction,
    }
}

/// Arguments of a simple SELECT.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub object: String,
    pub fields: Vec<String>,
    #[serde(default, rename = "where")]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub order_by: Vec<OrderBy>,
    #[serde(default)]
    pub limit: Option<i64>,
    /// Free-text filter ANDed with the structured conditions.
    #[serde(skip)]
    pub where_clause: Option<SanitizedClause>,
    /// When set, ORDER BY entries must appear in this list.
    #[serde(skip)]
    pub orderable_fields: Option<Vec<String>>,
}

impl QueryRequest {
    pub fn new<I, S>(object: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            object: object.into(),
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

    pub fn with_where_clause(mut self, clause: SanitizedClause) -> Self {
        self.where_clause = Some(clause);
        self
    }

    pub fn with_orderable_fields(mut self, fields: Vec<String>) -> Self {
        self.orderable_fields = Some(fields);
        self
    }
}

/// The structured query builder.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    pub(crate) sanitizer: WhereSanitizer,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sanitizer(&self) -> &WhereSanitizer {
        &self.sanitizer
    }
}

impl SafeBuilder for QueryBuilder {
    fn build_query(&self, request: &QueryRequest) -> Result<String, SoqlError> {
        let object = validate_object_name(&request.object)?;
        if request.fields.is_empty() {
            return Err(SoqlError::empty_select_list());
        }
        let fields = request
            .fields
            .iter()
            .map(|f| select_entry(f))
            .collect::<Result<Vec<_>, _>>()?;

        let mut query = format!("SELECT {} FROM {}", fields.join(", "), object);

        let structured = render_conditions(&request.conditions)?;
        let free_text = request.where_clause.as_ref().filter(|c| !c.is_empty());
        match (structured, free_text) {
            (Some(conditions), Some(clause)) => {
                query.push_str(&format!(" WHERE {} AND ({})", conditions, clause));
            }
            (Some(conditions), None) => query.push_str(&format!(" WHERE {}", conditions)),
            (None, Some(clause)) => query.push_str(&format!(" WHERE {}", clause)),
            (None, None) => {}
        }

        if !request.order_by.is_empty() {
            let orderable = request.orderable_fields.as_deref();
            let entries = request
                .order_by
                .iter()
                .map(|o| o.render(orderable))
                .collect::<Result<Vec<_>, _>>()?;
            query.push_str(&format!(" ORDER BY {}", entries.join(", ")));
        }

        if let Some(limit) = request.limit {
            query.push_str(&format!(" LIMIT {}", validate_limit(limit)?));
        }

        check_length("Query", &query, MAX_QUERY_LENGTH)?;
        tracing::debug!(query = %query, "Built SOQL query");
        Ok(query)
    }

    fn build_aggregate_query(&self, request: &AggregateRequest) -> Result<String, SoqlError> {
        crate::aggregate::build(self, request)
    }

    fn build_search(&self, request: &SearchRequest) -> Result<String, SoqlError> {
        crate::sosl::build(request)
    }
}
