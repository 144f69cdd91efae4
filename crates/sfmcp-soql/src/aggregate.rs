//! Aggregate SELECT ... GROUP BY assembly.
//!
//! The platform's own errors for a malformed aggregate query do not say which
//! field is wrong, so the grammar rules are enforced here:
//!
//! - every non-aggregate select entry (alias stripped) must appear in GROUP BY
//! - WHERE may not contain aggregate calls
//! - ORDER BY entries must be grouped fields or unaliased aggregate calls

use crate::builder::{check_relationship_depth, split_direction, QueryBuilder};
use crate::condition::{render_conditions, Condition};
use crate::error::SoqlError;
use crate::sanitizer::BestEffortSanitizer;
use crate::validator::{
    check_length, contains_function_call, is_aggregate_call, validate_aliased_field,
    validate_field_name, validate_limit, validate_object_name, FieldShape, ValidatedField,
    MAX_QUERY_LENGTH, MAX_WHERE_CLAUSE_LENGTH,
};
use crate::vocabulary::DateFunction;
use serde::Deserialize;

/// One GROUP BY entry. Accepts either `"StageName"` or
/// `{"field": "CreatedDate", "dateGranularity": "CALENDAR_YEAR"}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "GroupBySpec")]
pub struct GroupBy {
    pub field: String,
    pub granularity: Option<DateFunction>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GroupBySpec {
    Field(String),
    Detailed {
        field: String,
        #[serde(default, rename = "dateGranularity")]
        date_granularity: Option<DateFunction>,
    },
}

impl From<GroupBySpec> for GroupBy {
    fn from(spec: GroupBySpec) -> Self {
        match spec {
            GroupBySpec::Field(field) => GroupBy::field(field),
            GroupBySpec::Detailed {
                field,
                date_granularity,
            } => GroupBy {
                field,
                granularity: date_granularity,
            },
        }
    }
}

impl GroupBy {
    pub fn field(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            granularity: None,
        }
    }

    pub fn by_date(field: impl Into<String>, granularity: DateFunction) -> Self {
        Self {
            field: field.into(),
            granularity: Some(granularity),
        }
    }

    /// Validate and render, e.g. `StageName` or `CALENDAR_YEAR(CreatedDate)`.
    pub fn render(&self) -> Result<String, SoqlError> {
        let validated = validate_field_name(&self.field)?;
        match (validated.shape().clone(), self.granularity) {
            (FieldShape::Path, granularity) => {
                check_relationship_depth(validated.as_str())?;
                Ok(match granularity {
                    Some(function) => function.apply(validated.as_str()),
                    None => validated.into_string(),
                })
            }
            (
                FieldShape::Function {
                    aggregate: false,
                    alias: None,
                    argument: Some(argument),
                    ..
                },
                None,
            ) => {
                check_relationship_depth(&argument)?;
                Ok(validated.into_string())
            }
            _ => Err(SoqlError::field_not_allowed(
                &self.field,
                "GROUP BY accepts a field, optionally with a date granularity",
            )),
        }
    }
}

/// Arguments of an aggregate query.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRequest {
    pub object: String,
    pub select_fields: Vec<String>,
    #[serde(default, rename = "groupByFields")]
    pub group_by: Vec<GroupBy>,
    /// Structured filters, ANDed together.
    #[serde(default, rename = "where")]
    pub conditions: Vec<Condition>,
    /// Free-text WHERE filter; goes through the deny-list sanitizer.
    #[serde(default)]
    pub where_clause: Option<String>,
    /// Free-text HAVING filter; goes through the deny-list sanitizer.
    #[serde(default)]
    pub having_clause: Option<String>,
    #[serde(default)]
    pub order_by: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl AggregateRequest {
    pub fn new<I, S>(object: impl Into<String>, select_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            object: object.into(),
            select_fields: select_fields.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by.push(group_by);
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_where_clause(mut self, clause: impl Into<String>) -> Self {
        self.where_clause = Some(clause.into());
        self
    }

    pub fn with_having(mut self, clause: impl Into<String>) -> Self {
        self.having_clause = Some(clause.into());
        self
    }

    pub fn with_order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

pub(crate) fn build(builder: &QueryBuilder, request: &AggregateRequest) -> Result<String, SoqlError> {
    let object = validate_object_name(&request.object)?;
    if request.select_fields.is_empty() {
        return Err(SoqlError::empty_select_list());
    }

    let select = request
        .select_fields
        .iter()
        .map(|field| aggregate_select_entry(field))
        .collect::<Result<Vec<_>, _>>()?;
    let group_by = request
        .group_by
        .iter()
        .map(GroupBy::render)
        .collect::<Result<Vec<_>, _>>()?;

    let mut missing: Vec<String> = Vec::new();
    for field in select.iter().filter(|f| !f.is_aggregate()) {
        let base = field.base();
        if !group_by.iter().any(|g| g == base) && !missing.iter().any(|m| m == base) {
            missing.push(base.to_string());
        }
    }
    if !missing.is_empty() {
        return Err(SoqlError::missing_group_by_fields(&missing));
    }

    let select_list = select
        .iter()
        .map(ValidatedField::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let mut query = format!("SELECT {} FROM {}", select_list, object);

    let structured = render_conditions(&request.conditions)?;
    let free_text = match request.where_clause.as_deref().filter(|c| !c.trim().is_empty()) {
        Some(clause) => {
            check_length("WHERE clause", clause, MAX_WHERE_CLAUSE_LENGTH)?;
            if is_aggregate_call(clause) {
                return Err(SoqlError::aggregate_in_where(clause));
            }
            Some(builder.sanitizer.sanitize(clause)?)
        }
        None => None,
    };
    match (structured, free_text) {
        (Some(conditions), Some(clause)) => {
            query.push_str(&format!(" WHERE {} AND ({})", conditions, clause));
        }
        (Some(conditions), None) => query.push_str(&format!(" WHERE {}", conditions)),
        (None, Some(clause)) => query.push_str(&format!(" WHERE {}", clause)),
        (None, None) => {}
    }

    if !group_by.is_empty() {
        query.push_str(&format!(" GROUP BY {}", group_by.join(", ")));
    }

    if let Some(having) = request.having_clause.as_deref().filter(|c| !c.trim().is_empty()) {
        if group_by.is_empty() {
            return Err(SoqlError::having_without_group_by(having));
        }
        let having = builder.sanitizer.sanitize(having)?;
        query.push_str(&format!(" HAVING {}", having));
    }

    if let Some(order_by) = request.order_by.as_deref().filter(|c| !c.trim().is_empty()) {
        query.push_str(&format!(" ORDER BY {}", render_order_by(order_by, &group_by)?));
    }

    if let Some(limit) = request.limit {
        query.push_str(&format!(" LIMIT {}", validate_limit(limit)?));
    }

    check_length("Query", &query, MAX_QUERY_LENGTH)?;
    tracing::debug!(query = %query, "Built aggregate SOQL query");
    Ok(query)
}

fn aggregate_select_entry(field: &str) -> Result<ValidatedField, SoqlError> {
    // `StageName stage`: a grouped field may carry an alias here.
    let aliased = !field.starts_with('(')
        && !contains_function_call(field)
        && field.trim().contains(char::is_whitespace);
    let validated = if aliased {
        validate_aliased_field(field)?
    } else {
        validate_field_name(field)?
    };
    if validated.is_subquery() {
        return Err(SoqlError::field_not_allowed(
            field,
            "subqueries cannot be used in an aggregate query",
        ));
    }
    if let Some(path) = validated.path() {
        check_relationship_depth(path)?;
    }
    Ok(validated)
}

fn render_order_by(text: &str, group_by: &[String]) -> Result<String, SoqlError> {
    check_length("ORDER BY clause", text, MAX_WHERE_CLAUSE_LENGTH)?;
    let entries = text
        .split(',')
        .map(|entry| {
            let (field, direction) = split_direction(entry);
            if field.is_empty() {
                return Err(SoqlError::invalid_order_by(entry, "entry is empty"));
            }
            let validated = validate_field_name(field)?;
            let grouped = group_by.iter().any(|g| g == validated.as_str());
            let aggregate = validated.is_aggregate() && !validated.has_alias();
            if !grouped && !aggregate {
                return Err(SoqlError::invalid_order_by(
                    field,
                    "must appear in GROUP BY or be an aggregate function",
                ));
            }
            Ok(match direction {
                Some(direction) => format!("{} {}", validated, direction),
                None => validated.into_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries.join(", "))
}
