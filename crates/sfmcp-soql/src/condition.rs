//! Structured WHERE conditions.

use crate::builder::check_relationship_depth;
use crate::error::SoqlError;
use crate::literal::Literal;
use crate::validator::validate_field_name;
use crate::vocabulary::Operator;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A `(field, operator, value)` triple supplied by a caller.
///
/// `value` distinguishes an omitted value (`None`) from an explicit JSON
/// `null` (`Some(Value::Null)`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: String,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: Some(value.into()),
        }
    }

    /// Validate every part of the condition and render it as `field OP value`.
    pub fn render(&self) -> Result<String, SoqlError> {
        let field = validate_field_name(&self.field)?;
        if field.is_aggregate() {
            return Err(SoqlError::aggregate_in_where(&self.field));
        }
        if field.is_subquery() {
            return Err(SoqlError::field_not_allowed(
                &self.field,
                "subqueries cannot be compared",
            ));
        }
        if let Some(path) = field.path() {
            check_relationship_depth(path)?;
        }

        let operator: Operator = self.operator.parse()?;
        let value = Literal::from_json(&self.field, self.value.as_ref())?;

        if value.is_list() != operator.is_set() {
            let reason = if operator.is_set() {
                "a set operator requires a list of values"
            } else {
                "a list of values requires IN, NOT IN, INCLUDES or EXCLUDES"
            };
            return Err(SoqlError::operator_value_mismatch(
                &self.field,
                operator.as_str(),
                reason,
            ));
        }
        if value.is_null() && !operator.accepts_null() {
            return Err(SoqlError::operator_value_mismatch(
                &self.field,
                operator.as_str(),
                "NULL can only be compared with =, != or <>",
            ));
        }

        Ok(format!("{} {} {}", field, operator, value.serialize(Some(operator))?))
    }
}

/// Render conditions joined with `AND`. Returns `None` for an empty list.
pub fn render_conditions(conditions: &[Condition]) -> Result<Option<String>, SoqlError> {
    if conditions.is_empty() {
        return Ok(None);
    }
    let parts = conditions
        .iter()
        .map(Condition::render)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(parts.join(" AND ")))
}
