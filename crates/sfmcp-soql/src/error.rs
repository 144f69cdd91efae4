//! Error types for query validation and construction.
//!
//! Every failure carries the offending field or value in its message so the
//! calling agent can correct its arguments without consulting logs.

use std::fmt;

/// Error raised when an identifier, literal or clause is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SoqlError {
    /// The kind of validation error.
    pub kind: SoqlErrorKind,
    /// Human-readable error message.
    pub message: String,
}

impl SoqlError {
    /// Create a new error.
    pub fn new(kind: SoqlErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    // =========================================================================
    // LEXICAL ERRORS
    // =========================================================================

    /// Object name does not match the identifier grammar.
    pub fn invalid_identifier(name: &str) -> Self {
        Self::new(
            SoqlErrorKind::InvalidIdentifier,
            format!(
                "Invalid object name '{}': expected letters, digits and underscores, optionally ending in __c",
                name
            ),
        )
    }

    /// Field matches none of the accepted field shapes.
    pub fn invalid_field_name(field: &str) -> Self {
        Self::new(
            SoqlErrorKind::InvalidFieldName,
            format!(
                "Invalid field name '{}': expected a field name or a dotted relationship path",
                field
            ),
        )
    }

    /// Field is lexically valid but not allowed where it was used.
    pub fn field_not_allowed(field: &str, reason: &str) -> Self {
        Self::new(
            SoqlErrorKind::InvalidFieldName,
            format!("Field '{}' is not allowed here: {}", field, reason),
        )
    }

    /// SELECT list is empty.
    pub fn empty_select_list() -> Self {
        Self::new(
            SoqlErrorKind::InvalidFieldName,
            "At least one field must be selected",
        )
    }

    /// Aggregate or date function call is malformed.
    pub fn invalid_function_syntax(field: &str) -> Self {
        Self::new(
            SoqlErrorKind::InvalidFunctionSyntax,
            format!(
                "Invalid function syntax '{}': expected FUNCTION(field) with an optional alias",
                field
            ),
        )
    }

    /// Subquery lacks its keywords or its wrapping parentheses.
    pub fn invalid_subquery(field: &str, reason: &str) -> Self {
        Self::new(
            SoqlErrorKind::InvalidSubqueryFormat,
            format!("Invalid subquery '{}': {}", field, reason),
        )
    }

    /// Relationship path has an empty segment or is too deep.
    pub fn invalid_relationship(field: &str, reason: &str) -> Self {
        Self::new(
            SoqlErrorKind::InvalidRelationshipField,
            format!("Invalid relationship field '{}': {}", field, reason),
        )
    }

    // =========================================================================
    // CONDITION AND LITERAL ERRORS
    // =========================================================================

    /// Operator is not in the allow-list.
    pub fn invalid_operator(operator: &str) -> Self {
        Self::new(
            SoqlErrorKind::InvalidOperator,
            format!(
                "Invalid operator '{}': expected one of =, !=, <>, <, >, <=, >=, LIKE, IN, NOT IN, INCLUDES, EXCLUDES",
                operator
            ),
        )
    }

    /// Value shape does not fit the operator.
    pub fn operator_value_mismatch(field: &str, operator: &str, reason: &str) -> Self {
        Self::new(
            SoqlErrorKind::OperatorValueMismatch,
            format!(
                "Operator {} on field '{}' does not accept this value: {}",
                operator, field, reason
            ),
        )
    }

    /// Condition value was omitted entirely.
    pub fn undefined_value(field: &str) -> Self {
        Self::new(
            SoqlErrorKind::UndefinedValue,
            format!(
                "Condition on field '{}' has no value; pass null explicitly to compare with NULL",
                field
            ),
        )
    }

    /// Value type has no serialization rule.
    pub fn unsupported_value_type(value: &str, reason: &str) -> Self {
        Self::new(
            SoqlErrorKind::UnsupportedValueType,
            format!("Unsupported value {}: {}", value, reason),
        )
    }

    /// A string was expected.
    pub fn type_mismatch(value: &str, expected: &str) -> Self {
        Self::new(
            SoqlErrorKind::TypeMismatch,
            format!("Expected {} but got {}", expected, value),
        )
    }

    /// Literal content cannot be represented safely.
    pub fn invalid_literal(value: &str, reason: &str) -> Self {
        Self::new(
            SoqlErrorKind::InvalidLiteral,
            format!("Invalid literal {}: {}", value, reason),
        )
    }

    /// LIMIT is out of range or not an integer.
    pub fn invalid_limit(limit: impl fmt::Display, max: u32) -> Self {
        Self::new(
            SoqlErrorKind::InvalidLimit,
            format!(
                "Invalid LIMIT {}: must be a positive integer no greater than {}",
                limit, max
            ),
        )
    }

    // =========================================================================
    // AGGREGATE GRAMMAR ERRORS
    // =========================================================================

    /// Plain select fields missing from GROUP BY.
    pub fn missing_group_by_fields(missing: &[String]) -> Self {
        Self::new(
            SoqlErrorKind::MissingGroupByFields,
            format!(
                "Fields in SELECT must either be aggregated or appear in GROUP BY. Missing from GROUP BY: {}",
                missing.join(", ")
            ),
        )
    }

    /// HAVING was supplied without any GROUP BY field.
    pub fn having_without_group_by(clause: &str) -> Self {
        Self::new(
            SoqlErrorKind::MissingGroupByFields,
            format!("HAVING clause '{}' requires at least one GROUP BY field", clause),
        )
    }

    /// WHERE contains an aggregate function call.
    pub fn aggregate_in_where(clause: &str) -> Self {
        Self::new(
            SoqlErrorKind::AggregateInWhere,
            format!(
                "WHERE clause '{}' contains an aggregate function; filter on aggregates with HAVING instead",
                clause
            ),
        )
    }

    /// ORDER BY field is not allowed.
    pub fn invalid_order_by(field: &str, reason: &str) -> Self {
        Self::new(
            SoqlErrorKind::InvalidOrderByField,
            format!("Invalid ORDER BY field '{}': {}", field, reason),
        )
    }

    // =========================================================================
    // GUARDS
    // =========================================================================

    /// Free-text clause matched a deny-listed token.
    pub fn dangerous_pattern(clause: &str, token: &str) -> Self {
        Self::new(
            SoqlErrorKind::DangerousPattern,
            format!(
                "Clause '{}' contains a disallowed pattern: {}",
                clause, token
            ),
        )
    }

    /// Input exceeds its length cap.
    pub fn input_too_long(what: &str, len: usize, max: usize) -> Self {
        Self::new(
            SoqlErrorKind::InputTooLong,
            format!("{} is {} characters long; the maximum is {}", what, len, max),
        )
    }
}

/// Categories of query validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoqlErrorKind {
    // Lexical errors
    /// Object name fails the identifier grammar.
    InvalidIdentifier,
    /// Field fails all accepted field shapes.
    InvalidFieldName,
    /// Aggregate or date function call is malformed.
    InvalidFunctionSyntax,
    /// Subquery missing required keywords or wrapper parens.
    InvalidSubqueryFormat,
    /// Dotted path has an empty segment or exceeds the depth cap.
    InvalidRelationshipField,

    // Condition and literal errors
    /// WHERE operator not in the allow-list.
    InvalidOperator,
    /// Value shape incompatible with the operator.
    OperatorValueMismatch,
    /// Condition value omitted (distinct from null).
    UndefinedValue,
    /// Value type has no serialization rule.
    UnsupportedValueType,
    /// Value is not of the expected JSON type.
    TypeMismatch,
    /// Literal holds content that cannot be emitted safely.
    InvalidLiteral,
    /// LIMIT is non-integer, below 1 or above the platform ceiling.
    InvalidLimit,

    // Aggregate grammar errors
    /// Aggregate select has ungrouped plain fields.
    MissingGroupByFields,
    /// WHERE contains an aggregate function call.
    AggregateInWhere,
    /// ORDER BY field not groupable or not on the allow-list.
    InvalidOrderByField,

    // Guards
    /// Free-text clause matched the deny-list.
    DangerousPattern,
    /// Input exceeds its length cap.
    InputTooLong,
}

impl fmt::Display for SoqlErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
