//! # sfmcp-soql
//!
//! Injection-safe SOQL and SOSL construction for the Salesforce MCP server.
//!
//! Tool arguments arrive from an LLM agent and are untrusted. This crate turns
//! them into query text that the Salesforce client executes verbatim, so it is
//! the last line of defense: malformed input is rejected, never repaired.
//!
//! ## Layers
//!
//! ```text
//! tool arguments (JSON)
//!       │
//!       ▼
//! ┌────────────────────┐
//! │  Query Assembler   │  builder / aggregate / sosl
//! │  clause order,     │
//! │  GROUP BY rules,   │
//! │  depth, subqueries │
//! └─────────┬──────────┘
//!           │ every identifier and value
//!           ▼
//! ┌────────────────────┐
//! │  Lexical Validator │  validator / literal / condition
//! └────────────────────┘
//! ```
//!
//! Two trust levels are exposed as separate capabilities:
//!
//! | Trait | Implementation | Guarantee |
//! |-------|----------------|-----------|
//! | [`SafeBuilder`] | [`QueryBuilder`] | every token validated or escaped |
//! | [`BestEffortSanitizer`] | [`WhereSanitizer`] | deny-list only, for OR logic and HAVING text |
//!
//! ## Example
//!
//! ```
//! use sfmcp_soql::{Condition, QueryBuilder, QueryRequest, SafeBuilder};
//!
//! let request = QueryRequest::new("Account", ["Id", "Name"])
//!     .with_condition(Condition::new("Name", "=", "O'Brien"));
//! let soql = QueryBuilder::new().build_query(&request).unwrap();
//! assert_eq!(soql, r"SELECT Id, Name FROM Account WHERE Name = 'O\'Brien'");
//! ```
//!
//! Everything here is synchronous and stateless; builders can be shared
//! freely between tasks.

pub mod aggregate;
pub mod builder;
pub mod condition;
pub mod error;
pub mod literal;
pub mod sanitizer;
pub mod sosl;
pub mod validator;
pub mod vocabulary;

pub use aggregate::{AggregateRequest, GroupBy};
pub use builder::{
    check_relationship_depth, check_subquery_shape, OrderBy, QueryBuilder, QueryRequest,
    SafeBuilder, MAX_RELATIONSHIP_DEPTH,
};
pub use condition::{render_conditions, Condition};
pub use error::{SoqlError, SoqlErrorKind};
pub use literal::{serialize_literal, Literal};
pub use sanitizer::{BestEffortSanitizer, SanitizedClause, WhereSanitizer};
pub use sosl::{escape_search_term, ReturningObject, SearchRequest, SearchScope, MAX_SEARCH_LIMIT};
pub use validator::{
    escape_json_string, escape_string_literal, limit_from_json, validate_aliased_field,
    validate_field_name, validate_limit, validate_object_name, FieldShape, ValidatedField,
    MAX_FIELD_NAME_LENGTH, MAX_QUERY_LENGTH, MAX_QUERY_LIMIT, MAX_WHERE_CLAUSE_LENGTH,
};
pub use vocabulary::{AggregateFunction, DateFunction, Direction, Operator};
