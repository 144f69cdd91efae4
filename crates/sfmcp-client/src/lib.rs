//! # sfmcp-client
//!
//! The Salesforce side of the MCP server: a [`SalesforceClient`] trait
//! covering the operations the tools need, and [`RestClient`], which
//! implements it over the REST API with OAuth 2.0 session acquisition.
//!
//! The client executes query text verbatim. Build that text with
//! `sfmcp-soql`; nothing here re-validates it.

pub mod auth;
pub mod client;
pub mod error;
pub mod rest;
pub mod types;

pub use auth::{authenticate, Session};
pub use client::SalesforceClient;
pub use error::ClientError;
pub use rest::RestClient;
pub use types::{
    ApiError, ChildRelationship, FieldDescribe, ObjectDescribe, PicklistValue, QueryResult,
    Record, SObjectSummary, SaveResult, SearchResult,
};
