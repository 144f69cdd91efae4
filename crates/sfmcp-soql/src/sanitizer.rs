//! Best-effort sanitizer for free-text WHERE and HAVING clauses.
//!
//! This is a deny-list and offers a much weaker guarantee than the structured
//! builder: it only rejects known-dangerous token patterns and does not parse
//! the clause. Use it only when a filter cannot be expressed as structured
//! conditions (for example, OR logic).

use crate::error::SoqlError;
use crate::validator::{check_length, scan_parens, MAX_WHERE_CLAUSE_LENGTH};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// A clause that passed the deny-list. Only this module can construct one,
/// so a builder accepting it knows which trust level it came through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedClause(String);

impl SanitizedClause {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SanitizedClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Capability for passing caller-built clause text through a deny-list.
pub trait BestEffortSanitizer {
    fn sanitize(&self, clause: &str) -> Result<SanitizedClause, SoqlError>;
}

struct DenyPattern {
    regex: Regex,
    label: &'static str,
}

static DENY_LIST: LazyLock<Vec<DenyPattern>> = LazyLock::new(|| {
    [
        (
            r"(?i)\b(UNION|SELECT|INSERT|UPDATE|DELETE|DROP|CREATE|ALTER|EXEC|EXECUTE)\b",
            "SQL keyword",
        ),
        (r";", "statement separator ';'"),
        (r"--", "line comment '--'"),
        (r"/\*", "block comment '/*'"),
        (r"\*/", "block comment '*/'"),
        (r"(?i)xp_", "extended procedure prefix 'xp_'"),
        (r"(?i)sp_", "stored procedure prefix 'sp_'"),
        (r"(?i)\bOR\s+\d+\s*=\s*\d+", "tautology 'OR n=n'"),
        (r"(?i)\bAND\s+\d+\s*=\s*\d+", "tautology 'AND n=n'"),
    ]
    .into_iter()
    .map(|(pattern, label)| DenyPattern {
        regex: Regex::new(pattern).expect("deny-list pattern"),
        label,
    })
    .collect()
});

/// Deny-list sanitizer for WHERE/HAVING text.
#[derive(Debug, Clone)]
pub struct WhereSanitizer {
    max_length: usize,
}

impl Default for WhereSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl WhereSanitizer {
    pub fn new() -> Self {
        Self {
            max_length: MAX_WHERE_CLAUSE_LENGTH,
        }
    }
}

impl BestEffortSanitizer for WhereSanitizer {
    fn sanitize(&self, clause: &str) -> Result<SanitizedClause, SoqlError> {
        check_length("WHERE clause", clause, self.max_length)?;

        for pattern in DENY_LIST.iter() {
            if let Some(m) = pattern.regex.find(clause) {
                tracing::warn!(
                    pattern = pattern.label,
                    matched = m.as_str(),
                    "Rejected free-text clause"
                );
                return Err(SoqlError::dangerous_pattern(
                    clause,
                    &format!("{} ({})", pattern.label, m.as_str()),
                ));
            }
        }

        // The builders wrap the clause in parentheses; a stray `)` would close them.
        if !scan_parens(clause, |_, _| true) {
            tracing::warn!("Rejected free-text clause with unbalanced parentheses");
            return Err(SoqlError::dangerous_pattern(
                clause,
                "unbalanced parentheses or quotes",
            ));
        }

        Ok(SanitizedClause(clause.trim().to_string()))
    }
}
