//! Query guardrails applied by the tool handlers.

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Row ceiling of a single SOQL query on the platform.
pub const PLATFORM_MAX_LIMIT: u32 = 50_000;

/// Limits and sort restrictions for query tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// LIMIT applied to record queries that do not specify one.
    #[serde(default = "default_limit")]
    pub default_limit: Option<u32>,

    /// Largest LIMIT a caller may request.
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,

    /// Per-object ORDER BY allow-lists. Entries are `Field` or `Field DESC`.
    #[serde(default)]
    pub orderable_fields: HashMap<String, Vec<String>>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            orderable_fields: HashMap::new(),
        }
    }
}

impl QueryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_limit == 0 || self.max_limit > PLATFORM_MAX_LIMIT {
            return Err(ConfigError::Config(format!(
                "query.max_limit must be between 1 and {}, got {}",
                PLATFORM_MAX_LIMIT, self.max_limit
            )));
        }
        if let Some(default) = self.default_limit
            && (default == 0 || default > self.max_limit)
        {
            return Err(ConfigError::Config(format!(
                "query.default_limit must be between 1 and max_limit ({}), got {}",
                self.max_limit, default
            )));
        }
        Ok(())
    }

    /// ORDER BY allow-list for an object, if one is configured.
    pub fn orderable_fields_for(&self, object: &str) -> Option<&[String]> {
        self.orderable_fields
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(object))
            .map(|(_, fields)| fields.as_slice())
    }
}

fn default_limit() -> Option<u32> {
    Some(200)
}

fn default_max_limit() -> u32 {
    2000
}
