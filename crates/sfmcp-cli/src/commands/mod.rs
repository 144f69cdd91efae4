//! CLI command implementations for the sfmcp binary.

pub mod check;
pub mod serve;
pub mod soql;
pub mod tools;

use anyhow::{Context, Result};
use sfmcp_core::SfmcpConfig;
use std::path::Path;

/// Configuration as read from disk.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: SfmcpConfig,
    /// False when the file was missing and defaults are in use.
    pub found: bool,
}

/// Load the config file, falling back to defaults when it does not exist.
pub fn load_config(path: &Path) -> Result<LoadedConfig> {
    if !path.exists() {
        return Ok(LoadedConfig {
            config: SfmcpConfig::default(),
            found: false,
        });
    }
    let config = SfmcpConfig::from_file(path)
        .with_context(|| format!("Failed to load configuration from {:?}", path))?;
    Ok(LoadedConfig {
        config,
        found: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(&dir.path().join("sfmcp.yaml")).unwrap();
        assert!(!loaded.found);
        assert_eq!(loaded.config.query.max_limit, 2000);
    }

    #[test]
    fn test_file_is_parsed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "query:\n  max_limit: 50\nlogging:\n  level: debug").unwrap();

        let loaded = load_config(file.path()).unwrap();
        assert!(loaded.found);
        assert_eq!(loaded.config.query.max_limit, 50);
        assert_eq!(loaded.config.logging.level, "debug");
    }

    #[test]
    fn test_malformed_file_names_the_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mcp: [not, a, map]").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to load configuration"));
    }
}
