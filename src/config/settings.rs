//! Configuration settings and validation.

use std::path::PathBuf;

use crate::{Error, Result};

/// Search backend receiving the indexed lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StoreKind {
    /// Elasticsearch over its REST API.
    Elasticsearch,
    /// Local `SQLite` database.
    Sqlite,
}

/// Main configuration for an indexing run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the YAML repository list.
    pub repos_file: PathBuf,

    /// Directory under which repositories are cloned.
    pub workdir: PathBuf,

    /// Which store receives the documents.
    pub store: StoreKind,

    /// Base URL of the Elasticsearch cluster.
    pub elasticsearch_url: String,

    /// `SQLite` database file, used with [`StoreKind::Sqlite`].
    pub sqlite_path: PathBuf,

    /// Destination index name.
    pub index: String,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Where to write the Prometheus text exposition after the run.
    pub metrics_out: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repos_file: PathBuf::from("repos.yaml"),
            workdir: PathBuf::from("cloned_repos"),
            store: StoreKind::Elasticsearch,
            elasticsearch_url: "http://localhost:9200".to_string(),
            sqlite_path: PathBuf::from("./data/codesearch.db"),
            index: crate::ingest::CODESEARCH_INDEX.to_string(),
            log_level: "info".to_string(),
            metrics_out: None,
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.index.is_empty() {
            return Err(Error::config("index name cannot be empty"));
        }

        // Elasticsearch refuses these, keep both backends on the same naming rules
        if self
            .index
            .chars()
            .any(|c| c.is_uppercase() || c.is_whitespace() || c == '/' || c == '\\')
        {
            return Err(Error::config(format!(
                "invalid index name '{}': must be lowercase without whitespace or slashes",
                self.index
            )));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(Error::config(format!(
                "invalid log level '{}', must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            )));
        }

        if self.store == StoreKind::Elasticsearch && self.elasticsearch_url.trim().is_empty() {
            return Err(Error::config("elasticsearch url cannot be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.index, "codesearch");
        assert_eq!(config.store, StoreKind::Elasticsearch);
        assert_eq!(config.workdir, PathBuf::from("cloned_repos"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_index() {
        let config = Config {
            index: String::new(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("index name"));
    }

    #[test]
    fn test_validate_uppercase_index() {
        let config = Config {
            index: "CodeSearch".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("lowercase"));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let config = Config {
            log_level: "invalid".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log level"));
    }

    #[test]
    fn test_validate_empty_url_only_matters_for_elasticsearch() {
        let config = Config {
            elasticsearch_url: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            elasticsearch_url: String::new(),
            store: StoreKind::Sqlite,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_level_case_insensitive() {
        for level in ["TRACE", "Debug", "INFO", "Warn", "ERROR"] {
            let config = Config {
                log_level: level.to_string(),
                ..Default::default()
            };
            assert!(
                config.validate().is_ok(),
                "Level '{level}' should be valid (case insensitive)"
            );
        }
    }
}
