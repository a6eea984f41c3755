//! Core configuration.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration.

use serde::Deserialize;
use std::path::Path;

use crate::errors::{ExError, ExErrorKind, Result};
use crate::logging_facility::Profile;
use crate::model::CommitId;

/// Alignment policy of the list and array change appenders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListCompareAlgorithm {
    /// Minimal-edit alignment (longest common subsequence)
    #[default]
    Levenshtein,
    /// Index-by-index comparison
    Simple,
}

/// Largest `old_len * new_len` product still aligned by LCS
pub const DEFAULT_LCS_CELL_LIMIT: usize = 250_000;

fn default_lcs_cell_limit() -> usize {
    DEFAULT_LCS_CELL_LIMIT
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfiguration {
    pub list_compare_algorithm: ListCompareAlgorithm,

    /// Applied after trimming the common prefix and suffix; larger lists fall
    /// back to positional comparison
    #[serde(default = "default_lcs_cell_limit")]
    pub lcs_cell_limit: usize,

    /// Explicit starting point for commit numbering; the repository head is
    /// used when unset
    pub commit_id_seed: Option<u64>,

    pub logging_profile: Profile,
}

impl Default for CoreConfiguration {
    fn default() -> Self {
        Self {
            list_compare_algorithm: ListCompareAlgorithm::default(),
            lcs_cell_limit: DEFAULT_LCS_CELL_LIMIT,
            commit_id_seed: None,
            logging_profile: Profile::default(),
        }
    }
}

impl CoreConfiguration {
    /// Parse a TOML document
    ///
    /// # Errors
    ///
    /// `Configuration` if the document is not valid TOML or carries unknown
    /// or mistyped keys.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| {
            ExError::new(ExErrorKind::Configuration)
                .with_op("from_toml_str")
                .with_message(e.to_string())
        })
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    ///
    /// `Configuration` if the file cannot be read or parsed.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            ExError::new(ExErrorKind::Configuration)
                .with_op("from_toml_file")
                .with_entity_id(path.display().to_string())
                .with_message(e.to_string())
        })?;
        Self::from_toml_str(&source).map_err(|e| e.with_entity_id(path.display().to_string()))
    }

    /// Commit id that numbering continues after, when explicitly seeded
    pub fn seed_commit_id(&self) -> Option<CommitId> {
        self.commit_id_seed.map(|major| CommitId::new(major, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = CoreConfiguration::from_toml_str("").unwrap();
        assert_eq!(config, CoreConfiguration::default());
        assert_eq!(config.lcs_cell_limit, DEFAULT_LCS_CELL_LIMIT);
        assert_eq!(config.list_compare_algorithm, ListCompareAlgorithm::Levenshtein);
    }

    #[test]
    fn test_full_document() {
        let config = CoreConfiguration::from_toml_str(
            r#"
            list_compare_algorithm = "simple"
            lcs_cell_limit = 64
            commit_id_seed = 41
            logging_profile = "production"
            "#,
        )
        .unwrap();

        assert_eq!(config.list_compare_algorithm, ListCompareAlgorithm::Simple);
        assert_eq!(config.lcs_cell_limit, 64);
        assert_eq!(config.seed_commit_id(), Some(CommitId::new(41, 0)));
        assert_eq!(config.logging_profile, Profile::Production);
    }

    #[test]
    fn test_unknown_key_is_configuration_error() {
        let err = CoreConfiguration::from_toml_str("list_algorithm = \"simple\"").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Configuration);
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let err = CoreConfiguration::from_toml_file("/nonexistent/histograph.toml").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Configuration);
        assert_eq!(err.entity_id(), Some("/nonexistent/histograph.toml"));
    }
}
