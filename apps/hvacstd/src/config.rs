//! # Configuration
//!
//! Optional TOML file describing which table files to load and how to check
//! them:
//!
//! ```toml
//! data_dir = "data/standards"
//! files = ["boilers.json", "motors.json"]   # load order, later wins
//! exempt_tables = ["schedules"]
//! max_file_size = 104857600
//!
//! [[index]]
//! table = "space_types"
//! field = "template"
//! ```
//!
//! Every key is optional. A missing default config file means built-in
//! defaults; a missing file named with `--config` is an error.

use hvacstd_core::primitives::{DEFAULT_TABLE_FILES, MAX_TABLE_FILE_SIZE, NAME_EXEMPT_TABLES};
use hvacstd_core::{Corpus, CorpusLoader, IndexedCorpus, StandardsError, ValidatorConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "hvacstd.toml";

/// Directory holding the table files when nothing else is configured.
pub const DEFAULT_DATA_DIR: &str = "data/standards";

// =============================================================================
// CONFIG
// =============================================================================

/// Field index to build at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexSpec {
    pub table: String,
    pub field: String,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory the entries of `files` are relative to.
    pub data_dir: PathBuf,
    /// Table files in load order.
    pub files: Vec<PathBuf>,
    /// Tables allowed to repeat names.
    pub exempt_tables: Vec<String>,
    /// Per-file size limit in bytes.
    pub max_file_size: u64,
    #[serde(rename = "index")]
    pub indexes: Vec<IndexSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            files: DEFAULT_TABLE_FILES.iter().map(PathBuf::from).collect(),
            exempt_tables: NAME_EXEMPT_TABLES.iter().map(|t| t.to_string()).collect(),
            max_file_size: MAX_TABLE_FILE_SIZE,
            indexes: Vec::new(),
        }
    }
}

impl Config {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, StandardsError> {
        let config: Self =
            toml::from_str(text).map_err(|e| StandardsError::Config(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Load from `path`.
    ///
    /// When `explicit` is false a missing file yields the defaults.
    pub fn load(path: &Path, explicit: bool) -> Result<Self, StandardsError> {
        if !path.exists() {
            if explicit {
                return Err(StandardsError::Config(format!(
                    "config file '{}' does not exist",
                    path.display()
                )));
            }
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|e| StandardsError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), files = config.files.len(), "loaded config");
        Ok(config)
    }

    /// Apply command-line overrides.
    ///
    /// Files given on the command line replace the configured list and are
    /// taken relative to `data_dir` only when `data_dir` is also given.
    #[must_use]
    pub fn with_overrides(mut self, data_dir: Option<PathBuf>, files: Vec<PathBuf>) -> Self {
        if !files.is_empty() {
            self.files = files;
            self.data_dir = data_dir.unwrap_or_default();
        } else if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        self
    }

    fn check(&self) -> Result<(), StandardsError> {
        if self.max_file_size == 0 {
            return Err(StandardsError::Config(
                "max_file_size must be greater than zero".to_string(),
            ));
        }
        if let Some(spec) = self
            .indexes
            .iter()
            .find(|spec| spec.table.is_empty() || spec.field.is_empty())
        {
            return Err(StandardsError::Config(format!(
                "index entry needs both table and field (got table='{}', field='{}')",
                spec.table, spec.field
            )));
        }
        Ok(())
    }

    /// Table file paths in load order.
    #[must_use]
    pub fn table_paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|file| self.data_dir.join(file)).collect()
    }

    /// Integrity-check policy derived from this config.
    #[must_use]
    pub fn validator_config(&self) -> ValidatorConfig {
        ValidatorConfig {
            exempt_tables: self.exempt_tables.iter().cloned().collect(),
            ..ValidatorConfig::default()
        }
    }

    /// Load every configured table file.
    pub fn load_corpus(&self) -> Result<Corpus, StandardsError> {
        let paths = self
            .table_paths()
            .iter()
            .map(|path| validate_file_path(path))
            .collect::<Result<Vec<_>, _>>()?;
        CorpusLoader::new()
            .with_max_file_size(self.max_file_size)
            .load_files(&paths)
    }

    /// Wrap a corpus with the configured field indexes.
    pub fn index_corpus(&self, corpus: Arc<Corpus>) -> Result<IndexedCorpus, StandardsError> {
        self.indexes
            .iter()
            .try_fold(IndexedCorpus::new(corpus), |indexed, spec| {
                indexed.with_index(&spec.table, &spec.field)
            })
    }
}

/// Resolve a table file path.
///
/// Canonicalizing resolves `..` and symlinks and fails on missing paths, so
/// error messages name the real file and directories are rejected early.
fn validate_file_path(path: &Path) -> Result<PathBuf, StandardsError> {
    let canonical = path.canonicalize().map_err(|e| StandardsError::Io {
        path: path.display().to_string(),
        reason: format!("invalid file path: {}", e),
    })?;

    if !canonical.is_file() {
        return Err(StandardsError::Io {
            path: path.display().to_string(),
            reason: "not a regular file".to_string(),
        });
    }

    Ok(canonical)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn parses_all_keys() {
        let config = Config::from_toml_str(
            r#"
            data_dir = "tables"
            files = ["a.json", "b.json"]
            exempt_tables = ["schedules", "curves"]
            max_file_size = 1024

            [[index]]
            table = "space_types"
            field = "template"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.table_paths(),
            vec![PathBuf::from("tables/a.json"), PathBuf::from("tables/b.json")]
        );
        assert_eq!(config.max_file_size, 1024);
        assert_eq!(config.indexes.len(), 1);
        assert!(config.validator_config().exempt_tables.contains("curves"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = Config::from_toml_str("colour = \"blue\"");
        assert!(matches!(result, Err(StandardsError::Config(_))));
    }

    #[test]
    fn zero_size_limit_rejected() {
        let result = Config::from_toml_str("max_file_size = 0");
        assert!(matches!(result, Err(StandardsError::Config(_))));
    }

    #[test]
    fn missing_default_file_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        assert_eq!(Config::load(&path, false).unwrap(), Config::default());
        assert!(matches!(
            Config::load(&path, true),
            Err(StandardsError::Config(_))
        ));
    }

    #[test]
    fn cli_files_replace_configured_list() {
        let config = Config::default()
            .with_overrides(None, vec![PathBuf::from("local/motors.json")]);
        assert_eq!(config.table_paths(), vec![PathBuf::from("local/motors.json")]);

        let config = Config::default().with_overrides(Some(PathBuf::from("std")), Vec::new());
        assert_eq!(config.table_paths()[0], PathBuf::from("std").join(DEFAULT_TABLE_FILES[0]));
    }

    #[test]
    fn loads_and_indexes_corpus() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("spaces.json"),
            json!({"space_types": [{"name": "Office", "template": "Any"}]}).to_string(),
        )
        .unwrap();

        let mut config = Config::default().with_overrides(
            Some(dir.path().to_path_buf()),
            vec![PathBuf::from("spaces.json")],
        );
        config.indexes.push(IndexSpec {
            table: "space_types".to_string(),
            field: "template".to_string(),
        });

        let corpus = Arc::new(config.load_corpus().unwrap());
        let indexed = config.index_corpus(corpus).unwrap();
        assert_eq!(indexed.indexed_fields("space_types").count(), 1);

        config.indexes[0].table = "boilers".to_string();
        let corpus = Arc::new(config.load_corpus().unwrap());
        assert!(matches!(
            config.index_corpus(corpus),
            Err(StandardsError::TableNotFound(_))
        ));
    }
}
