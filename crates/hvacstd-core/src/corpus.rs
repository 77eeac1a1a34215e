//! # Corpus Loader
//!
//! Builds the in-memory corpus from an ordered list of table files.
//!
//! Each file is one JSON object mapping table name to either an array of
//! records or `{"table": [...]}`. Files are merged right-biased: a later
//! file's table replaces an earlier table of the same name entirely.
//!
//! Loading is one blocking, sequential pass. Any unreadable or malformed
//! file aborts the load; there is never a partial corpus.

use crate::formats;
use crate::primitives::MAX_TABLE_FILE_SIZE;
use crate::store::{RecordStore, Table};
use crate::StandardsError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

// =============================================================================
// CORPUS
// =============================================================================

/// All loaded tables, keyed by table name.
///
/// Read-only once built. Share it by reference (or `Arc`) between any
/// number of concurrent readers; nothing in the crate mutates a corpus
/// after loading.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Corpus {
    tables: BTreeMap<String, Table>,
}

impl Corpus {
    /// Create an empty corpus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load table files with the default loader settings.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self, StandardsError> {
        CorpusLoader::new().load_files(paths)
    }

    /// Build a corpus from one already-parsed document.
    pub fn from_json_value(document: Value) -> Result<Self, StandardsError> {
        let mut corpus = Self::new();
        corpus.merge_document("<memory>", document)?;
        Ok(corpus)
    }

    /// Build a corpus from one JSON document held in memory.
    pub fn from_json_str(text: &str) -> Result<Self, StandardsError> {
        CorpusLoader::new().load_sources([("<memory>", text.as_bytes())])
    }

    /// Merge the top-level tables of one document, replacing same-named tables.
    fn merge_document(&mut self, origin: &str, document: Value) -> Result<(), StandardsError> {
        let Value::Object(tables) = document else {
            return Err(StandardsError::InvalidDocument {
                origin: origin.to_string(),
                reason: "top level must be an object of tables".to_string(),
            });
        };

        for (name, value) in tables {
            let table = Table::from_json(value);
            tracing::debug!(table = %name, rows = table.len(), origin, "loaded table");
            if self.tables.insert(name.clone(), table).is_some() {
                tracing::debug!(table = %name, origin, "table replaced by later file");
            }
        }
        Ok(())
    }

    /// Get a table by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Get a table by name, failing with `TableNotFound`.
    pub fn table(&self, name: &str) -> Result<&Table, StandardsError> {
        self.tables
            .get(name)
            .ok_or_else(|| StandardsError::TableNotFound(name.to_string()))
    }

    /// Get a table's records, failing if it is absent or not a record table.
    pub fn records(&self, name: &str) -> Result<&RecordStore, StandardsError> {
        self.table(name)?
            .records()
            .ok_or_else(|| StandardsError::NotARecordTable(name.to_string()))
    }

    /// Check whether a table is present.
    #[must_use]
    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Iterate over tables in name order.
    pub fn tables(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.tables.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over record tables only, in name order.
    pub fn record_tables(&self) -> impl Iterator<Item = (&str, &RecordStore)> {
        self.tables()
            .filter_map(|(name, table)| table.records().map(|store| (name, store)))
    }

    /// Table names in order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Number of tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if no tables are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Per-table summary.
    #[must_use]
    pub fn stats(&self) -> CorpusStats {
        let tables: Vec<TableStats> = self
            .tables()
            .map(|(name, table)| TableStats {
                name: name.to_string(),
                rows: table.len(),
                searchable: table.records().is_some(),
                has_names: table.records().is_some_and(RecordStore::has_names),
            })
            .collect();
        let record_count = tables.iter().filter(|t| t.searchable).map(|t| t.rows).sum();
        CorpusStats {
            table_count: tables.len(),
            record_count,
            tables,
        }
    }

    /// Content checksum (FNV-1a over the canonical form).
    #[must_use]
    pub fn checksum(&self) -> u64 {
        formats::corpus_checksum(self)
    }

    /// BLAKE3 hash (hex) of the canonical form.
    #[cfg(feature = "crypto-hash")]
    #[must_use]
    pub fn crypto_hash(&self) -> String {
        formats::corpus_crypto_hash(self)
    }
}

// =============================================================================
// STATISTICS
// =============================================================================

/// Summary of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStats {
    pub name: String,
    pub rows: usize,
    /// Whether the table holds records (and can be searched/validated).
    pub searchable: bool,
    /// Whether the first record carries a `name` field.
    pub has_names: bool,
}

/// Summary of a corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub table_count: usize,
    pub record_count: usize,
    pub tables: Vec<TableStats>,
}

// =============================================================================
// LOADER
// =============================================================================

/// Reads and merges table files into a [`Corpus`].
#[derive(Debug, Clone)]
pub struct CorpusLoader {
    max_file_size: u64,
}

impl Default for CorpusLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CorpusLoader {
    /// Create a loader with the default file size limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_file_size: MAX_TABLE_FILE_SIZE,
        }
    }

    /// Override the per-file size limit.
    #[must_use]
    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Load files in order. Later files win per table name.
    pub fn load_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Corpus, StandardsError> {
        let mut corpus = Corpus::new();
        for path in paths {
            let path = path.as_ref();
            let bytes = self.read_file(path)?;
            merge_source(&mut corpus, &path.display().to_string(), &bytes)?;
        }
        Ok(corpus)
    }

    /// Load in-memory sources given as `(label, bytes)` pairs, in order.
    pub fn load_sources<'a, I>(&self, sources: I) -> Result<Corpus, StandardsError>
    where
        I: IntoIterator<Item = (&'a str, &'a [u8])>,
    {
        let mut corpus = Corpus::new();
        for (origin, bytes) in sources {
            if bytes.len() as u64 > self.max_file_size {
                return Err(StandardsError::FileTooLarge {
                    path: origin.to_string(),
                    size: bytes.len() as u64,
                    max: self.max_file_size,
                });
            }
            merge_source(&mut corpus, origin, bytes)?;
        }
        Ok(corpus)
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>, StandardsError> {
        let io_error = |e: std::io::Error| StandardsError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        let metadata = std::fs::metadata(path).map_err(io_error)?;
        if !metadata.is_file() {
            return Err(StandardsError::Io {
                path: path.display().to_string(),
                reason: "not a regular file".to_string(),
            });
        }
        if metadata.len() > self.max_file_size {
            return Err(StandardsError::FileTooLarge {
                path: path.display().to_string(),
                size: metadata.len(),
                max: self.max_file_size,
            });
        }

        std::fs::read(path).map_err(io_error)
    }
}

fn merge_source(corpus: &mut Corpus, origin: &str, bytes: &[u8]) -> Result<(), StandardsError> {
    let document = parse_document(origin, bytes)?;
    corpus.merge_document(origin, document)?;
    tracing::info!(file = %origin, tables = corpus.len(), "merged table file");
    Ok(())
}

fn parse_document(origin: &str, bytes: &[u8]) -> Result<Value, StandardsError> {
    serde_json::from_slice(bytes).map_err(|e| StandardsError::Parse {
        origin: origin.to_string(),
        reason: e.to_string(),
    })
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
    fn later_source_replaces_whole_table() {
        let first = br#"{"motors": [{"name": "M1"}, {"name": "M2"}], "fans": []}"#;
        let second = br#"{"motors": {"table": [{"name": "M3"}]}}"#;

        let corpus = CorpusLoader::new()
            .load_sources([("a.json", &first[..]), ("b.json", &second[..])])
            .unwrap();

        let motors = corpus.records("motors").unwrap();
        assert_eq!(motors.len(), 1);
        assert_eq!(motors.get(0).and_then(|r| r.name()), Some("M3"));
        assert!(corpus.contains_table("fans"));
    }

    /// Counts INFO events emitted while it is the default subscriber.
    struct InfoCounter(std::sync::Arc<std::sync::atomic::AtomicUsize>);

    impl tracing::Subscriber for InfoCounter {
        fn enabled(&self, _: &tracing::Metadata<'_>) -> bool {
            true
        }
        fn new_span(&self, _: &tracing::span::Attributes<'_>) -> tracing::span::Id {
            tracing::span::Id::from_u64(1)
        }
        fn record(&self, _: &tracing::span::Id, _: &tracing::span::Record<'_>) {}
        fn record_follows_from(&self, _: &tracing::span::Id, _: &tracing::span::Id) {}
        fn event(&self, event: &tracing::Event<'_>) {
            if *event.metadata().level() == tracing::Level::INFO {
                self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            }
        }
        fn enter(&self, _: &tracing::span::Id) {}
        fn exit(&self, _: &tracing::span::Id) {}
    }

    #[test]
    fn each_source_logs_its_merge() {
        let first = br#"{"motors": [{"name": "M1"}]}"#;
        let second = br#"{"fans": [{"name": "F1"}]}"#;
        let count = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));

        let corpus = tracing::subscriber::with_default(InfoCounter(count.clone()), || {
            CorpusLoader::new().load_sources([("a.json", &first[..]), ("b.json", &second[..])])
        })
        .unwrap();

        assert_eq!(corpus.len(), 2);
        assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[test]
    fn malformed_source_aborts_load() {
        let good = br#"{"motors": []}"#;
        let bad = br#"{"boilers": [ "#;
        let result = CorpusLoader::new().load_sources([("good", &good[..]), ("bad", &bad[..])]);
        assert!(matches!(result, Err(StandardsError::Parse { origin, .. }) if origin == "bad"));
    }

    #[test]
    fn non_object_document_is_rejected() {
        let result = Corpus::from_json_value(json!([1, 2, 3]));
        assert!(matches!(result, Err(StandardsError::InvalidDocument { .. })));
    }

    #[test]
    fn missing_table_is_reported() {
        let corpus = Corpus::new();
        assert!(matches!(
            corpus.records("boilers"),
            Err(StandardsError::TableNotFound(name)) if name == "boilers"
        ));
    }

    #[test]
    fn opaque_table_is_not_searchable() {
        let corpus = Corpus::from_json_value(json!({"version": {"number": 3}})).unwrap();
        assert!(matches!(
            corpus.records("version"),
            Err(StandardsError::NotARecordTable(_))
        ));
    }

    #[test]
    fn size_limit_applies_to_sources() {
        let doc = br#"{"motors": []}"#;
        let result = CorpusLoader::new()
            .with_max_file_size(4)
            .load_sources([("doc", &doc[..])]);
        assert!(matches!(result, Err(StandardsError::FileTooLarge { .. })));
    }

    #[test]
    fn stats_summarize_tables() {
        let corpus = Corpus::from_json_value(json!({
            "motors": [{"name": "M1"}, {"name": "M2"}],
            "curves": [{"form": "Quadratic"}],
            "notes": "free text"
        }))
        .unwrap();

        let stats = corpus.stats();
        assert_eq!(stats.table_count, 3);
        assert_eq!(stats.record_count, 3);
        let motors = stats.tables.iter().find(|t| t.name == "motors").unwrap();
        assert!(motors.searchable && motors.has_names);
        let notes = stats.tables.iter().find(|t| t.name == "notes").unwrap();
        assert!(!notes.searchable);
    }

    #[test]
    fn equal_content_equal_checksum() {
        let a = Corpus::from_json_str(r#"{"t": [{"x": 1, "y": 2}]}"#).unwrap();
        let b = Corpus::from_json_str(r#"{"t": [{"x": 1, "y": 2}]}"#).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.checksum(), b.checksum());

        let c = Corpus::from_json_str(r#"{"t": [{"x": 1, "y": 3}]}"#).unwrap();
        assert_ne!(a.checksum(), c.checksum());
    }
}
