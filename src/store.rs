//! Storage collaborator for materialized relations.
//!
//! Stages exchange fully materialized relations through this seam, keeping
//! the transformation logic independent of any particular database. Rows
//! are encoded as one JSON document per line, so a relation is
//! byte-comparable across runs. Floats are parsed with serde_json's
//! `float_roundtrip` feature; a row read back and rewritten keeps its
//! exact bytes.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::debug;

/// Names of the relations materialized by the pipeline.
pub mod relation {
    pub const STG_ETH_ACCOUNT: &str = "stg_eth_account";
    pub const STG_ETH_TRANSACTION: &str = "stg_eth_transaction";
    pub const INT_ACCOUNT_PROFILE: &str = "int_account_profile";
    pub const INT_ENRICHED_TRANSACTION: &str = "int_enriched_transaction";
    pub const INT_TRANSACTION_WINDOW: &str = "int_transaction_window";
    pub const AGG_HOURLY_NETWORK: &str = "agg_hourly_network";
}

/// Storage interface injected into the pipeline.
///
/// `write` replaces the relation all-or-nothing: a failed call leaves any
/// previously materialized version untouched.
pub trait RelationStore {
    /// Read all rows of a materialized relation.
    fn read<T: DeserializeOwned>(&self, relation: &str) -> Result<Vec<T>>;

    /// Materialize a relation, replacing any previous version.
    fn write<T: Serialize>(&self, relation: &str, rows: &[T]) -> Result<()>;

    /// Whether the relation has been materialized.
    fn exists(&self, relation: &str) -> bool;
}

fn encode_rows<T: Serialize>(relation: &str, rows: &[T]) -> Result<Vec<String>> {
    rows.iter()
        .map(|row| {
            serde_json::to_string(row)
                .with_context(|| format!("Failed to encode row for relation '{relation}'"))
        })
        .collect()
}

/// In-memory store for tests and embedding.
#[derive(Default)]
pub struct MemoryStore {
    relations: RwLock<HashMap<String, Vec<String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw encoded rows of a relation, for byte-level comparisons.
    pub fn snapshot(&self, relation: &str) -> Option<Vec<String>> {
        self.relations
            .read()
            .ok()
            .and_then(|relations| relations.get(relation).cloned())
    }
}

impl RelationStore for MemoryStore {
    fn read<T: DeserializeOwned>(&self, relation: &str) -> Result<Vec<T>> {
        let relations = self
            .relations
            .read()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;
        let rows = relations
            .get(relation)
            .with_context(|| format!("Relation '{relation}' has not been materialized"))?;

        rows.iter()
            .map(|line| {
                serde_json::from_str(line)
                    .with_context(|| format!("Corrupt row in relation '{relation}'"))
            })
            .collect()
    }

    fn write<T: Serialize>(&self, relation: &str, rows: &[T]) -> Result<()> {
        // Encode everything before touching the map so a failed row leaves
        // the previous version in place.
        let encoded = encode_rows(relation, rows)?;

        let mut relations = self
            .relations
            .write()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;
        relations.insert(relation.to_string(), encoded);

        debug!(relation, rows = rows.len(), "Materialized relation in memory");
        Ok(())
    }

    fn exists(&self, relation: &str) -> bool {
        self.relations
            .read()
            .map(|relations| relations.contains_key(relation))
            .unwrap_or(false)
    }
}

/// File-backed store: one `<relation>.jsonl` per relation under a data
/// directory.
///
/// Writes go to a temp file in the same directory and rename into place,
/// so an aborted run never leaves a partially written relation behind.
pub struct JsonlStore {
    data_dir: PathBuf,
}

impl JsonlStore {
    /// Create a store rooted at `data_dir`. The directory is created on
    /// first write.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn relation_path(&self, relation: &str) -> PathBuf {
        self.data_dir.join(format!("{relation}.jsonl"))
    }
}

impl RelationStore for JsonlStore {
    fn read<T: DeserializeOwned>(&self, relation: &str) -> Result<Vec<T>> {
        let path = self.relation_path(relation);
        let content = fs::read_to_string(&path).with_context(|| {
            format!("Failed to read relation '{relation}' from {}", path.display())
        })?;

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line)
                    .with_context(|| format!("Corrupt row in relation '{relation}'"))
            })
            .collect()
    }

    fn write<T: Serialize>(&self, relation: &str, rows: &[T]) -> Result<()> {
        fs::create_dir_all(&self.data_dir).with_context(|| {
            format!("Failed to create data directory {}", self.data_dir.display())
        })?;

        let mut content = String::new();
        for line in encode_rows(relation, rows)? {
            content.push_str(&line);
            content.push('\n');
        }

        let path = self.relation_path(relation);
        let tmp_path = self.data_dir.join(format!("{relation}.jsonl.tmp"));
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &path)
            .with_context(|| format!("Failed to materialize relation '{relation}'"))?;

        debug!(relation, rows = rows.len(), path = %path.display(), "Materialized relation");
        Ok(())
    }

    fn exists(&self, relation: &str) -> bool {
        self.relation_path(relation).exists()
    }
}
