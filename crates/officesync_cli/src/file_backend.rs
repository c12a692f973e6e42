//! A backend persisted to a single JSON file.
//!
//! The file holds one object per table, each mapping primary keys to
//! rows. Every upsert rewrites the whole file through a temporary sibling
//! and a rename.

use async_trait::async_trait;
use officesync_engine::{Backend, SyncError, SyncResult};
use officesync_model::{Row, PRIMARY_KEY};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

type Tables = BTreeMap<String, BTreeMap<String, Row>>;

/// Errors opening or writing the backing file.
#[derive(Error, Debug)]
pub enum FileBackendError {
    /// I/O error.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not a valid table document.
    #[error("invalid backend file {path}: {source}")]
    Json {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
}

/// Table storage in a JSON file.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    tables: Mutex<Tables>,
}

impl FileBackend {
    /// Opens `path`, starting empty if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FileBackendError> {
        let path = path.as_ref().to_path_buf();
        let tables = if path.exists() {
            let bytes = std::fs::read(&path).map_err(|source| FileBackendError::Io {
                path: path.clone(),
                source,
            })?;
            if bytes.is_empty() {
                Tables::new()
            } else {
                serde_json::from_slice(&bytes).map_err(|source| FileBackendError::Json {
                    path: path.clone(),
                    source,
                })?
            }
        } else {
            Tables::new()
        };

        Ok(Self {
            path,
            tables: Mutex::new(tables),
        })
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Row counts per table, including tables with no rows.
    pub fn table_counts(&self) -> BTreeMap<String, usize> {
        let tables = self.tables.lock();
        tables
            .iter()
            .map(|(name, rows)| (name.clone(), rows.len()))
            .collect()
    }

    fn save(&self, tables: &Tables) -> Result<(), FileBackendError> {
        let io = |source| FileBackendError::Io {
            path: self.path.clone(),
            source,
        };
        let bytes = serde_json::to_vec_pretty(tables).map_err(|source| FileBackendError::Json {
            path: self.path.clone(),
            source,
        })?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes).map_err(io)?;
        std::fs::rename(&tmp, &self.path).map_err(io)?;
        Ok(())
    }
}

fn primary_key(row: &Row) -> Option<String> {
    match row.get(PRIMARY_KEY)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl Backend for FileBackend {
    async fn select(&self, table: &str) -> SyncResult<Vec<Row>> {
        let tables = self.tables.lock();
        Ok(tables
            .get(table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn upsert(&self, table: &str, rows: Vec<Row>) -> SyncResult<()> {
        let mut tables = self.tables.lock();
        let mut next = tables.get(table).cloned().unwrap_or_default();
        for row in rows {
            let key = primary_key(&row)
                .ok_or_else(|| SyncError::backend(table, 400, "row without primary key"))?;
            next.entry(key).or_default().extend(row);
        }

        let count = next.len();
        let previous = tables.insert(table.to_string(), next);
        if let Err(e) = self.save(&tables) {
            match previous {
                Some(previous) => tables.insert(table.to_string(), previous),
                None => tables.remove(table),
            };
            return Err(SyncError::transport(e.to_string()));
        }
        debug!(table, rows = count, path = %self.path.display(), "table saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn upserts_persist_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("office.json");

        let backend = FileBackend::open(&path).unwrap();
        backend
            .upsert("rooms", vec![row(json!({"id": "r1", "name": "Lab"}))])
            .await
            .unwrap();
        backend
            .upsert("rooms", vec![row(json!({"id": "r1", "color": "#fff"}))])
            .await
            .unwrap();

        let reopened = FileBackend::open(&path).unwrap();
        let rows = reopened.select("rooms").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Lab");
        assert_eq!(rows[0]["color"], "#fff");
        assert_eq!(reopened.table_counts()["rooms"], 1);
    }

    #[tokio::test]
    async fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::open(dir.path().join("absent.json")).unwrap();
        assert!(backend.select("avatars").await.unwrap().is_empty());
        assert!(backend.table_counts().is_empty());
    }

    #[test]
    fn corrupt_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("office.json");
        std::fs::write(&path, b"not json").unwrap();
        assert!(matches!(
            FileBackend::open(&path),
            Err(FileBackendError::Json { .. })
        ));
    }

    #[tokio::test]
    async fn keyless_rows_are_rejected() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::open(dir.path().join("office.json")).unwrap();
        let err = backend
            .upsert("projects", vec![row(json!({"name": "Nameless"}))])
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Backend { status: 400, .. }));
        assert!(backend.table_counts().is_empty());
    }
}
