//! Backend abstraction for persisted collections.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use officesync_model::{Row, PRIMARY_KEY};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// A table-oriented persistence service.
///
/// Every row carries a stable primary key in [`PRIMARY_KEY`]; writes are
/// upserts keyed by it.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// Reads every row of a table.
    async fn select(&self, table: &str) -> SyncResult<Vec<Row>>;

    /// Inserts or updates rows by primary key.
    async fn upsert(&self, table: &str, rows: Vec<Row>) -> SyncResult<()>;
}

#[async_trait]
impl<B: Backend + ?Sized> Backend for Arc<B> {
    async fn select(&self, table: &str) -> SyncResult<Vec<Row>> {
        (**self).select(table).await
    }

    async fn upsert(&self, table: &str, rows: Vec<Row>) -> SyncResult<()> {
        (**self).upsert(table, rows).await
    }
}

/// A call observed by [`MemoryBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    /// A table read.
    Select {
        /// Table name.
        table: String,
    },
    /// A table write.
    Upsert {
        /// Table name.
        table: String,
        /// Rows sent.
        rows: Vec<Row>,
    },
}

impl BackendCall {
    /// Returns the table the call targeted.
    pub fn table(&self) -> &str {
        match self {
            BackendCall::Select { table } | BackendCall::Upsert { table, .. } => table,
        }
    }
}

/// An in-memory backend.
///
/// Records every call, can be told to fail individual tables, and can
/// delay every call to simulate network latency.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: RwLock<BTreeMap<String, BTreeMap<String, Row>>>,
    calls: Mutex<Vec<BackendCall>>,
    failing: RwLock<HashSet<String>>,
    latency: RwLock<Duration>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores rows directly, without recording a call.
    pub fn insert_rows(&self, table: &str, rows: Vec<Row>) {
        let mut tables = self.tables.write();
        let table = tables.entry(table.to_string()).or_default();
        for row in rows {
            if let Some(key) = primary_key(&row) {
                table.insert(key, row);
            }
        }
    }

    /// Returns the rows of a table ordered by primary key.
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .read()
            .get(table)
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns one row by primary key.
    pub fn row(&self, table: &str, id: &str) -> Option<Row> {
        self.tables.read().get(table)?.get(id).cloned()
    }

    /// Returns the number of rows in a table.
    pub fn row_count(&self, table: &str) -> usize {
        self.tables.read().get(table).map_or(0, BTreeMap::len)
    }

    /// Makes every call on `table` fail with a server error.
    pub fn fail_table(&self, table: &str) {
        self.failing.write().insert(table.to_string());
    }

    /// Undoes [`fail_table`](Self::fail_table).
    pub fn heal_table(&self, table: &str) {
        self.failing.write().remove(table);
    }

    /// Delays every call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.write() = latency;
    }

    /// Returns all recorded calls in issue order.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().clone()
    }

    /// Returns the total number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns the rows of every upsert on `table`, in issue order.
    pub fn upserts(&self, table: &str) -> Vec<Vec<Row>> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                BackendCall::Upsert { table: t, rows } if t == table => Some(rows.clone()),
                _ => None,
            })
            .collect()
    }

    /// Returns the number of upserts across all tables.
    pub fn upsert_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, BackendCall::Upsert { .. }))
            .count()
    }

    /// Returns the number of reads across all tables.
    pub fn select_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, BackendCall::Select { .. }))
            .count()
    }

    /// Forgets recorded calls; stored rows are kept.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    async fn enter(&self, call: BackendCall) -> SyncResult<()> {
        let table = call.table().to_string();
        self.calls.lock().push(call);

        let latency = *self.latency.read();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if self.failing.read().contains(&table) {
            return Err(SyncError::backend(table, 503, "injected failure"));
        }
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
impl Backend for MemoryBackend {
    async fn select(&self, table: &str) -> SyncResult<Vec<Row>> {
        self.enter(BackendCall::Select {
            table: table.to_string(),
        })
        .await?;
        Ok(self.rows(table))
    }

    async fn upsert(&self, table: &str, rows: Vec<Row>) -> SyncResult<()> {
        self.enter(BackendCall::Upsert {
            table: table.to_string(),
            rows: rows.clone(),
        })
        .await?;

        let mut keyed = Vec::with_capacity(rows.len());
        for row in rows {
            let key = primary_key(&row)
                .ok_or_else(|| SyncError::backend(table, 400, "row without primary key"))?;
            keyed.push((key, row));
        }

        // Merge columns into existing rows, like an on-conflict update.
        let mut tables = self.tables.write();
        let stored = tables.entry(table.to_string()).or_default();
        for (key, row) in keyed {
            stored.entry(key).or_default().extend(row);
        }
        Ok(())
    }
}
