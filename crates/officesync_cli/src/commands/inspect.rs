//! Inspect command implementation.

use super::{CommandResult, Format};
use crate::file_backend::FileBackend;
use officesync_model::Slice;
use serde::Serialize;

/// Backend file inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Backend file path.
    pub path: String,
    /// Per-table statistics, known tables first.
    pub tables: Vec<TableStats>,
}

/// Statistics for a single table.
#[derive(Debug, Serialize)]
pub struct TableStats {
    /// Table name.
    pub table: String,
    /// Number of rows.
    pub rows: usize,
    /// Debounce tier, for tables the engine writes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<&'static str>,
}

/// Runs the inspect command.
pub fn run(backend: &FileBackend, format: Format) -> CommandResult<String> {
    let mut counts = backend.table_counts();

    let mut tables: Vec<TableStats> = Slice::ALL
        .into_iter()
        .map(|slice| TableStats {
            table: slice.table().to_string(),
            rows: counts.remove(slice.table()).unwrap_or(0),
            tier: Some(slice.tier().as_str()),
        })
        .collect();
    tables.extend(counts.into_iter().map(|(table, rows)| TableStats {
        table,
        rows,
        tier: None,
    }));

    let result = InspectResult {
        path: backend.path().display().to_string(),
        tables,
    };

    Ok(match format {
        Format::Json => serde_json::to_string_pretty(&result)?,
        Format::Text => {
            let mut out = format!("Backend: {}\n", result.path);
            for stats in &result.tables {
                let tier = stats.tier.unwrap_or("-");
                out.push_str(&format!("  {:<16} {:>6} rows  {tier}\n", stats.table, stats.rows));
            }
            out.trim_end().to_string()
        }
    })
}
