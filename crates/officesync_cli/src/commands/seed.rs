//! Seed command implementation.

use super::{CommandResult, Format};
use officesync_engine::{bootstrap, Backend, BootstrapOutcome, Store, SyncConfig};
use serde::Serialize;

/// Seed result.
#[derive(Debug, Serialize)]
pub struct SeedResult {
    /// `loaded`, `seeded` or `disabled`.
    pub outcome: &'static str,
    /// Tables loaded or written.
    pub tables: Vec<&'static str>,
    /// Tables that failed, with messages.
    pub failed: Vec<(String, String)>,
}

/// Runs the seed command: loads existing state, or writes the starter
/// office when the backend has no content.
pub async fn run<B: Backend + ?Sized>(
    backend: &B,
    config: &SyncConfig,
    format: Format,
) -> CommandResult<String> {
    let store = Store::default();
    let result = match bootstrap(config, backend, &store).await {
        BootstrapOutcome::Disabled => SeedResult {
            outcome: "disabled",
            tables: Vec::new(),
            failed: Vec::new(),
        },
        BootstrapOutcome::Loaded(slices) => SeedResult {
            outcome: "loaded",
            tables: slices.iter().map(|s| s.table()).collect(),
            failed: Vec::new(),
        },
        BootstrapOutcome::Seeded(report) => SeedResult {
            outcome: "seeded",
            tables: report.written.iter().map(|s| s.table()).collect(),
            failed: report
                .failed
                .iter()
                .map(|(slice, error)| (slice.table().to_string(), error.clone()))
                .collect(),
        },
    };

    Ok(match format {
        Format::Json => serde_json::to_string_pretty(&result)?,
        Format::Text => {
            let mut out = format!("{}: {}", result.outcome, result.tables.join(", "));
            for (table, error) in &result.failed {
                out.push_str(&format!("\nfailed {table}: {error}"));
            }
            out
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_backend::FileBackend;
    use officesync_engine::{LoopbackClient, MemoryBackend, RestBackend, RestConfig};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn seeds_once_then_loads() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::open(dir.path().join("office.json")).unwrap();
        let config = SyncConfig::new();

        let first = run(&backend, &config, Format::Text).await.unwrap();
        assert!(first.starts_with("seeded: projects"), "{first}");

        let second = run(&backend, &config, Format::Json).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&second).unwrap();
        assert_eq!(value["outcome"], "loaded");
        assert_eq!(value["tables"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn disabled_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("office.json");
        let backend = FileBackend::open(&path).unwrap();

        let out = run(&backend, &SyncConfig::disabled(), Format::Text).await.unwrap();
        assert!(out.starts_with("disabled"));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn seeds_through_the_rest_backend() {
        let memory = Arc::new(MemoryBackend::new());
        let rest = RestBackend::new(
            RestConfig::new("https://office.example.co", "anon"),
            LoopbackClient::new(Arc::clone(&memory)),
        );

        let out = run(&rest, &SyncConfig::new(), Format::Json).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["outcome"], "seeded");
        assert_eq!(memory.row_count("settings"), 1);
        assert!(memory.row_count("avatars") > 0);
    }
}
