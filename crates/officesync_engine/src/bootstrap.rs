//! Startup: load persisted state, or seed an empty backend.
//!
//! Nothing here ever returns an error. A backend that cannot be read is
//! treated like an empty one, and failed seed writes are logged and
//! reported but never rolled back.

use crate::backend::Backend;
use crate::config::SyncConfig;
use crate::store::{StateSource, Store};
use futures::future::join_all;
use officesync_model::{
    OfficeState, PartialState, Row, RowCodec, Settings, Slice, Task, PRIMARY_KEY,
    SETTINGS_ROW_ID,
};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Result of seeding an empty backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Slices written.
    pub written: Vec<Slice>,
    /// Slices whose write failed, with the error message.
    pub failed: Vec<(Slice, String)>,
    /// Content slices skipped because they were empty.
    pub skipped: Vec<Slice>,
}

impl SeedReport {
    /// Returns true when nothing failed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// What [`bootstrap`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// Sync is disabled; nothing was read or written.
    Disabled,
    /// Persisted state was found; these slices were hydrated.
    Loaded(Vec<Slice>),
    /// The backend was empty or unreadable; the local state was written.
    Seeded(SeedReport),
}

/// Reads every table and decodes what was found.
///
/// Returns `None` when every content table is empty, when any read
/// fails, or when sync is disabled. Otherwise returns the non-empty
/// slices; callers must not assume every slice is present.
pub async fn load<B: Backend + ?Sized>(config: &SyncConfig, backend: &B) -> Option<PartialState> {
    if !config.enabled {
        return None;
    }

    let reads = join_all(Slice::ALL.into_iter().map(|slice| async move {
        (slice, backend.select(slice.table()).await)
    }))
    .await;

    let mut tables: BTreeMap<Slice, Vec<Row>> = BTreeMap::new();
    for (slice, result) in reads {
        match result {
            Ok(rows) => {
                tables.insert(slice, rows);
            }
            Err(e) => {
                warn!(slice = %slice, error = %e, "bootstrap read failed; using local state");
                return None;
            }
        }
    }

    let has_content = Slice::CONTENT
        .iter()
        .any(|slice| tables.get(slice).is_some_and(|rows| !rows.is_empty()));
    if !has_content {
        info!("backend has no content");
        return None;
    }

    let mut partial = PartialState::default();
    for (slice, mut rows) in tables {
        if rows.is_empty() {
            continue;
        }
        match slice {
            Slice::Rooms => partial.rooms = non_empty(decode_rows(slice, &rows)),
            Slice::Avatars => partial.avatars = non_empty(decode_rows(slice, &rows)),
            Slice::Projects => partial.projects = non_empty(decode_rows(slice, &rows)),
            Slice::TeamTemplates => {
                partial.team_templates = non_empty(decode_rows(slice, &rows));
            }
            Slice::Tasks => {
                rows.sort_by_key(Task::row_sort_order);
                partial.tasks = non_empty(decode_rows(slice, &rows));
            }
            Slice::Settings => partial.settings = decode_settings(&rows),
        }
    }

    debug!(slices = ?partial.slices(), "bootstrap loaded");
    Some(partial)
}

fn decode_rows<T: RowCodec>(slice: Slice, rows: &[Row]) -> Vec<T> {
    rows.iter()
        .filter_map(|row| match T::from_row(row) {
            Ok(entity) => Some(entity),
            Err(e) => {
                warn!(slice = %slice, error = %e, "skipping undecodable row");
                None
            }
        })
        .collect()
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

fn decode_settings(rows: &[Row]) -> Option<Settings> {
    let row = rows
        .iter()
        .find(|row| row.get(PRIMARY_KEY).and_then(|v| v.as_str()) == Some(SETTINGS_ROW_ID))
        .or_else(|| rows.first())?;
    match Settings::from_row(row) {
        Ok(settings) => Some(settings),
        Err(e) => {
            warn!(error = %e, "skipping undecodable settings row");
            None
        }
    }
}

/// Writes `state` to an empty backend.
///
/// Slices are written in waves so that referenced rows exist before the
/// rows referencing them. Empty content slices are skipped; the settings
/// row is always written.
pub async fn seed<B: Backend + ?Sized>(
    config: &SyncConfig,
    backend: &B,
    state: &OfficeState,
) -> SeedReport {
    let mut report = SeedReport::default();
    if !config.enabled {
        return report;
    }

    for wave in Slice::SEED_WAVES {
        let mut writes = Vec::with_capacity(wave.len());
        for &slice in wave {
            if !slice.is_singleton() && state.slice_len(slice) == 0 {
                report.skipped.push(slice);
                continue;
            }
            let rows = state.encode_slice(slice);
            writes.push(async move { (slice, backend.upsert(slice.table(), rows).await) });
        }

        for (slice, result) in join_all(writes).await {
            match result {
                Ok(()) => report.written.push(slice),
                Err(e) => {
                    warn!(slice = %slice, error = %e, "seed write failed");
                    report.failed.push((slice, e.to_string()));
                }
            }
        }
    }

    info!(
        written = report.written.len(),
        failed = report.failed.len(),
        "backend seeded"
    );
    report
}

/// Loads persisted state into `store`, or seeds the backend from it.
///
/// Run this before starting the engine, so hydration does not schedule
/// writes of what was just read.
pub async fn bootstrap<B: Backend + ?Sized>(
    config: &SyncConfig,
    backend: &B,
    store: &Store,
) -> BootstrapOutcome {
    if !config.enabled {
        return BootstrapOutcome::Disabled;
    }

    match load(config, backend).await {
        Some(partial) => {
            let slices = partial.slices();
            store.hydrate(partial);
            BootstrapOutcome::Loaded(slices)
        }
        None => {
            let state = store.get_state();
            BootstrapOutcome::Seeded(seed(config, backend, &state).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendCall, MemoryBackend};
    use officesync_model::{Project, Room};
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn empty_backend_loads_nothing() {
        let backend = MemoryBackend::new();
        backend.insert_rows("settings", vec![row(json!({"id": "default", "theme": "light"}))]);

        assert!(load(&SyncConfig::new(), &backend).await.is_none());
        assert_eq!(backend.select_count(), Slice::ALL.len());
    }

    #[tokio::test]
    async fn only_non_empty_slices_are_returned() {
        let backend = MemoryBackend::new();
        backend.insert_rows("projects", vec![row(json!({"id": "p1", "name": "Atlas"}))]);
        backend.insert_rows(
            "settings",
            vec![
                row(json!({"id": "other", "office_name": "Wrong"})),
                row(json!({"id": "default", "office_name": "HQ"})),
            ],
        );

        let partial = load(&SyncConfig::new(), &backend).await.unwrap();
        assert_eq!(partial.slices(), vec![Slice::Projects, Slice::Settings]);
        assert_eq!(partial.projects.unwrap()[0].name, "Atlas");
        assert_eq!(partial.settings.unwrap().office_name, "HQ");
    }

    #[tokio::test]
    async fn tasks_follow_sort_order_and_bad_rows_are_skipped() {
        let backend = MemoryBackend::new();
        backend.insert_rows(
            "mc_tasks",
            vec![
                row(json!({"id": "a", "title": "third", "sort_order": 2})),
                row(json!({"id": "b", "title": "first", "sort_order": 0})),
                row(json!({"id": "c", "title": "second", "sort_order": 1})),
            ],
        );
        backend.insert_rows("rooms", vec![row(json!({"id": 7, "name": "Numbered"}))]);

        let partial = load(&SyncConfig::new(), &backend).await.unwrap();
        let titles: Vec<_> = partial
            .tasks
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
        assert_eq!(partial.rooms.unwrap()[0].id, "7");
    }

    #[tokio::test]
    async fn read_failure_loads_nothing() {
        let backend = MemoryBackend::new();
        backend.insert_rows("rooms", vec![row(json!({"id": "r1"}))]);
        backend.fail_table("avatars");

        assert!(load(&SyncConfig::new(), &backend).await.is_none());
    }

    #[tokio::test]
    async fn disabled_config_does_no_io() {
        let backend = MemoryBackend::new();
        let config = SyncConfig::disabled();

        assert!(load(&config, &backend).await.is_none());
        let report = seed(&config, &backend, &OfficeState::default()).await;
        assert_eq!(report, SeedReport::default());
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn seed_is_idempotent() {
        let backend = MemoryBackend::new();
        let config = SyncConfig::new();
        let state = OfficeState::default();

        assert!(seed(&config, &backend, &state).await.is_complete());
        let first: Vec<Vec<Row>> = Slice::ALL.iter().map(|s| backend.rows(s.table())).collect();

        assert!(seed(&config, &backend, &state).await.is_complete());
        for (slice, rows) in Slice::ALL.iter().zip(&first) {
            assert_eq!(&backend.rows(slice.table()), rows, "{slice}");
            assert_eq!(backend.row_count(slice.table()), rows.len(), "{slice}");
        }
    }

    #[tokio::test]
    async fn seed_writes_in_dependency_waves() {
        let backend = MemoryBackend::new();
        let report = seed(&SyncConfig::new(), &backend, &OfficeState::default()).await;

        assert!(report.is_complete());
        assert_eq!(report.written.len(), Slice::ALL.len());

        let order: Vec<String> = backend
            .calls()
            .iter()
            .map(|c| c.table().to_string())
            .collect();
        let position = |table: &str| order.iter().position(|t| t == table).unwrap();
        assert!(position("projects") < position("rooms"));
        assert!(position("projects") < position("mc_tasks"));
        assert!(position("rooms") < position("avatars"));
    }

    #[tokio::test]
    async fn seed_skips_empty_content_but_writes_settings() {
        let backend = MemoryBackend::new();
        let mut state = OfficeState::empty();
        state.projects_mut().push(Project::new("p1", "Atlas"));

        let report = seed(&SyncConfig::new(), &backend, &state).await;
        assert_eq!(report.written, vec![Slice::Projects, Slice::Settings]);
        assert_eq!(
            report.skipped,
            vec![Slice::TeamTemplates, Slice::Rooms, Slice::Tasks, Slice::Avatars]
        );
        assert_eq!(backend.row_count("settings"), 1);
    }

    #[tokio::test]
    async fn seed_failures_are_reported_and_later_waves_continue() {
        let backend = MemoryBackend::new();
        backend.fail_table("projects");

        let report = seed(&SyncConfig::new(), &backend, &OfficeState::default()).await;
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, Slice::Projects);
        assert!(report.written.contains(&Slice::Avatars));
        assert_eq!(backend.row_count("projects"), 0);
    }

    #[tokio::test]
    async fn bootstrap_hydrates_or_seeds() {
        let config = SyncConfig::new();
        let backend = MemoryBackend::new();
        let store = Store::default();

        let outcome = bootstrap(&config, &backend, &store).await;
        assert!(matches!(outcome, BootstrapOutcome::Seeded(ref r) if r.is_complete()));

        backend.clear_calls();
        let fresh = Store::new(OfficeState::empty());
        let outcome = bootstrap(&config, &backend, &fresh).await;
        assert!(matches!(outcome, BootstrapOutcome::Loaded(ref s) if s.len() == Slice::ALL.len()));
        assert_eq!(fresh.get_state().rooms().len(), store.get_state().rooms().len());
        assert!(backend
            .calls()
            .iter()
            .all(|c| matches!(c, BackendCall::Select { .. })));
    }

    #[tokio::test]
    async fn bootstrap_disabled() {
        let backend = MemoryBackend::new();
        let store = Store::new(OfficeState::empty());
        store.update(|s| s.rooms_mut().push(Room::new("r1", "Lab")));

        let outcome = bootstrap(&SyncConfig::disabled(), &backend, &store).await;
        assert_eq!(outcome, BootstrapOutcome::Disabled);
        assert_eq!(backend.call_count(), 0);
    }
}
