//! Test fixtures and engine helpers.
//!
//! Provides convenience functions for setting up an engine against an
//! in-memory backend and for driving common store mutations.

use officesync_engine::{MemoryBackend, Store, SyncConfig, SyncEngine};
use officesync_model::{Avatar, OfficeState, Project, Room, Row, Vec3};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Position tier window used by [`fast_config`].
pub const FAST_POSITION_WINDOW: Duration = Duration::from_millis(200);

/// Normal tier window used by [`fast_config`].
pub const FAST_NORMAL_WINDOW: Duration = Duration::from_millis(50);

/// An enabled configuration with short windows.
pub fn fast_config() -> SyncConfig {
    SyncConfig::new()
        .with_position_window(FAST_POSITION_WINDOW)
        .with_normal_window(FAST_NORMAL_WINDOW)
}

/// A store, an in-memory backend and an engine connecting them.
pub struct SyncHarness {
    /// The store.
    pub store: Arc<Store>,
    /// The backend.
    pub backend: Arc<MemoryBackend>,
    /// The engine.
    pub engine: SyncEngine<MemoryBackend, Store>,
}

impl SyncHarness {
    /// Starts an engine over an empty office. Must be called inside a
    /// tokio runtime for the engine to run.
    pub fn start(config: SyncConfig) -> Self {
        Self::with_state(config, OfficeState::empty())
    }

    /// Starts an engine over `state`.
    pub fn with_state(config: SyncConfig, state: OfficeState) -> Self {
        Self::with_backend(config, state, Arc::new(MemoryBackend::new()))
    }

    /// Starts an engine over `state` writing to `backend`.
    pub fn with_backend(
        config: SyncConfig,
        state: OfficeState,
        backend: Arc<MemoryBackend>,
    ) -> Self {
        let store = Arc::new(Store::new(state));
        let engine = SyncEngine::start(config, Arc::clone(&backend), Arc::clone(&store));
        Self {
            store,
            backend,
            engine,
        }
    }

    /// Tables written so far, in call order.
    pub fn written_tables(&self) -> Vec<String> {
        self.backend
            .calls()
            .iter()
            .map(|call| call.table().to_string())
            .collect()
    }
}

/// Sleeps on the tokio clock. With a paused clock this advances time
/// deterministically and lets every ready task run.
pub async fn settle(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// An office with one project, one room and one avatar in it.
pub fn small_office() -> OfficeState {
    let mut state = OfficeState::empty();

    let project = Project::new("p1", "Atlas");
    let mut room = Room::new("r1", "Lab");
    room.project_id = Some(project.id.clone());
    let mut avatar = Avatar::new("a1", "Ada", "Engineer");
    avatar.room_id = Some(room.id.clone());

    state.projects_mut().push(project);
    state.rooms_mut().push(room);
    state.avatars_mut().push(avatar);
    state
}

/// Moves an avatar by `(dx, dz)`. Does nothing if the avatar is unknown.
pub fn nudge_avatar(store: &Store, id: &str, dx: f64, dz: f64) {
    store.update(|state| {
        if let Some(avatar) = state.avatar_mut(id) {
            avatar.position = Vec3::new(
                avatar.position.x + dx,
                avatar.position.y,
                avatar.position.z + dz,
            );
        }
    });
}

/// Builds a row from a JSON object literal.
///
/// # Panics
///
/// Panics if `value` is not an object.
pub fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Reads a `{x, y, z}` column back into a point.
pub fn position_of(row: &Row) -> Vec3 {
    Vec3::from_json(row.get("position"))
}
