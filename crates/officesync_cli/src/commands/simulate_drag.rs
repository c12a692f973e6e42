//! Simulate-drag command implementation.
//!
//! Bootstraps a store from the backend, starts the engine and moves one
//! avatar in small steps, the way a pointer drag does, then reports how
//! many writes reached the backend.

use super::{CommandResult, Format};
use officesync_engine::{bootstrap, Backend, StateSource, Store, SyncConfig, SyncEngine};
use officesync_model::Vec3;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Drag parameters.
#[derive(Debug, Clone)]
pub struct DragOptions {
    /// Avatar to move; the first avatar when `None`.
    pub avatar: Option<String>,
    /// Number of moves.
    pub steps: usize,
    /// Delay between moves.
    pub interval: Duration,
    /// Distance per move along x.
    pub dx: f64,
    /// Distance per move along z.
    pub dz: f64,
}

impl Default for DragOptions {
    fn default() -> Self {
        Self {
            avatar: None,
            steps: 50,
            interval: Duration::from_millis(38),
            dx: 0.1,
            dz: 0.0,
        }
    }
}

/// Drag outcome.
#[derive(Debug, Serialize)]
pub struct DragSummary {
    /// Avatar moved.
    pub avatar: String,
    /// Moves applied.
    pub moves: usize,
    /// Upserts dispatched by the engine.
    pub upserts_issued: u64,
    /// Upserts that failed.
    pub upserts_failed: u64,
    /// Final position.
    pub final_position: Vec3,
}

/// Runs the drag and waits for the position tier to settle.
pub async fn simulate<B: Backend>(
    backend: Arc<B>,
    config: SyncConfig,
    options: &DragOptions,
) -> CommandResult<DragSummary> {
    let store = Arc::new(Store::default());
    bootstrap(&config, backend.as_ref(), &store).await;

    let avatar = match &options.avatar {
        Some(id) => id.clone(),
        None => store
            .get_state()
            .avatars()
            .first()
            .map(|a| a.id.clone())
            .ok_or("the office has no avatars")?,
    };
    if !store.get_state().avatars().iter().any(|a| a.id == avatar) {
        return Err(format!("no avatar with id {avatar:?}").into());
    }

    let settle = config.position_window + Duration::from_millis(100);
    let engine = SyncEngine::start(config, backend, Arc::clone(&store));
    info!(avatar = %avatar, steps = options.steps, "dragging");

    for _ in 0..options.steps {
        store.update(|state| {
            if let Some(a) = state.avatar_mut(&avatar) {
                a.position = Vec3::new(
                    a.position.x + options.dx,
                    a.position.y,
                    a.position.z + options.dz,
                );
            }
        });
        tokio::time::sleep(options.interval).await;
    }

    tokio::time::sleep(settle).await;
    engine.flush().wait().await;
    engine.stop();

    let stats = engine.stats();
    let final_position = store
        .get_state()
        .avatars()
        .iter()
        .find(|a| a.id == avatar)
        .map(|a| a.position)
        .unwrap_or_default();

    Ok(DragSummary {
        avatar,
        moves: options.steps,
        upserts_issued: stats.upserts_issued,
        upserts_failed: stats.upserts_failed,
        final_position,
    })
}

/// Runs the simulate-drag command.
pub async fn run<B: Backend>(
    backend: Arc<B>,
    config: SyncConfig,
    options: &DragOptions,
    format: Format,
) -> CommandResult<String> {
    let summary = simulate(backend, config, options).await?;
    Ok(match format {
        Format::Json => serde_json::to_string_pretty(&summary)?,
        Format::Text => format!(
            "moved {} {} times; {} upserts ({} failed); now at ({:.2}, {:.2}, {:.2})",
            summary.avatar,
            summary.moves,
            summary.upserts_issued,
            summary.upserts_failed,
            summary.final_position.x,
            summary.final_position.y,
            summary.final_position.z,
        ),
    })
}
