//! End-to-end tests: bootstrap, steady-state writes and shutdown across
//! the in-memory and REST backends.

use officesync_engine::{
    bootstrap, load, BootstrapOutcome, LoopbackClient, MemoryBackend, RestBackend, RestConfig,
    StateSource, Store, SyncEngine,
};
use officesync_model::{OfficeState, Slice, Task, TaskStatus, Theme, Tier};
use officesync_testkit::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn fresh_backend_is_seeded_then_kept_in_step() {
    let config = fast_config();
    let backend = Arc::new(MemoryBackend::new());
    let store = Arc::new(Store::default());

    let outcome = bootstrap(&config, backend.as_ref(), &store).await;
    let BootstrapOutcome::Seeded(report) = outcome else {
        panic!("expected a seed, got {outcome:?}");
    };
    assert!(report.is_complete());
    backend.clear_calls();

    let engine = SyncEngine::start(config, Arc::clone(&backend), Arc::clone(&store));
    store.update(|s| s.tasks_mut()[0].status = TaskStatus::Done);
    settle(FAST_NORMAL_WINDOW * 2).await;

    assert_eq!(backend.upserts("mc_tasks").len(), 1);
    let stored = backend.row("mc_tasks", &store.get_state().tasks()[0].id).unwrap();
    assert_eq!(stored["status"], "done");
    engine.stop();
}

#[tokio::test(start_paused = true)]
async fn hydration_before_start_schedules_nothing() {
    let config = fast_config();
    let backend = Arc::new(MemoryBackend::new());
    backend.insert_rows(
        "rooms",
        vec![row(json!({"id": "r9", "name": "Archive", "position": {"x": 2, "y": 0, "z": 4}}))],
    );

    let store = Arc::new(Store::new(OfficeState::empty()));
    let outcome = bootstrap(&config, backend.as_ref(), &store).await;
    assert_eq!(outcome, BootstrapOutcome::Loaded(vec![Slice::Rooms]));
    assert_eq!(store.get_state().rooms()[0].position.z, 4.0);

    let engine = SyncEngine::start(config, Arc::clone(&backend), Arc::clone(&store));
    settle(Duration::from_secs(5)).await;
    assert_eq!(backend.upsert_count(), 0);
    assert!(engine.pending(Tier::Position).is_empty());
}

#[tokio::test(start_paused = true)]
async fn loaded_state_survives_a_restart() {
    let backend = Arc::new(MemoryBackend::new());

    {
        let harness = SyncHarness::with_backend(fast_config(), small_office(), Arc::clone(&backend));
        harness.store.update(|s| {
            s.set_theme(Theme::Light);
            s.tasks_mut().extend([Task::new("t2", "second"), Task::new("t1", "first")]);
        });
        nudge_avatar(&harness.store, "a1", 4.0, 0.0);
        harness.engine.flush().wait().await;
    }

    let partial = load(&fast_config(), backend.as_ref()).await.unwrap();
    assert_eq!(partial.settings.unwrap().theme, Theme::Light);
    let ids: Vec<_> = partial.tasks.unwrap().into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec!["t2", "t1"]);
    assert_eq!(partial.avatars.unwrap()[0].position.x, 4.0);
}

#[tokio::test(start_paused = true)]
async fn rest_backend_over_loopback() {
    let memory = Arc::new(MemoryBackend::new());
    let rest = Arc::new(RestBackend::new(
        RestConfig::new("https://office.example.co", "anon"),
        LoopbackClient::new(Arc::clone(&memory)),
    ));
    let store = Arc::new(Store::new(small_office()));
    let engine = SyncEngine::start(fast_config(), Arc::clone(&rest), Arc::clone(&store));

    store.update(|s| s.set_office_name("Remote HQ"));
    nudge_avatar(&store, "a1", 1.0, 0.0);
    let report = engine.flush().wait().await;

    assert!(report.is_clean());
    assert_eq!(report.flushed, vec![Slice::Avatars, Slice::Settings]);
    assert_eq!(memory.row("settings", "default").unwrap()["office_name"], "Remote HQ");
    assert!(rest.last_error().is_none());
}

#[tokio::test(start_paused = true)]
async fn failed_write_is_dropped_until_the_slice_changes_again() {
    let harness = SyncHarness::with_state(fast_config(), small_office());
    harness.backend.fail_table("projects");

    harness.store.update(|s| s.projects_mut()[0].name = "Lost".into());
    settle(FAST_NORMAL_WINDOW * 2).await;
    assert_eq!(harness.engine.stats().upserts_failed, 1);
    assert!(harness.engine.pending(Tier::Normal).is_empty());

    harness.backend.heal_table("projects");
    settle(Duration::from_secs(5)).await;
    assert_eq!(harness.backend.row_count("projects"), 0);

    harness.store.update(|s| s.projects_mut()[0].name = "Found".into());
    settle(FAST_NORMAL_WINDOW * 2).await;
    assert_eq!(harness.backend.row("projects", "p1").unwrap()["name"], "Found");
    assert_eq!(harness.engine.stats().upserts_issued, 2);
}

#[tokio::test(start_paused = true)]
async fn stop_lets_in_flight_writes_finish() {
    let harness = SyncHarness::with_state(fast_config(), small_office());
    harness.backend.set_latency(Duration::from_millis(300));

    harness.store.update(|s| s.set_sound_enabled(true));
    let handle = harness.engine.flush();
    harness.engine.stop();

    let report = handle.wait().await;
    assert_eq!(report.flushed, vec![Slice::Settings]);
    assert_eq!(harness.backend.row_count("settings"), 1);
}

#[tokio::test(start_paused = true)]
async fn engines_do_not_share_state() {
    let first = SyncHarness::start(fast_config());
    let second = SyncHarness::start(fast_config());

    first.store.update(|s| s.set_theme(Theme::Light));
    assert_eq!(first.engine.pending(Tier::Normal), vec![Slice::Settings]);
    assert!(second.engine.pending(Tier::Normal).is_empty());

    settle(FAST_POSITION_WINDOW * 2).await;
    assert_eq!(first.backend.upsert_count(), 1);
    assert_eq!(second.backend.upsert_count(), 0);
}
