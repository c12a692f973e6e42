//! # OfficeSync Engine
//!
//! Write-back synchronization between the office store and a hosted
//! table backend.
//!
//! This crate provides:
//! - The `Backend` abstraction, an in-memory backend and a REST backend
//! - A reactive `Store` holding the office state
//! - Bootstrap: load persisted state, or seed an empty backend
//! - Dirty-slice tracking with two debounce tiers
//! - `SyncEngine`, which ties the store to the backend
//!
//! ## Architecture
//!
//! The engine never reads the backend after startup. Every store update
//! marks the slices whose keys changed; each tier waits until its slices
//! have been quiet for the settle window, then writes the latest value of
//! every dirty slice with one upsert:
//! 1. Positional slices (rooms, avatars) settle after 2000 ms
//! 2. Everything else settles after 500 ms
//! 3. `flush()` writes everything now
//!
//! ## Key Invariants
//!
//! - UI-only store keys are never written
//! - A drain writes each dirty slice exactly once, from the latest state
//! - Writes are never retried; failures are logged and counted
//! - A disabled configuration performs no I/O at all

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod bootstrap;
mod config;
mod engine;
mod error;
mod http;
mod store;
mod tracker;

pub use backend::{Backend, BackendCall, MemoryBackend};
pub use bootstrap::{bootstrap, load, seed, BootstrapOutcome, SeedReport};
pub use config::{
    RestConfig, SyncConfig, DEFAULT_NORMAL_WINDOW, DEFAULT_POSITION_WINDOW, ENV_API_KEY, ENV_URL,
};
pub use engine::{FlushHandle, FlushReport, SyncEngine, SyncStats};
pub use error::{SyncError, SyncResult};
pub use http::{HttpClient, HttpRequest, HttpResponse, LoopbackClient, Method, RestBackend};
pub use store::{StateListener, StateSource, Store, Subscription};
pub use tracker::{DispatchedWrite, DrainReport, FlushReason};
