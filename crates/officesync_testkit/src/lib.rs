//! # OfficeSync Testkit
//!
//! Test utilities for OfficeSync.
//!
//! This crate provides:
//! - A harness wiring a store, an in-memory backend and a running engine
//! - Row and state fixtures
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use officesync_testkit::prelude::*;
//!
//! #[tokio::test(start_paused = true)]
//! async fn writes_after_settling() {
//!     let harness = SyncHarness::start(fast_config());
//!     harness.store.update(|s| s.set_theme(Theme::Light));
//!     settle(Duration::from_millis(100)).await;
//!     assert_eq!(harness.backend.upserts("settings").len(), 1);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
