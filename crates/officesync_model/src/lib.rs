//! # OfficeSync Model
//!
//! Domain entities and row codecs for the OfficeSync state engine.
//!
//! This crate provides:
//! - The virtual-office entities (rooms, avatars, projects, team
//!   templates, mission-control tasks, settings)
//! - `Slice`, `Tier` and `StoreKey`, the vocabulary shared by the
//!   tracker and the scheduler
//! - `RowCodec`, the bidirectional mapping between entities and the
//!   backend's snake_case rows
//! - `OfficeState`, the top-level store value with per-key revision stamps
//!
//! This is a pure data crate with no I/O operations.
//!
//! ## Key Invariants
//!
//! - Every `Slice` has exactly one table and exactly one `Tier`
//! - Runtime-only fields are never written to a row
//! - Decoding tolerates missing optional columns; only a missing primary
//!   key is an error

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod codec;
mod defaults;
mod entity;
mod error;
mod row;
mod slice;
mod state;

pub use codec::RowCodec;
pub use entity::{
    new_id, Avatar, AvatarStatus, Project, ProjectStatus, Room, RoomSize, Settings, Task,
    TaskPriority, TaskStatus, TeamTemplate, TemplateRole, Theme, Vec3, SETTINGS_ROW_ID,
};
pub use error::{CodecError, CodecResult};
pub use row::{Row, RowReader, RowWriter, PRIMARY_KEY};
pub use slice::{Slice, StoreKey, Tier};
pub use state::{CameraMode, OfficeState, PartialState};
