//! Team member avatars.

use super::Vec3;
use crate::codec::RowCodec;
use crate::error::CodecResult;
use crate::row::{Row, RowReader, RowWriter};
use serde::{Deserialize, Serialize};

/// What an avatar is doing right now.
///
/// Driven by the running session only. It is never persisted, and every
/// avatar loaded from the backend starts out idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvatarStatus {
    /// Standing around.
    #[default]
    Idle,
    /// Working on a task.
    Working,
    /// In a meeting.
    Meeting,
    /// Away from the office.
    Away,
}

/// A team member placed in the office scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Avatar {
    /// Primary key.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Job title.
    pub role: String,
    /// Body color (CSS hex).
    pub color: String,
    /// Room the avatar currently belongs to.
    pub room_id: Option<String>,
    /// Position in the scene; changes on every frame while dragged.
    pub position: Vec3,
    /// Skill tags.
    pub skills: Vec<String>,
    /// Runtime-only activity.
    #[serde(default)]
    pub status: AvatarStatus,
}

impl Avatar {
    /// Creates an idle avatar at the origin.
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: role.into(),
            color: DEFAULT_COLOR.to_string(),
            room_id: None,
            position: Vec3::default(),
            skills: Vec::new(),
            status: AvatarStatus::Idle,
        }
    }
}

const DEFAULT_COLOR: &str = "#22c55e";

impl RowCodec for Avatar {
    type Context = ();

    const TABLE: &'static str = "avatars";

    fn to_row(&self, _ctx: ()) -> Row {
        RowWriter::new(&self.id)
            .text("name", &self.name)
            .text("role", &self.role)
            .text("color", &self.color)
            .opt_text("room_id", self.room_id.as_deref())
            .value("position", self.position.to_json())
            .text_list("skills", &self.skills)
            .finish()
    }

    fn from_row(row: &Row) -> CodecResult<Self> {
        let r = RowReader::new(Self::TABLE, row);
        Ok(Self {
            id: r.id()?,
            name: r.text("name"),
            role: r.text("role"),
            color: r.text_or("color", DEFAULT_COLOR),
            room_id: r.opt_text("room_id"),
            position: Vec3::from_json(r.value("position")),
            skills: r.text_list("skills"),
            status: AvatarStatus::Idle,
        })
    }
}
