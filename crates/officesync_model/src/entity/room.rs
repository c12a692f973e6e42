//! Office rooms.

use super::Vec3;
use crate::codec::RowCodec;
use crate::error::CodecResult;
use crate::row::{Row, RowReader, RowWriter};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Floor footprint of a room.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomSize {
    /// Extent along X.
    pub width: f64,
    /// Extent along Z.
    pub depth: f64,
}

impl Default for RoomSize {
    fn default() -> Self {
        Self {
            width: 8.0,
            depth: 6.0,
        }
    }
}

impl RoomSize {
    fn to_json(self) -> Value {
        json!({ "width": self.width, "depth": self.depth })
    }

    fn from_json(value: Option<&Value>) -> Self {
        let default = Self::default();
        let Some(obj) = value.and_then(Value::as_object) else {
            return default;
        };
        Self {
            width: obj
                .get("width")
                .and_then(Value::as_f64)
                .unwrap_or(default.width),
            depth: obj
                .get("depth")
                .and_then(Value::as_f64)
                .unwrap_or(default.depth),
        }
    }
}

/// A room placed in the office scene, optionally dedicated to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// Primary key.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Project this room is dedicated to.
    pub project_id: Option<String>,
    /// Center of the floor.
    pub position: Vec3,
    /// Footprint.
    pub size: RoomSize,
    /// Accent color (CSS hex).
    pub color: String,
    /// Furniture and equipment tags.
    pub features: Vec<String>,
}

impl Room {
    /// Creates an empty room at the origin.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            project_id: None,
            position: Vec3::default(),
            size: RoomSize::default(),
            color: DEFAULT_COLOR.to_string(),
            features: Vec::new(),
        }
    }
}

const DEFAULT_COLOR: &str = "#4f46e5";

impl RowCodec for Room {
    type Context = ();

    const TABLE: &'static str = "rooms";

    fn to_row(&self, _ctx: ()) -> Row {
        RowWriter::new(&self.id)
            .text("name", &self.name)
            .opt_text("project_id", self.project_id.as_deref())
            .value("position", self.position.to_json())
            .value("size", self.size.to_json())
            .text("color", &self.color)
            .text_list("features", &self.features)
            .finish()
    }

    fn from_row(row: &Row) -> CodecResult<Self> {
        let r = RowReader::new(Self::TABLE, row);
        Ok(Self {
            id: r.id()?,
            name: r.text("name"),
            project_id: r.opt_text("project_id"),
            position: Vec3::from_json(r.value("position")),
            size: RoomSize::from_json(r.value("size")),
            color: r.text_or("color", DEFAULT_COLOR),
            features: r.text_list("features"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_columns_stay_structured() {
        let mut room = Room::new("r1", "War Room");
        room.position = Vec3::new(4.0, 0.0, -2.0);
        room.features = vec!["whiteboard".into(), "screen".into()];

        let row = room.to_row(());
        assert!(row["position"].is_object());
        assert!(row["features"].is_array());
        assert_eq!(row["size"]["width"], json!(8.0));
        assert_eq!(Room::from_row(&row).unwrap(), room);
    }

    #[test]
    fn sparse_row_decodes_to_defaults() {
        let row = json!({ "id": "r2" }).as_object().cloned().unwrap();
        let room = Room::from_row(&row).unwrap();
        assert_eq!(room.name, "");
        assert_eq!(room.project_id, None);
        assert_eq!(room.size, RoomSize::default());
        assert_eq!(room.color, DEFAULT_COLOR);
        assert!(room.features.is_empty());
    }
}
