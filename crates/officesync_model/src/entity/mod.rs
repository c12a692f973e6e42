//! Domain entities and their row codecs.

mod avatar;
mod project;
mod room;
mod settings;
mod task;
mod team;

pub use avatar::{Avatar, AvatarStatus};
pub use project::{Project, ProjectStatus};
pub use room::{Room, RoomSize};
pub use settings::{Settings, Theme, SETTINGS_ROW_ID};
pub use task::{Task, TaskPriority, TaskStatus};
pub use team::{TeamTemplate, TemplateRole};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Generates a fresh entity id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A point in the office scene.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate (height).
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl Vec3 {
    /// Creates a point.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Encodes as a structured `{x, y, z}` column value.
    pub fn to_json(&self) -> Value {
        json!({ "x": self.x, "y": self.y, "z": self.z })
    }

    /// Decodes from a structured column value. Missing components are 0.
    pub fn from_json(value: Option<&Value>) -> Self {
        let Some(obj) = value.and_then(Value::as_object) else {
            return Self::default();
        };
        let axis = |name: &str| obj.get(name).and_then(Value::as_f64).unwrap_or(0.0);
        Self::new(axis("x"), axis("y"), axis("z"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec3_json() {
        let p = Vec3::new(1.5, 0.0, -3.25);
        assert_eq!(Vec3::from_json(Some(&p.to_json())), p);
        assert_eq!(Vec3::from_json(None), Vec3::default());
        assert_eq!(
            Vec3::from_json(Some(&json!({"x": 2}))),
            Vec3::new(2.0, 0.0, 0.0)
        );
        assert_eq!(Vec3::from_json(Some(&json!("1,2,3"))), Vec3::default());
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(new_id(), new_id());
    }
}
