//! Projects.

use crate::codec::RowCodec;
use crate::error::CodecResult;
use crate::row::{Row, RowReader, RowWriter};
use serde::{Deserialize, Serialize};

/// Lifecycle of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Being worked on.
    #[default]
    Active,
    /// On hold.
    Paused,
    /// Finished or abandoned.
    Archived,
}

impl ProjectStatus {
    /// Column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Paused => "paused",
            ProjectStatus::Archived => "archived",
        }
    }

    /// Parses a column value; unknown values map to the default.
    pub fn parse(value: &str) -> Self {
        match value {
            "paused" => ProjectStatus::Paused,
            "archived" => ProjectStatus::Archived,
            _ => ProjectStatus::Active,
        }
    }
}

/// A project rooms and tasks can be attached to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Primary key.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Label color (CSS hex).
    pub color: String,
    /// Lifecycle status.
    pub status: ProjectStatus,
    /// Creation time (RFC 3339).
    pub created_at: String,
}

impl Project {
    /// Creates an active project.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            color: DEFAULT_COLOR.to_string(),
            status: ProjectStatus::Active,
            created_at: String::new(),
        }
    }
}

const DEFAULT_COLOR: &str = "#f59e0b";

impl RowCodec for Project {
    type Context = ();

    const TABLE: &'static str = "projects";

    fn to_row(&self, _ctx: ()) -> Row {
        RowWriter::new(&self.id)
            .text("name", &self.name)
            .text("description", &self.description)
            .text("color", &self.color)
            .text("status", self.status.as_str())
            .text("created_at", &self.created_at)
            .finish()
    }

    fn from_row(row: &Row) -> CodecResult<Self> {
        let r = RowReader::new(Self::TABLE, row);
        Ok(Self {
            id: r.id()?,
            name: r.text("name"),
            description: r.text("description"),
            color: r.text_or("color", DEFAULT_COLOR),
            status: ProjectStatus::parse(&r.text("status")),
            created_at: r.text("created_at"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_description_decodes_to_empty_string() {
        let row = json!({ "id": "p1", "name": "Atlas", "description": null })
            .as_object()
            .cloned()
            .unwrap();
        let project = Project::from_row(&row).unwrap();
        assert_eq!(project.description, "");
        assert_eq!(project.status, ProjectStatus::Active);
    }

    #[test]
    fn status_round_trip() {
        for status in [
            ProjectStatus::Active,
            ProjectStatus::Paused,
            ProjectStatus::Archived,
        ] {
            assert_eq!(ProjectStatus::parse(status.as_str()), status);
        }
        assert_eq!(ProjectStatus::parse("exploded"), ProjectStatus::Active);
    }
}
