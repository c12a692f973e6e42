//! Team templates: reusable staffing plans for new rooms.

use crate::codec::RowCodec;
use crate::error::CodecResult;
use crate::row::{Row, RowReader, RowWriter};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One line of a team template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRole {
    /// Job title.
    pub title: String,
    /// Number of seats.
    pub count: u32,
}

impl TemplateRole {
    /// Creates a role line.
    pub fn new(title: impl Into<String>, count: u32) -> Self {
        Self {
            title: title.into(),
            count,
        }
    }

    fn to_json(&self) -> Value {
        json!({ "title": self.title, "count": self.count })
    }

    fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let title = obj.get("title")?.as_str()?.to_string();
        let count = obj
            .get("count")
            .and_then(Value::as_u64)
            .and_then(|c| u32::try_from(c).ok())
            .unwrap_or(1);
        Some(Self { title, count })
    }
}

/// A named set of roles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamTemplate {
    /// Primary key.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Optional icon name.
    pub icon: Option<String>,
    /// Staffing lines.
    pub roles: Vec<TemplateRole>,
}

impl TeamTemplate {
    /// Creates an empty template.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            icon: None,
            roles: Vec::new(),
        }
    }

    /// Total seats across all roles.
    pub fn headcount(&self) -> u32 {
        self.roles.iter().map(|r| r.count).sum()
    }
}

impl RowCodec for TeamTemplate {
    type Context = ();

    const TABLE: &'static str = "team_templates";

    fn to_row(&self, _ctx: ()) -> Row {
        let roles = self.roles.iter().map(TemplateRole::to_json).collect();
        RowWriter::new(&self.id)
            .text("name", &self.name)
            .text("description", &self.description)
            .opt_text("icon", self.icon.as_deref())
            .value("roles", Value::Array(roles))
            .finish()
    }

    fn from_row(row: &Row) -> CodecResult<Self> {
        let r = RowReader::new(Self::TABLE, row);
        Ok(Self {
            id: r.id()?,
            name: r.text("name"),
            description: r.text("description"),
            icon: r.opt_text("icon"),
            roles: r
                .array("roles")
                .iter()
                .filter_map(TemplateRole::from_json)
                .collect(),
        })
    }
}
