//! Mission-control kanban tasks.

use crate::codec::RowCodec;
use crate::error::CodecResult;
use crate::row::{Row, RowReader, RowWriter};
use serde::{Deserialize, Serialize};

/// Kanban column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not yet planned.
    #[default]
    Backlog,
    /// Planned.
    Todo,
    /// Being worked on.
    InProgress,
    /// Awaiting review.
    Review,
    /// Finished.
    Done,
}

impl TaskStatus {
    /// Column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Backlog => "backlog",
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
        }
    }

    /// Parses a column value; unknown values map to the backlog.
    pub fn parse(value: &str) -> Self {
        match value {
            "todo" => TaskStatus::Todo,
            "in_progress" => TaskStatus::InProgress,
            "review" => TaskStatus::Review,
            "done" => TaskStatus::Done,
            _ => TaskStatus::Backlog,
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    /// Whenever.
    Low,
    /// Normal.
    #[default]
    Medium,
    /// Soon.
    High,
    /// Now.
    Urgent,
}

impl TaskPriority {
    /// Column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }

    /// Parses a column value; unknown values map to medium.
    pub fn parse(value: &str) -> Self {
        match value {
            "low" => TaskPriority::Low,
            "high" => TaskPriority::High,
            "urgent" => TaskPriority::Urgent,
            _ => TaskPriority::Medium,
        }
    }
}

/// A card on the mission-control board.
///
/// The board order is the order of the store's task list. It is not a
/// field of the task; the encoder receives it as context and writes it to
/// the `sort_order` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Primary key.
    pub id: String,
    /// Card title.
    pub title: String,
    /// Card body.
    pub description: String,
    /// Kanban column.
    pub status: TaskStatus,
    /// Priority.
    pub priority: TaskPriority,
    /// Owning project.
    pub project_id: Option<String>,
    /// Assigned avatar.
    pub assignee_id: Option<String>,
    /// Labels.
    pub tags: Vec<String>,
    /// Due date (RFC 3339 date).
    pub due_date: Option<String>,
    /// Creation time (RFC 3339).
    pub created_at: String,
}

impl Task {
    /// Creates a backlog task.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            status: TaskStatus::Backlog,
            priority: TaskPriority::Medium,
            project_id: None,
            assignee_id: None,
            tags: Vec::new(),
            due_date: None,
            created_at: String::new(),
        }
    }

    /// Reads the board position stored on a row. Rows without one sort last.
    pub fn row_sort_order(row: &Row) -> u64 {
        RowReader::new(Self::TABLE, row).u64_or("sort_order", u64::MAX)
    }
}

impl RowCodec for Task {
    /// Board position.
    type Context = usize;

    const TABLE: &'static str = "mc_tasks";

    fn to_row(&self, sort_order: usize) -> Row {
        RowWriter::new(&self.id)
            .text("title", &self.title)
            .text("description", &self.description)
            .text("status", self.status.as_str())
            .text("priority", self.priority.as_str())
            .opt_text("project_id", self.project_id.as_deref())
            .opt_text("assignee_id", self.assignee_id.as_deref())
            .text_list("tags", &self.tags)
            .opt_text("due_date", self.due_date.as_deref())
            .text("created_at", &self.created_at)
            .u64("sort_order", sort_order as u64)
            .finish()
    }

    fn from_row(row: &Row) -> CodecResult<Self> {
        let r = RowReader::new(Self::TABLE, row);
        Ok(Self {
            id: r.id()?,
            title: r.text("title"),
            description: r.text("description"),
            status: TaskStatus::parse(&r.text("status")),
            priority: TaskPriority::parse(&r.text("priority")),
            project_id: r.opt_text("project_id"),
            assignee_id: r.opt_text("assignee_id"),
            tags: r.text_list("tags"),
            due_date: r.opt_text("due_date"),
            created_at: r.text("created_at"),
        })
    }
}
