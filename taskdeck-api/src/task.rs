//! Task types for the `TaskDeck` backend contract.
//!
//! The `Task` record is the server's authoritative representation; the
//! request DTOs (`TaskCreate`, `TaskUpdate`, `TaskStatusUpdate`) carry
//! exactly the fields the backend accepts for each endpoint. `TaskCreate`
//! has no id field: the server assigns ids, and a locally synthesized
//! placeholder id can therefore never reach the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum allowed task title length in characters.
pub const MAX_TITLE_LENGTH: usize = 100;

/// Maximum allowed task description length in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// Unique identifier for a task.
///
/// Server-assigned ids are UUIDs; the client synthesizes placeholder ids
/// with [`TaskId::new`] for entries awaiting creation confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new random task identifier (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `TaskId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a task.
///
/// The backend knows exactly these two values; a task carries exactly one
/// of them at all times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Task has not been completed yet.
    Pending,
    /// Task has been completed.
    Completed,
}

impl TaskStatus {
    /// Returns the complement of this status.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Pending => Self::Completed,
            Self::Completed => Self::Pending,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// A task record as returned by the backend.
///
/// Timestamps are RFC 3339 UTC on the wire. `due_date`, when present, is
/// normalized to the last instant of its calendar day in UTC (see
/// [`crate::draft`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: TaskId,
    /// Task title (1 to [`MAX_TITLE_LENGTH`] characters).
    pub title: String,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Current status.
    pub status: TaskStatus,
    /// Optional due date, end-of-day UTC.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// When the task was created (server clock).
    pub created_at: DateTime<Utc>,
    /// When the task was last modified (server clock).
    pub updated_at: DateTime<Utc>,
    /// Id of the owning user.
    pub user_id: String,
}

/// Request body for `POST /api/v1/tasks/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCreate {
    /// Task title, already trimmed and length-checked.
    pub title: String,
    /// Optional description, already length-checked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional due date, end-of-day UTC.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

/// Request body for `PUT /api/v1/tasks/{id}`.
///
/// Fields left as `None` are not serialized and stay untouched on the
/// server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdate {
    /// New title, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New status, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// New due date, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

/// Request body for `PATCH /api/v1/tasks/{id}/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatusUpdate {
    /// The status to set.
    pub status: TaskStatus,
}
