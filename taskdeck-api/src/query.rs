//! Task listing query parameters and the paginated response envelope.
//!
//! The backend owns ordering and pagination; the client only resends the
//! query parameters it was given. `Pagination::pages` is what drives the
//! pagination controls in the UI.

use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskStatus};

/// Default page size for task listings.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Sort direction for task listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Oldest first.
    Asc,
    /// Newest first (backend default).
    Desc,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

/// Query parameters for `GET /api/v1/tasks/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    /// Restrict results to one status; `None` returns all tasks.
    pub status: Option<TaskStatus>,
    /// 1-based page number.
    pub page: u32,
    /// Items per page.
    pub limit: u32,
    /// Field to sort by.
    pub sort_by: String,
    /// Sort direction.
    pub order: SortOrder,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            status: None,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            sort_by: "created_at".to_string(),
            order: SortOrder::Desc,
        }
    }
}

impl TaskQuery {
    /// Returns the query string pairs for this query.
    ///
    /// `status` is omitted entirely when no filter is active, matching the
    /// backend's "absent means all" convention.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
            ("sort_by", self.sort_by.clone()),
            ("order", self.order.to_string()),
        ];
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        pairs
    }
}

/// Pagination metadata returned alongside a task page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// The page that was returned (1-based).
    pub page: u32,
    /// Items per page.
    pub limit: u32,
    /// Total number of matching tasks across all pages.
    pub total: u64,
    /// Total number of pages.
    pub pages: u32,
}

/// Response body for `GET /api/v1/tasks/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPage {
    /// The tasks on this page, in server order.
    pub tasks: Vec<Task>,
    /// Pagination metadata.
    pub pagination: Pagination,
}
