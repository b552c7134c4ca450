//! Task collection mirror with optimistic reconciliation.
//!
//! [`TaskStore`] owns the client's ordered copy of one server page and is
//! the only place local task state is mutated. Optimistic operations
//! (create, toggle, delete) apply a local change first and reconcile with
//! the server's authoritative response, rolling back to a captured snapshot
//! on failure; `update` is confirm-first and touches local state only after
//! the server has answered.
//!
//! Every operation takes `&mut self` across its await, so two mutations on
//! one store cannot overlap from safe single-owner code; the UI additionally
//! disables submitting controls while a command is in flight. Concurrent
//! edits from other clients are out of scope and resolved by refresh.

mod mutation;

use chrono::Utc;
use thiserror::Error;

use taskdeck_api::draft::{self, TaskDraft, ValidationError};
use taskdeck_api::query::TaskQuery;
use taskdeck_api::task::{Task, TaskId, TaskStatus, TaskUpdate};

use crate::backend::{ApiError, Backend};
use mutation::Mutation;

/// Failures surfaced by store operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The draft was rejected before any network call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backend call failed; optimistic state has been rolled back.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The operation named a task that is not in the local collection.
    #[error("unknown task: {0}")]
    UnknownTask(TaskId),
}

/// The client-side mirror of one page of tasks, plus its view parameters.
pub struct TaskStore<B> {
    backend: B,
    tasks: Vec<Task>,
    page: u32,
    pages: u32,
    total: u64,
    filter: Option<TaskStatus>,
    page_size: u32,
}

impl<B: Backend> TaskStore<B> {
    /// Creates an empty store over the given backend.
    pub fn new(backend: B, page_size: u32) -> Self {
        Self {
            backend,
            tasks: Vec::new(),
            page: 1,
            pages: 0,
            total: 0,
            filter: None,
            page_size: page_size.max(1),
        }
    }

    /// The tasks currently mirrored, in server order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Current page number (1-based).
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Total page count reported by the last listing.
    #[must_use]
    pub const fn pages(&self) -> u32 {
        self.pages
    }

    /// Total matching tasks reported by the last listing.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Active status filter.
    #[must_use]
    pub const fn filter(&self) -> Option<TaskStatus> {
        self.filter
    }

    /// The backend this store drives; auth calls go through here too.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Re-requests the current page and replaces the whole local collection
    /// with the response. No client-side merging across pages ever happens.
    ///
    /// # Errors
    ///
    /// Surfaces the [`ApiError`] untouched; local state is left as it was.
    pub async fn refresh(&mut self) -> Result<(), StoreError> {
        let query = TaskQuery {
            status: self.filter,
            page: self.page,
            limit: self.page_size,
            ..TaskQuery::default()
        };
        let page = self.backend.list_tasks(&query).await?;
        self.tasks = page.tasks;
        self.page = page.pagination.page;
        self.pages = page.pagination.pages;
        self.total = page.pagination.total;
        tracing::debug!(
            page = self.page,
            pages = self.pages,
            total = self.total,
            "task page refreshed"
        );
        Ok(())
    }

    /// Switches the status filter and reloads from page 1.
    ///
    /// # Errors
    ///
    /// Surfaces the [`ApiError`] from the reload.
    pub async fn set_filter(&mut self, filter: Option<TaskStatus>) -> Result<(), StoreError> {
        self.filter = filter;
        self.page = 1;
        self.refresh().await
    }

    /// Loads the given page (clamped to at least 1).
    ///
    /// # Errors
    ///
    /// Surfaces the [`ApiError`] from the reload.
    pub async fn goto_page(&mut self, page: u32) -> Result<(), StoreError> {
        self.page = page.max(1);
        self.refresh().await
    }

    /// Creates a task optimistically.
    ///
    /// The draft is validated first; a rejected draft costs no network call.
    /// A fully-formed placeholder with a locally synthesized id is inserted
    /// at the head, then the create request is sent. On success the
    /// placeholder is replaced in place by the server's task; on failure it
    /// is removed entirely.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`] before any request, or the backend's
    /// [`ApiError`] after rollback.
    pub async fn create(&mut self, task_draft: &TaskDraft) -> Result<(), StoreError> {
        let body = draft::validate(task_draft)?;

        let now = Utc::now();
        let placeholder = Task {
            id: TaskId::new(),
            title: body.title.clone(),
            description: body.description.clone(),
            status: TaskStatus::Pending,
            due_date: body.due_date,
            created_at: now,
            updated_at: now,
            user_id: String::new(),
        };
        let mutation = Mutation::Create { placeholder };
        mutation.apply(&mut self.tasks);

        match self.backend.create_task(&body).await {
            Ok(task) => {
                mutation.commit(&mut self.tasks, Some(task));
                self.total += 1;
                Ok(())
            }
            Err(e) => {
                tracing::debug!(error = %e, "create failed, removing placeholder");
                mutation.rollback(&mut self.tasks);
                Err(e.into())
            }
        }
    }

    /// Edits a task's fields, confirm-first.
    ///
    /// Local state is only touched once the server has answered, so a
    /// concurrent edit from elsewhere is never overwritten by a stale local
    /// guess. The patch carries the draft's title/description/due date and
    /// leaves the status alone.
    ///
    /// # Errors
    ///
    /// [`StoreError::Validation`], [`StoreError::UnknownTask`], or the
    /// backend's [`ApiError`]; local state is untouched in all three cases.
    pub async fn update(&mut self, id: TaskId, task_draft: &TaskDraft) -> Result<(), StoreError> {
        let body = draft::validate(task_draft)?;
        if !self.tasks.iter().any(|t| t.id == id) {
            return Err(StoreError::UnknownTask(id));
        }

        let patch = TaskUpdate {
            title: Some(body.title),
            description: body.description,
            status: None,
            due_date: body.due_date,
        };
        let task = self.backend.update_task(id, &patch).await?;
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == id) {
            *slot = task;
        }
        Ok(())
    }

    /// Flips a task's status optimistically.
    ///
    /// The flip and a fresh `updated_at` are applied immediately, then the
    /// full patch carrying the new status is sent. On success the entry is
    /// replaced by the server's response; on failure the pre-toggle snapshot
    /// is restored verbatim — no extra round trip.
    ///
    /// # Errors
    ///
    /// [`StoreError::UnknownTask`] or the backend's [`ApiError`] after
    /// rollback.
    pub async fn toggle_status(&mut self, id: TaskId) -> Result<(), StoreError> {
        let snapshot = self
            .tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(StoreError::UnknownTask(id))?;
        let status = snapshot.status.toggled();

        let patch = TaskUpdate {
            title: Some(snapshot.title.clone()),
            description: snapshot.description.clone(),
            status: Some(status),
            due_date: snapshot.due_date,
        };
        let mutation = Mutation::SetStatus {
            id,
            snapshot,
            status,
            stamped_at: Utc::now(),
        };
        mutation.apply(&mut self.tasks);

        match self.backend.update_task(id, &patch).await {
            Ok(task) => {
                mutation.commit(&mut self.tasks, Some(task));
                Ok(())
            }
            Err(e) => {
                tracing::debug!(task = %id, error = %e, "toggle failed, restoring snapshot");
                mutation.rollback(&mut self.tasks);
                Err(e.into())
            }
        }
    }

    /// Deletes a task optimistically.
    ///
    /// The entry is removed immediately, then the delete request is sent.
    /// On failure the exact removed value is re-inserted (appended; original
    /// position is not preserved — a refresh reconciles order). The yes/no
    /// confirmation gate is the view's responsibility, not this method's.
    ///
    /// # Errors
    ///
    /// [`StoreError::UnknownTask`] or the backend's [`ApiError`] after the
    /// removed task has been restored.
    pub async fn delete(&mut self, id: TaskId) -> Result<(), StoreError> {
        let snapshot = self
            .tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(StoreError::UnknownTask(id))?;
        let mutation = Mutation::Delete { snapshot };
        mutation.apply(&mut self.tasks);

        match self.backend.delete_task(id).await {
            Ok(_ack) => {
                mutation.commit(&mut self.tasks, None);
                self.total = self.total.saturating_sub(1);
                Ok(())
            }
            Err(e) => {
                tracing::debug!(task = %id, error = %e, "delete failed, restoring task");
                mutation.rollback(&mut self.tasks);
                Err(e.into())
            }
        }
    }
}
