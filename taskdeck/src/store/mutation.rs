//! Optimistic mutation transactions.
//!
//! Each optimistic operation builds one [`Mutation`] up front, capturing the
//! rollback snapshot exactly once. The store then drives the transaction
//! through `apply` → backend call → `commit` or `rollback`, so the value
//! restored on failure is always the value that was displaced, never a
//! re-derivation at the call site.

use chrono::{DateTime, Utc};

use taskdeck_api::task::{Task, TaskId, TaskStatus};

/// A single in-flight optimistic mutation.
#[derive(Debug, Clone)]
pub(crate) enum Mutation {
    /// Insert a placeholder task at the head of the collection.
    ///
    /// The placeholder carries a locally synthesized id that the commit
    /// replaces with the server's record. Rollback removes the placeholder
    /// entirely — it never existed on the server.
    Create {
        /// The fully-formed local task awaiting confirmation.
        placeholder: Task,
    },
    /// Flip a task's status in place and stamp a new `updated_at`.
    SetStatus {
        /// Task being toggled.
        id: TaskId,
        /// Pre-mutation value, restored verbatim on rollback.
        snapshot: Task,
        /// Status applied optimistically.
        status: TaskStatus,
        /// `updated_at` stamped optimistically.
        stamped_at: DateTime<Utc>,
    },
    /// Remove a task from the collection.
    Delete {
        /// The removed value, re-inserted on rollback.
        snapshot: Task,
    },
}

impl Mutation {
    /// Applies the optimistic change to the collection.
    pub(crate) fn apply(&self, tasks: &mut Vec<Task>) {
        match self {
            Self::Create { placeholder } => tasks.insert(0, placeholder.clone()),
            Self::SetStatus {
                id,
                status,
                stamped_at,
                ..
            } => {
                if let Some(task) = tasks.iter_mut().find(|t| t.id == *id) {
                    task.status = *status;
                    task.updated_at = *stamped_at;
                }
            }
            Self::Delete { snapshot } => tasks.retain(|t| t.id != snapshot.id),
        }
    }

    /// Replaces the optimistic value with the server's authoritative record.
    ///
    /// `server` is `None` only for deletions, where the backend returns an
    /// acknowledgement rather than a task.
    pub(crate) fn commit(self, tasks: &mut [Task], server: Option<Task>) {
        match (self, server) {
            (Self::Create { placeholder }, Some(server_task)) => {
                if let Some(slot) = tasks.iter_mut().find(|t| t.id == placeholder.id) {
                    *slot = server_task;
                }
            }
            (Self::SetStatus { id, .. }, Some(server_task)) => {
                if let Some(slot) = tasks.iter_mut().find(|t| t.id == id) {
                    *slot = server_task;
                }
            }
            _ => {}
        }
    }

    /// Reverts the optimistic change using the captured snapshot.
    pub(crate) fn rollback(self, tasks: &mut Vec<Task>) {
        match self {
            Self::Create { placeholder } => tasks.retain(|t| t.id != placeholder.id),
            Self::SetStatus { id, snapshot, .. } => {
                if let Some(slot) = tasks.iter_mut().find(|t| t.id == id) {
                    *slot = snapshot;
                }
            }
            // Original position is not preserved; a refresh reconciles order.
            Self::Delete { snapshot } => tasks.push(snapshot),
        }
    }
}
