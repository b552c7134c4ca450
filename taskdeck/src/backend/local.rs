//! In-process backend for tests and offline demo mode.
//!
//! Keeps a task list behind a mutex and serves the same contract as the
//! REST client, entirely in memory. Failures can be scripted with
//! [`LocalBackend::fail_next`] so rollback paths are exercisable without a
//! network, and [`LocalBackend::request_count`] lets tests assert that an
//! operation made no backend call at all.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use taskdeck_api::auth::{Acknowledgement, AuthResponse, Credentials, Registration, User};
use taskdeck_api::query::{Pagination, SortOrder, TaskPage, TaskQuery};
use taskdeck_api::task::{Task, TaskCreate, TaskId, TaskStatus, TaskUpdate};

use super::{ApiError, Backend};

/// User id assigned to everything the local backend owns.
const LOCAL_USER_ID: &str = "local-user";

struct LocalState {
    /// Tasks in newest-first insertion order.
    tasks: Vec<Task>,
    /// Scripted failures, consumed one per call.
    faults: VecDeque<ApiError>,
    /// Number of backend calls made, successful or not.
    calls: u64,
}

/// In-memory implementation of [`Backend`].
#[derive(Clone)]
pub struct LocalBackend {
    state: Arc<Mutex<LocalState>>,
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalBackend {
    /// Creates an empty local backend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(LocalState {
                tasks: Vec::new(),
                faults: VecDeque::new(),
                calls: 0,
            })),
        }
    }

    /// Creates a local backend pre-seeded with a few demo tasks, used when
    /// the client runs without a configured server.
    #[must_use]
    pub fn with_demo_tasks() -> Self {
        let backend = Self::new();
        {
            let mut state = backend.state.lock();
            for (title, status) in [
                ("Try TaskDeck offline", TaskStatus::Completed),
                ("Point --api-url at a real server", TaskStatus::Pending),
                ("Create your first task", TaskStatus::Pending),
            ] {
                let now = Utc::now();
                state.tasks.insert(
                    0,
                    Task {
                        id: TaskId::new(),
                        title: title.to_string(),
                        description: None,
                        status,
                        due_date: None,
                        created_at: now,
                        updated_at: now,
                        user_id: LOCAL_USER_ID.to_string(),
                    },
                );
            }
        }
        backend
    }

    /// Queues a failure to be returned by the next backend call.
    ///
    /// Multiple queued failures are consumed in order.
    pub fn fail_next(&self, error: ApiError) {
        self.state.lock().faults.push_back(error);
    }

    /// Number of backend calls made so far.
    #[must_use]
    pub fn request_count(&self) -> u64 {
        self.state.lock().calls
    }

    /// Snapshot of the stored tasks, newest first.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.state.lock().tasks.clone()
    }

    fn begin_call(&self) -> Result<(), ApiError> {
        let mut state = self.state.lock();
        state.calls += 1;
        match state.faults.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn demo_user(email: &str) -> User {
        User {
            id: LOCAL_USER_ID.to_string(),
            email: email.to_string(),
            name: None,
            created_at: Utc::now(),
        }
    }
}

impl Backend for LocalBackend {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        self.begin_call()?;
        Ok(AuthResponse {
            token: format!("local-{}", Uuid::new_v4()),
            user: Self::demo_user(&credentials.email),
        })
    }

    async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError> {
        self.begin_call()?;
        Ok(AuthResponse {
            token: format!("local-{}", Uuid::new_v4()),
            user: Self::demo_user(&registration.email),
        })
    }

    async fn list_tasks(&self, query: &TaskQuery) -> Result<TaskPage, ApiError> {
        self.begin_call()?;
        let state = self.state.lock();

        // The vec is newest-first by construction, so descending order is
        // the storage order and ascending is its reverse. Timestamp sort
        // would tie-break arbitrarily for tasks created in the same instant.
        let mut matching: Vec<Task> = state
            .tasks
            .iter()
            .filter(|t| query.status.is_none_or(|s| t.status == s))
            .cloned()
            .collect();
        if query.order == SortOrder::Asc {
            matching.reverse();
        }

        let total = matching.len() as u64;
        let limit = query.limit.max(1);
        let pages = u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX);
        let start = (query.page.saturating_sub(1) * limit) as usize;
        let tasks: Vec<Task> = matching
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .collect();

        Ok(TaskPage {
            tasks,
            pagination: Pagination {
                page: query.page,
                limit,
                total,
                pages,
            },
        })
    }

    async fn create_task(&self, body: &TaskCreate) -> Result<Task, ApiError> {
        self.begin_call()?;
        let now = Utc::now();
        let task = Task {
            id: TaskId::new(),
            title: body.title.clone(),
            description: body.description.clone(),
            status: TaskStatus::Pending,
            due_date: body.due_date,
            created_at: now,
            updated_at: now,
            user_id: LOCAL_USER_ID.to_string(),
        };
        self.state.lock().tasks.insert(0, task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: TaskId, body: &TaskUpdate) -> Result<Task, ApiError> {
        self.begin_call()?;
        let mut state = self.state.lock();
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(ApiError::Status {
                status: 404,
                message: "Task not found".to_string(),
            })?;

        if let Some(title) = &body.title {
            task.title.clone_from(title);
        }
        if let Some(description) = &body.description {
            task.description = Some(description.clone());
        }
        if let Some(status) = body.status {
            task.status = status;
        }
        if let Some(due_date) = body.due_date {
            task.due_date = Some(due_date);
        }
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn delete_task(&self, id: TaskId) -> Result<Acknowledgement, ApiError> {
        self.begin_call()?;
        let mut state = self.state.lock();
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != id);
        if state.tasks.len() == before {
            return Err(ApiError::Status {
                status: 404,
                message: "Task not found".to_string(),
            });
        }
        Ok(Acknowledgement {
            message: "Task deleted successfully".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_body(title: &str) -> TaskCreate {
        TaskCreate {
            title: title.to_string(),
            description: None,
            due_date: None,
        }
    }

    #[tokio::test]
    async fn create_then_list_round_trip() {
        let backend = LocalBackend::new();
        backend.create_task(&create_body("first")).await.unwrap();
        backend.create_task(&create_body("second")).await.unwrap();

        let page = backend.list_tasks(&TaskQuery::default()).await.unwrap();
        assert_eq!(page.tasks.len(), 2);
        // Newest first.
        assert_eq!(page.tasks[0].title, "second");
        assert_eq!(page.tasks[1].title, "first");
        assert_eq!(page.pagination.total, 2);
        assert_eq!(page.pagination.pages, 1);
    }

    #[tokio::test]
    async fn ascending_order_reverses_listing() {
        let backend = LocalBackend::new();
        backend.create_task(&create_body("first")).await.unwrap();
        backend.create_task(&create_body("second")).await.unwrap();

        let query = TaskQuery {
            order: SortOrder::Asc,
            ..TaskQuery::default()
        };
        let page = backend.list_tasks(&query).await.unwrap();
        assert_eq!(page.tasks[0].title, "first");
    }

    #[tokio::test]
    async fn status_filter_narrows_listing() {
        let backend = LocalBackend::new();
        let task = backend.create_task(&create_body("done")).await.unwrap();
        backend.create_task(&create_body("open")).await.unwrap();
        backend
            .update_task(
                task.id,
                &TaskUpdate {
                    status: Some(TaskStatus::Completed),
                    ..TaskUpdate::default()
                },
            )
            .await
            .unwrap();

        let query = TaskQuery {
            status: Some(TaskStatus::Completed),
            ..TaskQuery::default()
        };
        let page = backend.list_tasks(&query).await.unwrap();
        assert_eq!(page.tasks.len(), 1);
        assert_eq!(page.tasks[0].title, "done");
        assert_eq!(page.pagination.total, 1);
    }

    #[tokio::test]
    async fn pagination_math_matches_backend() {
        let backend = LocalBackend::new();
        for i in 0..25 {
            backend.create_task(&create_body(&format!("task {i}"))).await.unwrap();
        }

        let page = backend
            .list_tasks(&TaskQuery {
                page: 3,
                limit: 10,
                ..TaskQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(page.tasks.len(), 5);
        assert_eq!(page.pagination.pages, 3);
        assert_eq!(page.pagination.total, 25);
    }

    #[tokio::test]
    async fn scripted_failure_is_consumed_once() {
        let backend = LocalBackend::new();
        backend.fail_next(ApiError::Network("socket closed".to_string()));

        let err = backend.create_task(&create_body("x")).await.unwrap_err();
        assert_eq!(err, ApiError::Network("socket closed".to_string()));
        // The failed call still counted, and the next one succeeds.
        assert_eq!(backend.request_count(), 1);
        assert!(backend.create_task(&create_body("x")).await.is_ok());
    }

    #[tokio::test]
    async fn update_unknown_task_is_404() {
        let backend = LocalBackend::new();
        let err = backend
            .update_task(TaskId::new(), &TaskUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn delete_removes_and_acknowledges() {
        let backend = LocalBackend::new();
        let task = backend.create_task(&create_body("doomed")).await.unwrap();
        let ack = backend.delete_task(task.id).await.unwrap();
        assert_eq!(ack.message, "Task deleted successfully");
        assert!(backend.tasks().is_empty());
    }

    #[tokio::test]
    async fn demo_backend_is_seeded() {
        let backend = LocalBackend::with_demo_tasks();
        let page = backend.list_tasks(&TaskQuery::default()).await.unwrap();
        assert_eq!(page.tasks.len(), 3);
    }
}
