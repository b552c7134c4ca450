//! In-memory user, token, and task storage for the stub backend.
//!
//! One flat task list with per-user ownership checks, matching the real
//! backend's behavior: a task belonging to another user is indistinguishable
//! from a missing one. Thread-safe via a mutex; every operation is a short
//! critical section with no awaits inside.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use taskdeck_api::auth::User;
use taskdeck_api::query::{Pagination, SortOrder, TaskPage, TaskQuery};
use taskdeck_api::task::{
    MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH, Task, TaskCreate, TaskId, TaskStatus, TaskUpdate,
};

/// Failures from store operations, mapped to HTTP statuses by the server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Registration with an email that already has an account.
    #[error("Email already registered")]
    EmailTaken,
    /// Login with unknown email or wrong password.
    #[error("Invalid email or password")]
    BadCredentials,
    /// Request body failed the shared validation rules.
    #[error("{0}")]
    Invalid(String),
    /// Unknown task id, or a task owned by a different user.
    #[error("Task not found")]
    TaskNotFound,
}

struct Account {
    user: User,
    password: String,
}

struct VaultState {
    accounts: Vec<Account>,
    /// Opaque bearer token -> user id.
    tokens: HashMap<String, String>,
    /// All tasks, newest-first insertion order.
    tasks: Vec<Task>,
}

/// Shared storage behind the stub server's handlers.
pub struct TaskVault {
    state: Mutex<VaultState>,
}

impl Default for TaskVault {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskVault {
    /// Creates an empty vault.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(VaultState {
                accounts: Vec::new(),
                tokens: HashMap::new(),
                tasks: Vec::new(),
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Accounts and tokens
    // -----------------------------------------------------------------------

    /// Creates an account and issues a token for it.
    ///
    /// # Errors
    ///
    /// [`StoreError::EmailTaken`] when the email already has an account.
    pub fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<String>,
    ) -> Result<(String, User), StoreError> {
        let mut state = self.state.lock();
        if state.accounts.iter().any(|a| a.user.email == email) {
            return Err(StoreError::EmailTaken);
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            name,
            created_at: Utc::now(),
        };
        state.accounts.push(Account {
            user: user.clone(),
            password: password.to_string(),
        });

        let token = Uuid::new_v4().to_string();
        let user_id = user.id.clone();
        state.tokens.insert(token.clone(), user_id);
        Ok((token, user))
    }

    /// Verifies credentials and issues a fresh token.
    ///
    /// # Errors
    ///
    /// [`StoreError::BadCredentials`] for an unknown email or a password
    /// mismatch — indistinguishable on purpose.
    pub fn login(&self, email: &str, password: &str) -> Result<(String, User), StoreError> {
        let mut state = self.state.lock();
        let user = state
            .accounts
            .iter()
            .find(|a| a.user.email == email && a.password == password)
            .map(|a| a.user.clone())
            .ok_or(StoreError::BadCredentials)?;

        let token = Uuid::new_v4().to_string();
        state.tokens.insert(token.clone(), user.id.clone());
        Ok((token, user))
    }

    /// Resolves a bearer token to its user id.
    #[must_use]
    pub fn authenticate(&self, token: &str) -> Option<String> {
        self.state.lock().tokens.get(token).cloned()
    }

    /// Revokes a token. Unknown tokens are ignored.
    pub fn revoke(&self, token: &str) {
        self.state.lock().tokens.remove(token);
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    /// Lists one page of the user's tasks.
    #[must_use]
    pub fn list(&self, user_id: &str, query: &TaskQuery) -> TaskPage {
        let state = self.state.lock();
        let mut matching: Vec<Task> = state
            .tasks
            .iter()
            .filter(|t| t.user_id == user_id)
            .filter(|t| query.status.is_none_or(|s| t.status == s))
            .cloned()
            .collect();
        // Storage is newest-first; ascending creation order is its reverse.
        if query.order == SortOrder::Asc {
            matching.reverse();
        }

        let total = matching.len() as u64;
        let limit = query.limit.clamp(1, 100);
        let pages = u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX);
        let start = (query.page.saturating_sub(1) * limit) as usize;
        let tasks: Vec<Task> = matching
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .collect();

        TaskPage {
            tasks,
            pagination: Pagination {
                page: query.page,
                limit,
                total,
                pages,
            },
        }
    }

    /// Creates a task for the user.
    ///
    /// # Errors
    ///
    /// [`StoreError::Invalid`] when the body violates the shared bounds.
    pub fn create(&self, user_id: &str, body: &TaskCreate) -> Result<Task, StoreError> {
        validate_title(&body.title)?;
        validate_description(body.description.as_deref())?;

        let now = Utc::now();
        let task = Task {
            id: TaskId::new(),
            title: body.title.clone(),
            description: body.description.clone(),
            status: TaskStatus::Pending,
            due_date: body.due_date,
            created_at: now,
            updated_at: now,
            user_id: user_id.to_string(),
        };
        self.state.lock().tasks.insert(0, task.clone());
        Ok(task)
    }

    /// Fetches one of the user's tasks.
    ///
    /// # Errors
    ///
    /// [`StoreError::TaskNotFound`] for unknown ids and foreign owners alike.
    pub fn get(&self, user_id: &str, id: TaskId) -> Result<Task, StoreError> {
        self.state
            .lock()
            .tasks
            .iter()
            .find(|t| t.id == id && t.user_id == user_id)
            .cloned()
            .ok_or(StoreError::TaskNotFound)
    }

    /// Applies a partial update to one of the user's tasks.
    ///
    /// # Errors
    ///
    /// [`StoreError::Invalid`] on bound violations,
    /// [`StoreError::TaskNotFound`] for unknown ids and foreign owners.
    pub fn update(&self, user_id: &str, id: TaskId, body: &TaskUpdate) -> Result<Task, StoreError> {
        if let Some(title) = &body.title {
            validate_title(title)?;
        }
        validate_description(body.description.as_deref())?;

        let mut state = self.state.lock();
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id && t.user_id == user_id)
            .ok_or(StoreError::TaskNotFound)?;

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

    /// Sets only the status of one of the user's tasks.
    ///
    /// # Errors
    ///
    /// [`StoreError::TaskNotFound`] for unknown ids and foreign owners.
    pub fn set_status(
        &self,
        user_id: &str,
        id: TaskId,
        status: TaskStatus,
    ) -> Result<Task, StoreError> {
        let mut state = self.state.lock();
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id && t.user_id == user_id)
            .ok_or(StoreError::TaskNotFound)?;
        task.status = status;
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    /// Deletes one of the user's tasks.
    ///
    /// # Errors
    ///
    /// [`StoreError::TaskNotFound`] for unknown ids and foreign owners.
    pub fn delete(&self, user_id: &str, id: TaskId) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        let before = state.tasks.len();
        state.tasks.retain(|t| !(t.id == id && t.user_id == user_id));
        if state.tasks.len() == before {
            return Err(StoreError::TaskNotFound);
        }
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<(), StoreError> {
    let len = title.chars().count();
    if !(1..=MAX_TITLE_LENGTH).contains(&len) {
        return Err(StoreError::Invalid(format!(
            "Title must be between 1 and {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> Result<(), StoreError> {
    if let Some(d) = description
        && d.chars().count() > MAX_DESCRIPTION_LENGTH
    {
        return Err(StoreError::Invalid(format!(
            "Description must be less than {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(())
}
