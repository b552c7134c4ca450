//! Backend abstraction for the `TaskDeck` REST API.
//!
//! Defines the [`Backend`] trait that all backend implementations must
//! satisfy. Concrete implementations:
//! - [`rest::RestBackend`] — JSON-over-HTTP client against a live server
//! - [`local::LocalBackend`] — in-process backend for tests and offline
//!   demo mode
//!
//! The trait is the seam that lets the reconciliation core be exercised
//! without a network: the store is generic over it and never knows which
//! implementation it is driving.

pub mod local;
pub mod rest;

pub use local::LocalBackend;
pub use rest::RestBackend;

use taskdeck_api::auth::{Acknowledgement, AuthResponse, Credentials, Registration};
use taskdeck_api::query::{TaskPage, TaskQuery};
use taskdeck_api::task::{Task, TaskCreate, TaskId, TaskUpdate};

/// Failures surfaced by a backend call.
///
/// Validation failures never appear here — drafts are rejected client-side
/// before a backend method is invoked (see [`crate::store`]).
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ApiError {
    /// The server answered 401. The request layer has already cleared the
    /// session by the time this value is returned.
    #[error("authentication required")]
    Unauthorized,

    /// The server answered with a non-2xx status other than 401.
    #[error("server returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body, or the raw body text.
        message: String,
    },

    /// No response was received at all (DNS, connect, or mid-body failure).
    #[error("network error: {0}")]
    Network(String),

    /// A 2xx response whose body does not match the expected schema.
    #[error("malformed server response: {0}")]
    Decode(String),
}

/// Async interface to the task backend.
///
/// One method per consumed endpoint; request and response bodies are the
/// typed DTOs from `taskdeck-api`, never loose JSON. Implementations do not
/// retry — a caller that wants retry semantics must re-invoke explicitly.
pub trait Backend: Send + Sync {
    /// `POST /api/v1/auth/login`.
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl std::future::Future<Output = Result<AuthResponse, ApiError>> + Send;

    /// `POST /api/v1/auth/register`.
    fn register(
        &self,
        registration: &Registration,
    ) -> impl std::future::Future<Output = Result<AuthResponse, ApiError>> + Send;

    /// `GET /api/v1/tasks/` with filter, pagination, and sort parameters.
    fn list_tasks(
        &self,
        query: &TaskQuery,
    ) -> impl std::future::Future<Output = Result<TaskPage, ApiError>> + Send;

    /// `POST /api/v1/tasks/`.
    fn create_task(
        &self,
        body: &TaskCreate,
    ) -> impl std::future::Future<Output = Result<Task, ApiError>> + Send;

    /// `PUT /api/v1/tasks/{id}`.
    fn update_task(
        &self,
        id: TaskId,
        body: &TaskUpdate,
    ) -> impl std::future::Future<Output = Result<Task, ApiError>> + Send;

    /// `DELETE /api/v1/tasks/{id}`.
    fn delete_task(
        &self,
        id: TaskId,
    ) -> impl std::future::Future<Output = Result<Acknowledgement, ApiError>> + Send;
}
