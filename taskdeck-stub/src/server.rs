//! Stub server core: shared state, routing, and the REST handlers.
//!
//! Implements the `TaskDeck` backend contract over an in-memory
//! [`TaskVault`]. Error responses use the `{"detail": ...}` envelope on
//! every non-2xx path, and a missing or unknown bearer token answers 401 on
//! every protected route.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};

use taskdeck_api::auth::{Acknowledgement, AuthResponse, Credentials, ErrorBody, Registration};
use taskdeck_api::query::{SortOrder, TaskPage, TaskQuery};
use taskdeck_api::task::{Task, TaskCreate, TaskId, TaskStatus, TaskStatusUpdate, TaskUpdate};

use crate::store::{StoreError, TaskVault};

/// Shared server state.
pub struct StubState {
    /// Account, token, and task storage.
    pub vault: TaskVault,
}

impl Default for StubState {
    fn default() -> Self {
        Self::new()
    }
}

impl StubState {
    /// Creates state with an empty vault.
    #[must_use]
    pub fn new() -> Self {
        Self {
            vault: TaskVault::new(),
        }
    }
}

type Rejection = (StatusCode, Json<ErrorBody>);

fn reject(status: StatusCode, detail: impl Into<String>) -> Rejection {
    (
        status,
        Json(ErrorBody {
            detail: detail.into(),
        }),
    )
}

impl From<StoreError> for Rejection {
    fn from(error: StoreError) -> Self {
        let status = match &error {
            StoreError::EmailTaken => StatusCode::BAD_REQUEST,
            StoreError::BadCredentials => StatusCode::UNAUTHORIZED,
            StoreError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            StoreError::TaskNotFound => StatusCode::NOT_FOUND,
        };
        reject(status, error.to_string())
    }
}

/// Pulls the bearer token out of the `Authorization` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Resolves the caller's user id, or answers 401.
fn authenticate(state: &StubState, headers: &HeaderMap) -> Result<String, Rejection> {
    bearer_token(headers)
        .and_then(|token| state.vault.authenticate(token))
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Not authenticated"))
}

// ---------------------------------------------------------------------------
// Auth handlers
// ---------------------------------------------------------------------------

async fn register(
    State(state): State<Arc<StubState>>,
    Json(body): Json<Registration>,
) -> Result<(StatusCode, Json<AuthResponse>), Rejection> {
    let (token, user) = state.vault.register(&body.email, &body.password, body.name)?;
    tracing::info!(email = %user.email, "account registered");
    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

async fn login(
    State(state): State<Arc<StubState>>,
    Json(body): Json<Credentials>,
) -> Result<Json<AuthResponse>, Rejection> {
    let (token, user) = state.vault.login(&body.email, &body.password)?;
    tracing::info!(email = %user.email, "login");
    Ok(Json(AuthResponse { token, user }))
}

async fn logout(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
) -> Result<Json<Acknowledgement>, Rejection> {
    authenticate(&state, &headers)?;
    if let Some(token) = bearer_token(&headers) {
        state.vault.revoke(token);
    }
    Ok(Json(Acknowledgement {
        message: "Successfully logged out".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Task handlers
// ---------------------------------------------------------------------------

/// Query parameters accepted by the listing endpoint.
#[derive(Debug, serde::Deserialize)]
struct ListParams {
    status: Option<TaskStatus>,
    page: Option<u32>,
    limit: Option<u32>,
    sort_by: Option<String>,
    order: Option<SortOrder>,
}

async fn list_tasks(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Json<TaskPage>, Rejection> {
    let user_id = authenticate(&state, &headers)?;
    let defaults = TaskQuery::default();
    let query = TaskQuery {
        status: params.status,
        page: params.page.unwrap_or(defaults.page).max(1),
        limit: params.limit.unwrap_or(defaults.limit),
        sort_by: params.sort_by.unwrap_or(defaults.sort_by),
        order: params.order.unwrap_or(defaults.order),
    };
    Ok(Json(state.vault.list(&user_id, &query)))
}

async fn create_task(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<TaskCreate>,
) -> Result<(StatusCode, Json<Task>), Rejection> {
    let user_id = authenticate(&state, &headers)?;
    let task = state.vault.create(&user_id, &body)?;
    tracing::debug!(task = %task.id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

async fn get_task(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Path(id): Path<TaskId>,
) -> Result<Json<Task>, Rejection> {
    let user_id = authenticate(&state, &headers)?;
    Ok(Json(state.vault.get(&user_id, id)?))
}

async fn update_task(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Path(id): Path<TaskId>,
    Json(body): Json<TaskUpdate>,
) -> Result<Json<Task>, Rejection> {
    let user_id = authenticate(&state, &headers)?;
    Ok(Json(state.vault.update(&user_id, id, &body)?))
}

async fn update_task_status(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Path(id): Path<TaskId>,
    Json(body): Json<TaskStatusUpdate>,
) -> Result<Json<Task>, Rejection> {
    let user_id = authenticate(&state, &headers)?;
    Ok(Json(state.vault.set_status(&user_id, id, body.status)?))
}

async fn delete_task(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Path(id): Path<TaskId>,
) -> Result<Json<Acknowledgement>, Rejection> {
    let user_id = authenticate(&state, &headers)?;
    state.vault.delete(&user_id, id)?;
    tracing::debug!(task = %id, "task deleted");
    Ok(Json(Acknowledgement {
        message: "Task deleted successfully".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Server startup
// ---------------------------------------------------------------------------

/// Builds the router over the given state.
#[must_use]
pub fn router(state: Arc<StubState>) -> axum::Router {
    axum::Router::new()
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/logout", post(logout))
        .route("/api/v1/tasks/", get(list_tasks).post(create_task))
        .route(
            "/api/v1/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route(
            "/api/v1/tasks/{id}/status",
            axum::routing::patch(update_task_status),
        )
        .with_state(state)
}

/// Starts the stub server on the given address and returns the bound address
/// and a join handle.
///
/// This is the primary entry point used by both `main.rs` and test code.
/// Binding to port 0 gets an OS-assigned port for tests.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    start_server_with_state(addr, Arc::new(StubState::new())).await
}

/// Starts the stub server with pre-configured [`StubState`].
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_state(
    addr: &str,
    state: Arc<StubState>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "stub server error");
        }
    });

    Ok((bound_addr, handle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_parses_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc123".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc123"));
    }

    #[test]
    fn bearer_token_rejects_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic abc123".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn unknown_token_is_unauthorized() {
        let state = StubState::new();
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer nope".parse().unwrap());
        let err = authenticate(&state, &headers).unwrap_err();
        assert_eq!(err.0, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn store_errors_map_to_statuses() {
        let r: Rejection = StoreError::EmailTaken.into();
        assert_eq!(r.0, StatusCode::BAD_REQUEST);
        let r: Rejection = StoreError::BadCredentials.into();
        assert_eq!(r.0, StatusCode::UNAUTHORIZED);
        let r: Rejection = StoreError::Invalid("x".to_string()).into();
        assert_eq!(r.0, StatusCode::UNPROCESSABLE_ENTITY);
        let r: Rejection = StoreError::TaskNotFound.into();
        assert_eq!(r.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn server_binds_to_os_assigned_port() {
        let (addr, handle) = start_server("127.0.0.1:0").await.unwrap();
        assert_ne!(addr.port(), 0);
        handle.abort();
    }
}
