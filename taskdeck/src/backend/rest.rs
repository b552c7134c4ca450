//! JSON-over-HTTP backend client.
//!
//! Wraps a shared [`reqwest::Client`]. Every request sends
//! `Content-Type: application/json` for bodies and attaches
//! `Authorization: Bearer <token>` when the session holds a token. On a
//! non-2xx response the body is read as text first and then parsed for the
//! backend's `{"detail": ...}` envelope; a 401 additionally clears the
//! session before the failure is returned, independent of how the caller
//! reacts to it.

use reqwest::{Method, StatusCode};
use url::Url;

use taskdeck_api::auth::{Acknowledgement, AuthResponse, Credentials, ErrorBody, Registration};
use taskdeck_api::query::{TaskPage, TaskQuery};
use taskdeck_api::task::{Task, TaskCreate, TaskId, TaskUpdate};

use super::{ApiError, Backend};
use crate::session::Session;

/// REST implementation of [`Backend`].
#[derive(Debug, Clone)]
pub struct RestBackend {
    http: reqwest::Client,
    base_url: Url,
    session: Session,
}

impl RestBackend {
    /// Creates a backend client for the given server.
    ///
    /// The base URL's path is normalized to end with `/` so endpoint paths
    /// join below it instead of replacing its last segment.
    #[must_use]
    pub fn new(mut base_url: Url, session: Session) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
            session,
        }
    }

    /// Returns the session this backend authenticates with.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Issues one request and decodes the JSON response.
    async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ApiError::Network(format!("invalid request URL {path}: {e}")))?;

        let mut request = self.http.request(method.clone(), url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status();

        // Read the body as text exactly once; both the success and the
        // failure path parse from this string.
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if status.is_success() {
            return serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()));
        }

        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.detail)
            .unwrap_or_else(|_| {
                if text.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                } else {
                    text
                }
            });

        if status == StatusCode::UNAUTHORIZED {
            tracing::info!(%method, "401 from backend, clearing session");
            self.session.clear();
            return Err(ApiError::Unauthorized);
        }

        tracing::debug!(%method, status = status.as_u16(), %message, "backend request failed");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

impl Backend for RestBackend {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        self.request(Method::POST, "api/v1/auth/login", &[], Some(credentials))
            .await
    }

    async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError> {
        self.request(Method::POST, "api/v1/auth/register", &[], Some(registration))
            .await
    }

    async fn list_tasks(&self, query: &TaskQuery) -> Result<TaskPage, ApiError> {
        self.request::<TaskPage, ()>(Method::GET, "api/v1/tasks/", &query.query_pairs(), None)
            .await
    }

    async fn create_task(&self, body: &TaskCreate) -> Result<Task, ApiError> {
        self.request(Method::POST, "api/v1/tasks/", &[], Some(body))
            .await
    }

    async fn update_task(&self, id: TaskId, body: &TaskUpdate) -> Result<Task, ApiError> {
        self.request(Method::PUT, &format!("api/v1/tasks/{id}"), &[], Some(body))
            .await
    }

    async fn delete_task(&self, id: TaskId) -> Result<Acknowledgement, ApiError> {
        self.request::<Acknowledgement, ()>(Method::DELETE, &format!("api/v1/tasks/{id}"), &[], None)
            .await
    }
}
