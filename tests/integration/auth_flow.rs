//! Integration tests for authentication against the stub backend.
//!
//! Exercises registration, login, token persistence in the session, the
//! 401-clears-session side effect, and the logout endpoint.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use url::Url;

use taskdeck::backend::{ApiError, Backend, RestBackend};
use taskdeck::session::Session;
use taskdeck_api::auth::{Credentials, Registration};
use taskdeck_api::query::TaskQuery;
use taskdeck_stub::server;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Spawns a fresh stub server and a backend pointed at it.
async fn spawn_backend() -> (RestBackend, Session, std::net::SocketAddr) {
    let (addr, _handle) = server::start_server("127.0.0.1:0")
        .await
        .expect("failed to start stub server");
    let session = Session::ephemeral();
    let base = Url::parse(&format!("http://{addr}")).unwrap();
    (RestBackend::new(base, session.clone()), session, addr)
}

fn registration(email: &str) -> Registration {
    Registration {
        email: email.to_string(),
        password: "hunter2".to_string(),
        name: None,
    }
}

// ---------------------------------------------------------------------------
// Login / register
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_then_login_stores_token() {
    let (backend, session, _) = spawn_backend().await;
    backend.register(&registration("a@b.com")).await.unwrap();

    let auth = backend
        .login(&Credentials {
            email: "a@b.com".to_string(),
            password: "hunter2".to_string(),
        })
        .await
        .unwrap();

    session.set_token(&auth.token);
    assert!(session.is_authenticated());
    assert_eq!(session.token(), Some(auth.token));
    assert_eq!(auth.user.email, "a@b.com");
}

#[tokio::test]
async fn register_issues_usable_token_immediately() {
    let (backend, session, _) = spawn_backend().await;
    let auth = backend.register(&registration("new@b.com")).await.unwrap();
    session.set_token(&auth.token);

    // The registration token authenticates task requests right away.
    let page = backend.list_tasks(&TaskQuery::default()).await.unwrap();
    assert!(page.tasks.is_empty());
    assert_eq!(page.pagination.total, 0);
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let (backend, session, _) = spawn_backend().await;
    backend.register(&registration("a@b.com")).await.unwrap();

    let err = backend
        .login(&Credentials {
            email: "a@b.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let (backend, _, _) = spawn_backend().await;
    backend.register(&registration("a@b.com")).await.unwrap();

    let err = backend.register(&registration("a@b.com")).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 400, .. }));
}

// ---------------------------------------------------------------------------
// 401 handling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn any_401_clears_the_session() {
    let (backend, session, _) = spawn_backend().await;
    // A token the server never issued.
    session.set_token("stale-token");
    assert!(session.is_authenticated());

    let err = backend.list_tasks(&TaskQuery::default()).await.unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
    // Cleared as a side effect, before the caller reacts.
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn requests_without_token_are_unauthorized() {
    let (backend, session, _) = spawn_backend().await;
    let err = backend.list_tasks(&TaskQuery::default()).await.unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
    assert!(!session.is_authenticated());
}

// ---------------------------------------------------------------------------
// Logout endpoint
// ---------------------------------------------------------------------------

#[tokio::test]
async fn logout_revokes_the_token_server_side() {
    let (backend, session, addr) = spawn_backend().await;
    let auth = backend.register(&registration("a@b.com")).await.unwrap();
    session.set_token(&auth.token);

    let http = reqwest::Client::new();
    let response = http
        .post(format!("http://{addr}/api/v1/auth/logout"))
        .bearer_auth(&auth.token)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    // The revoked token no longer authenticates.
    let err = backend.list_tasks(&TaskQuery::default()).await.unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
}
