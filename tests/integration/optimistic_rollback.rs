//! Integration tests for optimistic reconciliation against real server
//! failures: tasks deleted behind the client's back, expired sessions, and
//! validation fast-fails.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use url::Url;

use taskdeck::backend::{ApiError, Backend, RestBackend};
use taskdeck::session::Session;
use taskdeck::store::{StoreError, TaskStore};
use taskdeck_api::auth::Registration;
use taskdeck_api::draft::TaskDraft;
use taskdeck_api::task::MAX_TITLE_LENGTH;
use taskdeck_stub::server;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Spawns a stub server and a signed-in store plus its session handle.
async fn signed_in_store(
    email: &str,
) -> (TaskStore<RestBackend>, Session, std::net::SocketAddr) {
    let (addr, _handle) = server::start_server("127.0.0.1:0")
        .await
        .expect("failed to start stub server");

    let session = Session::ephemeral();
    let base = Url::parse(&format!("http://{addr}")).unwrap();
    let backend = RestBackend::new(base, session.clone());

    let auth = backend
        .register(&Registration {
            email: email.to_string(),
            password: "pw".to_string(),
            name: None,
        })
        .await
        .unwrap();
    session.set_token(&auth.token);

    (TaskStore::new(backend, 10), session, addr)
}

fn draft(title: &str) -> TaskDraft {
    TaskDraft {
        title: title.to_string(),
        description: None,
        due_date: None,
    }
}

/// Deletes a task out from under the client, simulating another device.
async fn delete_behind_back(addr: std::net::SocketAddr, token: &str, id: taskdeck_api::task::TaskId) {
    let http = reqwest::Client::new();
    let response = http
        .delete(format!("http://{addr}/api/v1/tasks/{id}"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
}

// ---------------------------------------------------------------------------
// Rollback on server-side failure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn toggle_rolls_back_when_task_vanished() {
    let (mut store, session, addr) = signed_in_store("a@b.com").await;
    store.create(&draft("vanishing")).await.unwrap();
    let id = store.tasks()[0].id;
    let before = store.tasks()[0].clone();

    let token = session.token().unwrap();
    delete_behind_back(addr, &token, id).await;

    let err = store.toggle_status(id).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Api(ApiError::Status { status: 404, .. })
    ));
    // The optimistic flip was undone exactly.
    assert_eq!(store.tasks()[0], before);
}

#[tokio::test]
async fn delete_restores_task_when_server_refuses() {
    let (mut store, session, addr) = signed_in_store("a@b.com").await;
    store.create(&draft("twice deleted")).await.unwrap();
    let id = store.tasks()[0].id;
    let before = store.tasks()[0].clone();

    let token = session.token().unwrap();
    delete_behind_back(addr, &token, id).await;

    let err = store.delete(id).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Api(ApiError::Status { status: 404, .. })
    ));
    // The removed value is back, deep-equal to what was displayed.
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.tasks()[0], before);
}

#[tokio::test]
async fn update_leaves_state_untouched_when_task_vanished() {
    let (mut store, session, addr) = signed_in_store("a@b.com").await;
    store.create(&draft("original")).await.unwrap();
    let id = store.tasks()[0].id;
    let before = store.tasks().to_vec();

    let token = session.token().unwrap();
    delete_behind_back(addr, &token, id).await;

    let err = store.update(id, &draft("never lands")).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Api(ApiError::Status { status: 404, .. })
    ));
    // Confirm-first: nothing was applied locally.
    assert_eq!(store.tasks(), before.as_slice());
}

// ---------------------------------------------------------------------------
// Rollback on authentication failure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_removes_placeholder_on_expired_session() {
    let (mut store, session, _) = signed_in_store("a@b.com").await;
    // Simulate an expired token: present locally, unknown to the server.
    session.set_token("expired");

    let err = store.create(&draft("never created")).await.unwrap_err();
    assert!(matches!(err, StoreError::Api(ApiError::Unauthorized)));
    assert!(store.tasks().is_empty());
    // The 401 side effect cleared the session.
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn delete_restores_task_on_expired_session() {
    let (mut store, session, _) = signed_in_store("a@b.com").await;
    store.create(&draft("kept")).await.unwrap();
    let before = store.tasks()[0].clone();
    let id = before.id;

    session.set_token("expired");

    let err = store.delete(id).await.unwrap_err();
    assert!(matches!(err, StoreError::Api(ApiError::Unauthorized)));
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.tasks()[0], before);
    assert!(!session.is_authenticated());
}

// ---------------------------------------------------------------------------
// Validation fast-fail
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_drafts_never_reach_the_server() {
    let (mut store, _, _) = signed_in_store("a@b.com").await;
    store.create(&draft("only survivor")).await.unwrap();

    for bad in [
        draft(""),
        draft(&"x".repeat(MAX_TITLE_LENGTH + 1)),
        TaskDraft {
            title: "ok".to_string(),
            description: Some("y".repeat(1001)),
            due_date: None,
        },
    ] {
        let err = store.create(&bad).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    // The server still holds exactly the one valid task.
    store.refresh().await.unwrap();
    assert_eq!(store.total(), 1);
    assert_eq!(store.tasks()[0].title, "only survivor");
}
