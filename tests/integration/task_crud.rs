//! Integration tests for task CRUD, filtering, and pagination against the
//! stub backend, driven through the full client stack (store → REST →
//! server).

#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::{NaiveDate, Timelike};
use url::Url;

use taskdeck::backend::{Backend, RestBackend};
use taskdeck::session::Session;
use taskdeck::store::TaskStore;
use taskdeck_api::auth::Registration;
use taskdeck_api::draft::TaskDraft;
use taskdeck_api::task::TaskStatus;
use taskdeck_stub::server;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Spawns a stub server and returns a signed-in store over it.
async fn signed_in_store(email: &str) -> (TaskStore<RestBackend>, std::net::SocketAddr, String) {
    let (addr, _handle) = server::start_server("127.0.0.1:0")
        .await
        .expect("failed to start stub server");
    let (store, token) = store_for(addr, email).await;
    (store, addr, token)
}

/// Registers an account on an existing server and returns a store for it.
async fn store_for(addr: std::net::SocketAddr, email: &str) -> (TaskStore<RestBackend>, String) {
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

    (TaskStore::new(backend, 10), auth.token)
}

fn draft(title: &str) -> TaskDraft {
    TaskDraft {
        title: title.to_string(),
        description: None,
        due_date: None,
    }
}

// ---------------------------------------------------------------------------
// Create / list
// ---------------------------------------------------------------------------

#[tokio::test]
async fn created_task_round_trips_through_server() {
    let (mut store, _, _) = signed_in_store("a@b.com").await;

    store
        .create(&TaskDraft {
            title: "  Write the report  ".to_string(),
            description: Some("quarterly numbers".to_string()),
            due_date: NaiveDate::from_ymd_opt(2026, 9, 30),
        })
        .await
        .unwrap();

    // The local entry is the server's record after reconciliation.
    let local = store.tasks()[0].clone();
    assert_eq!(local.title, "Write the report");
    assert_eq!(local.description.as_deref(), Some("quarterly numbers"));
    assert_eq!(local.status, TaskStatus::Pending);
    let due = local.due_date.unwrap();
    assert_eq!(due.hour(), 23);
    assert_eq!(due.minute(), 59);

    // A fresh listing returns the same record.
    store.refresh().await.unwrap();
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.tasks()[0], local);
}

#[tokio::test]
async fn listing_is_newest_first() {
    let (mut store, _, _) = signed_in_store("a@b.com").await;
    store.create(&draft("first")).await.unwrap();
    store.create(&draft("second")).await.unwrap();

    store.refresh().await.unwrap();
    assert_eq!(store.tasks()[0].title, "second");
    assert_eq!(store.tasks()[1].title, "first");
}

#[tokio::test]
async fn pagination_follows_server_page_count() {
    let (mut store, _, _) = signed_in_store("a@b.com").await;
    for i in 0..25 {
        store.create(&draft(&format!("task {i}"))).await.unwrap();
    }

    store.goto_page(1).await.unwrap();
    assert_eq!(store.tasks().len(), 10);
    assert_eq!(store.pages(), 3);
    assert_eq!(store.total(), 25);

    store.goto_page(3).await.unwrap();
    assert_eq!(store.tasks().len(), 5);
    assert_eq!(store.page(), 3);
}

#[tokio::test]
async fn completed_filter_returns_only_completed() {
    let (mut store, _, _) = signed_in_store("a@b.com").await;
    store.create(&draft("open")).await.unwrap();
    store.create(&draft("done")).await.unwrap();
    let done_id = store.tasks()[0].id;
    store.toggle_status(done_id).await.unwrap();

    store.set_filter(Some(TaskStatus::Completed)).await.unwrap();
    assert_eq!(store.tasks().len(), 1);
    assert!(
        store
            .tasks()
            .iter()
            .all(|t| t.status == TaskStatus::Completed)
    );
    assert_eq!(store.pages(), 1);

    store.set_filter(Some(TaskStatus::Pending)).await.unwrap();
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.tasks()[0].title, "open");
}

// ---------------------------------------------------------------------------
// Update / toggle / delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_edits_fields_confirm_first() {
    let (mut store, _, _) = signed_in_store("a@b.com").await;
    store.create(&draft("old title")).await.unwrap();
    let id = store.tasks()[0].id;

    store
        .update(
            id,
            &TaskDraft {
                title: "new title".to_string(),
                description: Some("now with details".to_string()),
                due_date: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(store.tasks()[0].title, "new title");
    store.refresh().await.unwrap();
    assert_eq!(store.tasks()[0].title, "new title");
    assert_eq!(
        store.tasks()[0].description.as_deref(),
        Some("now with details")
    );
}

#[tokio::test]
async fn toggle_persists_on_the_server() {
    let (mut store, _, _) = signed_in_store("a@b.com").await;
    store.create(&draft("toggle me")).await.unwrap();
    let id = store.tasks()[0].id;

    store.toggle_status(id).await.unwrap();
    store.refresh().await.unwrap();
    assert_eq!(store.tasks()[0].status, TaskStatus::Completed);

    store.toggle_status(id).await.unwrap();
    store.refresh().await.unwrap();
    assert_eq!(store.tasks()[0].status, TaskStatus::Pending);
}

#[tokio::test]
async fn delete_removes_on_the_server() {
    let (mut store, _, _) = signed_in_store("a@b.com").await;
    store.create(&draft("doomed")).await.unwrap();
    let id = store.tasks()[0].id;

    store.delete(id).await.unwrap();
    assert!(store.tasks().is_empty());

    store.refresh().await.unwrap();
    assert!(store.tasks().is_empty());
    assert_eq!(store.total(), 0);
}

// ---------------------------------------------------------------------------
// Contract endpoints not driven by the store
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_patch_endpoint_flips_status() {
    let (mut store, addr, token) = signed_in_store("a@b.com").await;
    store.create(&draft("patch me")).await.unwrap();
    let id = store.tasks()[0].id;

    let http = reqwest::Client::new();
    let response = http
        .patch(format!("http://{addr}/api/v1/tasks/{id}/status"))
        .bearer_auth(&token)
        .json(&serde_json::json!({"status": "completed"}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    store.refresh().await.unwrap();
    assert_eq!(store.tasks()[0].status, TaskStatus::Completed);
}

#[tokio::test]
async fn single_task_endpoint_returns_the_task() {
    let (mut store, addr, token) = signed_in_store("a@b.com").await;
    store.create(&draft("fetch me")).await.unwrap();
    let id = store.tasks()[0].id;

    let http = reqwest::Client::new();
    let fetched: taskdeck_api::task::Task = http
        .get(format!("http://{addr}/api/v1/tasks/{id}"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched.id, id);
    assert_eq!(fetched.title, "fetch me");
}

// ---------------------------------------------------------------------------
// Multi-user isolation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn users_see_only_their_own_tasks() {
    let (mut alice, addr, _) = signed_in_store("alice@b.com").await;
    let (mut bob, _) = store_for(addr, "bob@b.com").await;

    alice.create(&draft("alice's task")).await.unwrap();
    bob.create(&draft("bob's task")).await.unwrap();

    alice.refresh().await.unwrap();
    bob.refresh().await.unwrap();

    assert_eq!(alice.tasks().len(), 1);
    assert_eq!(alice.tasks()[0].title, "alice's task");
    assert_eq!(bob.tasks().len(), 1);
    assert_eq!(bob.tasks()[0].title, "bob's task");
}
