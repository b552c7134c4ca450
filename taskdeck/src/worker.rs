//! Worker bridge wiring the TUI to the async backend.
//!
//! The TUI event loop is synchronous and poll-based; every backend call runs
//! on a background tokio task that owns the [`TaskStore`]. The main thread
//! sends [`UiCommand`]s and drains [`UiEvent`]s on each tick.
//!
//! # Architecture
//!
//! ```text
//! TUI (main thread)  ←── UiEvent ───  tokio worker task
//!                     ─── UiCommand →
//! ```
//!
//! Commands are processed strictly one at a time, in order. That single
//! worker loop is the cooperative mutual exclusion that keeps at most one
//! mutation in flight; the view reinforces it by disabling submission while
//! it waits for the answering event.

use tokio::sync::mpsc;

use taskdeck_api::draft::TaskDraft;
use taskdeck_api::task::{Task, TaskId, TaskStatus};

use crate::backend::{ApiError, Backend};
use crate::session::Session;
use crate::store::{StoreError, TaskStore};

/// Channel capacity for command/event channels.
const CHANNEL_CAPACITY: usize = 64;

/// Commands sent from the TUI main loop to the worker.
#[derive(Debug)]
pub enum UiCommand {
    /// Authenticate with the backend.
    Login {
        /// Account email.
        email: String,
        /// Account password.
        password: String,
    },
    /// Create an account, then use the returned token.
    Register {
        /// Account email.
        email: String,
        /// Account password.
        password: String,
        /// Optional display name.
        name: Option<String>,
    },
    /// Drop the session token.
    Logout,
    /// Load a page of tasks with the given filter.
    Load {
        /// 1-based page number.
        page: u32,
        /// Status filter, `None` for all.
        filter: Option<TaskStatus>,
    },
    /// Create a task from a form draft.
    Create(TaskDraft),
    /// Edit a task's fields from a form draft.
    Update {
        /// Task to edit.
        id: TaskId,
        /// New field values.
        draft: TaskDraft,
    },
    /// Flip a task's status.
    ToggleStatus(TaskId),
    /// Delete a task. The confirmation gate has already happened in the view.
    Delete(TaskId),
    /// Gracefully stop the worker.
    Shutdown,
}

/// Events sent from the worker back to the TUI main loop.
#[derive(Debug)]
pub enum UiEvent {
    /// Login or registration succeeded.
    LoggedIn {
        /// Email of the authenticated account.
        email: String,
    },
    /// The session was dropped on request.
    LoggedOut,
    /// A fresh page of tasks replaced the collection.
    PageLoaded {
        /// Tasks in server order.
        tasks: Vec<Task>,
        /// Page that was loaded.
        page: u32,
        /// Total page count for pagination controls.
        pages: u32,
        /// Total matching tasks.
        total: u64,
        /// Filter the page was loaded with.
        filter: Option<TaskStatus>,
    },
    /// A mutation finished (successfully or rolled back); the view should
    /// re-render from these tasks.
    TasksChanged {
        /// Tasks in server order.
        tasks: Vec<Task>,
    },
    /// A 401 was seen; the session is already cleared and the view must
    /// return to the login screen.
    AuthRequired,
    /// A failure to show in the status line.
    Error(String),
}

/// Spawns the worker task and returns its channel handles.
///
/// The worker owns the store (and through it the backend); the session
/// handle is shared with the REST layer that clears it on 401.
pub fn spawn<B: Backend + 'static>(
    store: TaskStore<B>,
    session: Session,
) -> (mpsc::Sender<UiCommand>, mpsc::Receiver<UiEvent>) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<UiCommand>(CHANNEL_CAPACITY);
    let (evt_tx, evt_rx) = mpsc::channel::<UiEvent>(CHANNEL_CAPACITY);

    tokio::spawn(async move {
        run(store, session, cmd_rx, evt_tx).await;
    });

    (cmd_tx, evt_rx)
}

/// The worker loop: one command at a time, in arrival order.
async fn run<B: Backend>(
    mut store: TaskStore<B>,
    session: Session,
    mut cmd_rx: mpsc::Receiver<UiCommand>,
    evt_tx: mpsc::Sender<UiEvent>,
) {
    while let Some(cmd) = cmd_rx.recv().await {
        let Some(events) = handle_command(&mut store, &session, cmd).await else {
            tracing::info!("worker shutting down");
            return;
        };
        for event in events {
            if evt_tx.send(event).await.is_err() {
                // TUI dropped; exit.
                return;
            }
        }
    }
}

/// Executes one command. Returns `None` for shutdown.
async fn handle_command<B: Backend>(
    store: &mut TaskStore<B>,
    session: &Session,
    cmd: UiCommand,
) -> Option<Vec<UiEvent>> {
    let events = match cmd {
        UiCommand::Login { email, password } => {
            let credentials = taskdeck_api::auth::Credentials { email, password };
            match store.backend().login(&credentials).await {
                Ok(auth) => {
                    session.set_token(&auth.token);
                    vec![UiEvent::LoggedIn { email: auth.user.email }]
                }
                Err(e) => vec![failure_event(&StoreError::Api(e))],
            }
        }
        UiCommand::Register { email, password, name } => {
            let registration = taskdeck_api::auth::Registration { email, password, name };
            match store.backend().register(&registration).await {
                Ok(auth) => {
                    session.set_token(&auth.token);
                    vec![UiEvent::LoggedIn { email: auth.user.email }]
                }
                Err(e) => vec![failure_event(&StoreError::Api(e))],
            }
        }
        UiCommand::Logout => {
            session.clear();
            vec![UiEvent::LoggedOut]
        }
        UiCommand::Load { page, filter } => {
            let result = if filter == store.filter() {
                store.goto_page(page).await
            } else {
                store.set_filter(filter).await
            };
            match result {
                Ok(()) => vec![page_loaded(store)],
                Err(e) => vec![failure_event(&e)],
            }
        }
        UiCommand::Create(draft) => {
            let error = store.create(&draft).await.err();
            mutation_events(store, error)
        }
        UiCommand::Update { id, draft } => {
            let error = store.update(id, &draft).await.err();
            mutation_events(store, error)
        }
        UiCommand::ToggleStatus(id) => {
            let error = store.toggle_status(id).await.err();
            mutation_events(store, error)
        }
        UiCommand::Delete(id) => {
            let error = store.delete(id).await.err();
            mutation_events(store, error)
        }
        UiCommand::Shutdown => return None,
    };
    Some(events)
}

/// Builds a `PageLoaded` from the store's current view.
fn page_loaded<B: Backend>(store: &TaskStore<B>) -> UiEvent {
    UiEvent::PageLoaded {
        tasks: store.tasks().to_vec(),
        page: store.page(),
        pages: store.pages(),
        total: store.total(),
        filter: store.filter(),
    }
}

/// Events after a mutation: the (possibly rolled back) collection, plus the
/// failure if there was one.
fn mutation_events<B: Backend>(store: &TaskStore<B>, error: Option<StoreError>) -> Vec<UiEvent> {
    let mut events = vec![UiEvent::TasksChanged {
        tasks: store.tasks().to_vec(),
    }];
    if let Some(e) = error {
        events.push(failure_event(&e));
    }
    events
}

/// Maps a store failure to the event the view needs.
fn failure_event(error: &StoreError) -> UiEvent {
    match error {
        StoreError::Api(ApiError::Unauthorized) => UiEvent::AuthRequired,
        other => UiEvent::Error(other.to_string()),
    }
}
