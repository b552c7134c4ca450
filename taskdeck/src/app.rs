//! Application state and event handling.
//!
//! [`App`] is the synchronous heart of the TUI: key events go in, optional
//! [`UiCommand`]s come out, and [`UiEvent`]s from the worker are folded back
//! into display state. While a command is waiting for its answering event
//! the `busy` flag is set and every control that would dispatch another
//! command is ignored — the view-side half of the one-mutation-in-flight
//! rule.

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use taskdeck_api::draft::TaskDraft;
use taskdeck_api::task::{Task, TaskId, TaskStatus};

use crate::worker::{UiCommand, UiEvent};

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Login form.
    Login,
    /// Registration form.
    Register,
    /// The task list.
    Tasks,
}

/// Focused field on the auth screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    /// Email input.
    Email,
    /// Password input.
    Password,
    /// Display name input (registration only).
    Name,
}

/// State of the login/registration form.
#[derive(Debug, Default, Clone)]
pub struct AuthForm {
    /// Email as typed.
    pub email: String,
    /// Password as typed.
    pub password: String,
    /// Display name as typed (registration only).
    pub name: String,
    /// Focused field.
    pub focus: Option<AuthField>,
}

impl AuthForm {
    fn field_mut(&mut self, field: AuthField) -> &mut String {
        match field {
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
            AuthField::Name => &mut self.name,
        }
    }
}

/// Focused field on the task form overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    /// Title input.
    Title,
    /// Description input.
    Description,
    /// Due date input (`YYYY-MM-DD`).
    DueDate,
}

/// State of the create/edit form overlay.
#[derive(Debug, Clone)]
pub struct TaskForm {
    /// Title as typed.
    pub title: String,
    /// Description as typed.
    pub description: String,
    /// Due date as typed, `YYYY-MM-DD` or empty.
    pub due_date: String,
    /// Focused field.
    pub focus: FormField,
    /// Task being edited, or `None` when creating.
    pub editing: Option<TaskId>,
}

impl TaskForm {
    fn blank() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            due_date: String::new(),
            focus: FormField::Title,
            editing: None,
        }
    }

    fn prefilled(task: &Task, date_format: &str) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            due_date: task
                .due_date
                .map(|d| d.date_naive().format(date_format).to_string())
                .unwrap_or_default(),
            focus: FormField::Title,
            editing: Some(task.id),
        }
    }

    fn field_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Title => &mut self.title,
            FormField::Description => &mut self.description,
            FormField::DueDate => &mut self.due_date,
        }
    }
}

/// Modal overlay above the task list.
#[derive(Debug, Clone)]
pub enum Overlay {
    /// No overlay.
    None,
    /// Create/edit form.
    Form(TaskForm),
    /// Yes/no gate before a delete is dispatched.
    ConfirmDelete(TaskId),
}

/// Main application state.
pub struct App {
    /// Which screen is showing.
    pub screen: Screen,
    /// Login/registration form state.
    pub auth: AuthForm,
    /// Modal overlay state.
    pub overlay: Overlay,
    /// Tasks currently displayed, in server order.
    pub tasks: Vec<Task>,
    /// Selected row in the task list.
    pub selected: usize,
    /// Current page (1-based).
    pub page: u32,
    /// Total page count from the last listing.
    pub pages: u32,
    /// Total matching tasks from the last listing.
    pub total: u64,
    /// Active status filter.
    pub filter: Option<TaskStatus>,
    /// A command is in flight; submitting controls are disabled.
    pub busy: bool,
    /// Running against the in-process demo backend.
    pub offline: bool,
    /// Email of the signed-in account, when known.
    pub account: Option<String>,
    /// Message for the status line (last error or progress note).
    pub status_message: Option<String>,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Due-date display format (chrono).
    pub date_format: String,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Creates the app on the login screen.
    #[must_use]
    pub fn new() -> Self {
        Self {
            screen: Screen::Login,
            auth: AuthForm {
                focus: Some(AuthField::Email),
                ..AuthForm::default()
            },
            overlay: Overlay::None,
            tasks: Vec::new(),
            selected: 0,
            page: 1,
            pages: 0,
            total: 0,
            filter: None,
            busy: false,
            offline: false,
            account: None,
            status_message: None,
            should_quit: false,
            date_format: "%Y-%m-%d".to_string(),
        }
    }

    /// Sets the due-date display format.
    #[must_use]
    pub fn with_date_format(mut self, format: &str) -> Self {
        self.date_format = format.to_string();
        self
    }

    /// Marks the app as running against the in-process demo backend.
    #[must_use]
    pub const fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Skips the login screen for a session restored from disk.
    ///
    /// The caller is expected to dispatch the initial page load; `busy` is
    /// set so controls stay disabled until it answers.
    pub fn restore_session(&mut self) {
        self.screen = Screen::Tasks;
        self.busy = true;
    }

    /// Whether a new command may be dispatched.
    #[must_use]
    pub const fn can_submit(&self) -> bool {
        !self.busy
    }

    /// The task under the cursor, if any.
    #[must_use]
    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks.get(self.selected)
    }

    // -----------------------------------------------------------------------
    // Key handling
    // -----------------------------------------------------------------------

    /// Handles one key press. Returns a command to dispatch, if the key
    /// completed an action that needs the worker.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<UiCommand> {
        match self.screen {
            Screen::Login | Screen::Register => self.handle_auth_key(key),
            Screen::Tasks => match &self.overlay {
                Overlay::None => self.handle_tasks_key(key),
                Overlay::Form(_) => self.handle_form_key(key),
                Overlay::ConfirmDelete(_) => self.handle_confirm_key(key),
            },
        }
    }

    fn handle_auth_key(&mut self, key: KeyEvent) -> Option<UiCommand> {
        let registering = self.screen == Screen::Register;
        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
                None
            }
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.screen = if registering {
                    Screen::Login
                } else {
                    Screen::Register
                };
                self.status_message = None;
                None
            }
            KeyCode::Tab | KeyCode::Down => {
                self.auth.focus = Some(next_auth_field(self.auth.focus, registering));
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.auth.focus = Some(prev_auth_field(self.auth.focus, registering));
                None
            }
            KeyCode::Enter => {
                if !self.can_submit() {
                    return None;
                }
                if self.auth.email.trim().is_empty() || self.auth.password.is_empty() {
                    self.status_message = Some("Email and password are required".to_string());
                    return None;
                }
                self.busy = true;
                self.status_message = Some(if registering {
                    "Creating account...".to_string()
                } else {
                    "Signing in...".to_string()
                });
                let email = self.auth.email.trim().to_string();
                let password = self.auth.password.clone();
                if registering {
                    let name = self.auth.name.trim();
                    Some(UiCommand::Register {
                        email,
                        password,
                        name: (!name.is_empty()).then(|| name.to_string()),
                    })
                } else {
                    Some(UiCommand::Login { email, password })
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = self.auth.focus {
                    self.auth.field_mut(field).pop();
                }
                None
            }
            KeyCode::Char(c) => {
                if let Some(field) = self.auth.focus {
                    self.auth.field_mut(field).push(c);
                }
                None
            }
            _ => None,
        }
    }

    #[allow(clippy::too_many_lines)]
    fn handle_tasks_key(&mut self, key: KeyEvent) -> Option<UiCommand> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.tasks.len() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if !self.can_submit() {
                    return None;
                }
                let id = self.selected_task()?.id;
                self.busy = true;
                Some(UiCommand::ToggleStatus(id))
            }
            KeyCode::Char('n') => {
                self.overlay = Overlay::Form(TaskForm::blank());
                None
            }
            KeyCode::Char('e') => {
                let form = TaskForm::prefilled(self.selected_task()?, &self.date_format);
                self.overlay = Overlay::Form(form);
                None
            }
            KeyCode::Char('d') => {
                let id = self.selected_task()?.id;
                self.overlay = Overlay::ConfirmDelete(id);
                None
            }
            KeyCode::Char('f') => {
                if !self.can_submit() {
                    return None;
                }
                self.busy = true;
                Some(UiCommand::Load {
                    page: 1,
                    filter: next_filter(self.filter),
                })
            }
            KeyCode::Char('r') => {
                if !self.can_submit() {
                    return None;
                }
                self.busy = true;
                Some(UiCommand::Load {
                    page: self.page,
                    filter: self.filter,
                })
            }
            KeyCode::Left | KeyCode::Char('h') => {
                if !self.can_submit() || self.page <= 1 {
                    return None;
                }
                self.busy = true;
                Some(UiCommand::Load {
                    page: self.page - 1,
                    filter: self.filter,
                })
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if !self.can_submit() || self.page >= self.pages {
                    return None;
                }
                self.busy = true;
                Some(UiCommand::Load {
                    page: self.page + 1,
                    filter: self.filter,
                })
            }
            KeyCode::Char('o') => {
                if !self.can_submit() {
                    return None;
                }
                Some(UiCommand::Logout)
            }
            _ => None,
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<UiCommand> {
        let Overlay::Form(form) = &mut self.overlay else {
            return None;
        };
        match key.code {
            KeyCode::Esc => {
                self.overlay = Overlay::None;
                None
            }
            KeyCode::Tab | KeyCode::Down => {
                form.focus = match form.focus {
                    FormField::Title => FormField::Description,
                    FormField::Description => FormField::DueDate,
                    FormField::DueDate => FormField::Title,
                };
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                form.focus = match form.focus {
                    FormField::Title => FormField::DueDate,
                    FormField::Description => FormField::Title,
                    FormField::DueDate => FormField::Description,
                };
                None
            }
            KeyCode::Enter => self.submit_form(),
            KeyCode::Backspace => {
                form.field_mut().pop();
                None
            }
            KeyCode::Char(c) => {
                form.field_mut().push(c);
                None
            }
            _ => None,
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Option<UiCommand> {
        let Overlay::ConfirmDelete(id) = &self.overlay else {
            return None;
        };
        let id = *id;
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.overlay = Overlay::None;
                if !self.can_submit() {
                    return None;
                }
                self.busy = true;
                Some(UiCommand::Delete(id))
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.overlay = Overlay::None;
                None
            }
            _ => None,
        }
    }

    /// Builds the draft from the form and dispatches create or update.
    fn submit_form(&mut self) -> Option<UiCommand> {
        if !self.can_submit() {
            return None;
        }
        let Overlay::Form(form) = &self.overlay else {
            return None;
        };

        let due = form.due_date.trim();
        let due_date = if due.is_empty() {
            None
        } else {
            match NaiveDate::parse_from_str(due, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    self.status_message = Some("Due date must be YYYY-MM-DD".to_string());
                    return None;
                }
            }
        };

        let draft = TaskDraft {
            title: form.title.clone(),
            description: Some(form.description.clone()),
            due_date,
        };
        let editing = form.editing;
        self.overlay = Overlay::None;
        self.busy = true;
        self.status_message = None;
        match editing {
            Some(id) => Some(UiCommand::Update { id, draft }),
            None => Some(UiCommand::Create(draft)),
        }
    }

    // -----------------------------------------------------------------------
    // Worker events
    // -----------------------------------------------------------------------

    /// Folds a worker event into display state. May return a follow-up
    /// command (the page load right after signing in).
    pub fn apply_event(&mut self, event: UiEvent) -> Option<UiCommand> {
        match event {
            UiEvent::LoggedIn { email } => {
                self.account = Some(email);
                self.screen = Screen::Tasks;
                self.auth.password.clear();
                self.status_message = None;
                // Stay busy until the first page arrives.
                self.busy = true;
                Some(UiCommand::Load {
                    page: 1,
                    filter: None,
                })
            }
            UiEvent::LoggedOut => {
                self.account = None;
                self.screen = Screen::Login;
                self.tasks.clear();
                self.overlay = Overlay::None;
                self.busy = false;
                self.status_message = Some("Signed out".to_string());
                None
            }
            UiEvent::PageLoaded {
                tasks,
                page,
                pages,
                total,
                filter,
            } => {
                self.tasks = tasks;
                self.page = page;
                self.pages = pages;
                self.total = total;
                self.filter = filter;
                self.busy = false;
                self.status_message = None;
                self.clamp_selection();
                None
            }
            UiEvent::TasksChanged { tasks } => {
                self.tasks = tasks;
                self.busy = false;
                self.clamp_selection();
                None
            }
            UiEvent::AuthRequired => {
                self.account = None;
                self.screen = Screen::Login;
                self.overlay = Overlay::None;
                self.tasks.clear();
                self.busy = false;
                self.status_message = Some("Session expired — please sign in again".to_string());
                None
            }
            UiEvent::Error(message) => {
                self.busy = false;
                self.status_message = Some(message);
                None
            }
        }
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.tasks.len().saturating_sub(1));
    }
}

/// Filter cycle order: all → pending → completed → all.
const fn next_filter(current: Option<TaskStatus>) -> Option<TaskStatus> {
    match current {
        None => Some(TaskStatus::Pending),
        Some(TaskStatus::Pending) => Some(TaskStatus::Completed),
        Some(TaskStatus::Completed) => None,
    }
}

fn next_auth_field(current: Option<AuthField>, registering: bool) -> AuthField {
    match current {
        None | Some(AuthField::Name) => AuthField::Email,
        Some(AuthField::Email) => AuthField::Password,
        Some(AuthField::Password) => {
            if registering {
                AuthField::Name
            } else {
                AuthField::Email
            }
        }
    }
}

fn prev_auth_field(current: Option<AuthField>, registering: bool) -> AuthField {
    match current {
        None | Some(AuthField::Email) => {
            if registering {
                AuthField::Name
            } else {
                AuthField::Password
            }
        }
        Some(AuthField::Password) => AuthField::Email,
        Some(AuthField::Name) => AuthField::Password,
    }
}
