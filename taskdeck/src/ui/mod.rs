//! Terminal UI rendering.

pub mod auth_panel;
pub mod form;
pub mod status_bar;
pub mod task_panel;
pub mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

use crate::app::{App, Overlay, Screen};

/// Main draw function for the entire UI.
pub fn draw(frame: &mut Frame, app: &App) {
    // Content above, one-line status bar below.
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let content_area = main_chunks[0];
    let status_area = main_chunks[1];

    match app.screen {
        Screen::Login | Screen::Register => auth_panel::render(frame, content_area, app),
        Screen::Tasks => {
            task_panel::render(frame, content_area, app);
            match &app.overlay {
                Overlay::Form(form_state) => form::render_form(frame, content_area, form_state),
                Overlay::ConfirmDelete(_) => form::render_confirm(frame, content_area, app),
                Overlay::None => {}
            }
        }
    }

    status_bar::render(frame, status_area, app);
}

/// A centered rectangle with the given percentage size, for modal overlays.
#[must_use]
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
