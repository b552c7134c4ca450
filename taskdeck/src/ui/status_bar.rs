//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::{App, Overlay, Screen};

/// Render the status bar at the bottom of the screen.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let help_text = match (app.screen, &app.overlay) {
        (Screen::Login | Screen::Register, _) => "Tab: next field | Enter: submit | Esc: quit",
        (Screen::Tasks, Overlay::Form(_)) => "Tab: next field | Enter: save | Esc: cancel",
        (Screen::Tasks, Overlay::ConfirmDelete(_)) => "y: delete | n: keep",
        (Screen::Tasks, Overlay::None) => {
            "↑↓: move | Enter: toggle | n: new | e: edit | d: delete | f: filter | ←→: page | o: sign out | q: quit"
        }
    };

    let (dot_color, connection) = if app.offline {
        (theme::WARNING, "Offline demo".to_string())
    } else if app.account.is_some() || app.screen == Screen::Tasks {
        (
            theme::SUCCESS,
            app.account
                .clone()
                .map_or_else(|| "Signed in".to_string(), |email| email),
        )
    } else {
        (theme::FG_SECONDARY, "Signed out".to_string())
    };

    let mut spans = vec![
        Span::styled("TaskDeck v0.1.0", theme::bold()),
        Span::raw(" | "),
        Span::styled("●", theme::normal().fg(dot_color)),
        Span::raw(format!(" {connection}")),
        Span::raw(" | "),
    ];

    if app.busy {
        spans.push(Span::styled("⋯ working", theme::highlighted()));
        spans.push(Span::raw(" | "));
    }

    if let Some(message) = &app.status_message {
        spans.push(Span::styled(message.as_str(), theme::error()));
        spans.push(Span::raw(" | "));
    }

    spans.push(Span::styled(help_text, theme::dimmed()));

    let paragraph = Paragraph::new(Line::from(spans)).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}
