//! Login and registration form rendering.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::{centered_rect, theme};
use crate::app::{App, AuthField, Screen};

/// Render the centered auth form for the login/register screens.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let registering = app.screen == Screen::Register;
    let title = if registering { " Register " } else { " Sign in " };

    let form_area = centered_rect(50, 60, area);
    let block = Block::default()
        .title(Span::styled(title, theme::panel_title(theme::AUTH_TITLE)))
        .borders(Borders::ALL);
    let inner = block.inner(form_area);
    frame.render_widget(block, form_area);

    let row_count = if registering { 4 } else { 3 };
    let mut constraints = vec![Constraint::Length(2); row_count];
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    frame.render_widget(
        field_line("Email", &app.auth.email, app.auth.focus == Some(AuthField::Email), false),
        rows[0],
    );
    frame.render_widget(
        field_line(
            "Password",
            &app.auth.password,
            app.auth.focus == Some(AuthField::Password),
            true,
        ),
        rows[1],
    );

    let mut next_row = 2;
    if registering {
        frame.render_widget(
            field_line("Name", &app.auth.name, app.auth.focus == Some(AuthField::Name), false),
            rows[next_row],
        );
        next_row += 1;
    }

    let hint = if registering {
        "Enter: create account | Ctrl-R: back to sign in | Esc: quit"
    } else {
        "Enter: sign in | Ctrl-R: register | Esc: quit"
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(hint, theme::dimmed()))),
        rows[next_row],
    );
}

/// One labeled input row; passwords are masked.
fn field_line<'a>(label: &'a str, value: &str, focused: bool, mask: bool) -> Paragraph<'a> {
    let shown = if mask {
        "•".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    let cursor = if focused { "▌" } else { "" };
    let label_style = if focused {
        theme::highlighted()
    } else {
        theme::dimmed()
    };

    Paragraph::new(Line::from(vec![
        Span::styled(format!("{label:>9}: "), label_style),
        Span::styled(format!("{shown}{cursor}"), theme::normal()),
    ]))
}
