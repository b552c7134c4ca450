//! Task form overlay and delete confirmation modal.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::{centered_rect, theme};
use crate::app::{App, FormField, TaskForm};

/// Render the create/edit form overlay.
pub fn render_form(frame: &mut Frame, area: Rect, form: &TaskForm) {
    let title = if form.editing.is_some() {
        " Edit task "
    } else {
        " New task "
    };

    let overlay_area = centered_rect(60, 50, area);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .title(Span::styled(title, theme::panel_title(theme::HIGHLIGHT)))
        .borders(Borders::ALL);
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(inner);

    frame.render_widget(
        field_line("Title", &form.title, form.focus == FormField::Title),
        rows[0],
    );
    frame.render_widget(
        field_line(
            "Description",
            &form.description,
            form.focus == FormField::Description,
        ),
        rows[1],
    );
    frame.render_widget(
        field_line("Due (Y-m-d)", &form.due_date, form.focus == FormField::DueDate),
        rows[2],
    );
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "Enter: save | Tab: next field | Esc: cancel",
            theme::dimmed(),
        ))),
        rows[3],
    );
}

/// Render the yes/no gate shown before a delete is dispatched.
pub fn render_confirm(frame: &mut Frame, area: Rect, app: &App) {
    let overlay_area = centered_rect(40, 20, area);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .title(Span::styled(" Delete task ", theme::panel_title(theme::ERROR)))
        .borders(Borders::ALL);
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let title = app
        .selected_task()
        .map_or_else(|| "this task".to_string(), |t| format!("\"{}\"", t.title));

    let lines = vec![
        Line::from(Span::styled(
            format!("Delete {title}?"),
            theme::normal(),
        )),
        Line::from(Span::styled("y: delete | n/Esc: keep", theme::dimmed())),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

/// One labeled input row for the task form.
fn field_line<'a>(label: &'a str, value: &str, focused: bool) -> Paragraph<'a> {
    let cursor = if focused { "▌" } else { "" };
    let label_style = if focused {
        theme::highlighted()
    } else {
        theme::dimmed()
    };

    Paragraph::new(Line::from(vec![
        Span::styled(format!("{label:>12}: "), label_style),
        Span::styled(format!("{value}{cursor}"), theme::normal()),
    ]))
}
