//! Task list rendering.

use chrono::Utc;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use taskdeck_api::task::{Task, TaskStatus};

use super::theme;
use crate::app::App;

/// Render the task list with its pagination/filter title line.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let filter_label = match app.filter {
        None => "All",
        Some(TaskStatus::Pending) => "Pending",
        Some(TaskStatus::Completed) => "Completed",
    };
    let title = if app.pages > 1 {
        format!(
            " Tasks — {filter_label} · page {}/{} · {} total ",
            app.page, app.pages, app.total
        )
    } else {
        format!(" Tasks — {filter_label} · {} total ", app.total)
    };

    let block = Block::default()
        .title(Span::styled(title, theme::panel_title(theme::TASKS_TITLE)))
        .borders(Borders::ALL);

    if app.tasks.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No tasks found — press n to create one",
            theme::dimmed(),
        )))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .tasks
        .iter()
        .enumerate()
        .map(|(index, task)| task_row(task, index == app.selected, &app.date_format))
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}

/// One row: checkbox, title, optional due date and description preview.
fn task_row<'a>(task: &'a Task, is_selected: bool, date_format: &str) -> ListItem<'a> {
    let done = task.status == TaskStatus::Completed;
    let checkbox = if done { "[✓]" } else { "[ ]" };

    let title_style = if is_selected {
        theme::selected()
    } else if done {
        theme::completed()
    } else {
        theme::normal()
    };

    let mut spans = vec![
        Span::styled(checkbox, title_style),
        Span::raw(" "),
        Span::styled(task.title.as_str(), title_style),
    ];

    if let Some(due) = task.due_date {
        let overdue = !done && due < Utc::now();
        let style = if overdue { theme::overdue() } else { theme::dimmed() };
        let formatted = due.date_naive().format(date_format).to_string();
        spans.push(Span::raw("  "));
        spans.push(Span::styled(format!("due {formatted}"), style));
    }

    if let Some(description) = &task.description {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(preview(description), theme::dimmed()));
    }

    ListItem::new(Line::from(spans))
}

/// First line of the description, capped for a single row.
fn preview(description: &str) -> String {
    const MAX_PREVIEW: usize = 40;
    let first_line = description.lines().next().unwrap_or_default();
    if first_line.chars().count() > MAX_PREVIEW {
        let cut: String = first_line.chars().take(MAX_PREVIEW).collect();
        format!("{cut}…")
    } else {
        first_line.to_string()
    }
}
