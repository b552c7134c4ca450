//! Draft validation and normalization for task create/edit forms.
//!
//! [`validate`] is the single gate every draft passes through before a
//! request is built: rules are checked in a fixed order and the first
//! violation is reported. Normalization trims the title and description and
//! widens a date-only due date to the last instant of that calendar day in
//! UTC, so a date picked near a timezone boundary never lands on the wrong
//! day after the backend truncates it.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

use crate::task::{MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH, TaskCreate};

/// A raw task form submission, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    /// Title as typed, possibly padded with whitespace.
    pub title: String,
    /// Description as typed; empty strings are treated as absent.
    pub description: Option<String>,
    /// Due date from a date-only input.
    pub due_date: Option<NaiveDate>,
}

/// A rejected draft, naming the first violated rule.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Title is empty after trimming.
    #[error("title is required")]
    TitleRequired,
    /// Title exceeds [`MAX_TITLE_LENGTH`] characters.
    #[error("title must be at most {MAX_TITLE_LENGTH} characters")]
    TitleTooLong,
    /// Description exceeds [`MAX_DESCRIPTION_LENGTH`] characters.
    #[error("description must be at most {MAX_DESCRIPTION_LENGTH} characters")]
    DescriptionTooLong,
}

/// Validates a draft and produces the normalized request body.
///
/// Rules are checked in order: title required, title length, description
/// length. Lengths are character counts, not bytes.
///
/// # Errors
///
/// Returns the first violated [`ValidationError`].
pub fn validate(draft: &TaskDraft) -> Result<TaskCreate, ValidationError> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(ValidationError::TitleRequired);
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ValidationError::TitleTooLong);
    }

    let description = draft
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    if let Some(d) = description
        && d.chars().count() > MAX_DESCRIPTION_LENGTH
    {
        return Err(ValidationError::DescriptionTooLong);
    }

    Ok(TaskCreate {
        title: title.to_string(),
        description: description.map(ToString::to_string),
        due_date: draft.due_date.map(end_of_day_utc),
    })
}

/// Widens a calendar date to its last instant (23:59:59.999) in UTC.
#[must_use]
pub fn end_of_day_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
        .and_utc()
}
