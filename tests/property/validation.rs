//! Property-based tests for draft validation and normalization.
//!
//! Uses proptest to verify:
//! 1. Any draft with a reasonable title validates, and the normalized title
//!    is exactly the trimmed input.
//! 2. Whitespace-only titles are always rejected as missing.
//! 3. Length bounds hold at every size, counted in characters.
//! 4. Any due date widens to the last instant of the same calendar day UTC.
//! 5. Rules are checked in a fixed order (title before description).

use chrono::{NaiveDate, Timelike};
use proptest::prelude::*;

use taskdeck_api::draft::{TaskDraft, ValidationError, end_of_day_utc, validate};
use taskdeck_api::task::{MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH};

// --- Strategies ---

/// Titles that should always pass: 1..=100 chars with at least one
/// non-whitespace character.
fn arb_valid_title() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9äöüñ .,!?-]{0,99}".prop_map(|tail| format!("x{tail}"))
}

/// Whitespace-only strings of any length up to the title bound.
fn arb_blank_title() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(vec![' ', '\t']), 0..MAX_TITLE_LENGTH)
        .prop_map(|chars| chars.into_iter().collect())
}

/// Dates across a wide range of years, including leap days.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (1970i32..=2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

// --- Properties ---

proptest! {
    #[test]
    fn valid_titles_validate_and_trim(title in arb_valid_title(), pad_left in 0usize..4, pad_right in 0usize..4) {
        let padded = format!("{}{}{}", " ".repeat(pad_left), title, " ".repeat(pad_right));
        let draft = TaskDraft { title: padded, description: None, due_date: None };
        let create = validate(&draft).unwrap();
        prop_assert_eq!(create.title, title.trim().to_string());
    }

    #[test]
    fn blank_titles_are_rejected(title in arb_blank_title()) {
        let draft = TaskDraft { title, description: None, due_date: None };
        prop_assert_eq!(validate(&draft).unwrap_err(), ValidationError::TitleRequired);
    }

    #[test]
    fn title_length_bound_is_exact(extra in 1usize..50) {
        let at_bound = "x".repeat(MAX_TITLE_LENGTH);
        let at_bound_draft = TaskDraft { title: at_bound, description: None, due_date: None };
        prop_assert!(validate(&at_bound_draft).is_ok());

        let over = "x".repeat(MAX_TITLE_LENGTH + extra);
        let draft = TaskDraft { title: over, description: None, due_date: None };
        prop_assert_eq!(validate(&draft).unwrap_err(), ValidationError::TitleTooLong);
    }

    #[test]
    fn description_length_bound_is_exact(extra in 1usize..50) {
        let over = "y".repeat(MAX_DESCRIPTION_LENGTH + extra);
        let draft = TaskDraft {
            title: "ok".to_string(),
            description: Some(over),
            due_date: None,
        };
        prop_assert_eq!(validate(&draft).unwrap_err(), ValidationError::DescriptionTooLong);
    }

    #[test]
    fn length_is_counted_in_chars(len in 1usize..=MAX_TITLE_LENGTH) {
        // Multi-byte characters must count as one each.
        let title: String = std::iter::repeat_n('ß', len).collect();
        let draft = TaskDraft { title, description: None, due_date: None };
        prop_assert!(validate(&draft).is_ok());
    }

    #[test]
    fn due_dates_widen_to_end_of_same_day(date in arb_date()) {
        let widened = end_of_day_utc(date);
        prop_assert_eq!(widened.date_naive(), date);
        prop_assert_eq!(widened.hour(), 23);
        prop_assert_eq!(widened.minute(), 59);
        prop_assert_eq!(widened.second(), 59);
        prop_assert_eq!(widened.timestamp_subsec_millis(), 999);
    }

    #[test]
    fn due_date_survives_validation(date in arb_date()) {
        let draft = TaskDraft {
            title: "task".to_string(),
            description: None,
            due_date: Some(date),
        };
        let create = validate(&draft).unwrap();
        prop_assert_eq!(create.due_date.unwrap().date_naive(), date);
    }

    #[test]
    fn title_rule_fires_before_description_rule(desc_extra in 1usize..50) {
        // Both rules violated; the title violation must be the one reported.
        let draft = TaskDraft {
            title: "   ".to_string(),
            description: Some("y".repeat(MAX_DESCRIPTION_LENGTH + desc_extra)),
            due_date: None,
        };
        prop_assert_eq!(validate(&draft).unwrap_err(), ValidationError::TitleRequired);
    }
}
