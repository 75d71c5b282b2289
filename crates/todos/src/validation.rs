//! Input validation for todo fields.

use crate::error::{TodoError, TodoResult};
use chrono::DateTime;

pub const MAX_TITLE_LEN: usize = 200;

/// Trim and bound-check a title. Returns the cleaned value.
pub fn validate_title(title: &str) -> TodoResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(TodoError::EmptyTitle);
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(TodoError::TitleTooLong(MAX_TITLE_LEN));
    }
    Ok(title.to_string())
}

/// Due dates travel as RFC 3339 strings; reject anything that does not parse.
pub fn validate_due_date(due_date: &str) -> TodoResult<String> {
    DateTime::parse_from_rfc3339(due_date).map_err(|_| TodoError::InvalidDueDate)?;
    Ok(due_date.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_trimmed() {
        assert_eq!(validate_title("  buy milk  ").unwrap(), "buy milk");
    }

    #[test]
    fn empty_and_whitespace_titles_are_rejected() {
        assert!(matches!(validate_title(""), Err(TodoError::EmptyTitle)));
        assert!(matches!(validate_title("   "), Err(TodoError::EmptyTitle)));
    }

    #[test]
    fn overlong_title_is_rejected() {
        let long = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(matches!(
            validate_title(&long),
            Err(TodoError::TitleTooLong(MAX_TITLE_LEN))
        ));
        let exact = "x".repeat(MAX_TITLE_LEN);
        assert!(validate_title(&exact).is_ok());
    }

    #[test]
    fn due_date_must_be_rfc3339() {
        assert!(validate_due_date("2026-09-01T12:00:00Z").is_ok());
        assert!(matches!(
            validate_due_date("tomorrow"),
            Err(TodoError::InvalidDueDate)
        ));
    }
}
