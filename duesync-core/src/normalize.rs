//! Raw feed event to canonical event conversion.

use std::sync::LazyLock;

use regex::Regex;

use crate::classify::classify;
use crate::event::{Event, RawEvent};

/// Suffix LMS feeds append to deadline events ("Quiz 3 closes").
const CLOSES_SUFFIX: &str = "closes";

/// "Quiz 12: Functions", "quiz3 - Recursion", "7 closes"...
static NUMBERED_QUIZ: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:Quiz\s*)?([0-9]+)\W*(.*)").expect("valid quiz title regex")
});

/// Build the canonical event for a raw feed event.
pub fn normalize(raw: &RawEvent) -> Event {
    Event {
        id: raw.uid.clone(),
        title: format_title(&raw.title),
        due_at: raw.end,
        subject: classify(&raw.tags),
    }
}

/// Format a feed title for display.
///
/// Numbered quizzes become `Quiz {n} – {rest}`; any other title only loses
/// its trailing `closes`.
pub fn format_title(title: &str) -> String {
    let Some(caps) = NUMBERED_QUIZ.captures(title) else {
        return match title.strip_suffix(CLOSES_SUFFIX) {
            Some(stripped) => stripped.trim_end().to_string(),
            None => title.to_string(),
        };
    };

    let digits = caps[1].trim_start_matches('0');
    let number = if digits.is_empty() { "0" } else { digits };

    let rest = caps[2].trim();
    let rest = rest.strip_suffix(CLOSES_SUFFIX).unwrap_or(rest).trim();

    format!("Quiz {number} – {rest}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeSet;

    fn raw(title: &str, tags: &[&str]) -> RawEvent {
        RawEvent {
            uid: "event-1@lms".to_string(),
            title: title.to_string(),
            end: Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 0).unwrap(),
            tags: tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
        }
    }

    #[test]
    fn test_format_title_bare_number() {
        assert_eq!(format_title("3 closes"), "Quiz 3 – ");
    }

    #[test]
    fn test_format_title_quiz_with_topic() {
        assert_eq!(format_title("Quiz 12: Functions closes"), "Quiz 12 – Functions");
    }

    #[test]
    fn test_format_title_non_quiz_strips_closes() {
        assert_eq!(format_title("Assignment 2 closes"), "Assignment 2");
    }

    #[test]
    fn test_format_title_non_quiz_without_suffix_is_unchanged() {
        assert_eq!(format_title("Lab report due "), "Lab report due ");
        assert_eq!(format_title("Assignment opens"), "Assignment opens");
    }

    #[test]
    fn test_format_title_prefix_is_case_insensitive() {
        assert_eq!(format_title("quiz4 - Graphs closes"), "Quiz 4 – Graphs");
    }

    #[test]
    fn test_format_title_drops_leading_zeros() {
        assert_eq!(format_title("Quiz 007 Spies"), "Quiz 7 – Spies");
        assert_eq!(format_title("Quiz 00 closes"), "Quiz 0 – ");
    }

    #[test]
    fn test_format_title_opening_quiz_keeps_opens_suffix() {
        assert_eq!(format_title("Quiz 3 opens"), "Quiz 3 – opens");
    }

    #[test]
    fn test_normalize_copies_identity_and_due() {
        let raw = raw("Quiz 1 closes", &["COSC262-24S1"]);
        let event = normalize(&raw);

        assert_eq!(event.id, "event-1@lms");
        assert_eq!(event.title, "Quiz 1 – ");
        assert_eq!(event.due_at, raw.end);
        assert_eq!(event.subject, "COSC262");
    }

    #[test]
    fn test_normalize_without_subject_tag() {
        let event = normalize(&raw("Exam", &["Lecture"]));
        assert_eq!(event.subject, "");
        assert_eq!(event.title, "Exam");
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let raw = raw("Quiz 5: Trees closes", &["COSC262-24S1", "Other"]);
        assert_eq!(normalize(&raw), normalize(&raw));
    }
}
