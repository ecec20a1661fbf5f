//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output.

use droidspec_core::validation::ValidationError;
use droidspec_core::{Error, ErrorCode, Result};
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;
use std::fmt::Display;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!(
            "{} {}",
            "✓".if_supports_color(Stream::Stdout, |t| t.green()),
            message
        );
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!(
            "{} {}",
            "✗".if_supports_color(Stream::Stderr, |t| t.red()),
            message
        );
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!(
            "{} {}",
            "⚠".if_supports_color(Stream::Stderr, |t| t.yellow()),
            message
        );
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!(
            "{} {}",
            "ℹ".if_supports_color(Stream::Stdout, |t| t.blue()),
            message
        );
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.if_supports_color(Stream::Stdout, |t| t.bold()));
        println!("{}", "─".repeat(message.chars().count()));
    }
}

/// One line per violated constraint, with the expected/actual pair when known.
///
/// Styled for stderr, where violations are printed.
pub fn violation_line(violation: &ValidationError) -> String {
    let mut line = format!(
        "{} {} {}",
        format!("[{}]", violation.code).if_supports_color(Stream::Stderr, |t| t.dimmed()),
        violation.field.if_supports_color(Stream::Stderr, |t| t.bold()),
        violation.message
    );
    if let (Some(expected), Some(actual)) = (&violation.expected, &violation.actual) {
        line.push_str(&format!(" (expected {expected}, got {actual})"));
    }
    line
}

/// Print every violation to stderr under a summary line
pub fn print_violations(violations: &[ValidationError]) {
    Status::error(&format!(
        "{} found",
        format_count(violations.len(), "constraint violation", "constraint violations")
    ));
    for violation in violations {
        eprintln!("  {} {}", bullet(), violation_line(violation));
    }
}

/// Print a titled bullet list to stderr
pub fn print_details<T: Display>(title: &str, items: &[T]) {
    Status::error(title);
    for item in items {
        eprintln!("  {} {}", bullet(), item);
    }
}

fn bullet() -> impl Display {
    "•".if_supports_color(Stream::Stderr, |t| t.red())
}

/// Report a failed command on stderr, as a JSON `ErrorReport` when `json` is set
pub fn print_error(err: &Error, json: bool) {
    if json {
        match serde_json::to_string(&err.to_report()) {
            Ok(report) => eprintln!("{report}"),
            Err(_) => Status::error(&err.to_string()),
        }
    } else {
        Status::error(&err.to_string());
    }
}

/// Pretty-print a value as JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| Error::new(ErrorCode::Internal, format!("JSON output failed: {e}")))?;
    println!("{json}");
    Ok(())
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{}m {:.0}s", mins, remaining_secs)
    }
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_format_duration_ms() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
    }

    #[test]
    fn test_format_duration_secs() {
        assert_eq!(format_duration(Duration::from_secs_f32(5.5)), "5.5s");
    }

    #[test]
    fn test_format_duration_mins() {
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(1, "dependency", "dependencies"), "1 dependency");
        assert_eq!(format_count(3, "dependency", "dependencies"), "3 dependencies");
    }

    #[test]
    fn test_violation_line_mentions_field_and_values() {
        owo_colors::set_override(false);
        let mut violation = ValidationError::new(
            "defaultConfig.minSdk",
            "ORDERING",
            "minSdk (30) must not exceed targetSdk (21)",
        );
        violation.expected = Some("<= 21".to_string());
        violation.actual = Some("30".to_string());

        let line = violation_line(&violation);
        assert!(line.contains("[ORDERING]"));
        assert!(line.contains("defaultConfig.minSdk"));
        assert!(line.contains("(expected <= 21, got 30)"));
        assert!(!line.contains('\u{1b}'));
    }
}
