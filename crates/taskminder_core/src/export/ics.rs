//! iCalendar (RFC 5545) serialization for a single task.
//!
//! # Invariants
//! - Output depends only on the task; no clock or locale input.
//! - Timestamps are UTC basic format (`YYYYMMDDTHHMMSSZ`).
//! - Lines end with CRLF and are folded at 75 octets.

use crate::model::task::{Priority, Task};
use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

const PRODID: &str = "-//taskminder//task export//EN";
const MAX_LINE_OCTETS: usize = 75;
const FALLBACK_FILE_STEM: &str = "Task";

static FILE_NAME_UNSAFE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("valid file name regex"));

/// Fixed event length; tasks carry only a deadline.
pub fn event_duration() -> Duration {
    Duration::hours(1)
}

/// Maps priority onto the iCalendar 1 (highest) to 9 (lowest) scale.
pub fn ics_priority(priority: Priority) -> u8 {
    match priority {
        Priority::Urgent => 1,
        Priority::Important => 5,
        Priority::Normal => 9,
    }
}

/// Serializes one task as a VCALENDAR containing a single VEVENT.
pub fn export_ics(task: &Task) -> String {
    let start = task.deadline;
    let end = start + event_duration();

    let lines = [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{PRODID}"),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}@taskminder", task.id),
        format!("DTSTART:{}", format_utc(start)),
        format!("DTEND:{}", format_utc(end)),
        format!("SUMMARY:{}", escape_text(&task.title)),
        format!("DESCRIPTION:{}", escape_text(&task.description)),
        format!("CATEGORIES:{}", escape_text(&task.category)),
        format!("PRIORITY:{}", ics_priority(task.priority)),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ];

    let mut out = String::new();
    for line in &lines {
        out.push_str(&fold_line(line));
        out.push_str("\r\n");
    }
    out
}

/// Derives a download file name from the task title.
pub fn export_file_name(task: &Task) -> String {
    let replaced = FILE_NAME_UNSAFE_RE.replace_all(task.title.trim(), "_");
    let stem = replaced.trim_matches(|c: char| c == '_' || c == '.');
    if stem.is_empty() {
        format!("{FALLBACK_FILE_STEM}.ics")
    } else {
        format!("{stem}.ics")
    }
}

fn format_utc(value: DateTime<Utc>) -> String {
    value.format("%Y%m%dT%H%M%SZ").to_string()
}

fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                escaped.push_str("\\n");
            }
            '\n' => escaped.push_str("\\n"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut folded = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut octets = 0;
    for c in line.chars() {
        // Continuation lines spend one octet on the leading space.
        if octets + c.len_utf8() > MAX_LINE_OCTETS {
            folded.push_str("\r\n ");
            octets = 1;
        }
        folded.push(c);
        octets += c.len_utf8();
    }
    folded
}

#[cfg(test)]
mod tests {
    use super::{escape_text, export_file_name, fold_line, MAX_LINE_OCTETS};
    use crate::model::task::{parse_deadline, TaskDraft};

    #[test]
    fn escape_text_handles_reserved_characters() {
        assert_eq!(escape_text("a,b;c\\d\r\ne\nf"), "a\\,b\\;c\\\\d\\ne\\nf");
    }

    #[test]
    fn fold_line_keeps_lines_within_limit() {
        let line = format!("DESCRIPTION:{}", "é".repeat(80));
        let folded = fold_line(&line);
        for segment in folded.split("\r\n") {
            assert!(segment.len() <= MAX_LINE_OCTETS);
        }
        assert_eq!(folded.replace("\r\n ", ""), line);
    }

    #[test]
    fn file_name_is_sanitized_with_fallback() {
        let deadline = parse_deadline("2024-01-01T10:00").unwrap();
        let named = TaskDraft::new("Pay: rent / March!", deadline).into_task(1).unwrap();
        assert_eq!(export_file_name(&named), "Pay_rent_March.ics");

        let symbols = TaskDraft::new("!!!", deadline).into_task(2).unwrap();
        assert_eq!(export_file_name(&symbols), "Task.ics");
    }
}
