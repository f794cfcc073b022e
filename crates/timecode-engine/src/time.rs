//! Time token resolution: `HH:MM` (todo deadline) or `HH:MM-HH:MM` (event).
//!
//! Any field may be `?` (or left empty) to mark it unknown; unknown fields are
//! stored as 0 and flagged in the endpoint's [`Marks`]. A missing `:MM` part
//! means minute 0, known.
//!
//! Legality:
//! - an endpoint may not have an unknown hour with a known minute;
//! - an event needs a known hour on at least one endpoint;
//! - a todo needs a known hour.

use crate::error::{GrammarError, GrammarResult};
use crate::types::{Ambiguity, Marks, TimeRange, TimeUnit};

pub fn parse_time_range(text: &str) -> GrammarResult<TimeRange> {
    let malformed = || GrammarError::Time(text.to_string());
    let mut endpoints = text.split('-');
    let first = endpoints.next().ok_or_else(malformed)?;
    let second = endpoints.next();
    if endpoints.next().is_some() {
        return Err(malformed());
    }

    match second {
        None => {
            let (end, end_marks) = parse_endpoint(first).ok_or_else(malformed)?;
            if !end_marks.hour.is_known() {
                return Err(malformed());
            }
            Ok(TimeRange {
                start: None,
                end,
                start_marks: Marks::KNOWN,
                end_marks,
            })
        }
        Some(second) => {
            let (start, start_marks) = parse_endpoint(first).ok_or_else(malformed)?;
            let (end, end_marks) = parse_endpoint(second).ok_or_else(malformed)?;
            if !start_marks.hour.is_known() && !end_marks.hour.is_known() {
                return Err(malformed());
            }
            Ok(TimeRange {
                start: Some(start),
                end,
                start_marks,
                end_marks,
            })
        }
    }
}

fn parse_endpoint(text: &str) -> Option<(TimeUnit, Marks)> {
    let mut fields = text.split(':');
    let hour = fields.next()?;
    let minute = fields.next();
    if fields.next().is_some() {
        return None;
    }

    let (hour, hour_mark) = parse_field(hour, 23)?;
    let (minute, minute_mark) = match minute {
        Some(minute) => parse_field(minute, 59)?,
        None => (0, Ambiguity::Known),
    };
    // An unknown hour is only meaningful when the minute is unknown too.
    if !hour_mark.is_known() && minute_mark.is_known() {
        return None;
    }
    Some((TimeUnit::new(hour, minute), Marks::new(hour_mark, minute_mark)))
}

fn parse_field(text: &str, max: u32) -> Option<(u32, Ambiguity)> {
    if text.is_empty() || text == "?" {
        return Some((0, Ambiguity::Unknown));
    }
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u32 = text.parse().ok()?;
    (value <= max).then_some((value, Ambiguity::Known))
}

/// Canonical rendering of a time token. Unknown fields render as `?`.
pub fn format_time_range(range: &TimeRange) -> String {
    let end = format_endpoint(range.end, range.end_marks);
    match range.start {
        Some(start) => format!("{}-{}", format_endpoint(start, range.start_marks), end),
        None => end,
    }
}

fn format_endpoint(time: TimeUnit, marks: Marks) -> String {
    let hour = if marks.hour.is_known() {
        time.hour.to_string()
    } else {
        "?".to_string()
    };
    let minute = if marks.minute.is_known() {
        format!("{:02}", time.minute)
    } else {
        "?".to_string()
    };
    format!("{}:{}", hour, minute)
}
