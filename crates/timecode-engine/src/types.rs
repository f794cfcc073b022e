//! Core value types shared by the resolvers, the expander and the compiler.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Whether a schedule has a start and an end (event) or only a deadline (todo).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Event,
    Todo,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Event => f.write_str("event"),
            EventType::Todo => f.write_str("todo"),
        }
    }
}

/// A partial calendar date as written in a date token. Missing fields are
/// filled in by the date resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateUnit {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

/// A fully resolved date range. `until` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub dtstart: NaiveDate,
    pub until: Option<NaiveDate>,
}

/// Whether a single hour or minute field was written explicitly or left as `?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Ambiguity {
    #[default]
    Known,
    Unknown,
}

impl Ambiguity {
    pub fn is_known(self) -> bool {
        self == Ambiguity::Known
    }
}

/// Per-endpoint ambiguity marks.
///
/// On the wire and in canonical text this is a two-character string where the
/// first character is the hour and the second the minute, `1` meaning known:
/// `"10"` is "hour given, minute unknown".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Marks {
    pub hour: Ambiguity,
    pub minute: Ambiguity,
}

impl Marks {
    pub const KNOWN: Marks = Marks {
        hour: Ambiguity::Known,
        minute: Ambiguity::Known,
    };

    pub fn new(hour: Ambiguity, minute: Ambiguity) -> Self {
        Self { hour, minute }
    }

    /// Encode as the two-character wire form.
    pub fn to_code(self) -> String {
        let bit = |a: Ambiguity| if a.is_known() { '1' } else { '0' };
        [bit(self.hour), bit(self.minute)].iter().collect()
    }

    /// Decode the two-character wire form. Returns `None` for anything else.
    pub fn from_code(code: &str) -> Option<Self> {
        let bit = |c: char| match c {
            '1' => Some(Ambiguity::Known),
            '0' => Some(Ambiguity::Unknown),
            _ => None,
        };
        let mut chars = code.chars();
        let hour = bit(chars.next()?)?;
        let minute = bit(chars.next()?)?;
        if chars.next().is_some() {
            return None;
        }
        Some(Self { hour, minute })
    }
}

impl fmt::Display for Marks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_code())
    }
}

impl Serialize for Marks {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_code())
    }
}

impl<'de> Deserialize<'de> for Marks {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Marks::from_code(&code)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid marks `{}`", code)))
    }
}

/// A wall-clock time of day. Unknown fields hold 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TimeUnit {
    pub hour: u32,
    pub minute: u32,
}

impl TimeUnit {
    pub fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }
}

/// The parsed time token of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// `None` makes the line a todo.
    pub start: Option<TimeUnit>,
    pub end: TimeUnit,
    pub start_marks: Marks,
    pub end_marks: Marks,
}

impl TimeRange {
    pub fn event_type(&self) -> EventType {
        if self.start.is_some() {
            EventType::Event
        } else {
            EventType::Todo
        }
    }

    /// An event whose start hour is later than its end hour ends on the next day.
    pub fn is_overnight(&self) -> bool {
        self.start.is_some_and(|start| start.hour > self.end.hour)
    }
}

/// One concrete interval, normalized to UTC.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occurrence {
    pub start: Option<DateTime<Utc>>,
    pub end: DateTime<Utc>,
    pub start_marks: Marks,
    pub end_marks: Marks,
}

impl Occurrence {
    /// Match used when pairing against persisted rows: `end` and marks always,
    /// `start` only when both sides have one.
    pub fn same_slot(&self, other: &Occurrence) -> bool {
        if let (Some(a), Some(b)) = (self.start, other.start) {
            if a != b {
                return false;
            }
        }
        self.end == other.end
            && self.start_marks == other.start_marks
            && self.end_marks == other.end_marks
    }
}

/// Output of [`crate::compiler::parse_time_codes`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    /// `None` only when both code strings are empty.
    pub event_type: Option<EventType>,
    /// Inclusion occurrences not removed by the exclusion code.
    pub included: Vec<Occurrence>,
    /// Inclusion occurrences removed by the exclusion code.
    pub excluded: Vec<Occurrence>,
    pub inclusion_code: String,
    pub exclusion_code: String,
}
