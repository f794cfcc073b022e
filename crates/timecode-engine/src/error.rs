//! Error types for timecode-engine operations.

use thiserror::Error;

/// Every way a piece of time-code text can be rejected.
///
/// A single invalid line invalidates the whole compile call; the variants only
/// exist so callers can tell the failure categories apart.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("expected 2 to 5 whitespace-separated tokens, found {found} in `{line}`")]
    TokenCount { line: String, found: usize },

    #[error("malformed date `{0}`")]
    Date(String),

    #[error("malformed time `{0}`")]
    Time(String),

    #[error("unknown frequency `{0}`")]
    UnknownFrequency(String),

    #[error("malformed frequency option `{0}`")]
    FrequencyOption(String),

    #[error("unknown timezone or abbreviation `{0}`")]
    UnknownTimezone(String),

    #[error("option category `{0}` given more than once")]
    DuplicateOption(&'static str),

    #[error("malformed by-rule `{0}`")]
    ByRule(String),

    #[error("{field} index {value} is out of range")]
    OutOfRange { field: &'static str, value: i32 },

    #[error("all lines must share one event type (found both event and todo)")]
    MixedEventType,

    #[error("recurrence rejected: {0}")]
    Rule(String),

    #[error("line expands to more than {0} occurrences")]
    TooManyOccurrences(usize),
}

#[derive(Error, Debug)]
pub enum TimecodeError {
    #[error("Grammar error: {0}")]
    Grammar(#[from] GrammarError),

    /// An expansion produced a result that valid input can never produce.
    #[error("Invariant violated: {0}")]
    Invariant(String),

    #[error("Schedule not found: {0}")]
    ScheduleNotFound(String),

    #[error("Schedule is deleted: {0}")]
    ScheduleDeleted(String),

    #[error("Schedule {id} cannot change type from {from} to {to}")]
    EventTypeChanged {
        id: String,
        from: crate::types::EventType,
        to: crate::types::EventType,
    },

    #[error("Occurrence {0} cannot be written as a single line")]
    UnrepresentableOccurrence(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid settings: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, TimecodeError>;

/// Result of the token resolvers, which only ever fail with a grammar error.
pub type GrammarResult<T> = std::result::Result<T, GrammarError>;
