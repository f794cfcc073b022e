//! # timecode-engine
//!
//! Compiles compact time-code notation into concrete UTC occurrences.
//!
//! A time code is a `;`-separated list of lines such as
//! `2023/7/10-2023/7/31 21:00-22:00 America/Los_Angeles weekly by[day[1,3]]`.
//! A schedule is described by two codes: an inclusion code and an exclusion
//! code whose occurrences are removed from it. The engine expands both,
//! subtracts, and reconciles the result with the rows already persisted for
//! the schedule so that editing the code never disturbs unrelated rows.
//!
//! The compiler is pure: the current time and the user's settings are passed
//! in through a [`CompileContext`].
//!
//! ## Modules
//!
//! - [`lexer`] — one line → tokens, sugar expansion, canonical text
//! - [`date`], [`time`], [`freq`], [`byrule`] — token resolvers
//! - [`expander`] — lexed line → UTC occurrences via the `rrule` crate
//! - [`dst`] — DST gap policies
//! - [`setops`] — intersection/difference/union with custom equality
//! - [`compiler`] — inclusion + exclusion code → [`ParseResult`]
//! - [`reconcile`] — diff a [`ParseResult`] against persisted rows
//! - [`store`], [`schedule`] — persistence seam and schedule operations
//! - [`sync`] — last-writer-wins version stamps
//! - [`settings`], [`zones`] — user settings and timezone lookup
//! - [`error`] — Error types

pub mod byrule;
pub mod compiler;
pub mod date;
pub mod dst;
pub mod error;
pub mod expander;
pub mod freq;
pub mod lexer;
pub mod reconcile;
pub mod schedule;
pub mod setops;
pub mod settings;
pub mod store;
pub mod sync;
pub mod time;
pub mod types;
pub mod zones;

pub use compiler::{compile_code, parse_time_codes};
pub use date::parse_date_range;
pub use error::{GrammarError, TimecodeError};
pub use reconcile::{reconcile, OccurrenceRow, ReconcilePlan};
pub use settings::{CompileContext, Settings};
pub use time::parse_time_range;
pub use types::{EventType, Marks, Occurrence, ParseResult};
pub use zones::AbbreviationTable;
