//! Recurrence expansion -- converts one lexed line into concrete UTC occurrences.
//!
//! The date grid is produced by the `rrule` crate (v0.13) from an RRULE built
//! in UTC at midnight, so DST never shifts a date. Each date point is then
//! combined with the line's wall-clock times in the line's zone and converted
//! to UTC.
//!
//! Frequency and `by[...]` options only apply to lines with an explicit
//! `until` date. A line without one always yields exactly one occurrence.
//!
//! `by[...]` keys the `rrule` crate refuses for the line's frequency are
//! applied as [`DateFilter`]s on the expanded grid.

use chrono::{Duration, NaiveDate, NaiveDateTime, Utc, Weekday};
use rrule::RRuleSet;

use crate::byrule::{ByRule, DateFilter};
use crate::dst::{resolve_local, DstPolicy};
use crate::error::{GrammarError, Result, TimecodeError};
use crate::freq::Frequency;
use crate::lexer::LexedLine;
use crate::settings::weekday_code;
use crate::types::{Occurrence, TimeUnit};

/// Upper bound on date points a single line may expand to.
pub const MAX_OCCURRENCES: u16 = 5000;

/// A fully specified recurrence, built field by field from a lexed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceSpec {
    pub dtstart: NaiveDate,
    /// Inclusive.
    pub until: Option<NaiveDate>,
    pub freq: Frequency,
    pub interval: Option<u32>,
    pub count: Option<u32>,
    pub by: Option<ByRule>,
    pub week_start: Weekday,
}

impl RecurrenceSpec {
    pub fn from_line(line: &LexedLine, week_start: Weekday) -> Self {
        let mut spec = RecurrenceSpec {
            dtstart: line.dates.dtstart,
            until: line.dates.until,
            freq: Frequency::Daily,
            interval: None,
            count: None,
            by: None,
            week_start,
        };
        if line.dates.until.is_none() {
            spec.count = Some(1);
            return spec;
        }
        if let Some(option) = line.frequency {
            spec.freq = option.freq;
            spec.interval = option.interval;
            spec.count = option.count;
        }
        spec.by = line.by.clone();
        spec
    }

    /// RFC 5545 text for the date grid (`DTSTART` line plus `RRULE` line).
    ///
    /// `COUNT` is only emitted without `UNTIL`; with both, the count is applied
    /// after expansion.
    pub fn to_rrule_text(&self) -> String {
        let mut parts = vec![format!("FREQ={}", self.freq.rrule_name())];
        match (self.until, self.count) {
            (Some(until), _) => parts.push(format!("UNTIL={}T000000Z", until.format("%Y%m%d"))),
            (None, Some(count)) => parts.push(format!("COUNT={}", count)),
            (None, None) => {}
        }
        if let Some(interval) = self.interval {
            parts.push(format!("INTERVAL={}", interval));
        }
        let (native, _) = self.split_by();
        if let Some(by) = native {
            parts.extend(by.rrule_parts());
        }
        parts.push(format!("WKST={}", weekday_code(self.week_start)));

        format!(
            "DTSTART:{}T000000Z\nRRULE:{}",
            self.dtstart.format("%Y%m%d"),
            parts.join(";")
        )
    }

    /// The `by[...]` part handed to the `rrule` crate, and the filters applied
    /// to its output.
    pub fn split_by(&self) -> (Option<ByRule>, DateFilter) {
        match &self.by {
            Some(by) => {
                let (native, filter) = by.split_for(self.freq);
                ((!native.is_empty()).then_some(native), filter)
            }
            None => (
                None,
                DateFilter {
                    freq: self.freq,
                    ..DateFilter::default()
                },
            ),
        }
    }
}

/// Expand a recurrence into its date points, in order.
///
/// A count stops the expansion early, so a counted line over a long range is
/// fine as long as the count itself stays within [`MAX_OCCURRENCES`].
///
/// # Errors
/// Returns a grammar error if the rule is rejected or expands past
/// [`MAX_OCCURRENCES`], and `TimecodeError::Invariant` if the expansion
/// yields a date outside `[dtstart, until]`.
pub fn expand_dates(spec: &RecurrenceSpec) -> Result<Vec<NaiveDate>> {
    // Short-circuit: caller explicitly wants zero instances.
    if spec.count == Some(0) {
        return Ok(Vec::new());
    }
    if spec.interval == Some(0) {
        return Err(GrammarError::Rule("interval must be at least 1".to_string()).into());
    }

    let text = spec.to_rrule_text();
    let rrule_set: RRuleSet = text
        .parse()
        .map_err(|e| GrammarError::Rule(format!("{}", e)))?;

    let cap = usize::from(MAX_OCCURRENCES);
    let wanted = spec
        .count
        .map_or(cap + 1, |count| (count as usize).min(cap + 1));
    let (_, filter) = spec.split_by();

    let mut dates: Vec<NaiveDate> = Vec::new();
    let mut group: Vec<NaiveDate> = Vec::new();
    let mut group_start = None;
    for dt in &rrule_set {
        if dates.len() >= wanted {
            break;
        }
        let date = dt.with_timezone(&Utc).date_naive();
        if !filter.matches(date, spec.week_start) {
            continue;
        }
        if filter.bysetpos.is_none() {
            dates.push(date);
            continue;
        }
        let period = filter.period_start(date, spec.week_start);
        if group_start != Some(period) {
            dates.extend(filter.select(&group));
            group.clear();
            group_start = Some(period);
        }
        group.push(date);
    }
    dates.extend(filter.select(&group));
    dates.truncate(wanted);

    if dates.len() > cap {
        return Err(GrammarError::TooManyOccurrences(cap).into());
    }

    let last = spec.until.unwrap_or(NaiveDate::MAX);
    if let Some(stray) = dates.iter().find(|d| **d < spec.dtstart || **d > last) {
        return Err(TimecodeError::Invariant(format!(
            "expansion of `{}` produced {} outside its range",
            text.replace('\n', " "),
            stray
        )));
    }

    Ok(dates)
}

/// Expand one lexed line into UTC occurrences.
///
/// Occurrences whose wall-clock time falls into a DST gap follow `dst_policy`.
pub fn expand_line(
    line: &LexedLine,
    week_start: Weekday,
    dst_policy: DstPolicy,
) -> Result<Vec<Occurrence>> {
    let spec = RecurrenceSpec::from_line(line, week_start);
    let dates = expand_dates(&spec)?;
    let times = &line.times;

    let mut occurrences = Vec::with_capacity(dates.len());
    for date in dates {
        let end_date = if times.is_overnight() {
            date + Duration::days(1)
        } else {
            date
        };
        let Some(end) = resolve_local(&line.zone, at(end_date, times.end)?, dst_policy) else {
            continue;
        };
        let start = match times.start {
            Some(start) => match resolve_local(&line.zone, at(date, start)?, dst_policy) {
                Some(start) => Some(start),
                None => continue,
            },
            None => None,
        };
        occurrences.push(Occurrence {
            start,
            end,
            start_marks: times.start_marks,
            end_marks: times.end_marks,
        });
    }

    tracing::debug!(
        line = %line.canonical,
        occurrences = occurrences.len(),
        "expanded time code line"
    );
    Ok(occurrences)
}

fn at(date: NaiveDate, time: TimeUnit) -> Result<NaiveDateTime> {
    date.and_hms_opt(time.hour, time.minute, 0).ok_or_else(|| {
        TimecodeError::Invariant(format!("{}:{} is not a time of day", time.hour, time.minute))
    })
}
