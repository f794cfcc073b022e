//! Date token resolution: `D`, `M/D`, `Y/M/D`, optionally `START-END`.
//!
//! Fields omitted from `END` are taken from the resolved `START`. A `START`
//! without a year is the next `(month, day)` that has not passed yet, measured
//! against "today" in the user's zone. A bare day is the next such day of a
//! month.

use chrono::{Datelike, Months, NaiveDate};

use crate::error::{GrammarError, GrammarResult};
use crate::types::{DateRange, DateUnit};

/// Parse one date without resolving missing fields. Components are
/// right-aligned: `5` is a day, `7/5` a month and day.
pub fn parse_date_unit(text: &str) -> GrammarResult<DateUnit> {
    let malformed = || GrammarError::Date(text.to_string());
    let parts: Vec<&str> = text.split('/').collect();
    if parts.len() > 3 {
        return Err(malformed());
    }
    let mut numbers = Vec::with_capacity(parts.len());
    for part in &parts {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        numbers.push(part.parse::<u32>().map_err(|_| malformed())?);
    }

    let mut unit = DateUnit::default();
    match numbers.as_slice() {
        [day] => unit.day = Some(*day),
        [month, day] => {
            unit.month = Some(*month);
            unit.day = Some(*day);
        }
        [year, month, day] => {
            unit.year = Some(i32::try_from(*year).map_err(|_| malformed())?);
            unit.month = Some(*month);
            unit.day = Some(*day);
        }
        _ => return Err(malformed()),
    }
    Ok(unit)
}

/// Parse and resolve a date token against `today`.
pub fn parse_date_range(text: &str, today: NaiveDate) -> GrammarResult<DateRange> {
    let malformed = || GrammarError::Date(text.to_string());
    let mut bounds = text.split('-');
    let start = bounds.next().ok_or_else(malformed)?;
    let end = bounds.next();
    if bounds.next().is_some() {
        return Err(malformed());
    }

    let dtstart = resolve_start(parse_date_unit(start)?, today).ok_or_else(malformed)?;
    let until = match end {
        Some(end) => {
            let unit = parse_date_unit(end)?;
            let until = NaiveDate::from_ymd_opt(
                unit.year.unwrap_or(dtstart.year()),
                unit.month.unwrap_or(dtstart.month()),
                unit.day.unwrap_or(dtstart.day()),
            )
            .ok_or_else(malformed)?;
            if until < dtstart {
                return Err(malformed());
            }
            Some(until)
        }
        None => None,
    };

    Ok(DateRange { dtstart, until })
}

fn resolve_start(unit: DateUnit, today: NaiveDate) -> Option<NaiveDate> {
    let day = unit.day?;
    match (unit.year, unit.month) {
        (Some(year), Some(month)) => NaiveDate::from_ymd_opt(year, month, day),
        (None, Some(month)) => {
            let passed = (month, day) < (today.month(), today.day());
            let year = if passed { today.year() + 1 } else { today.year() };
            NaiveDate::from_ymd_opt(year, month, day)
        }
        (None, None) => {
            // Walk forward month by month; a day like 31 skips short months.
            let first = today.with_day(1)?;
            (0..=12).find_map(|offset| {
                let month = first.checked_add_months(Months::new(offset))?;
                let candidate = month.with_day(day)?;
                (candidate >= today).then_some(candidate)
            })
        }
        (Some(_), None) => None,
    }
}

/// Canonical rendering of a resolved date: `Y/M/D` without padding.
pub fn format_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.year(), date.month(), date.day())
}

/// Canonical rendering of a resolved range.
pub fn format_date_range(range: &DateRange) -> String {
    match range.until {
        Some(until) => format!("{}-{}", format_date(range.dtstart), format_date(until)),
        None => format_date(range.dtstart),
    }
}
