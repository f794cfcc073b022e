//! `by[...]` filters: `by[day[1,3],month[6,7]]`.
//!
//! Weekday indices are 1-based and relative to the user's week start, so with
//! a Sunday week start `day[1]` is Sunday.

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};

use crate::error::{GrammarError, GrammarResult};
use crate::freq::Frequency;
use crate::settings::weekday_code;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByKey {
    Month,
    WeekNo,
    YearDay,
    MonthDay,
    Day,
    SetPos,
}

impl ByKey {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "month" => Some(ByKey::Month),
            "weekno" => Some(ByKey::WeekNo),
            "yearday" => Some(ByKey::YearDay),
            "monthday" => Some(ByKey::MonthDay),
            "day" => Some(ByKey::Day),
            "setpos" => Some(ByKey::SetPos),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            ByKey::Month => "month",
            ByKey::WeekNo => "weekno",
            ByKey::YearDay => "yearday",
            ByKey::MonthDay => "monthday",
            ByKey::Day => "day",
            ByKey::SetPos => "setpos",
        }
    }

    /// Largest absolute value, and whether negative (from-the-end) values are allowed.
    fn bounds(self) -> (i32, bool) {
        match self {
            ByKey::Month => (12, false),
            ByKey::WeekNo => (53, true),
            ByKey::YearDay => (366, true),
            ByKey::MonthDay => (31, true),
            ByKey::Day => (7, false),
            ByKey::SetPos => (366, true),
        }
    }

    fn check(self, value: i32) -> GrammarResult<i32> {
        let (max, signed) = self.bounds();
        let ok = value != 0 && value.abs() <= max && (signed || value > 0);
        if ok {
            Ok(value)
        } else {
            Err(GrammarError::OutOfRange {
                field: self.name(),
                value,
            })
        }
    }
}

/// Parsed `by[...]` filters. Each field is set only when its key was given.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ByRule {
    pub bymonth: Option<Vec<i32>>,
    pub byweekno: Option<Vec<i32>>,
    pub byyearday: Option<Vec<i32>>,
    pub bymonthday: Option<Vec<i32>>,
    pub byweekday: Option<Vec<Weekday>>,
    pub bysetpos: Option<Vec<i32>>,
}

impl ByRule {
    pub fn is_empty(&self) -> bool {
        *self == ByRule::default()
    }

    /// Canonical text, with keys in a fixed order and weekdays written back as
    /// indices relative to `week_start`.
    pub fn to_code(&self, week_start: Weekday) -> String {
        let list = |values: &[i32]| {
            values
                .iter()
                .map(i32::to_string)
                .collect::<Vec<_>>()
                .join(",")
        };
        let mut parts = Vec::new();
        let numeric = [
            (ByKey::Month, &self.bymonth),
            (ByKey::WeekNo, &self.byweekno),
            (ByKey::YearDay, &self.byyearday),
            (ByKey::MonthDay, &self.bymonthday),
        ];
        for (key, values) in numeric {
            if let Some(values) = values {
                parts.push(format!("{}[{}]", key.name(), list(values)));
            }
        }
        if let Some(days) = &self.byweekday {
            let indices: Vec<i32> = days.iter().map(|d| weekday_index(*d, week_start)).collect();
            parts.push(format!("day[{}]", list(&indices)));
        }
        if let Some(values) = &self.bysetpos {
            parts.push(format!("setpos[{}]", list(values)));
        }
        format!("by[{}]", parts.join(","))
    }

    /// The `BY*` parts of an RFC 5545 RRULE.
    pub fn rrule_parts(&self) -> Vec<String> {
        let list = |values: &[i32]| {
            values
                .iter()
                .map(i32::to_string)
                .collect::<Vec<_>>()
                .join(",")
        };
        let mut parts = Vec::new();
        if let Some(v) = &self.bymonth {
            parts.push(format!("BYMONTH={}", list(v)));
        }
        if let Some(v) = &self.byweekno {
            parts.push(format!("BYWEEKNO={}", list(v)));
        }
        if let Some(v) = &self.byyearday {
            parts.push(format!("BYYEARDAY={}", list(v)));
        }
        if let Some(v) = &self.bymonthday {
            parts.push(format!("BYMONTHDAY={}", list(v)));
        }
        if let Some(days) = &self.byweekday {
            let codes: Vec<&str> = days.iter().map(|d| weekday_code(*d)).collect();
            parts.push(format!("BYDAY={}", codes.join(",")));
        }
        if let Some(v) = &self.bysetpos {
            parts.push(format!("BYSETPOS={}", list(v)));
        }
        parts
    }

    /// Split into the part the `rrule` crate accepts for `freq` and the
    /// filters it refuses (`weekno` outside `yearly`, `yearday` outside
    /// `yearly`, `monthday` under `weekly`), which are applied to the
    /// expanded dates instead.
    ///
    /// When anything is moved out, `setpos` moves with it, and a grid that
    /// would otherwise default to dtstart's weekday or day of month is
    /// widened to every day of the period.
    pub fn split_for(&self, freq: Frequency) -> (ByRule, DateFilter) {
        let mut native = self.clone();
        let mut filter = DateFilter {
            freq,
            ..DateFilter::default()
        };
        if freq != Frequency::Yearly {
            filter.byweekno = native.byweekno.take();
            filter.byyearday = native.byyearday.take();
        }
        if freq == Frequency::Weekly {
            filter.bymonthday = native.bymonthday.take();
        }
        if filter.is_empty() {
            return (native, filter);
        }

        filter.bysetpos = native.bysetpos.take();
        if native.byweekday.is_none() && native.bymonthday.is_none() {
            native.byweekday = Some(ALL_WEEKDAYS.to_vec());
        }
        (native, filter)
    }
}

const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// `by[...]` filters applied to already expanded dates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DateFilter {
    /// Period used to group dates for `bysetpos`.
    pub freq: Frequency,
    pub byweekno: Option<Vec<i32>>,
    pub byyearday: Option<Vec<i32>>,
    pub bymonthday: Option<Vec<i32>>,
    pub bysetpos: Option<Vec<i32>>,
}

impl DateFilter {
    /// No day filters. `bysetpos` alone never lands here.
    pub fn is_empty(&self) -> bool {
        self.byweekno.is_none() && self.byyearday.is_none() && self.bymonthday.is_none()
    }

    pub fn matches(&self, date: NaiveDate, week_start: Weekday) -> bool {
        if let Some(values) = &self.byyearday {
            let Some(total) = days_in_year(date.year()) else {
                return false;
            };
            if !matches_position(values, date.ordinal() as i32, total) {
                return false;
            }
        }
        if let Some(values) = &self.bymonthday {
            let Some(total) = days_in_month(date) else {
                return false;
            };
            if !matches_position(values, date.day() as i32, total) {
                return false;
            }
        }
        if let Some(values) = &self.byweekno {
            let Some((week, total)) = week_number(date, week_start) else {
                return false;
            };
            if !matches_position(values, week, total) {
                return false;
            }
        }
        true
    }

    /// First day of the `freq` period containing `date`; dates sharing it form
    /// one `bysetpos` group.
    pub fn period_start(&self, date: NaiveDate, week_start: Weekday) -> NaiveDate {
        match self.freq {
            Frequency::Daily => date,
            Frequency::Weekly => {
                date - Duration::days(i64::from(weekday_index(date.weekday(), week_start) - 1))
            }
            Frequency::Monthly => date.with_day(1).unwrap_or(date),
            Frequency::Yearly => date.with_ordinal(1).unwrap_or(date),
        }
    }

    /// Apply `bysetpos` to one period's dates (sorted). Without `bysetpos`
    /// the group is returned as is.
    pub fn select(&self, group: &[NaiveDate]) -> Vec<NaiveDate> {
        let Some(positions) = &self.bysetpos else {
            return group.to_vec();
        };
        let len = group.len() as i32;
        let mut picked: Vec<NaiveDate> = positions
            .iter()
            .filter_map(|&pos| {
                let index = if pos > 0 { pos - 1 } else { len + pos };
                usize::try_from(index).ok().and_then(|i| group.get(i).copied())
            })
            .collect();
        picked.sort();
        picked.dedup();
        picked
    }
}

/// `value` matches `position` counted from the start, or from the end when
/// negative (`-1` is the last of `total`).
fn matches_position(values: &[i32], position: i32, total: i32) -> bool {
    values
        .iter()
        .any(|&v| if v > 0 { v == position } else { total + v + 1 == position })
}

fn days_in_year(year: i32) -> Option<i32> {
    NaiveDate::from_ymd_opt(year, 12, 31).map(|d| d.ordinal() as i32)
}

fn days_in_month(date: NaiveDate) -> Option<i32> {
    let first = date.with_day(1)?;
    let next = first.checked_add_months(Months::new(1))?;
    Some((next - first).num_days() as i32)
}

/// Start of week 1 of `year`: the first week, starting on `week_start`, with
/// at least four days in the year.
fn week_one_start(year: i32, week_start: Weekday) -> Option<NaiveDate> {
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let back = i64::from(weekday_index(jan1.weekday(), week_start) - 1);
    Some(if back <= 3 {
        jan1 - Duration::days(back)
    } else {
        jan1 + Duration::days(7 - back)
    })
}

/// RFC 5545 week number of `date` and the number of weeks in its week-year.
///
/// Days at the edges of a calendar year may belong to the neighbouring
/// week-year, as with ISO 8601 weeks.
pub fn week_number(date: NaiveDate, week_start: Weekday) -> Option<(i32, i32)> {
    let year = date.year();
    let mut start = week_one_start(year, week_start)?;
    let mut next = week_one_start(year + 1, week_start)?;
    if date < start {
        next = start;
        start = week_one_start(year - 1, week_start)?;
    } else if date >= next {
        start = next;
        next = week_one_start(year + 2, week_start)?;
    }
    let week = (date - start).num_days() / 7 + 1;
    let total = (next - start).num_days() / 7;
    Some((week as i32, total as i32))
}

/// The weekday at 1-based `index` of a week starting on `week_start`.
pub fn weekday_at(index: i32, week_start: Weekday) -> Weekday {
    (1..index).fold(week_start, |day, _| day.succ())
}

/// Inverse of [`weekday_at`].
pub fn weekday_index(day: Weekday, week_start: Weekday) -> i32 {
    let offset = (7 + day.num_days_from_monday() - week_start.num_days_from_monday()) % 7;
    offset as i32 + 1
}

pub fn parse_by_rule(text: &str, week_start: Weekday) -> GrammarResult<ByRule> {
    let malformed = || GrammarError::ByRule(text.to_string());
    let body = text
        .strip_prefix("by[")
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(malformed)?;

    let mut rule = ByRule::default();
    let mut rest = body;
    while !rest.is_empty() {
        let open = rest.find('[').ok_or_else(malformed)?;
        let close = rest.find(']').ok_or_else(malformed)?;
        if close < open {
            return Err(malformed());
        }
        let key = ByKey::from_name(&rest[..open]).ok_or_else(malformed)?;
        let values = parse_list(&rest[open + 1..close]).ok_or_else(malformed)?;
        let values = values
            .into_iter()
            .map(|v| key.check(v))
            .collect::<GrammarResult<Vec<i32>>>()?;

        let taken = match key {
            ByKey::Month => rule.bymonth.replace(values).is_some(),
            ByKey::WeekNo => rule.byweekno.replace(values).is_some(),
            ByKey::YearDay => rule.byyearday.replace(values).is_some(),
            ByKey::MonthDay => rule.bymonthday.replace(values).is_some(),
            ByKey::SetPos => rule.bysetpos.replace(values).is_some(),
            ByKey::Day => {
                let days = values.iter().map(|i| weekday_at(*i, week_start)).collect();
                rule.byweekday.replace(days).is_some()
            }
        };
        if taken {
            return Err(malformed());
        }

        rest = &rest[close + 1..];
        if let Some(next) = rest.strip_prefix(',') {
            if next.is_empty() {
                return Err(malformed());
            }
            rest = next;
        } else if !rest.is_empty() {
            return Err(malformed());
        }
    }

    if rule.is_empty() {
        return Err(malformed());
    }
    Ok(rule)
}

/// `1,2,-1` → `[1, 2, -1]`. Empty lists and empty items are rejected.
fn parse_list(text: &str) -> Option<Vec<i32>> {
    if text.is_empty() {
        return None;
    }
    text.split(',')
        .map(|item| {
            let digits = item.strip_prefix('-').unwrap_or(item);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            item.parse().ok()
        })
        .collect()
}
