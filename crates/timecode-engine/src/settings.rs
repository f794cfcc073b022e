//! User settings and the explicit ambient input of a compile call.
//!
//! The compiler never reads the clock or process state. Everything that would
//! otherwise be ambient (current time, preferred zone, week start) travels in a
//! [`CompileContext`].

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dst::DstPolicy;
use crate::error::{Result, TimecodeError};
use crate::zones::AbbreviationTable;

/// Per-user compiler settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Zone used for lines without a zone option, for `tdy`/`tmr`, and for
    /// resolving dates without a year.
    pub time_zone: Tz,
    /// First day of the user's week; `by[day[1]]` means this day.
    #[serde(with = "week_start_code")]
    pub week_start: Weekday,
    pub dst_policy: DstPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            time_zone: Tz::UTC,
            week_start: Weekday::Mon,
            dst_policy: DstPolicy::default(),
        }
    }
}

impl Settings {
    pub fn new(time_zone: Tz, week_start: Weekday) -> Self {
        Self {
            time_zone,
            week_start,
            ..Self::default()
        }
    }

    /// Parse settings from a JSON object; missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| TimecodeError::Settings(e.to_string()))
    }
}

/// Two-letter weekday codes (`MO`..`SU`), as used for `WKST` in RFC 5545.
pub fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

pub fn parse_weekday_code(code: &str) -> Option<Weekday> {
    match code.to_ascii_uppercase().as_str() {
        "MO" => Some(Weekday::Mon),
        "TU" => Some(Weekday::Tue),
        "WE" => Some(Weekday::Wed),
        "TH" => Some(Weekday::Thu),
        "FR" => Some(Weekday::Fri),
        "SA" => Some(Weekday::Sat),
        "SU" => Some(Weekday::Sun),
        _ => None,
    }
}

mod week_start_code {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(super::weekday_code(*day))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        let code = String::deserialize(deserializer)?;
        super::parse_weekday_code(&code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown week start `{}`", code)))
    }
}

/// Everything a compile call depends on besides the code text.
#[derive(Debug, Clone, Copy)]
pub struct CompileContext<'a> {
    pub now: DateTime<Utc>,
    pub settings: &'a Settings,
    pub abbreviations: &'a AbbreviationTable,
}

impl<'a> CompileContext<'a> {
    /// Context using the process-wide abbreviation table.
    pub fn new(now: DateTime<Utc>, settings: &'a Settings) -> Self {
        Self {
            now,
            settings,
            abbreviations: AbbreviationTable::global(),
        }
    }

    pub fn with_abbreviations(mut self, abbreviations: &'a AbbreviationTable) -> Self {
        self.abbreviations = abbreviations;
        self
    }

    /// Today's date in the configured zone.
    pub fn today(&self) -> NaiveDate {
        self.now.with_timezone(&self.settings.time_zone).date_naive()
    }
}
