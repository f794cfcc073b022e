//! Single-line lexer: `date time [zone] [freq] [by]`.
//!
//! The lexer splits a line into tokens, expands the textual sugar, classifies
//! the option tokens and hands each token to its resolver. It also renders the
//! line back in canonical form: every date fully resolved, sugar expanded,
//! zone abbreviations replaced by the chosen IANA name, options in a fixed
//! order. Lexing the canonical form again yields the same line.

use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::byrule::{parse_by_rule, ByRule};
use crate::date::{format_date, format_date_range, parse_date_range};
use crate::error::{GrammarError, GrammarResult};
use crate::freq::{parse_frequency, FrequencyOption};
use crate::settings::CompileContext;
use crate::time::{format_time_range, parse_time_range};
use crate::types::{DateRange, EventType, TimeRange};
use crate::zones::resolve_zone;

static DATE_SUGAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"tdy|tmr").expect("valid regex"));
static TIME_SUGAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"start|end|s|e|\.").expect("valid regex"));

/// One lexed and resolved line.
#[derive(Debug, Clone, PartialEq)]
pub struct LexedLine {
    pub dates: DateRange,
    pub times: TimeRange,
    pub zone: Tz,
    pub frequency: Option<FrequencyOption>,
    pub by: Option<ByRule>,
    pub canonical: String,
}

impl LexedLine {
    pub fn event_type(&self) -> EventType {
        self.times.event_type()
    }
}

/// Replace `tdy` and `tmr` with today's and tomorrow's date.
pub fn expand_date_sugar(token: &str, today: NaiveDate) -> String {
    DATE_SUGAR
        .replace_all(token, |caps: &Captures| match &caps[0] {
            "tdy" => format_date(today),
            _ => format_date(today + Duration::days(1)),
        })
        .into_owned()
}

/// Replace `start`/`s` with `0:0`, `end`/`e` with `23:59` and `.` with `:`.
pub fn expand_time_sugar(token: &str) -> String {
    TIME_SUGAR
        .replace_all(token, |caps: &Captures| match &caps[0] {
            "start" | "s" => "0:0",
            "end" | "e" => "23:59",
            _ => ":",
        })
        .into_owned()
}

pub fn lex_line(line: &str, ctx: &CompileContext<'_>) -> GrammarResult<LexedLine> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if !(2..=5).contains(&tokens.len()) {
        return Err(GrammarError::TokenCount {
            line: line.trim().to_string(),
            found: tokens.len(),
        });
    }

    let week_start = ctx.settings.week_start;
    let date_text = expand_date_sugar(tokens[0], ctx.today());
    let time_text = expand_time_sugar(tokens[1]);

    let mut zone: Option<Tz> = None;
    let mut frequency: Option<FrequencyOption> = None;
    let mut by: Option<ByRule> = None;
    for token in &tokens[2..] {
        if token.starts_with("by[") {
            if by.replace(parse_by_rule(token, week_start)?).is_some() {
                return Err(GrammarError::DuplicateOption("by"));
            }
        } else if FrequencyOption::matches(token) {
            if frequency.replace(parse_frequency(token)?).is_some() {
                return Err(GrammarError::DuplicateOption("frequency"));
            }
        } else if zone.replace(resolve_zone(token, ctx.abbreviations)?).is_some() {
            return Err(GrammarError::DuplicateOption("timezone"));
        }
    }

    let dates = parse_date_range(&date_text, ctx.today())?;
    let times = parse_time_range(&time_text)?;
    let zone = zone.unwrap_or(ctx.settings.time_zone);

    let mut canonical = format!(
        "{} {} {}",
        format_date_range(&dates),
        format_time_range(&times),
        zone.name()
    );
    if let Some(frequency) = &frequency {
        canonical.push(' ');
        canonical.push_str(&frequency.to_code());
    }
    if let Some(by) = &by {
        canonical.push(' ');
        canonical.push_str(&by.to_code(week_start));
    }

    tracing::debug!(line = line.trim(), canonical = %canonical, "lexed time code line");

    Ok(LexedLine {
        dates,
        times,
        zone,
        frequency,
        by,
        canonical,
    })
}
