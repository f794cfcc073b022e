//! Frequency option: `daily`, `weekly,i2`, `monthly,c6`, `yearly,i1,c3`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GrammarError, GrammarResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Yearly,
    ];

    /// The name used in time-code text.
    pub fn name(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }

    /// The RFC 5545 `FREQ` value.
    pub fn rrule_name(self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrequencyOption {
    pub freq: Frequency,
    pub interval: Option<u32>,
    pub count: Option<u32>,
}

impl FrequencyOption {
    /// Whether `token` has the shape of a frequency option (its first
    /// comma-separated part is a frequency name).
    pub fn matches(token: &str) -> bool {
        token
            .split(',')
            .next()
            .is_some_and(|name| Frequency::from_name(name).is_some())
    }

    /// Canonical text: name, then interval, then count.
    pub fn to_code(&self) -> String {
        let mut code = self.freq.name().to_string();
        if let Some(interval) = self.interval {
            code.push_str(&format!(",i{}", interval));
        }
        if let Some(count) = self.count {
            code.push_str(&format!(",c{}", count));
        }
        code
    }
}

pub fn parse_frequency(text: &str) -> GrammarResult<FrequencyOption> {
    let malformed = || GrammarError::FrequencyOption(text.to_string());
    let mut parts = text.split(',');
    let name = parts.next().unwrap_or_default();
    let freq = Frequency::from_name(name)
        .ok_or_else(|| GrammarError::UnknownFrequency(name.to_string()))?;

    let mut option = FrequencyOption {
        freq,
        ..FrequencyOption::default()
    };
    for flag in parts {
        let (slot, digits) = match flag.split_at_checked(1) {
            Some(("i", digits)) => (&mut option.interval, digits),
            Some(("c", digits)) => (&mut option.count, digits),
            _ => return Err(malformed()),
        };
        if slot.is_some() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        *slot = Some(digits.parse().map_err(|_| malformed())?);
    }
    Ok(option)
}
