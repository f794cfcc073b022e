//! Timezone lookup: IANA identifiers and abbreviations such as `PST` or `CET`.
//!
//! Abbreviations are not unique (`CST` is used in Chicago, Shanghai and
//! Havana). The table keeps every zone an abbreviation maps to and resolves an
//! abbreviation to the first zone in lexical order. That choice is arbitrary:
//! a caller who needs a specific zone must write its IANA name.

use std::collections::{BTreeMap, BTreeSet};

use chrono::DateTime;
use chrono_tz::{Tz, TZ_VARIANTS};
use once_cell::sync::Lazy;

use crate::error::{GrammarError, GrammarResult};

/// Reference instants used to sample abbreviations: mid-January and mid-July
/// 2024 (UTC), so both standard and daylight names are collected.
const SAMPLE_INSTANTS: [i64; 2] = [1_705_320_000, 1_721_044_800];

static GLOBAL: Lazy<AbbreviationTable> = Lazy::new(AbbreviationTable::from_tz_database);

/// Abbreviation → set of zone identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbbreviationTable {
    map: BTreeMap<String, BTreeSet<String>>,
}

impl AbbreviationTable {
    /// The process-wide table built from the bundled tz database on first use.
    pub fn global() -> &'static AbbreviationTable {
        &GLOBAL
    }

    /// Build the table from every zone in the bundled tz database.
    pub fn from_tz_database() -> Self {
        let mut table = Self::default();
        for tz in TZ_VARIANTS.iter() {
            for secs in SAMPLE_INSTANTS {
                let Some(instant) = DateTime::from_timestamp(secs, 0) else {
                    continue;
                };
                let abbr = instant.with_timezone(tz).format("%Z").to_string();
                // Zones without a name render their offset ("+03"); those are not abbreviations.
                if abbr.starts_with(['+', '-']) || abbr.is_empty() {
                    continue;
                }
                table.insert(&abbr, tz.name());
            }
        }
        tracing::debug!(abbreviations = table.len(), "built timezone abbreviation table");
        table
    }

    /// Build a table from explicit `(abbreviation, zone)` pairs.
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut table = Self::default();
        for (abbr, zone) in entries {
            table.insert(abbr, zone);
        }
        table
    }

    fn insert(&mut self, abbr: &str, zone: &str) {
        self.map
            .entry(abbr.to_string())
            .or_default()
            .insert(zone.to_string());
    }

    /// All zones known under `abbr`.
    pub fn zones(&self, abbr: &str) -> Option<&BTreeSet<String>> {
        self.map.get(abbr)
    }

    /// The zone `abbr` resolves to: the first parseable zone of its set.
    pub fn representative(&self, abbr: &str) -> Option<Tz> {
        self.zones(abbr)?.iter().find_map(|zone| zone.parse().ok())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Resolve a zone option token: an IANA identifier first, then an abbreviation.
pub fn resolve_zone(token: &str, abbreviations: &AbbreviationTable) -> GrammarResult<Tz> {
    if let Ok(tz) = token.parse::<Tz>() {
        return Ok(tz);
    }
    let tz = abbreviations
        .representative(token)
        .ok_or_else(|| GrammarError::UnknownTimezone(token.to_string()))?;
    if let Some(zones) = abbreviations.zones(token).filter(|zones| zones.len() > 1) {
        tracing::warn!(
            abbreviation = token,
            chosen = tz.name(),
            candidates = zones.len(),
            "ambiguous timezone abbreviation"
        );
    }
    Ok(tz)
}
