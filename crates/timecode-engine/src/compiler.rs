//! Top-level compiler: inclusion and exclusion code → [`ParseResult`].
//!
//! Each code string is a `;`-separated list of lines. Every line is lexed and
//! expanded on its own; the inclusion set minus the exclusion set is what the
//! schedule keeps, and the overlap is what it excludes.

use crate::error::{GrammarError, Result};
use crate::expander::expand_line;
use crate::lexer::lex_line;
use crate::setops::{difference, distinct, intersection};
use crate::settings::CompileContext;
use crate::types::{EventType, Occurrence, ParseResult};

/// One compiled code string.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledCode {
    /// `None` when the code has no lines.
    pub event_type: Option<EventType>,
    /// Distinct occurrences, in line order.
    pub occurrences: Vec<Occurrence>,
    /// Canonical lines joined with `;`.
    pub canonical: String,
}

/// Compile one code string.
///
/// # Errors
/// Fails on the first invalid line, or if lines disagree on event type.
pub fn compile_code(code: &str, ctx: &CompileContext<'_>) -> Result<CompiledCode> {
    let mut event_type: Option<EventType> = None;
    let mut occurrences = Vec::new();
    let mut canonical_lines = Vec::new();

    for line in code.split(';').map(str::trim).filter(|l| !l.is_empty()) {
        let lexed = lex_line(line, ctx)?;
        let line_type = lexed.event_type();
        if event_type.is_some_and(|t| t != line_type) {
            return Err(GrammarError::MixedEventType.into());
        }
        event_type = Some(line_type);

        occurrences.extend(expand_line(
            &lexed,
            ctx.settings.week_start,
            ctx.settings.dst_policy,
        )?);
        canonical_lines.push(lexed.canonical);
    }

    Ok(CompiledCode {
        event_type,
        occurrences: distinct(&occurrences, |a, b| a == b),
        canonical: canonical_lines.join(";"),
    })
}

/// Compile an inclusion and an exclusion code string into a [`ParseResult`].
///
/// `included` is inclusion minus exclusion and `excluded` is their
/// intersection, both under structural equality.
///
/// # Errors
/// Any invalid line fails the whole call, as does an event-type mismatch
/// between the two codes when both are non-empty.
pub fn parse_time_codes(
    inclusion: &str,
    exclusion: &str,
    ctx: &CompileContext<'_>,
) -> Result<ParseResult> {
    let include = compile_code(inclusion, ctx)?;
    let exclude = compile_code(exclusion, ctx)?;

    if let (Some(a), Some(b)) = (include.event_type, exclude.event_type) {
        if a != b {
            return Err(GrammarError::MixedEventType.into());
        }
    }

    let equal = |a: &Occurrence, b: &Occurrence| a == b;
    let included = difference(&include.occurrences, &exclude.occurrences, equal);
    let excluded = intersection(&include.occurrences, &exclude.occurrences, equal);

    tracing::debug!(
        included = included.len(),
        excluded = excluded.len(),
        "compiled time codes"
    );

    Ok(ParseResult {
        event_type: include.event_type.or(exclude.event_type),
        included,
        excluded,
        inclusion_code: include.canonical,
        exclusion_code: exclude.canonical,
    })
}
