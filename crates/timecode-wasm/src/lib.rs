//! WASM bindings for timecode-engine.
//!
//! Exposes time-code compilation and reconciliation to JavaScript via
//! `wasm-bindgen`. All complex types are passed as JSON strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p timecode-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/timecode-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/timecode_wasm.wasm
//! ```

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use timecode_engine::{
    compile_code, parse_time_codes, reconcile, CompileContext, OccurrenceRow, ParseResult,
    Settings,
};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalDto {
    event_type: Option<String>,
    canonical: String,
    occurrence_count: usize,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn js_error(context: &str, e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, e))
}

/// Parse an ISO 8601 datetime string into `DateTime<Utc>`.
///
/// Accepts RFC 3339 (e.g. "2026-10-16T12:00:00+09:00") and naive datetimes
/// (e.g. "2026-10-16T12:00:00"), which are read as UTC.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, JsValue> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .map_err(|e| js_error(&format!("Invalid datetime '{}'", s), e))
}

/// An empty string means default settings.
fn parse_settings(json: &str) -> Result<Settings, JsValue> {
    if json.trim().is_empty() {
        return Ok(Settings::default());
    }
    Settings::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| js_error("Serialization error", e))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Compile an inclusion and an exclusion code.
///
/// Returns the `ParseResult` as JSON: `event_type`, `included`, `excluded`
/// (arrays of `{start, end, start_marks, end_marks}` with RFC 3339 instants)
/// and the canonical codes.
///
/// # Arguments
/// - `settings_json` -- `{"time_zone", "week_start", "dst_policy"}`, any key
///   optional; `""` for defaults
/// - `now` -- the current instant, RFC 3339
#[wasm_bindgen(js_name = "compileTimeCodes")]
pub fn compile_time_codes(
    inclusion: &str,
    exclusion: &str,
    settings_json: &str,
    now: &str,
) -> Result<String, JsValue> {
    let settings = parse_settings(settings_json)?;
    let now = parse_datetime(now)?;
    let result = parse_time_codes(inclusion, exclusion, &CompileContext::new(now, &settings))
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_json(&result)
}

/// Normalize a single code. Returns `{eventType, canonical, occurrenceCount}`.
#[wasm_bindgen(js_name = "canonicalTimeCode")]
pub fn canonical_time_code(code: &str, settings_json: &str, now: &str) -> Result<String, JsValue> {
    let settings = parse_settings(settings_json)?;
    let now = parse_datetime(now)?;
    let compiled = compile_code(code, &CompileContext::new(now, &settings))
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_json(&CanonicalDto {
        event_type: compiled.event_type.map(|t| t.to_string()),
        canonical: compiled.canonical,
        occurrence_count: compiled.occurrences.len(),
    })
}

/// Diff persisted rows against a result from [`compile_time_codes`].
///
/// `rows_json` is an array of occurrence rows as stored; `result_json` is the
/// output of `compileTimeCodes`. Returns the plan: `created`, `flipped`,
/// `removed` and `kept`.
#[wasm_bindgen(js_name = "reconcileOccurrences")]
pub fn reconcile_occurrences(rows_json: &str, result_json: &str) -> Result<String, JsValue> {
    let rows: Vec<OccurrenceRow> =
        serde_json::from_str(rows_json).map_err(|e| js_error("Invalid rows JSON", e))?;
    let result: ParseResult =
        serde_json::from_str(result_json).map_err(|e| js_error("Invalid result JSON", e))?;
    to_json(&reconcile(&rows, &result))
}
