//! Property-based tests for the compiler using proptest.
//!
//! These check invariants that should hold for any well-formed code, not just
//! the examples in `compiler_tests.rs`.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use timecode_engine::{compile_code, parse_time_codes, reconcile, CompileContext, Settings};

// ---------------------------------------------------------------------------
// Strategies — generate valid lines
// ---------------------------------------------------------------------------

fn arb_zone() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("UTC"),
        Just("America/Los_Angeles"),
        Just("America/New_York"),
        Just("Europe/London"),
        Just("Europe/Berlin"),
        Just("Asia/Tokyo"),
        Just("Australia/Sydney"),
    ]
}

fn arb_dtstart() -> impl Strategy<Value = NaiveDate> {
    (2020i32..=2030, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn arb_time() -> impl Strategy<Value = String> {
    (0u32..=23, 0u32..=59, 0u32..=23, 0u32..=59).prop_map(|(sh, sm, eh, em)| {
        format!("{}:{:02}-{}:{:02}", sh, sm, eh, em)
    })
}

fn arb_freq() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just(" daily".to_string()),
        (1u32..=4).prop_map(|i| format!(" weekly,i{}", i)),
        (1u32..=20).prop_map(|c| format!(" daily,c{}", c)),
        Just(" monthly".to_string()),
    ]
}

fn arb_by() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        (1i32..=7).prop_map(|d| format!(" by[day[{}]]", d)),
        (1i32..=7, 1i32..=6)
            .prop_map(|(a, step)| format!(" by[day[{},{}]]", a, (a - 1 + step) % 7 + 1)),
    ]
}

/// A bounded line: `dtstart-until time zone [freq] [by]`, spanning up to 90 days.
fn arb_line() -> impl Strategy<Value = (String, i64)> {
    (arb_dtstart(), 0i64..=90, arb_time(), arb_zone(), arb_freq(), arb_by()).prop_map(
        |(start, span, time, zone, freq, by)| {
            let until = start + Duration::days(span);
            let line = format!(
                "{}-{} {} {}{}{}",
                start.format("%Y/%-m/%-d"),
                until.format("%Y/%-m/%-d"),
                time,
                zone,
                freq,
                by
            );
            (line, span)
        },
    )
}

/// Date forms other than full `Y/M/D` ranges. `now()` is 2026-10-16.
fn arb_sugared_date() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("tdy".to_string()),
        Just("tmr".to_string()),
        Just("tdy-2026/12/31".to_string()),
        (11u32..=12, 1u32..=28).prop_map(|(m, d)| format!("tmr-{}/{}", m, d)),
        (1u32..=12, 1u32..=18, 0u32..=10).prop_map(|(m, d, extra)| format!("{}/{}-{}", m, d, d + extra)),
        (1u32..=12, 1u32..=28).prop_map(|(m, d)| format!("{}/{}", m, d)),
        (1u32..=28).prop_map(|d| d.to_string()),
    ]
}

/// Event times using `s`/`e` sugar, `.` separators, bare hours and `?` fields.
fn arb_sugared_event_time() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("s-e".to_string()),
        Just("start-end".to_string()),
        (0u32..=23, 0u32..=23).prop_map(|(a, b)| format!("{}-{}", a, b)),
        (0u32..=23, 0u32..=59, 0u32..=23, 0u32..=59)
            .prop_map(|(sh, sm, eh, em)| format!("{}.{}-{}.{:02}", sh, sm, eh, em)),
        (0u32..=23, 0u32..=23).prop_map(|(a, b)| format!("{}:?-{}:?", a, b)),
        (0u32..=23, 0u32..=59).prop_map(|(h, m)| format!("?:?-{}:{:02}", h, m)),
    ]
}

fn arb_todo_time() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("e".to_string()),
        Just("end".to_string()),
        (0u32..=23).prop_map(|h| h.to_string()),
        (0u32..=23, 0u32..=59).prop_map(|(h, m)| format!("{}.{}", h, m)),
        (0u32..=23).prop_map(|h| format!("{}:?", h)),
    ]
}

/// Zone token with its leading space; empty means the settings zone.
fn arb_zone_token() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just(" PST".to_string()),
        Just(" CET".to_string()),
        Just(" JST".to_string()),
        arb_zone().prop_map(|zone| format!(" {}", zone)),
    ]
}

/// One line in any surface form: event or todo, sugared dates and times,
/// abbreviations or no zone at all.
fn arb_sugared_line() -> impl Strategy<Value = String> {
    let time = prop_oneof![arb_sugared_event_time(), arb_todo_time()];
    (arb_sugared_date(), time, arb_zone_token(), arb_freq(), arb_by())
        .prop_map(|(date, time, zone, freq, by)| format!("{} {}{}{}{}", date, time, zone, freq, by))
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
}

fn config() -> ProptestConfig {
    ProptestConfig::with_cases(64)
}

// ---------------------------------------------------------------------------
// Property 1: Compiling the canonical form is idempotent
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn canonical_form_is_idempotent(
        (first, _) in arb_line(),
        (second, _) in arb_line(),
    ) {
        let settings = Settings::default();
        let ctx = CompileContext::new(now(), &settings);
        let code = format!("{};{}", first, second);

        let once = compile_code(&code, &ctx).unwrap();
        let twice = compile_code(&once.canonical, &ctx).unwrap();

        prop_assert_eq!(&twice.canonical, &once.canonical);
        prop_assert_eq!(twice.occurrences, once.occurrences);
    }
}

// ---------------------------------------------------------------------------
// Property 1b: Every surface form reaches the same canonical fixed point
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn sugared_lines_reach_a_canonical_fixed_point(line in arb_sugared_line()) {
        let settings = Settings::new(chrono_tz::Tz::America__New_York, chrono::Weekday::Sun);
        let ctx = CompileContext::new(now(), &settings);

        let once = compile_code(&line, &ctx).unwrap();
        let twice = compile_code(&once.canonical, &ctx).unwrap();

        prop_assert_eq!(&twice.canonical, &once.canonical);
        prop_assert_eq!(&twice.occurrences, &once.occurrences);
        prop_assert_eq!(twice.event_type, once.event_type);
        prop_assert!(!once.canonical.contains("tdy") && !once.canonical.contains("tmr"));
    }
}

// ---------------------------------------------------------------------------
// Property 2: A line never yields more date points than days in its range
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn occurrences_fit_in_range((line, span) in arb_line()) {
        let settings = Settings::default();
        let ctx = CompileContext::new(now(), &settings);
        let compiled = compile_code(&line, &ctx).unwrap();
        prop_assert!(compiled.occurrences.len() as i64 <= span + 1);
    }
}

// ---------------------------------------------------------------------------
// Property 3: included and excluded partition the inclusion set
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn included_and_excluded_partition_inclusion(
        (inclusion, _) in arb_line(),
        (exclusion, _) in arb_line(),
    ) {
        let settings = Settings::default();
        let ctx = CompileContext::new(now(), &settings);
        let all = compile_code(&inclusion, &ctx).unwrap().occurrences;
        let result = parse_time_codes(&inclusion, &exclusion, &ctx).unwrap();

        prop_assert_eq!(result.included.len() + result.excluded.len(), all.len());
        for occurrence in &result.included {
            prop_assert!(!result.excluded.contains(occurrence));
        }
        for occurrence in &all {
            prop_assert!(
                result.included.contains(occurrence) || result.excluded.contains(occurrence)
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Property 4: Excluding a code from itself excludes everything
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn self_exclusion_excludes_all((line, _) in arb_line()) {
        let settings = Settings::default();
        let ctx = CompileContext::new(now(), &settings);
        let result = parse_time_codes(&line, &line, &ctx).unwrap();
        prop_assert!(result.included.is_empty());
    }
}

// ---------------------------------------------------------------------------
// Property 5: Lines without an until date yield exactly one occurrence
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn unbounded_line_yields_one(
        start in arb_dtstart(),
        time in arb_time(),
        zone in arb_zone(),
        freq in arb_freq(),
        by in arb_by(),
    ) {
        let settings = Settings::default();
        let ctx = CompileContext::new(now(), &settings);
        let line = format!("{} {} {}{}{}", start.format("%Y/%-m/%-d"), time, zone, freq, by);
        let compiled = compile_code(&line, &ctx).unwrap();
        prop_assert_eq!(compiled.occurrences.len(), 1);
    }
}

// ---------------------------------------------------------------------------
// Property 6: Reconciling a result against itself is a no-op
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn self_reconcile_is_noop(
        (inclusion, _) in arb_line(),
        (exclusion, _) in arb_line(),
    ) {
        use timecode_engine::reconcile::OccurrenceRow;
        use timecode_engine::sync::VersionStamp;

        let settings = Settings::default();
        let ctx = CompileContext::new(now(), &settings);
        let result = parse_time_codes(&inclusion, &exclusion, &ctx).unwrap();

        let rows: Vec<OccurrenceRow> = result
            .included
            .iter()
            .map(|o| (o, false))
            .chain(result.excluded.iter().map(|o| (o, true)))
            .enumerate()
            .map(|(i, (occurrence, excluded))| OccurrenceRow {
                id: format!("occ-{}", i),
                schedule_id: "sch-1".to_string(),
                occurrence: occurrence.clone(),
                excluded,
                comment: String::new(),
                done: false,
                stamp: VersionStamp::initial(now()),
            })
            .collect();

        prop_assert!(reconcile(&rows, &result).is_noop());
    }
}
