//! Tests for date token resolution.

use chrono::NaiveDate;
use timecode_engine::date::{format_date, format_date_range, parse_date_range, parse_date_unit};
use timecode_engine::types::DateUnit;
use timecode_engine::GrammarError;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn today() -> NaiveDate {
    date(2026, 10, 16)
}

// ---------------------------------------------------------------------------
// Unit parsing
// ---------------------------------------------------------------------------

#[test]
fn components_are_right_aligned() {
    assert_eq!(
        parse_date_unit("5").unwrap(),
        DateUnit {
            year: None,
            month: None,
            day: Some(5)
        }
    );
    assert_eq!(
        parse_date_unit("7/5").unwrap(),
        DateUnit {
            year: None,
            month: Some(7),
            day: Some(5)
        }
    );
    assert_eq!(
        parse_date_unit("2023/7/5").unwrap(),
        DateUnit {
            year: Some(2023),
            month: Some(7),
            day: Some(5)
        }
    );
}

#[test]
fn malformed_units_are_rejected() {
    for text in ["", "1/2/3/4", "7/", "/5", "a/b", "7/-5", "2023/7/5x"] {
        assert!(
            matches!(parse_date_unit(text), Err(GrammarError::Date(_))),
            "`{}` should be rejected",
            text
        );
    }
}

// ---------------------------------------------------------------------------
// Resolution against today
// ---------------------------------------------------------------------------

#[test]
fn full_date_is_taken_verbatim() {
    let range = parse_date_range("2023/7/10", today()).unwrap();
    assert_eq!(range.dtstart, date(2023, 7, 10));
    assert_eq!(range.until, None);
}

#[test]
fn month_day_in_the_past_rolls_to_next_year() {
    let range = parse_date_range("7/10", today()).unwrap();
    assert_eq!(range.dtstart, date(2027, 7, 10));
}

#[test]
fn month_day_still_ahead_stays_in_this_year() {
    assert_eq!(
        parse_date_range("12/1", today()).unwrap().dtstart,
        date(2026, 12, 1)
    );
    assert_eq!(
        parse_date_range("10/16", today()).unwrap().dtstart,
        date(2026, 10, 16),
        "today has not passed yet"
    );
}

#[test]
fn bare_day_is_next_matching_day_of_a_month() {
    assert_eq!(parse_date_range("20", today()).unwrap().dtstart, date(2026, 10, 20));
    assert_eq!(parse_date_range("10", today()).unwrap().dtstart, date(2026, 11, 10));
    assert_eq!(parse_date_range("31", today()).unwrap().dtstart, date(2026, 10, 31));
}

#[test]
fn bare_day_skips_months_that_lack_it() {
    let mid_november = date(2026, 11, 16);
    assert_eq!(
        parse_date_range("31", mid_november).unwrap().dtstart,
        date(2026, 12, 31)
    );
}

#[test]
fn october_range_before_october() {
    let september = date(2026, 9, 15);
    let range = parse_date_range("10/1-25", september).unwrap();
    assert_eq!(range.dtstart, date(2026, 10, 1));
    assert_eq!(range.until, Some(date(2026, 10, 25)));
}

#[test]
fn until_inherits_missing_fields_from_start() {
    let range = parse_date_range("2023/7/20-30", today()).unwrap();
    assert_eq!(range.until, Some(date(2023, 7, 30)));

    let range = parse_date_range("2023/7/10-8/1", today()).unwrap();
    assert_eq!(range.until, Some(date(2023, 8, 1)));

    let range = parse_date_range("7/10-7/12", today()).unwrap();
    assert_eq!(range.dtstart, date(2027, 7, 10));
    assert_eq!(range.until, Some(date(2027, 7, 12)));
}

#[test]
fn single_day_range_is_allowed() {
    let range = parse_date_range("2023/7/10-10", today()).unwrap();
    assert_eq!(range.until, Some(date(2023, 7, 10)));
}

#[test]
fn until_before_start_is_rejected() {
    assert!(matches!(
        parse_date_range("2023/7/12-7/10", today()),
        Err(GrammarError::Date(_))
    ));
}

#[test]
fn impossible_dates_are_rejected() {
    for text in ["2023/2/30", "2023/13/1", "2023/7/10-2023/7/32", "7/10-8/1-9/1", "0"] {
        assert!(
            parse_date_range(text, today()).is_err(),
            "`{}` should be rejected",
            text
        );
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

#[test]
fn formatting_has_no_padding() {
    assert_eq!(format_date(date(2023, 7, 5)), "2023/7/5");
    let range = parse_date_range("2023/7/5-9", today()).unwrap();
    assert_eq!(format_date_range(&range), "2023/7/5-2023/7/9");
}
