//! DST transition policies for local wall-clock times.

use chrono::offset::LocalResult;
use chrono::{DateTime, Duration, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Policy for local times that fall into a DST gap (e.g. 2:30 AM on a
/// spring-forward day). Times in a fall-back overlap always take the earlier
/// instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstPolicy {
    /// Drop occurrences whose wall-clock time does not exist.
    Skip,
    /// Read the wall-clock time with the offset in force before the gap, which
    /// lands the instant just past the transition.
    #[default]
    ShiftForward,
}

/// Convert a local wall-clock time in `tz` to UTC under `policy`.
///
/// Returns `None` only when the time is inside a gap and the policy is `Skip`.
pub fn resolve_local(tz: &Tz, local: NaiveDateTime, policy: DstPolicy) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => match policy {
            DstPolicy::Skip => None,
            DstPolicy::ShiftForward => {
                // No gap lasts a day, so the offset a day earlier is the pre-gap one.
                let before = tz
                    .offset_from_utc_datetime(&(local - Duration::days(1)))
                    .fix();
                let utc = local - Duration::seconds(i64::from(before.local_minus_utc()));
                Some(utc.and_utc())
            }
        },
    }
}

