//! Schedule operations: compile, reconcile and persist through a [`ScheduleStore`].
//!
//! Each operation is compile → reconcile → one `commit`, so a failed compile
//! or a rejected update leaves the store untouched.

use chrono::{DateTime, Timelike, Utc};

use crate::compiler::{compile_code, parse_time_codes};
use crate::date::format_date;
use crate::error::{GrammarError, Result, TimecodeError};
use crate::reconcile::{reconcile, OccurrenceRow, ReconcilePlan};
use crate::settings::CompileContext;
use crate::store::{ScheduleRecord, ScheduleStore};
use crate::types::{Marks, Occurrence};
use crate::sync::VersionStamp;

/// User-editable fields of a schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleDraft {
    pub name: String,
    pub comment: String,
    pub inclusion: String,
    pub exclusion: String,
}

impl ScheduleDraft {
    pub fn new(name: impl Into<String>, inclusion: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inclusion: inclusion.into(),
            ..Self::default()
        }
    }

    pub fn with_exclusion(mut self, exclusion: impl Into<String>) -> Self {
        self.exclusion = exclusion.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// Compile `draft` and store it as a new schedule with all of its rows.
pub fn create_schedule<S: ScheduleStore>(
    store: &mut S,
    draft: &ScheduleDraft,
    ctx: &CompileContext<'_>,
) -> Result<ScheduleRecord> {
    let result = parse_time_codes(&draft.inclusion, &draft.exclusion, ctx)?;
    let event_type = result
        .event_type
        .ok_or_else(|| GrammarError::Rule("a schedule needs at least one line".to_string()))?;

    let stamp = VersionStamp::initial(ctx.now);
    let schedule = ScheduleRecord {
        id: store.next_schedule_id(),
        event_type,
        name: draft.name.clone(),
        comment: draft.comment.clone(),
        inclusion_code: result.inclusion_code.clone(),
        exclusion_code: result.exclusion_code.clone(),
        star: false,
        deleted: false,
        stamp,
    };
    let plan = reconcile(&[], &result);
    store.commit(&schedule, &plan, stamp)?;

    tracing::info!(
        id = %schedule.id,
        occurrences = plan.created.len(),
        "created schedule"
    );
    Ok(schedule)
}

/// Recompile an existing schedule and reconcile its rows.
///
/// # Errors
/// `ScheduleNotFound` and `ScheduleDeleted` for a missing or soft-deleted
/// schedule, `EventTypeChanged` when the new code turns an event into a todo
/// or back, and any compile error.
pub fn update_schedule<S: ScheduleStore>(
    store: &mut S,
    id: &str,
    draft: &ScheduleDraft,
    ctx: &CompileContext<'_>,
) -> Result<(ScheduleRecord, ReconcilePlan)> {
    let old = live_schedule(store, id)?;

    let result = parse_time_codes(&draft.inclusion, &draft.exclusion, ctx)?;
    let event_type = result
        .event_type
        .ok_or_else(|| GrammarError::Rule("a schedule needs at least one line".to_string()))?;
    if event_type != old.event_type {
        return Err(TimecodeError::EventTypeChanged {
            id: id.to_string(),
            from: old.event_type,
            to: event_type,
        });
    }

    let stamp = old.stamp.bump(ctx.now);
    let schedule = ScheduleRecord {
        name: draft.name.clone(),
        comment: draft.comment.clone(),
        inclusion_code: result.inclusion_code.clone(),
        exclusion_code: result.exclusion_code.clone(),
        stamp,
        ..old.clone()
    };

    // Identical text can still expand differently under new settings.
    let plan = reconcile(&store.occurrences(id)?, &result);
    store.commit(&schedule, &plan, stamp)?;

    tracing::info!(
        id,
        created = plan.created.len(),
        flipped = plan.flipped.len(),
        removed = plan.removed.len(),
        "updated schedule"
    );
    Ok((schedule, plan))
}

/// Exclude one occurrence by appending a UTC line for it to the schedule's
/// exclusion code, then reconciling. The row keeps its id and is flipped to
/// excluded.
///
/// Excluding an already excluded row changes nothing.
///
/// # Errors
/// `UnrepresentableOccurrence` when the row has unknown fields or a span no
/// single line reproduces, plus everything [`update_schedule`] returns.
pub fn exclude_occurrence<S: ScheduleStore>(
    store: &mut S,
    occurrence_id: &str,
    ctx: &CompileContext<'_>,
) -> Result<(ScheduleRecord, ReconcilePlan)> {
    let row = store
        .occurrence(occurrence_id)?
        .ok_or_else(|| TimecodeError::Store(format!("occurrence {} does not exist", occurrence_id)))?;
    let schedule = live_schedule(store, &row.schedule_id)?;
    if row.excluded {
        return Ok((schedule, ReconcilePlan::default()));
    }

    let line = occurrence_line(&row.occurrence)
        .ok_or_else(|| TimecodeError::UnrepresentableOccurrence(occurrence_id.to_string()))?;
    let compiled = compile_code(&line, ctx)?;
    if compiled.occurrences.as_slice() != std::slice::from_ref(&row.occurrence) {
        return Err(TimecodeError::UnrepresentableOccurrence(occurrence_id.to_string()));
    }

    let exclusion = if schedule.exclusion_code.is_empty() {
        compiled.canonical
    } else {
        format!("{};{}", schedule.exclusion_code, compiled.canonical)
    };
    let draft = ScheduleDraft {
        name: schedule.name.clone(),
        comment: schedule.comment.clone(),
        inclusion: schedule.inclusion_code.clone(),
        exclusion,
    };
    tracing::debug!(occurrence = occurrence_id, line = %line, "excluding occurrence");
    update_schedule(store, &schedule.id, &draft, ctx)
}

/// `Y/M/D H:MM-H:MM UTC` (or `Y/M/D H:MM UTC` for a todo) for a fully known
/// occurrence. An end on the next day relies on the overnight roll.
fn occurrence_line(occurrence: &Occurrence) -> Option<String> {
    if occurrence.start_marks != Marks::KNOWN || occurrence.end_marks != Marks::KNOWN {
        return None;
    }
    let clock = |at: DateTime<Utc>| format!("{}:{:02}", at.hour(), at.minute());
    let end = occurrence.end;
    Some(match occurrence.start {
        Some(start) => format!(
            "{} {}-{} UTC",
            format_date(start.date_naive()),
            clock(start),
            clock(end)
        ),
        None => format!("{} {} UTC", format_date(end.date_naive()), clock(end)),
    })
}

/// Star or unstar a schedule. Its rows are untouched.
pub fn set_schedule_star<S: ScheduleStore>(
    store: &mut S,
    id: &str,
    star: bool,
    now: DateTime<Utc>,
) -> Result<ScheduleRecord> {
    let old = live_schedule(store, id)?;
    let stamp = old.stamp.bump(now);
    let schedule = ScheduleRecord {
        star,
        stamp,
        ..old
    };
    store.commit(&schedule, &ReconcilePlan::default(), stamp)?;
    tracing::info!(id, star, "starred schedule");
    Ok(schedule)
}

/// Soft-delete a schedule; its rows are all marked excluded.
pub fn delete_schedule<S: ScheduleStore>(
    store: &mut S,
    id: &str,
    now: DateTime<Utc>,
) -> Result<ScheduleRecord> {
    let old = live_schedule(store, id)?;
    store.soft_delete(id, old.stamp.bump(now))?;
    store
        .schedule(id)?
        .ok_or_else(|| TimecodeError::ScheduleNotFound(id.to_string()))
}

/// Mark one occurrence done or not done.
pub fn set_occurrence_done<S: ScheduleStore>(
    store: &mut S,
    occurrence_id: &str,
    done: bool,
    now: DateTime<Utc>,
) -> Result<OccurrenceRow> {
    edit_occurrence(store, occurrence_id, now, |row| row.done = done)
}

/// Replace the free-text comment of one occurrence.
pub fn set_occurrence_comment<S: ScheduleStore>(
    store: &mut S,
    occurrence_id: &str,
    comment: &str,
    now: DateTime<Utc>,
) -> Result<OccurrenceRow> {
    edit_occurrence(store, occurrence_id, now, |row| {
        row.comment = comment.to_string()
    })
}

fn edit_occurrence<S, F>(
    store: &mut S,
    occurrence_id: &str,
    now: DateTime<Utc>,
    edit: F,
) -> Result<OccurrenceRow>
where
    S: ScheduleStore,
    F: FnOnce(&mut OccurrenceRow),
{
    let mut row = store
        .occurrence(occurrence_id)?
        .ok_or_else(|| TimecodeError::Store(format!("occurrence {} does not exist", occurrence_id)))?;
    live_schedule(store, &row.schedule_id)?;
    edit(&mut row);
    row.stamp = row.stamp.bump(now);
    store.put_occurrence(row.clone())?;
    Ok(row)
}

fn live_schedule<S: ScheduleStore>(store: &S, id: &str) -> Result<ScheduleRecord> {
    let schedule = store
        .schedule(id)?
        .ok_or_else(|| TimecodeError::ScheduleNotFound(id.to_string()))?;
    if schedule.deleted {
        return Err(TimecodeError::ScheduleDeleted(id.to_string()));
    }
    Ok(schedule)
}

