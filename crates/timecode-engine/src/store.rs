//! Persistence seam for schedules and their occurrences.
//!
//! The engine never talks to a database. A [`ScheduleStore`] supplies the
//! persisted rows and accepts a [`ReconcilePlan`] together with the updated
//! schedule in one `commit`, which implementations must apply atomically.
//! [`MemoryStore`] is the in-process implementation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TimecodeError};
use crate::reconcile::{OccurrenceRow, ReconcilePlan};
use crate::sync::{accepts_write, VersionStamp};
use crate::types::EventType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub id: String,
    pub event_type: EventType,
    pub name: String,
    pub comment: String,
    /// Canonical inclusion code.
    pub inclusion_code: String,
    /// Canonical exclusion code.
    pub exclusion_code: String,
    pub star: bool,
    /// Soft-deletion flag. A deleted schedule is never modified again.
    pub deleted: bool,
    pub stamp: VersionStamp,
}

pub trait ScheduleStore {
    /// A fresh schedule id.
    fn next_schedule_id(&mut self) -> String;

    fn schedule(&self, id: &str) -> Result<Option<ScheduleRecord>>;

    /// Every row of the schedule, included and excluded.
    fn occurrences(&self, schedule_id: &str) -> Result<Vec<OccurrenceRow>>;

    fn occurrence(&self, id: &str) -> Result<Option<OccurrenceRow>>;

    /// Write `schedule` and apply `plan` to its rows as one unit: either
    /// everything is stored or nothing is. Rows touched by the plan get `stamp`.
    fn commit(
        &mut self,
        schedule: &ScheduleRecord,
        plan: &ReconcilePlan,
        stamp: VersionStamp,
    ) -> Result<()>;

    /// Replace one existing row.
    fn put_occurrence(&mut self, row: OccurrenceRow) -> Result<()>;

    /// Mark the schedule deleted and every one of its rows excluded.
    fn soft_delete(&mut self, id: &str, stamp: VersionStamp) -> Result<()>;
}

/// In-memory store. Ids are sequential (`sch-1`, `occ-1`, ...).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    schedules: BTreeMap<String, ScheduleRecord>,
    rows: BTreeMap<String, OccurrenceRow>,
    next_schedule: u64,
    next_row: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing rows, e.g. loaded from a file.
    pub fn with_rows(rows: impl IntoIterator<Item = OccurrenceRow>) -> Self {
        let mut store = Self::new();
        for row in rows {
            store.rows.insert(row.id.clone(), row);
        }
        store
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Apply a row received from another device under last-writer-wins.
    /// Returns whether it was stored.
    pub fn sync_occurrence(&mut self, incoming: OccurrenceRow) -> bool {
        let stored = self.rows.get(&incoming.id).map(|row| &row.stamp);
        if !accepts_write(stored, &incoming.stamp) {
            tracing::debug!(id = %incoming.id, "dropped stale occurrence write");
            return false;
        }
        self.rows.insert(incoming.id.clone(), incoming);
        true
    }

    /// Apply a schedule received from another device under last-writer-wins.
    pub fn sync_schedule(&mut self, incoming: ScheduleRecord) -> bool {
        let stored = self.schedules.get(&incoming.id).map(|s| &s.stamp);
        if !accepts_write(stored, &incoming.stamp) {
            tracing::debug!(id = %incoming.id, "dropped stale schedule write");
            return false;
        }
        self.schedules.insert(incoming.id.clone(), incoming);
        true
    }

    fn next_row_id(&mut self) -> String {
        loop {
            self.next_row += 1;
            let id = format!("occ-{}", self.next_row);
            if !self.rows.contains_key(&id) {
                return id;
            }
        }
    }

    fn missing_row(id: &str) -> TimecodeError {
        TimecodeError::Store(format!("occurrence {} does not exist", id))
    }
}

impl ScheduleStore for MemoryStore {
    fn next_schedule_id(&mut self) -> String {
        self.next_schedule += 1;
        format!("sch-{}", self.next_schedule)
    }

    fn schedule(&self, id: &str) -> Result<Option<ScheduleRecord>> {
        Ok(self.schedules.get(id).cloned())
    }

    fn occurrences(&self, schedule_id: &str) -> Result<Vec<OccurrenceRow>> {
        Ok(self
            .rows
            .values()
            .filter(|row| row.schedule_id == schedule_id)
            .cloned()
            .collect())
    }

    fn occurrence(&self, id: &str) -> Result<Option<OccurrenceRow>> {
        Ok(self.rows.get(id).cloned())
    }

    fn commit(
        &mut self,
        schedule: &ScheduleRecord,
        plan: &ReconcilePlan,
        stamp: VersionStamp,
    ) -> Result<()> {
        // Validate before touching anything so a bad plan leaves no trace.
        let referenced = plan
            .flipped
            .iter()
            .map(|change| &change.id)
            .chain(&plan.removed);
        for id in referenced {
            if !self.rows.contains_key(id) {
                return Err(Self::missing_row(id));
            }
        }

        for change in &plan.flipped {
            if let Some(row) = self.rows.get_mut(&change.id) {
                row.excluded = change.excluded;
                row.stamp = stamp;
            }
        }
        for id in &plan.removed {
            self.rows.remove(id);
        }
        for new in &plan.created {
            let id = self.next_row_id();
            self.rows.insert(
                id.clone(),
                OccurrenceRow {
                    id,
                    schedule_id: schedule.id.clone(),
                    occurrence: new.occurrence.clone(),
                    excluded: new.excluded,
                    comment: String::new(),
                    done: false,
                    stamp,
                },
            );
        }
        self.schedules.insert(schedule.id.clone(), schedule.clone());
        Ok(())
    }

    fn put_occurrence(&mut self, row: OccurrenceRow) -> Result<()> {
        if !self.rows.contains_key(&row.id) {
            return Err(Self::missing_row(&row.id));
        }
        self.rows.insert(row.id.clone(), row);
        Ok(())
    }

    fn soft_delete(&mut self, id: &str, stamp: VersionStamp) -> Result<()> {
        let schedule = self
            .schedules
            .get_mut(id)
            .ok_or_else(|| TimecodeError::ScheduleNotFound(id.to_string()))?;
        schedule.deleted = true;
        schedule.stamp = stamp;
        for row in self.rows.values_mut().filter(|row| row.schedule_id == id) {
            row.excluded = true;
            row.stamp = stamp;
        }
        Ok(())
    }
}

