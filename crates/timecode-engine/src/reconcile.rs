//! Reconciliation of freshly compiled occurrences against persisted rows.
//!
//! Rows are matched with [`Occurrence::same_slot`]. A matched row keeps its id,
//! comment and done flag; only its `excluded` flag follows the new result.
//! Unmatched new occurrences become new rows and unmatched rows are removed
//! outright, since a stale excluded row would show up as an exception the
//! schedule no longer has.

use serde::{Deserialize, Serialize};

use crate::sync::VersionStamp;
use crate::types::{Occurrence, ParseResult};

/// A persisted occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccurrenceRow {
    pub id: String,
    pub schedule_id: String,
    #[serde(flatten)]
    pub occurrence: Occurrence,
    /// Set when the exclusion code removes this occurrence.
    pub excluded: bool,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub stamp: VersionStamp,
}

/// An occurrence with no persisted counterpart yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOccurrence {
    pub occurrence: Occurrence,
    pub excluded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagChange {
    pub id: String,
    pub excluded: bool,
}

/// What has to happen to the persisted rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconcilePlan {
    pub created: Vec<NewOccurrence>,
    pub flipped: Vec<FlagChange>,
    /// Ids to hard-delete.
    pub removed: Vec<String>,
    /// Ids matched without any change.
    pub kept: Vec<String>,
}

impl ReconcilePlan {
    /// True when applying the plan would not touch any row.
    pub fn is_noop(&self) -> bool {
        self.created.is_empty() && self.flipped.is_empty() && self.removed.is_empty()
    }
}

/// Diff `result` against every persisted row of a schedule, included and
/// excluded alike.
///
/// Each row is claimed by at most one new occurrence, so duplicates on either
/// side never share a row.
pub fn reconcile(existing: &[OccurrenceRow], result: &ParseResult) -> ReconcilePlan {
    let mut plan = ReconcilePlan::default();
    let mut claimed = vec![false; existing.len()];

    let wanted = result
        .included
        .iter()
        .map(|o| (o, false))
        .chain(result.excluded.iter().map(|o| (o, true)));

    for (occurrence, excluded) in wanted {
        let matched = existing
            .iter()
            .enumerate()
            .position(|(i, row)| !claimed[i] && row.occurrence.same_slot(occurrence));
        match matched {
            Some(i) => {
                claimed[i] = true;
                let row = &existing[i];
                if row.excluded == excluded {
                    plan.kept.push(row.id.clone());
                } else {
                    plan.flipped.push(FlagChange {
                        id: row.id.clone(),
                        excluded,
                    });
                }
            }
            None => plan.created.push(NewOccurrence {
                occurrence: occurrence.clone(),
                excluded,
            }),
        }
    }

    plan.removed = existing
        .iter()
        .zip(&claimed)
        .filter(|(_, claimed)| !**claimed)
        .map(|(row, _)| row.id.clone())
        .collect();

    tracing::debug!(
        created = plan.created.len(),
        flipped = plan.flipped.len(),
        removed = plan.removed.len(),
        kept = plan.kept.len(),
        "reconciled occurrences"
    );
    plan
}
