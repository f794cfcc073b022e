//! Optimistic version stamps for rows edited from several devices.
//!
//! Writes are last-writer-wins with no merge: a higher version always wins, an
//! equal version is decided by the update timestamp, and a losing write is
//! dropped without an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VersionStamp {
    pub version: i64,
    pub updated: DateTime<Utc>,
}

impl VersionStamp {
    pub fn new(version: i64, updated: DateTime<Utc>) -> Self {
        Self { version, updated }
    }

    pub fn initial(now: DateTime<Utc>) -> Self {
        Self::new(0, now)
    }

    /// The stamp for the next local write.
    pub fn bump(self, now: DateTime<Utc>) -> Self {
        Self::new(self.version + 1, now)
    }
}

/// Whether an incoming write replaces the stored row.
pub fn accepts_write(stored: Option<&VersionStamp>, incoming: &VersionStamp) -> bool {
    match stored {
        None => true,
        Some(stored) if incoming.version != stored.version => incoming.version > stored.version,
        Some(stored) => incoming.updated >= stored.updated,
    }
}
