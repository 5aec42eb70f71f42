//! Schema migration guard
//!
//! A snapshot read from an unversioned file that lacks per-group data turns
//! the next cycle into a catch-up cycle: the diff still runs to produce the
//! next snapshot, but its events are withheld and a single
//! [`MigrationMarker`] is reported instead.

use crate::diff::Diff;
use crate::event::ChangeEvent;
use crate::snapshot::Snapshot;
use std::fmt::{self, Display, Formatter};

/// How a cycle treats its diff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleMode {
    /// Report every event
    Normal,
    /// Withhold every event; snapshot predates worker-group tracking
    Migration {
        /// Clusters in the loaded snapshot with no worker-group data
        legacy_clusters: usize,
    },
}

impl CycleMode {
    /// Whether events are withheld this cycle
    #[inline]
    #[must_use]
    pub fn is_migration(&self) -> bool {
        matches!(self, Self::Migration { .. })
    }
}

/// Decide the mode for a cycle from the loaded snapshot
///
/// Versioned snapshots never migrate, so a cluster that legitimately has no
/// worker groups is not mistaken for legacy data.
#[must_use]
pub fn evaluate(snapshot: &Snapshot) -> CycleMode {
    if snapshot.is_empty() || !snapshot.is_outdated() {
        return CycleMode::Normal;
    }

    let legacy_clusters = snapshot
        .clusters()
        .filter(|c| c.worker_groups.is_empty())
        .count();

    if legacy_clusters == 0 {
        CycleMode::Normal
    } else {
        CycleMode::Migration { legacy_clusters }
    }
}

/// Outcome of a diff after the guard has been applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guarded {
    /// Events to report, empty in migration mode
    pub events: Vec<ChangeEvent>,
    /// Events withheld by the guard
    pub suppressed: usize,
    /// Present only in migration mode
    pub marker: Option<MigrationMarker>,
    /// Baseline for the next cycle
    pub next: Snapshot,
}

/// Apply a cycle mode to a diff
#[must_use]
pub fn guard(mode: CycleMode, diff: Diff) -> Guarded {
    match mode {
        CycleMode::Normal => Guarded {
            events: diff.events,
            suppressed: 0,
            marker: None,
            next: diff.next,
        },
        CycleMode::Migration { .. } => {
            let marker = MigrationMarker {
                clusters: diff.next.len(),
                suppressed: diff.events.len(),
            };
            Guarded {
                events: Vec::new(),
                suppressed: marker.suppressed,
                marker: Some(marker),
                next: diff.next,
            }
        }
    }
}

/// Informational notice sent once a migration cycle completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationMarker {
    /// Clusters written to the migrated snapshot
    pub clusters: usize,
    /// Events withheld during the cycle
    pub suppressed: usize,
}

impl Display for MigrationMarker {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "snapshot migration finished: {} clusters resynchronized, {} changes suppressed",
            self.clusters, self.suppressed
        )
    }
}
