//! Snapshot diff engine
//!
//! Pure comparison of a [`Snapshot`] against an [`Observation`]. The output
//! order is total: observed clusters in name order (added, or compared as
//! version, worker groups in name order, then error state), followed by
//! removed clusters in name order.

use crate::cluster::{Cluster, OperationFailure, WorkerGroup};
use crate::event::ChangeEvent;
use crate::snapshot::{Observation, Snapshot};
use std::collections::BTreeSet;

/// Result of one diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
    /// Detected changes in emission order
    pub events: Vec<ChangeEvent>,
    /// Baseline for the next cycle (the observation, verbatim)
    pub next: Snapshot,
}

impl Diff {
    /// Whether nothing changed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Compare previous snapshot with current observation
///
/// # Invariants
/// - a new cluster yields only `ClusterAdded`, never `WorkerGroupAdded`
/// - a removed cluster yields only `ClusterRemoved`, never `WorkerGroupRemoved`
/// - every `ClusterRemoved` follows all events of observed clusters
/// - identical inputs yield identical event sequences
#[must_use]
pub fn diff(previous: &Snapshot, current: &Observation) -> Diff {
    let mut events = Vec::new();

    for cluster in current.clusters() {
        match previous.get(&cluster.name) {
            None => events.push(ChangeEvent::ClusterAdded {
                name: cluster.name.clone(),
                seed: cluster.seed.clone(),
            }),
            Some(old) => diff_cluster(old, cluster, current.failure(&cluster.name), &mut events),
        }
    }

    events.extend(
        previous
            .names()
            .filter(|name| current.get(name).is_none())
            .map(|name| ChangeEvent::ClusterRemoved {
                name: name.to_string(),
            }),
    );

    Diff {
        events,
        next: current.to_snapshot(),
    }
}

fn diff_cluster(
    old: &Cluster,
    new: &Cluster,
    failure: Option<&OperationFailure>,
    events: &mut Vec<ChangeEvent>,
) {
    if old.control_plane_version != new.control_plane_version {
        events.push(ChangeEvent::ClusterVersionChanged {
            name: new.name.clone(),
            old: old.control_plane_version.clone(),
            new: new.control_plane_version.clone(),
        });
    }

    let groups: BTreeSet<&str> = old
        .worker_groups
        .keys()
        .chain(new.worker_groups.keys())
        .map(String::as_str)
        .collect();

    for group in groups {
        match (old.group(group), new.group(group)) {
            (None, Some(_)) => events.push(ChangeEvent::WorkerGroupAdded {
                cluster: new.name.clone(),
                name: group.to_string(),
            }),
            (Some(before), Some(after)) => diff_group(&new.name, before, after, events),
            (Some(_), None) => events.push(ChangeEvent::WorkerGroupRemoved {
                cluster: new.name.clone(),
                name: group.to_string(),
            }),
            (None, None) => {}
        }
    }

    if old.state != new.state && new.is_errored() {
        events.push(ChangeEvent::ClusterErrored {
            name: new.name.clone(),
            failure: failure.cloned().unwrap_or_default(),
        });
    }
}

fn diff_group(cluster: &str, old: &WorkerGroup, new: &WorkerGroup, events: &mut Vec<ChangeEvent>) {
    if old.size() != new.size() {
        events.push(ChangeEvent::WorkerGroupSizeChanged {
            cluster: cluster.to_string(),
            name: new.name.clone(),
            old: old.size(),
            new: new.size(),
        });
    }

    let (old_image, new_image) = (old.image(), new.image());
    if old_image != new_image {
        events.push(ChangeEvent::WorkerGroupImageChanged {
            cluster: cluster.to_string(),
            name: new.name.clone(),
            old: old_image,
            new: new_image,
        });
    }

    if old.control_plane_version != new.control_plane_version {
        events.push(ChangeEvent::WorkerGroupVersionChanged {
            cluster: cluster.to_string(),
            name: new.name.clone(),
            old: old.control_plane_version.clone(),
            new: new.control_plane_version.clone(),
        });
    }
}
