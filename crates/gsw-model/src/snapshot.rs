//! Snapshots and observations
//!
//! A [`Snapshot`] is what was last seen and already notified about; an
//! [`Observation`] is the current truth for one cycle. Both are keyed by
//! cluster name in a sorted map so iteration order is stable.

use crate::cluster::{Cluster, OperationFailure};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Schema version written by this crate
///
/// Version 1 covers every unversioned layout (flat legacy records and nested
/// records without a version field).
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Schema version assigned to unversioned snapshot files
pub const UNVERSIONED_SCHEMA_VERSION: u32 = 1;

/// Persisted baseline for the diff
///
/// # Invariants
/// - every map key equals the `name` of the cluster stored under it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    schema_version: u32,
    clusters: BTreeMap<String, Cluster>,
}

impl Snapshot {
    /// Empty snapshot at the current schema version
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            clusters: BTreeMap::new(),
        }
    }

    /// Build snapshot at the current schema version
    #[must_use]
    pub fn from_clusters(clusters: impl IntoIterator<Item = Cluster>) -> Self {
        Self::with_schema_version(CURRENT_SCHEMA_VERSION, clusters)
    }

    /// Build snapshot with an explicit schema version
    #[must_use]
    pub fn with_schema_version(
        schema_version: u32,
        clusters: impl IntoIterator<Item = Cluster>,
    ) -> Self {
        Self {
            schema_version,
            clusters: clusters.into_iter().map(|c| (c.name.clone(), c)).collect(),
        }
    }

    /// Restore cluster and group names from map keys
    ///
    /// Must be called after deserializing a snapshot.
    #[must_use]
    pub fn rekeyed(mut self) -> Self {
        for (name, cluster) in &mut self.clusters {
            cluster.rekey(name);
        }
        self
    }

    /// Schema version this snapshot was read with
    #[inline]
    #[must_use]
    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// Whether the snapshot predates the current schema
    #[inline]
    #[must_use]
    pub fn is_outdated(&self) -> bool {
        self.schema_version < CURRENT_SCHEMA_VERSION
    }

    /// Look up a cluster
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Cluster> {
        self.clusters.get(name)
    }

    /// Clusters in name order
    #[inline]
    pub fn clusters(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.values()
    }

    /// Cluster names in order
    #[inline]
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.clusters.keys().map(String::as_str)
    }

    /// Number of clusters
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// Whether the snapshot holds no clusters
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Current state of the resource collection for one cycle
///
/// Never persisted directly; [`crate::diff`] promotes it into the next
/// [`Snapshot`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observation {
    clusters: BTreeMap<String, Cluster>,
    failures: BTreeMap<String, OperationFailure>,
}

impl Observation {
    /// Create empty observation
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert cluster, replacing any cluster of the same name
    pub fn insert(&mut self, cluster: Cluster) {
        self.clusters.insert(cluster.name.clone(), cluster);
    }

    /// With cluster
    #[inline]
    #[must_use]
    pub fn with_cluster(mut self, cluster: Cluster) -> Self {
        self.insert(cluster);
        self
    }

    /// Attach last-operation failure details to a cluster
    pub fn record_failure(&mut self, cluster: impl Into<String>, failure: OperationFailure) {
        self.failures.insert(cluster.into(), failure);
    }

    /// With failure details
    #[inline]
    #[must_use]
    pub fn with_failure(mut self, cluster: impl Into<String>, failure: OperationFailure) -> Self {
        self.record_failure(cluster, failure);
        self
    }

    /// Look up a cluster
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Cluster> {
        self.clusters.get(name)
    }

    /// Failure details for a cluster, if any were observed
    #[inline]
    #[must_use]
    pub fn failure(&self, name: &str) -> Option<&OperationFailure> {
        self.failures.get(name)
    }

    /// Clusters in name order
    #[inline]
    pub fn clusters(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.values()
    }

    /// Cluster names in order
    #[inline]
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.clusters.keys().map(String::as_str)
    }

    /// Number of clusters
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// Whether nothing was observed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Promote into the next snapshot verbatim
    #[must_use]
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot::from_clusters(self.clusters.values().cloned())
    }
}

impl FromIterator<Cluster> for Observation {
    fn from_iter<I: IntoIterator<Item = Cluster>>(iter: I) -> Self {
        let mut observation = Self::new();
        for cluster in iter {
            observation.insert(cluster);
        }
        observation
    }
}
