//! Change events
//!
//! Each [`ChangeEvent`] is one classified difference between a snapshot and
//! an observation. Its `Display` output is the notification text.

use crate::cluster::{FailedCondition, GroupSize, MachineImage, OperationFailure};
use std::fmt::{self, Display, Formatter};

/// One detected difference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// Cluster appeared
    ClusterAdded {
        /// Cluster name
        name: String,
        /// Seed the cluster is scheduled on
        seed: String,
    },

    /// Cluster disappeared; subsumes removal of its worker groups
    ClusterRemoved {
        /// Cluster name
        name: String,
    },

    /// Cluster-level version changed
    ClusterVersionChanged {
        /// Cluster name
        name: String,
        /// Previous version
        old: String,
        /// Current version
        new: String,
    },

    /// Last operation moved into the error state
    ClusterErrored {
        /// Cluster name
        name: String,
        /// Description and unhealthy conditions
        failure: OperationFailure,
    },

    /// Worker group appeared in an existing cluster
    WorkerGroupAdded {
        /// Owning cluster
        cluster: String,
        /// Group name
        name: String,
    },

    /// Worker group disappeared from an existing cluster
    WorkerGroupRemoved {
        /// Owning cluster
        cluster: String,
        /// Group name
        name: String,
    },

    /// Minimum/maximum pair changed
    WorkerGroupSizeChanged {
        /// Owning cluster
        cluster: String,
        /// Group name
        name: String,
        /// Previous bounds
        old: GroupSize,
        /// Current bounds
        new: GroupSize,
    },

    /// Image name/version pair changed
    WorkerGroupImageChanged {
        /// Owning cluster
        cluster: String,
        /// Group name
        name: String,
        /// Previous image
        old: MachineImage,
        /// Current image
        new: MachineImage,
    },

    /// Per-group version override changed
    WorkerGroupVersionChanged {
        /// Owning cluster
        cluster: String,
        /// Group name
        name: String,
        /// Previous override
        old: String,
        /// Current override
        new: String,
    },
}

impl ChangeEvent {
    /// Stable kind label, used as a log field
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ClusterAdded { .. } => "cluster_added",
            Self::ClusterRemoved { .. } => "cluster_removed",
            Self::ClusterVersionChanged { .. } => "cluster_version_changed",
            Self::ClusterErrored { .. } => "cluster_errored",
            Self::WorkerGroupAdded { .. } => "worker_group_added",
            Self::WorkerGroupRemoved { .. } => "worker_group_removed",
            Self::WorkerGroupSizeChanged { .. } => "worker_group_size_changed",
            Self::WorkerGroupImageChanged { .. } => "worker_group_image_changed",
            Self::WorkerGroupVersionChanged { .. } => "worker_group_version_changed",
        }
    }

    /// Name of the cluster the event concerns
    #[must_use]
    pub fn cluster(&self) -> &str {
        match self {
            Self::ClusterAdded { name, .. }
            | Self::ClusterRemoved { name }
            | Self::ClusterVersionChanged { name, .. }
            | Self::ClusterErrored { name, .. } => name,
            Self::WorkerGroupAdded { cluster, .. }
            | Self::WorkerGroupRemoved { cluster, .. }
            | Self::WorkerGroupSizeChanged { cluster, .. }
            | Self::WorkerGroupImageChanged { cluster, .. }
            | Self::WorkerGroupVersionChanged { cluster, .. } => cluster,
        }
    }
}

impl Display for ChangeEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClusterAdded { name, seed } => {
                write!(f, "new cluster: {name} in seed {seed}")
            }
            Self::ClusterRemoved { name } => write!(f, "cluster {name} has been deleted"),
            Self::ClusterVersionChanged { name, old, new } => {
                write!(f, "new cluster API version for {name}: {new} (old: {old})")
            }
            Self::ClusterErrored { name, failure } => {
                write!(f, "shoot {name} has errors: {}", failure.description)?;
                for FailedCondition { kind, message } in &failure.conditions {
                    write!(f, "\n{kind} - {message}")?;
                }
                Ok(())
            }
            Self::WorkerGroupAdded { cluster, name } => {
                write!(f, "new workergroup: {name} in cluster {cluster}")
            }
            Self::WorkerGroupRemoved { cluster, name } => {
                write!(f, "workergroup {name} in {cluster} has been deleted")
            }
            Self::WorkerGroupSizeChanged {
                cluster,
                name,
                old,
                new,
            } => write!(
                f,
                "new sizes for workergroup {name} in {cluster}: min {}, max {} (old: {}, {})",
                new.minimum, new.maximum, old.minimum, old.maximum
            ),
            Self::WorkerGroupImageChanged {
                cluster,
                name,
                old,
                new,
            } => write!(
                f,
                "new worker image versions for workergroup {name} in {cluster}: {new} (old: {old})"
            ),
            Self::WorkerGroupVersionChanged {
                cluster,
                name,
                old,
                new,
            } => write!(
                f,
                "new API version for workergroup {name} in {cluster}: {new} (old: {old})"
            ),
        }
    }
}
