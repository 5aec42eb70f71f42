//! Cluster and worker-group records
//!
//! Provides [`Cluster`] and [`WorkerGroup`], the per-shoot state that is
//! observed, compared and persisted every cycle.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// Last-operation state the control plane reports for a failed shoot
pub const STATE_ERROR: &str = "Error";

/// One managed cluster
///
/// `name` is the snapshot key and is not part of the persisted record; the
/// store restores it from the map key on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// Unique key within a snapshot (`namespace/name` for shoots)
    #[serde(skip)]
    pub name: String,

    /// Declared orchestration version
    #[serde(default, deserialize_with = "null_as_empty")]
    pub control_plane_version: String,

    /// Worker groups keyed by group name
    #[serde(default)]
    pub worker_groups: BTreeMap<String, WorkerGroup>,

    /// Seed the cluster is scheduled on
    #[serde(default, skip_serializing_if = "String::is_empty", deserialize_with = "null_as_empty")]
    pub seed: String,

    /// Last-operation state (`Succeeded`, `Processing`, `Error`, ...)
    #[serde(default, skip_serializing_if = "String::is_empty", deserialize_with = "null_as_empty")]
    pub state: String,
}

impl Cluster {
    /// Create cluster with a name and control plane version
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, control_plane_version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            control_plane_version: control_plane_version.into(),
            ..Self::default()
        }
    }

    /// With seed name
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = seed.into();
        self
    }

    /// With last-operation state
    #[inline]
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    /// With worker group, replacing any group of the same name
    #[inline]
    #[must_use]
    pub fn with_group(mut self, group: WorkerGroup) -> Self {
        self.insert_group(group);
        self
    }

    /// Insert worker group keyed by its name
    pub fn insert_group(&mut self, group: WorkerGroup) {
        self.worker_groups.insert(group.name.clone(), group);
    }

    /// Look up a worker group
    #[inline]
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&WorkerGroup> {
        self.worker_groups.get(name)
    }

    /// Whether the control plane reports the last operation as failed
    #[inline]
    #[must_use]
    pub fn is_errored(&self) -> bool {
        self.state == STATE_ERROR
    }

    /// Restore `name` fields from map keys after deserialization
    pub fn rekey(&mut self, name: &str) {
        name.clone_into(&mut self.name);
        for (group_name, group) in &mut self.worker_groups {
            group_name.clone_into(&mut group.name);
        }
    }
}

/// One pool of worker nodes within a cluster
///
/// Size bounds are passed through as reported upstream; `minimum <= maximum`
/// is not enforced here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerGroup {
    /// Unique within the owning cluster; restored from the map key on load
    #[serde(skip)]
    pub name: String,

    /// Lower node-count bound
    #[serde(default)]
    pub minimum: i32,

    /// Upper node-count bound
    #[serde(default)]
    pub maximum: i32,

    /// Machine image name
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image_name: String,

    /// Machine image version
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image_version: String,

    /// Per-group version override, empty when unspecified
    #[serde(default, deserialize_with = "null_as_empty")]
    pub control_plane_version: String,
}

impl WorkerGroup {
    /// Create group with size bounds
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, minimum: i32, maximum: i32) -> Self {
        Self {
            name: name.into(),
            minimum,
            maximum,
            ..Self::default()
        }
    }

    /// With machine image
    #[inline]
    #[must_use]
    pub fn with_image(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.image_name = name.into();
        self.image_version = version.into();
        self
    }

    /// With version override
    #[inline]
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.control_plane_version = version.into();
        self
    }

    /// Size bounds as a unit
    #[inline]
    #[must_use]
    pub fn size(&self) -> GroupSize {
        GroupSize {
            minimum: self.minimum,
            maximum: self.maximum,
        }
    }

    /// Machine image as a unit
    #[inline]
    #[must_use]
    pub fn image(&self) -> MachineImage {
        MachineImage {
            name: self.image_name.clone(),
            version: self.image_version.clone(),
        }
    }
}

/// Node-count bounds of a worker group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSize {
    /// Lower bound
    pub minimum: i32,
    /// Upper bound
    pub maximum: i32,
}

/// Machine image identity, rendered as `name-version`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineImage {
    /// Image name
    pub name: String,
    /// Image version
    pub version: String,
}

impl Display for MachineImage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.version)
    }
}

/// Failure details of a cluster's last operation
///
/// Only carried by observations; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationFailure {
    /// Last-operation description
    pub description: String,
    /// Conditions that are neither healthy nor progressing
    pub conditions: Vec<FailedCondition>,
}

/// One unhealthy cluster condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedCondition {
    /// Condition type, e.g. `APIServerAvailable`
    pub kind: String,
    /// Condition message
    pub message: String,
}

impl FailedCondition {
    /// Create condition
    #[inline]
    #[must_use]
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// `null` and absent both mean "unspecified"
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
