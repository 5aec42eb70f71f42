//! GSW Model
//!
//! Cluster state, the diff engine and the schema migration guard.
//!
//! # Core Concepts
//!
//! - [`Snapshot`]: persisted baseline, keyed by cluster name
//! - [`Observation`]: current truth for one cycle
//! - [`diff()`]: pure `(Snapshot, Observation) -> (events, next snapshot)`
//! - [`ChangeEvent`]: one classified difference, displayed as a message
//! - [`migration::evaluate`]: decides whether a cycle withholds its events
//!
//! # Example
//!
//! ```rust
//! use gsw_model::{diff, Cluster, Observation, Snapshot, WorkerGroup};
//!
//! let previous = Snapshot::from_clusters([
//!     Cluster::new("garden-dev/alpha", "1.30.2").with_group(WorkerGroup::new("pool-a", 2, 5)),
//! ]);
//! let current = Observation::new().with_cluster(
//!     Cluster::new("garden-dev/alpha", "1.30.2").with_group(WorkerGroup::new("pool-a", 3, 6)),
//! );
//!
//! let result = diff(&previous, &current);
//! assert_eq!(
//!     result.events[0].to_string(),
//!     "new sizes for workergroup pool-a in garden-dev/alpha: min 3, max 6 (old: 2, 5)"
//! );
//! ```

#![warn(unreachable_pub)]

// Core modules
mod cluster;
mod diff;
mod event;
mod snapshot;

pub mod migration;

// Re-exports
pub use cluster::{
    Cluster, FailedCondition, GroupSize, MachineImage, OperationFailure, WorkerGroup, STATE_ERROR,
};
pub use diff::{diff, Diff};
pub use event::ChangeEvent;
pub use migration::{CycleMode, Guarded, MigrationMarker};
pub use snapshot::{Observation, Snapshot, CURRENT_SCHEMA_VERSION, UNVERSIONED_SCHEMA_VERSION};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
