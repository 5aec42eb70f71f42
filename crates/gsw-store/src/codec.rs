//! On-disk snapshot layouts
//!
//! Three layouts are accepted on read:
//! 1. versioned: `{"schemaVersion": 2, "clusters": {name -> cluster}}`
//! 2. unversioned nested: `{name -> {controlPlaneVersion, workerGroups, ...}}`
//! 3. legacy flat: `{name -> {minimum, maximum, imagename, apiversion, ...}}`
//!
//! Layouts 2 and 3 load at [`UNVERSIONED_SCHEMA_VERSION`]. Only layout 1 is
//! ever written.

use gsw_model::{Cluster, Snapshot, WorkerGroup, UNVERSIONED_SCHEMA_VERSION};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

const SCHEMA_VERSION_KEY: &str = "schemaVersion";

/// Record shape shared by both unversioned layouts
///
/// Flat legacy fields (`minimum`, `imagename`, ...) carry no group name and
/// are dropped; the migration cycle rebuilds group data from the next
/// observation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnversionedRecord {
    #[serde(default, alias = "apiversion", alias = "apiVersion")]
    control_plane_version: Option<String>,
    #[serde(default)]
    worker_groups: Option<BTreeMap<String, WorkerGroup>>,
    #[serde(default)]
    seed: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

impl UnversionedRecord {
    fn into_cluster(self, name: String) -> Cluster {
        let mut cluster = Cluster {
            name,
            control_plane_version: self.control_plane_version.unwrap_or_default(),
            worker_groups: self.worker_groups.unwrap_or_default(),
            seed: self.seed.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
        };
        let name = cluster.name.clone();
        cluster.rekey(&name);
        cluster
    }
}

/// Decode a snapshot file in any known layout
pub(crate) fn decode(bytes: &[u8]) -> Result<Snapshot, serde_json::Error> {
    let value: Value = serde_json::from_slice(bytes)?;

    if value.get(SCHEMA_VERSION_KEY).is_some() {
        let snapshot: Snapshot = serde_json::from_value(value)?;
        return Ok(snapshot.rekeyed());
    }

    let records: BTreeMap<String, UnversionedRecord> = serde_json::from_value(value)?;
    let clusters = records
        .into_iter()
        .map(|(name, record)| record.into_cluster(name));

    Ok(Snapshot::with_schema_version(
        UNVERSIONED_SCHEMA_VERSION,
        clusters,
    ))
}

/// Encode a snapshot in the versioned layout
pub(crate) fn encode(snapshot: &Snapshot) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec_pretty(snapshot)
}
