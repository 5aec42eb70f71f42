//! Shoot decoding
//!
//! Maps the subset of a Gardener `Shoot` the watcher tracks onto a
//! [`Cluster`]. Missing optional fields become empty strings.

use crate::error::ObserveError;
use gsw_model::{Cluster, FailedCondition, Observation, OperationFailure, WorkerGroup};
use kube::api::DynamicObject;
use serde::Deserialize;
use serde_json::Value;

/// Condition statuses that do not count as a failure
const HEALTHY_STATUSES: [&str; 2] = ["True", "Progressing"];

#[derive(Debug, Default, Deserialize)]
struct ShootBody {
    #[serde(default)]
    spec: ShootSpec,
    #[serde(default)]
    status: ShootStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShootSpec {
    #[serde(default)]
    kubernetes: KubernetesSpec,
    #[serde(default)]
    provider: ProviderSpec,
    #[serde(default)]
    seed_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct KubernetesSpec {
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ProviderSpec {
    #[serde(default)]
    workers: Vec<WorkerSpec>,
}

#[derive(Debug, Deserialize)]
struct WorkerSpec {
    name: String,
    #[serde(default)]
    minimum: i32,
    #[serde(default)]
    maximum: i32,
    #[serde(default)]
    machine: MachineSpec,
    #[serde(default)]
    kubernetes: Option<KubernetesSpec>,
}

#[derive(Debug, Default, Deserialize)]
struct MachineSpec {
    #[serde(default)]
    image: Option<ImageSpec>,
}

#[derive(Debug, Default, Deserialize)]
struct ImageSpec {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShootStatus {
    #[serde(default)]
    last_operation: Option<LastOperation>,
    #[serde(default)]
    conditions: Vec<Condition>,
}

#[derive(Debug, Default, Deserialize)]
struct LastOperation {
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Condition {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
}

/// Decoded shoot: the cluster record plus failure details when errored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedShoot {
    /// Tracked state
    pub cluster: Cluster,
    /// Present only when the last operation is in the error state
    pub failure: Option<OperationFailure>,
}

/// Decode one shoot from its namespace, name and `spec`/`status` body
///
/// # Errors
/// Returns `ObserveError::Decode` if the body does not match the shoot shape
pub fn shoot_to_cluster(namespace: &str, name: &str, body: &Value) -> Result<DecodedShoot, ObserveError> {
    let key = format!("{namespace}/{name}");
    let shoot = ShootBody::deserialize(body).map_err(|source| ObserveError::Decode {
        name: key.clone(),
        source,
    })?;

    let last_operation = shoot.status.last_operation.unwrap_or_default();
    let mut cluster = Cluster::new(key, shoot.spec.kubernetes.version.unwrap_or_default())
        .with_seed(shoot.spec.seed_name.unwrap_or_default())
        .with_state(last_operation.state.unwrap_or_default());

    for worker in shoot.spec.provider.workers {
        let image = worker.machine.image.unwrap_or_default();
        cluster.insert_group(
            WorkerGroup::new(worker.name, worker.minimum, worker.maximum)
                .with_image(image.name.unwrap_or_default(), image.version.unwrap_or_default())
                .with_version(
                    worker
                        .kubernetes
                        .and_then(|k| k.version)
                        .unwrap_or_default(),
                ),
        );
    }

    let failure = cluster.is_errored().then(|| OperationFailure {
        description: last_operation.description.unwrap_or_default(),
        conditions: shoot
            .status
            .conditions
            .into_iter()
            .filter(|c| !HEALTHY_STATUSES.contains(&c.status.as_str()))
            .map(|c| FailedCondition::new(c.kind, c.message.unwrap_or_default()))
            .collect(),
    });

    Ok(DecodedShoot { cluster, failure })
}

/// Decode a full shoot listing into an observation
///
/// # Errors
/// Returns the first decode error; a partial observation would report
/// healthy clusters as deleted
pub fn shoots_to_observation<'a>(
    shoots: impl IntoIterator<Item = &'a DynamicObject>,
) -> Result<Observation, ObserveError> {
    let mut observation = Observation::new();

    for shoot in shoots {
        let namespace = shoot.metadata.namespace.as_deref().unwrap_or_default();
        let name = shoot.metadata.name.as_deref().unwrap_or_default();
        let decoded = shoot_to_cluster(namespace, name, &shoot.data)?;

        if let Some(failure) = decoded.failure {
            observation.record_failure(decoded.cluster.name.clone(), failure);
        }
        observation.insert(decoded.cluster);
    }

    Ok(observation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gsw_model::STATE_ERROR;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn decodes_minimal_shoot() {
        let decoded = shoot_to_cluster("garden-dev", "alpha", &json!({})).unwrap();

        assert_eq!(decoded.cluster, Cluster::new("garden-dev/alpha", ""));
        assert!(decoded.failure.is_none());
    }

    #[test]
    fn worker_without_image_version_reads_empty() {
        let body = json!({
            "spec": {
                "kubernetes": {"version": "1.30.2"},
                "provider": {"workers": [
                    {"name": "pool-a", "minimum": 1, "maximum": 2, "machine": {"image": {"name": "gardenlinux"}}}
                ]}
            }
        });

        let cluster = shoot_to_cluster("ns", "a", &body).unwrap().cluster;
        let group = cluster.group("pool-a").unwrap();
        assert_eq!(group.image_name, "gardenlinux");
        assert_eq!(group.image_version, "");
        assert_eq!(group.control_plane_version, "");
    }

    #[test]
    fn healthy_conditions_are_not_failures() {
        let body = json!({
            "status": {
                "lastOperation": {"state": STATE_ERROR, "description": "boom"},
                "conditions": [
                    {"type": "APIServerAvailable", "status": "True"},
                    {"type": "ControlPlaneHealthy", "status": "Progressing"},
                    {"type": "EveryNodeReady", "status": "False", "message": "node down"},
                    {"type": "SystemComponentsHealthy", "status": "Unknown"}
                ]
            }
        });

        let failure = shoot_to_cluster("ns", "a", &body).unwrap().failure.unwrap();
        assert_eq!(failure.description, "boom");
        assert_eq!(
            failure.conditions,
            vec![
                FailedCondition::new("EveryNodeReady", "node down"),
                FailedCondition::new("SystemComponentsHealthy", ""),
            ]
        );
    }

    #[test]
    fn malformed_worker_is_decode_error() {
        let body = json!({"spec": {"provider": {"workers": [{"minimum": 1}]}}});
        let err = shoot_to_cluster("ns", "broken", &body).unwrap_err();
        assert!(matches!(err, ObserveError::Decode { ref name, .. } if name == "ns/broken"));
    }
}
