//! Testing utilities for GSW workspace
//!
//! Shared fixtures, a recording notifier and a scripted observer.

#![allow(missing_docs)]

use async_trait::async_trait;
use gsw_model::{Cluster, FailedCondition, Observation, OperationFailure, WorkerGroup, STATE_ERROR};
use gsw_notify::{DeliveryError, Notifier};
use gsw_observer::{ObserveError, ResourceObserver};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

pub fn create_group(name: &str, minimum: i32, maximum: i32) -> WorkerGroup {
    WorkerGroup::new(name, minimum, maximum).with_image("gardenlinux", "1592.1.0")
}

pub fn create_cluster(name: &str, version: &str) -> Cluster {
    Cluster::new(name, version)
        .with_seed("aws-eu1")
        .with_state("Succeeded")
}

pub fn create_cluster_with_groups(name: &str, version: &str, groups: &[(&str, i32, i32)]) -> Cluster {
    groups
        .iter()
        .fold(create_cluster(name, version), |cluster, (group, min, max)| {
            cluster.with_group(create_group(group, *min, *max))
        })
}

pub fn create_failure(description: &str, conditions: &[(&str, &str)]) -> OperationFailure {
    OperationFailure {
        description: description.to_string(),
        conditions: conditions
            .iter()
            .map(|(kind, message)| FailedCondition::new(*kind, *message))
            .collect(),
    }
}

/// Observation holding `cluster` switched to the error state
pub fn errored_observation(cluster: Cluster, failure: OperationFailure) -> Observation {
    let cluster = cluster.with_state(STATE_ERROR);
    let name = cluster.name.clone();
    Observation::new().with_cluster(cluster).with_failure(name, failure)
}

pub fn observation_of(clusters: impl IntoIterator<Item = Cluster>) -> Observation {
    clusters.into_iter().collect()
}

/// Temporary directory plus a snapshot path inside it
pub fn temp_snapshot_path() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");
    (dir, path)
}

pub fn decode_error(name: &str) -> ObserveError {
    let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    ObserveError::Decode {
        name: name.to_string(),
        source,
    }
}

/// Notifier that records every message
///
/// In failing mode every call is recorded and then rejected.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
    failing: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            messages: Mutex::default(),
            failing: true,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.messages.lock().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) -> Result<(), DeliveryError> {
        self.messages.lock().push(message.to_string());
        if self.failing {
            return Err(DeliveryError::Rejected {
                body: "invalid_token".to_string(),
            });
        }
        Ok(())
    }
}

enum Step {
    Observe(Observation),
    Fail(String),
}

/// Observer serving a scripted sequence of observations
///
/// Once the script is exhausted the last observation is served again.
pub struct StaticObserver {
    script: Mutex<VecDeque<Step>>,
    last: Mutex<Observation>,
    observed: AtomicUsize,
    readied: AtomicUsize,
}

impl StaticObserver {
    pub fn new(observations: impl IntoIterator<Item = Observation>) -> Self {
        Self {
            script: Mutex::new(observations.into_iter().map(Step::Observe).collect()),
            last: Mutex::default(),
            observed: AtomicUsize::new(0),
            readied: AtomicUsize::new(0),
        }
    }

    /// Append a failing step named after `cluster`
    #[must_use]
    pub fn then_fail(self, cluster: &str) -> Self {
        self.script.lock().push_back(Step::Fail(cluster.to_string()));
        self
    }

    pub fn observe_calls(&self) -> usize {
        self.observed.load(Ordering::SeqCst)
    }

    pub fn ready_calls(&self) -> usize {
        self.readied.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceObserver for StaticObserver {
    async fn wait_ready(&self) -> Result<(), ObserveError> {
        self.readied.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn observe(&self) -> Result<Observation, ObserveError> {
        self.observed.fetch_add(1, Ordering::SeqCst);
        let step = self.script.lock().pop_front();
        match step {
            Some(Step::Observe(observation)) => {
                *self.last.lock() = observation.clone();
                Ok(observation)
            }
            Some(Step::Fail(cluster)) => Err(decode_error(&cluster)),
            None => Ok(self.last.lock().clone()),
        }
    }
}
