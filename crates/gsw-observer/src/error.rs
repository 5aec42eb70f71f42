//! Error types for resource observation
//!
//! Every variant is fatal to the poll loop: without current truth no cycle
//! can proceed.

use std::path::PathBuf;

/// Observation failures
#[derive(Debug, thiserror::Error)]
pub enum ObserveError {
    /// Kubeconfig file could not be loaded
    #[error("failed to load kubeconfig {path}: {source}")]
    Kubeconfig {
        /// Kubeconfig file
        path: PathBuf,
        /// Loader error
        #[source]
        source: kube::config::KubeconfigError,
    },

    /// No explicit kubeconfig and no in-cluster or default config found
    #[error("failed to infer kubernetes config: {0}")]
    Infer(#[from] kube::config::InferConfigError),

    /// Client construction failed
    #[error("failed to build kubernetes client: {0}")]
    Client(#[source] kube::Error),

    /// List call failed
    #[error("shoot list failed: {0}")]
    Api(#[from] kube::Error),

    /// Shoot object did not match the expected shape
    #[error("malformed shoot {name}: {source}")]
    Decode {
        /// `namespace/name` of the shoot
        name: String,
        /// Decoder error
        #[source]
        source: serde_json::Error,
    },
}
