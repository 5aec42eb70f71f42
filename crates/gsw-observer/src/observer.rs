//! Resource observer trait and the Gardener implementation

use crate::error::ObserveError;
use crate::shoot::shoots_to_observation;
use async_trait::async_trait;
use gsw_model::Observation;
use kube::api::{Api, ApiResource, DynamicObject, GroupVersionKind, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::path::Path;
use std::sync::Arc;

/// Gardener API group serving shoots
pub const SHOOT_GROUP: &str = "core.gardener.cloud";

/// Served shoot version
pub const SHOOT_VERSION: &str = "v1beta1";

/// Source of the current cluster set
#[async_trait]
pub trait ResourceObserver: Send + Sync {
    /// Block until the source can answer `observe`
    ///
    /// Called once before the first cycle.
    ///
    /// # Errors
    /// Returns error if the source is unreachable
    async fn wait_ready(&self) -> Result<(), ObserveError>;

    /// Full re-list of every tracked cluster
    ///
    /// # Errors
    /// Returns error if the list fails or an entry cannot be decoded
    async fn observe(&self) -> Result<Observation, ObserveError>;
}

#[async_trait]
impl<T: ResourceObserver + ?Sized> ResourceObserver for Arc<T> {
    async fn wait_ready(&self) -> Result<(), ObserveError> {
        (**self).wait_ready().await
    }

    async fn observe(&self) -> Result<Observation, ObserveError> {
        (**self).observe().await
    }
}

/// API resource descriptor for `core.gardener.cloud/v1beta1` shoots
#[must_use]
pub fn shoot_resource() -> ApiResource {
    let gvk = GroupVersionKind::gvk(SHOOT_GROUP, SHOOT_VERSION, "Shoot");
    ApiResource::from_gvk_with_plural(&gvk, "shoots")
}

/// Observes Gardener shoots across all namespaces
#[derive(Clone)]
pub struct GardenerObserver {
    api: Api<DynamicObject>,
}

impl std::fmt::Debug for GardenerObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GardenerObserver")
            .field("resource", &"shoots.core.gardener.cloud")
            .finish_non_exhaustive()
    }
}

impl GardenerObserver {
    /// Create observer over an existing client
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            api: Api::all_with(client, &shoot_resource()),
        }
    }

    /// Connect using an explicit kubeconfig, or infer the config
    ///
    /// Inference tries in-cluster configuration, then the default
    /// kubeconfig location.
    ///
    /// # Errors
    /// - `ObserveError::Kubeconfig` if the given file cannot be loaded
    /// - `ObserveError::Infer` if no configuration can be found
    /// - `ObserveError::Client` if the client cannot be built
    pub async fn connect(kubeconfig: Option<&Path>) -> Result<Self, ObserveError> {
        let config = match kubeconfig {
            Some(path) => {
                let kubeconfig_error = |source| ObserveError::Kubeconfig {
                    path: path.to_path_buf(),
                    source,
                };
                let raw = Kubeconfig::read_from(path).map_err(kubeconfig_error)?;
                Config::from_custom_kubeconfig(raw, &KubeConfigOptions::default())
                    .await
                    .map_err(kubeconfig_error)?
            }
            None => Config::infer().await?,
        };

        tracing::info!(cluster_url = %config.cluster_url, "kubernetes client configured");
        let client = Client::try_from(config).map_err(ObserveError::Client)?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl ResourceObserver for GardenerObserver {
    async fn wait_ready(&self) -> Result<(), ObserveError> {
        self.api.list(&ListParams::default().limit(1)).await?;
        tracing::info!("shoot api reachable");
        Ok(())
    }

    async fn observe(&self) -> Result<Observation, ObserveError> {
        let list = self.api.list(&ListParams::default()).await?;
        let observation = shoots_to_observation(&list.items)?;

        tracing::debug!(shoots = observation.len(), "shoots listed");
        Ok(observation)
    }
}
