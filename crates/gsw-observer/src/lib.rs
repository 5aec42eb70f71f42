//! GSW Observer
//!
//! Reads the current set of Gardener shoots and turns it into an
//! [`Observation`](gsw_model::Observation).
//!
//! # Core Concepts
//!
//! - [`ResourceObserver`]: async seam the poll loop observes through
//! - [`GardenerObserver`]: lists `core.gardener.cloud/v1beta1` shoots in all
//!   namespaces via `kube`
//! - [`shoot_to_cluster`]: pure conversion of one shoot body
//!
//! # Example
//!
//! ```rust,ignore
//! use gsw_observer::{GardenerObserver, ResourceObserver};
//!
//! let observer = GardenerObserver::connect(None).await?;
//! observer.wait_ready().await?;
//! let observation = observer.observe().await?;
//! ```

#![warn(unreachable_pub)]

pub mod error;
mod observer;
mod shoot;

pub use error::ObserveError;
pub use observer::{shoot_resource, GardenerObserver, ResourceObserver, SHOOT_GROUP, SHOOT_VERSION};
pub use shoot::{shoot_to_cluster, shoots_to_observation, DecodedShoot};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
