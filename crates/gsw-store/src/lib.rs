//! GSW Store
//!
//! The trusted boundary between the snapshot file and the in-memory
//! [`gsw_model::Snapshot`].
//!
//! # Core Operations
//!
//! - [`load`]: read a snapshot, empty on first run or corruption
//! - [`try_load`]: read a snapshot, reporting corruption
//! - [`save`]: write-temp-then-rename replace of the snapshot file
//!
//! # Example
//!
//! ```rust,ignore
//! use gsw_store::SnapshotStore;
//!
//! let store = SnapshotStore::new("/var/lib/gsw/db.json");
//! let previous = store.load();
//! // ... diff against the current observation ...
//! store.save(&next)?;
//! ```

#![warn(unreachable_pub)]

mod codec;
pub mod error;
mod store;

pub use error::StoreError;
pub use store::{load, save, try_load, SnapshotStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
