//! Snapshot store
//!
//! Single-writer flat-file persistence for [`Snapshot`]. No locking: the poll
//! loop is the only reader and writer.

use crate::codec;
use crate::error::StoreError;
use gsw_model::Snapshot;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Load a snapshot, substituting an empty one on any failure
///
/// A missing file is first-run; unreadable or malformed files are logged
/// and treated the same way.
#[must_use]
pub fn load(path: impl AsRef<Path>) -> Snapshot {
    let path = path.as_ref();
    match try_load(path) {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => {
            tracing::info!(path = %path.display(), "snapshot file does not exist, starting empty");
            Snapshot::empty()
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to load snapshot, starting empty");
            Snapshot::empty()
        }
    }
}

/// Load a snapshot, reporting why it could not be read
///
/// # Returns
/// `Ok(None)` if the file does not exist
///
/// # Errors
/// - `StoreError::Read` if the file exists but cannot be read
/// - `StoreError::Parse` if the content matches no known layout
pub fn try_load(path: impl AsRef<Path>) -> Result<Option<Snapshot>, StoreError> {
    let path = path.as_ref();

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::read(path, e)),
    };

    codec::decode(&bytes)
        .map(Some)
        .map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Persist a snapshot, atomically replacing the file
///
/// Writes a temporary file next to the target, syncs it and renames it over
/// the target, so a crash leaves either the old or the new snapshot.
///
/// # Errors
/// - `StoreError::Serialize` if encoding fails
/// - `StoreError::Write` if the temporary file cannot be written
/// - `StoreError::Persist` if the rename fails
pub fn save(path: impl AsRef<Path>, snapshot: &Snapshot) -> Result<(), StoreError> {
    let path = path.as_ref();
    let bytes = codec::encode(snapshot).map_err(StoreError::Serialize)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(|e| StoreError::write(dir, e))?;
    write_synced(&mut file, &bytes).map_err(|e| StoreError::write(file.path(), e))?;

    file.persist(path).map_err(|e| StoreError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    tracing::debug!(
        path = %path.display(),
        clusters = snapshot.len(),
        "snapshot saved"
    );
    Ok(())
}

fn write_synced(file: &mut NamedTempFile, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes)?;
    file.flush()?;
    file.as_file().sync_all()
}

/// Snapshot store bound to one file
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Create store for a file path
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// See [`load`]
    #[inline]
    #[must_use]
    pub fn load(&self) -> Snapshot {
        load(&self.path)
    }

    /// See [`try_load`]
    ///
    /// # Errors
    /// Same as [`try_load`]
    #[inline]
    pub fn try_load(&self) -> Result<Option<Snapshot>, StoreError> {
        try_load(&self.path)
    }

    /// See [`save`]
    ///
    /// # Errors
    /// Same as [`save`]
    #[inline]
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        save(&self.path, snapshot)
    }
}
