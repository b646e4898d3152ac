//! Pool state persistence: in-memory and file-backed stores.

use crate::domain::{PoolDelta, PoolError, PoolSnapshot};
use crate::ports::PoolStore;
use parking_lot::{Mutex, RwLock};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

fn fold(current: Option<PoolSnapshot>, delta: &PoolDelta) -> PoolSnapshot {
    let mut snapshot = current.unwrap_or_else(|| PoolSnapshot {
        totals: delta.totals,
        config: delta.config.clone(),
        holders: Vec::new(),
    });
    snapshot.apply(delta);
    snapshot
}

/// In-memory implementation of `PoolStore` for testing.
///
/// Clones share the same state.
#[derive(Clone, Debug, Default)]
pub struct InMemoryPoolStore {
    state: Arc<RwLock<Option<PoolSnapshot>>>,
    fail_commits: Arc<RwLock<bool>>,
}

impl InMemoryPoolStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make following commits fail (storage outage).
    pub fn set_fail_commits(&self, fail: bool) {
        *self.fail_commits.write() = fail;
    }
}

impl PoolStore for InMemoryPoolStore {
    fn load(&self) -> Result<Option<PoolSnapshot>, PoolError> {
        Ok(self.state.read().clone())
    }

    fn commit(&self, delta: &PoolDelta) -> Result<(), PoolError> {
        if *self.fail_commits.read() {
            return Err(PoolError::Storage("commit rejected".to_string()));
        }
        let mut state = self.state.write();
        let next = fold(state.take(), delta);
        *state = Some(next);
        Ok(())
    }
}

/// File-backed store.
///
/// Keeps the snapshot in memory and rewrites the whole file on every commit,
/// atomically via a temp file and rename. Encoded with bincode.
#[derive(Debug)]
pub struct FilePoolStore {
    path: PathBuf,
    cache: Mutex<Option<PoolSnapshot>>,
}

impl FilePoolStore {
    /// Open the store at `path`, reading any existing snapshot.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PoolError> {
        let path = path.as_ref().to_path_buf();
        let cache = Self::read_file(&path)?;
        match &cache {
            Some(snapshot) => info!(
                path = %path.display(),
                holders = snapshot.holders.len(),
                "Loaded pool snapshot"
            ),
            None => info!(path = %path.display(), "No existing pool snapshot"),
        }
        Ok(Self {
            path,
            cache: Mutex::new(cache),
        })
    }

    /// Location of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(path: &Path) -> Result<Option<PoolSnapshot>, PoolError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PoolError::Storage(e.to_string())),
        };
        bincode::deserialize(&bytes)
            .map(Some)
            .map_err(|e| PoolError::Storage(format!("corrupt snapshot: {e}")))
    }

    fn write_file(&self, snapshot: &PoolSnapshot) -> Result<(), PoolError> {
        use std::io::Write;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PoolError::Storage(e.to_string()))?;
        }
        let bytes = bincode::serialize(snapshot).map_err(|e| PoolError::Storage(e.to_string()))?;

        // Write atomically via temp file
        let temp_path = self.path.with_extension("tmp");
        let mut file =
            std::fs::File::create(&temp_path).map_err(|e| PoolError::Storage(e.to_string()))?;
        file.write_all(&bytes)
            .map_err(|e| PoolError::Storage(e.to_string()))?;
        file.sync_all()
            .map_err(|e| PoolError::Storage(e.to_string()))?;
        std::fs::rename(&temp_path, &self.path).map_err(|e| PoolError::Storage(e.to_string()))?;

        debug!(bytes = bytes.len(), "Pool snapshot written");
        Ok(())
    }
}

impl PoolStore for FilePoolStore {
    fn load(&self) -> Result<Option<PoolSnapshot>, PoolError> {
        Ok(self.cache.lock().clone())
    }

    fn commit(&self, delta: &PoolDelta) -> Result<(), PoolError> {
        let mut cache = self.cache.lock();
        let next = fold(cache.clone(), delta);
        self.write_file(&next)?;
        *cache = Some(next);
        Ok(())
    }
}
