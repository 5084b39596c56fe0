//! Per-request temporary workspace lifecycle.
//!
//! Each request that needs disk space gets one uniquely-named directory
//! under the configured root, holding at most a bare clone and one
//! rendered cliff.toml. The directory is removed on every exit path:
//! explicitly via `release`, or by the `Drop` backstop when a handler
//! bails out early with `?`. Removal failures are logged and swallowed
//! so cleanup never masks the primary request outcome.

use std::path::Path;
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::errors::ServiceError;

/// Exclusively-owned temporary directory tied to one request
#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
}

impl Workspace {
    /// Create a unique workspace directory under `root`.
    ///
    /// The root is created first if missing; an unwritable root
    /// surfaces as `ServiceError::Io`.
    pub fn acquire(root: &Path, prefix: &str) -> Result<Self, ServiceError> {
        std::fs::create_dir_all(root)?;
        let dir = tempfile::Builder::new().prefix(prefix).tempdir_in(root)?;
        debug!("Acquired workspace: {}", dir.path().display());
        Ok(Self { dir: Some(dir) })
    }

    /// Path of the workspace directory
    pub fn path(&self) -> &Path {
        self.dir
            .as_ref()
            .expect("workspace accessed after release")
            .path()
    }

    /// Recursively remove the workspace. Removal errors are logged,
    /// never propagated.
    pub fn release(mut self) {
        self.remove_best_effort();
    }

    fn remove_best_effort(&mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                warn!("Failed to remove workspace {}: {}", path.display(), e);
            } else {
                debug!("Released workspace: {}", path.display());
            }
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.remove_best_effort();
    }
}
