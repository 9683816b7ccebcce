//! Request-scoped temporary directories.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Prefix of workspace directory names.
const WORKSPACE_PREFIX: &str = "igdl-";

/// A uniquely named temporary directory owned by one request.
///
/// The directory and everything in it is removed when the value is dropped,
/// whichever way the request ends.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    /// Create a fresh workspace under `root`.
    pub async fn create(root: &Path) -> Result<Self> {
        let path = root.join(format!("{}{}", WORKSPACE_PREFIX, uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&path).await?;
        tracing::debug!("Created workspace {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of an entry inside the workspace.
    pub fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let path = std::mem::take(&mut self.path);

        // Off the async workers when a runtime is around
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || remove_workspace(&path));
            }
            Err(_) => remove_workspace(&path),
        }
    }
}

fn remove_workspace(path: &Path) {
    match std::fs::remove_dir_all(path) {
        Ok(()) => tracing::debug!("Removed workspace {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove workspace {}: {}", path.display(), e),
    }
}
