//! Per-compilation scratch directory with guaranteed cleanup.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::render::RenderError;

const PROBE_FILE: &str = "test_write.tmp";

/// A unique `latex_<8 hex>` directory under the temp root.
///
/// `close` removes it (files first, then directories) on the blocking pool
/// unless it was created with `cleanup = false`. A workspace that is dropped
/// without being closed, e.g. when the request future is cancelled, is removed
/// synchronously in `Drop`. Removal failures are logged, never raised.
#[derive(Debug)]
pub struct Workspace {
    dir: PathBuf,
    cleanup: bool,
    /// Cleared by `close` so `Drop` does not remove the directory twice.
    armed: bool,
}

impl Workspace {
    /// Creates the directory and proves it is writable by writing and deleting
    /// a probe file.
    pub fn prepare(root: &Path, cleanup: bool) -> Result<Self, RenderError> {
        let dir = root.join(format!("latex_{}", short_id()));
        fs::create_dir_all(&dir).map_err(|source| RenderError::WorkspaceUnwritable {
            path: dir.clone(),
            source,
        })?;
        // From here on the guard owns the directory, so a failed probe cleans up.
        let workspace = Self {
            dir,
            cleanup,
            armed: true,
        };

        let probe = workspace.dir.join(PROBE_FILE);
        fs::write(&probe, b"probe")
            .and_then(|_| fs::remove_file(&probe))
            .map_err(|source| RenderError::WorkspaceUnwritable {
                path: workspace.dir.clone(),
                source,
            })?;

        debug!(dir = %workspace.dir.display(), "Prepared LaTeX workspace");
        Ok(workspace)
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Writes `resume_<8 hex>.tex` and returns its stem.
    pub fn write_source(&self, latex: &str) -> Result<String, RenderError> {
        let stem = format!("resume_{}", short_id());
        let path = self.dir.join(format!("{stem}.tex"));
        fs::write(&path, latex).map_err(|e| RenderError::io("write", path, e))?;
        Ok(stem)
    }

    /// Path of the PDF for `stem` if the compiler left a non-empty one behind.
    pub fn artifact(&self, stem: &str) -> Option<PathBuf> {
        let path = self.dir.join(format!("{stem}.pdf"));
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() && meta.len() > 0 => Some(path),
            _ => None,
        }
    }
}

impl Workspace {
    /// Removes the workspace without blocking the async executor.
    pub async fn close(mut self) {
        self.armed = false;
        if !self.cleanup {
            debug!(dir = %self.dir.display(), "Keeping LaTeX workspace");
            return;
        }
        let dir = self.dir.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || remove_tree(&dir)).await {
            warn!(dir = %self.dir.display(), error = %e, "Workspace cleanup task failed");
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if !self.cleanup {
            debug!(dir = %self.dir.display(), "Keeping LaTeX workspace");
            return;
        }
        remove_tree(&self.dir);
    }
}

fn remove_tree(dir: &Path) {
    for entry in WalkDir::new(dir).contents_first(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Failed to walk workspace");
                continue;
            }
        };
        let path = entry.path();
        let result = if entry.file_type().is_dir() {
            fs::remove_dir(path)
        } else {
            fs::remove_file(path)
        };
        if let Err(e) = result {
            warn!(path = %path.display(), error = %e, "Failed to remove workspace entry");
        }
    }
}

fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}
