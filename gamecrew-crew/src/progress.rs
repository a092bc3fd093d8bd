//! Last-completed-task marker, persisted as `{"last_task": "..."}`.

use gamecrew_error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const PROGRESS_FILE: &str = "progress.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub last_task: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProgressMarker {
    path: PathBuf,
    progress: Progress,
}

impl ProgressMarker {
    /// Load the marker; a missing file means nothing has completed yet.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let progress = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| {
                Error::from(e)
                    .with_operation("progress::load")
                    .with_context("path", path.display().to_string())
            })?;
            serde_json::from_str(&content).map_err(|e| {
                Error::parse_failed(format!("corrupt progress file: {}", e))
                    .with_operation("progress::load")
                    .with_context("path", path.display().to_string())
                    .set_source(e)
            })?
        } else {
            Progress::default()
        };

        Ok(Self { path, progress })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn last_task(&self) -> Option<&str> {
        self.progress.last_task.as_deref()
    }

    /// Record `task` as the last completed task
    pub fn save(&mut self, task: &str) -> Result<()> {
        self.progress.last_task = Some(task.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.storage_error("progress::save", e))?;
        }
        let content = serde_json::to_string(&self.progress).map_err(|e| {
            Error::new(gamecrew_error::ErrorKind::SerializationFailed, e.to_string())
                .with_operation("progress::save")
        })?;
        std::fs::write(&self.path, content).map_err(|e| self.storage_error("progress::save", e))
    }

    /// Forget all progress and remove the file
    pub fn reset(&mut self) -> Result<()> {
        self.progress = Progress::default();
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.storage_error("progress::reset", e)),
        }
    }

    /// Whether `task` sits at or before the marker in `order`.
    ///
    /// A marker naming a task outside `order` (the chain changed) covers nothing.
    pub fn is_completed(&self, task: &str, order: &[String]) -> bool {
        let Some(last) = self.last_task() else {
            return false;
        };
        let last_pos = order.iter().position(|t| t == last);
        let task_pos = order.iter().position(|t| t == task);
        matches!((task_pos, last_pos), (Some(t), Some(l)) if t <= l)
    }

    fn storage_error(&self, operation: &'static str, err: std::io::Error) -> Error {
        Error::storage_failed(format!("failed to write {}: {}", self.path.display(), err))
            .with_operation(operation)
            .set_source(err)
    }
}
