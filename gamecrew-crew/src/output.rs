//! Writes task outputs to disk as the crew runs.
//!
//! ```text
//! game_outputs/
//!   progress.json
//!   <task_slug>_output.txt   # appended per run
//!   crew_output.txt          # final result, appended per run
//!   images/                  # written by the image tool
//! ```

use crate::crew::{CrewOutput, TaskObserver};
use crate::progress::{ProgressMarker, PROGRESS_FILE};
use crate::task::{task_slug, TaskOutput};
use gamecrew_error::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const CREW_OUTPUT_FILE: &str = "crew_output.txt";
pub const EMPTY_OUTPUT: &str = "No output.";

pub struct OutputWriter {
    dir: PathBuf,
    marker: ProgressMarker,
    /// Task slugs in run order
    order: Vec<String>,
    written: Vec<PathBuf>,
    skipped: Vec<String>,
}

impl OutputWriter {
    /// Create the output directory and load its progress marker
    pub fn new(dir: impl Into<PathBuf>, task_names: &[&str]) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            Error::from(e)
                .with_operation("output::new")
                .with_context("dir", dir.display().to_string())
        })?;
        let marker = ProgressMarker::load(dir.join(PROGRESS_FILE))?;

        Ok(Self {
            dir,
            marker,
            order: task_names.iter().map(|name| task_slug(name)).collect(),
            written: Vec::new(),
            skipped: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn marker(&self) -> &ProgressMarker {
        &self.marker
    }

    pub fn marker_mut(&mut self) -> &mut ProgressMarker {
        &mut self.marker
    }

    /// Files written during this run
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Task slugs skipped because the marker already covered them
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn task_file(&self, task_name: &str) -> PathBuf {
        self.dir.join(format!("{}_output.txt", task_slug(task_name)))
    }

    /// Append one task's output unless the marker already covers it
    pub fn record(&mut self, output: &TaskOutput) -> Result<()> {
        let slug = task_slug(&output.name);
        if self.marker.is_completed(&slug, &self.order) {
            tracing::info!(task = %slug, "Skipping already completed task");
            self.skipped.push(slug);
            return Ok(());
        }

        let path = self.task_file(&output.name);
        let text = if output.raw.trim().is_empty() {
            EMPTY_OUTPUT
        } else {
            output.raw.as_str()
        };
        append_line(&path, text)?;
        self.marker.save(&slug)?;

        tracing::info!(task = %slug, path = %path.display(), "wrote task output");
        self.written.push(path);
        Ok(())
    }

    /// Append the crew's final result to `crew_output.txt`
    pub fn write_final(&mut self, output: &CrewOutput) -> Result<PathBuf> {
        let path = self.dir.join(CREW_OUTPUT_FILE);
        append_line(&path, &output.raw)?;
        self.written.push(path.clone());
        Ok(path)
    }
}

impl TaskObserver for OutputWriter {
    fn task_completed(&mut self, output: &TaskOutput) -> Result<()> {
        self.record(output)
    }
}

fn append_line(path: &Path, text: &str) -> Result<()> {
    let storage_error = |e: std::io::Error| {
        Error::storage_failed(format!("failed to append to {}: {}", path.display(), e))
            .with_operation("output::append")
            .set_source(e)
    };

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(storage_error)?;
    writeln!(file, "{}", text).map_err(storage_error)
}
