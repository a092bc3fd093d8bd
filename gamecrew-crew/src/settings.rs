//! Where the crew reads its configuration and writes its results.

use crate::progress::PROGRESS_FILE;
use gamecrew_llm::RateLimitPolicy;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_DIR: &str = "config";
pub const DEFAULT_OUTPUT_DIR: &str = "game_outputs";

#[derive(Debug, Clone)]
pub struct CrewSettings {
    pub config_dir: PathBuf,
    pub output_dir: PathBuf,
    pub rate_limit: RateLimitPolicy,
}

impl Default for CrewSettings {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            rate_limit: RateLimitPolicy::default(),
        }
    }
}

impl CrewSettings {
    pub fn new(config_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_rate_limit(mut self, policy: RateLimitPolicy) -> Self {
        self.rate_limit = policy;
        self
    }

    pub fn agents_path(&self) -> PathBuf {
        self.config_dir.join("agents.yaml")
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.config_dir.join("tasks.yaml")
    }

    pub fn inputs_path(&self) -> PathBuf {
        self.config_dir.join("inputs.yaml")
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn progress_path(&self) -> PathBuf {
        self.output_dir.join(PROGRESS_FILE)
    }

    pub fn images_dir(&self) -> PathBuf {
        self.output_dir.join("images")
    }
}
