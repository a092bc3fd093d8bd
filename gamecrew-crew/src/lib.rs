//! # gamecrew crew
//!
//! Runs a fixed chain of LLM agents that together write a browser game:
//! 1. Agents and tasks are read from `agents.yaml` / `tasks.yaml`
//! 2. Task prompts are filled from `inputs.yaml` (platform, difficulty, template, ...)
//! 3. Tasks run strictly in order; each sees the outputs of earlier tasks
//! 4. Provider rate limits are waited out and retried
//! 5. Each output is appended to `game_outputs/` and the progress marker advances
//!
//! The image-asset agent can call the image generation tool, which saves PNGs
//! under `game_outputs/images/`.

mod agent;
mod config;
mod crew;
mod output;
mod progress;
mod settings;
mod task;
mod tool;

pub use agent::{Agent, DEFAULT_MAX_ITER};
pub use config::{
    interpolate, load_agents, load_tasks, normalize_model, render_value, AgentConfig, CrewInputs,
    TaskConfig, HTML_TEMPLATE_KEY, TEMPLATE_PATH_KEY,
};
pub use crew::{Crew, CrewOutput, TaskObserver};
pub use output::{OutputWriter, CREW_OUTPUT_FILE, EMPTY_OUTPUT};
pub use progress::{Progress, ProgressMarker, PROGRESS_FILE};
pub use settings::{CrewSettings, DEFAULT_CONFIG_DIR, DEFAULT_OUTPUT_DIR};
pub use task::{task_slug, Task, TaskOutput, CONTEXT_DIVIDER};
pub use tool::{sanitize_filename, ImageGenerationArgs, ImageGenerationTool, Tool, ToolSet};
