//! Declarative crew configuration
//!
//! Three YAML files describe a crew:
//!
//! ```text
//! config/
//!   agents.yaml   # agent key -> role, goal, backstory, model, tools
//!   tasks.yaml    # task name -> description, expected_output, agent, context
//!   inputs.yaml   # values interpolated into `{placeholders}`
//! ```
//!
//! Mapping order is significant: tasks run in the order they appear in
//! `tasks.yaml`. Unknown fields are ignored.

use gamecrew_error::{Error, ErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Input key holding the path of the HTML template
pub const TEMPLATE_PATH_KEY: &str = "template_path";
/// Input key the template's content is exposed under
pub const HTML_TEMPLATE_KEY: &str = "html_template";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    /// Model name; `openai/` prefixes are accepted and stripped
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    /// Maximum tool-calling rounds before a final answer is forced
    #[serde(default)]
    pub max_iter: Option<usize>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    pub description: String,
    #[serde(default)]
    pub expected_output: String,
    /// Key of the agent in `agents.yaml`
    pub agent: String,
    /// Earlier tasks whose output this task sees. Absent means all earlier tasks.
    #[serde(default)]
    pub context: Option<Vec<String>>,
}

/// Load `agents.yaml`, preserving file order
pub fn load_agents(path: impl AsRef<Path>) -> Result<Vec<(String, AgentConfig)>> {
    load_ordered(path.as_ref(), "config::load_agents")
}

/// Load `tasks.yaml`, preserving file order
pub fn load_tasks(path: impl AsRef<Path>) -> Result<Vec<(String, TaskConfig)>> {
    load_ordered(path.as_ref(), "config::load_tasks")
}

fn read_config(path: &Path, operation: &'static str) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        Error::from(e)
            .with_operation(operation)
            .with_context("path", path.display().to_string())
    })
}

fn parse_mapping(content: &str, path: &Path, operation: &'static str) -> Result<serde_yaml::Mapping> {
    if content.trim().is_empty() {
        return Ok(serde_yaml::Mapping::new());
    }
    serde_yaml::from_str(content).map_err(|e| {
        Error::parse_failed(format!("invalid YAML: {}", e))
            .with_operation(operation)
            .with_context("path", path.display().to_string())
            .set_source(e)
    })
}

fn load_ordered<T>(path: &Path, operation: &'static str) -> Result<Vec<(String, T)>>
where
    T: serde::de::DeserializeOwned,
{
    let content = read_config(path, operation)?;
    let mapping = parse_mapping(&content, path, operation)?;

    let mut entries = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let key = key.as_str().map(str::to_string).ok_or_else(|| {
            Error::parse_failed("top-level keys must be strings")
                .with_operation(operation)
                .with_context("path", path.display().to_string())
        })?;
        let entry: T = serde_yaml::from_value(value).map_err(|e| {
            Error::parse_failed(format!("invalid entry '{}': {}", key, e))
                .with_operation(operation)
                .with_context("path", path.display().to_string())
                .with_context("key", key.clone())
        })?;
        entries.push((key, entry));
    }
    Ok(entries)
}

// =============================================================================
// Inputs
// =============================================================================

/// Named values substituted into `{placeholders}` of agents and tasks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrewInputs {
    values: BTreeMap<String, String>,
}

impl CrewInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `inputs.yaml`.
    ///
    /// A `template_path` entry is read (relative to the inputs file's
    /// directory) and exposed as `html_template`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = read_config(path, "inputs::load")?;
        let mapping = parse_mapping(&content, path, "inputs::load")?;

        let mut inputs = Self::new();
        for (key, value) in &mapping {
            let key = key.as_str().ok_or_else(|| {
                Error::parse_failed("input names must be strings").with_operation("inputs::load")
            })?;
            inputs.insert(key, render_value(value));
        }

        if let Some(template) = inputs.get(TEMPLATE_PATH_KEY).map(PathBuf::from) {
            let template = if template.is_absolute() {
                template
            } else {
                path.parent().unwrap_or_else(|| Path::new(".")).join(template)
            };
            let html = std::fs::read_to_string(&template).map_err(|e| {
                Error::from(e)
                    .with_operation("inputs::load_template")
                    .with_context("template", template.display().to_string())
            })?;
            inputs.insert(HTML_TEMPLATE_KEY, html);
        }

        Ok(inputs)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Render a YAML value the way it reads in a prompt
pub fn render_value(value: &serde_yaml::Value) -> String {
    use serde_yaml::Value;

    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(items) => items.iter().map(render_value).collect::<Vec<_>>().join(", "),
        Value::Mapping(_) => serde_yaml::to_string(value)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
        Value::Tagged(tagged) => render_value(&tagged.value),
    }
}

/// Replace `{name}` with the input of that name.
///
/// Braces that do not name a known input are kept as written, so code
/// snippets in prompts survive. Substituted text is not scanned again.
pub fn interpolate(text: &str, inputs: &CrewInputs) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let replaced = after.find('}').and_then(|close| {
            let name = &after[..close];
            let is_ident = !name.is_empty()
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if is_ident {
                inputs.get(name).map(|value| (value, close))
            } else {
                None
            }
        });

        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Strip litellm-style provider prefixes (`openai/gpt-4o` -> `gpt-4o`)
pub fn normalize_model(model: &str) -> &str {
    model.strip_prefix("openai/").unwrap_or(model).trim()
}

pub(crate) fn config_error(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::ConfigInvalid, message).with_operation("crew::from_config")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_tasks_keep_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.yaml");
        fs::write(
            &path,
            r#"
zeta_task:
  description: first
  expected_output: a
  agent: writer
alpha_task:
  description: second
  agent: writer
  context: [zeta_task]
"#,
        )
        .unwrap();

        let tasks = load_tasks(&path).unwrap();
        let names: Vec<_> = tasks.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["zeta_task", "alpha_task"]);
        assert_eq!(tasks[1].1.context, Some(vec!["zeta_task".to_string()]));
        assert_eq!(tasks[1].1.expected_output, "");
    }

    #[test]
    fn test_agent_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agents.yaml");
        fs::write(
            &path,
            r#"
game_logic_agent:
  role: Game Logic Developer
  goal: Write the game loop
  backstory: Veteran JavaScript developer
  future_field: ignored
"#,
        )
        .unwrap();

        let agents = load_agents(&path).unwrap();
        let (key, agent) = &agents[0];
        assert_eq!(key, "game_logic_agent");
        assert!(agent.tools.is_empty());
        assert!(agent.model.is_none());
        assert!(agent.max_iter.is_none());
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();

        let err = load_agents(dir.path().join("missing.yaml")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);

        let path = dir.path().join("tasks.yaml");
        fs::write(&path, "task:\n  agent: [unclosed").unwrap();
        let err = load_tasks(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseFailed);

        fs::write(&path, "task:\n  description: no agent here\n").unwrap();
        let err = load_tasks(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseFailed);
        assert!(err.message().contains("task"));
    }

    #[test]
    fn test_inputs_render_and_template() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("GameTemplate.html"), "<canvas id=\"game\"></canvas>").unwrap();
        let path = dir.path().join("inputs.yaml");
        fs::write(
            &path,
            r#"
template_path: GameTemplate.html
platform: mobile + desktop
difficulty: intermediate
levels: 3
player_features:
  - torchlight
  - dynamic maze
  - hidden keys
"#,
        )
        .unwrap();

        let inputs = CrewInputs::load(&path).unwrap();
        assert_eq!(inputs.get("platform"), Some("mobile + desktop"));
        assert_eq!(inputs.get("levels"), Some("3"));
        assert_eq!(
            inputs.get("player_features"),
            Some("torchlight, dynamic maze, hidden keys")
        );
        assert_eq!(inputs.get(HTML_TEMPLATE_KEY), Some("<canvas id=\"game\"></canvas>"));
    }

    #[test]
    fn test_inputs_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inputs.yaml");
        fs::write(&path, "template_path: nowhere.html\n").unwrap();

        let err = CrewInputs::load(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
        assert_eq!(err.operation(), "inputs::load_template");
    }

    #[test]
    fn test_interpolate_known_keys_only() {
        let inputs = CrewInputs::new()
            .with("platform", "mobile + desktop")
            .with("difficulty", "intermediate");

        let text = "Target {platform} at {difficulty} level. \
                    function draw() { ctx.fill(); } uses {unknown} and {}.";
        assert_eq!(
            interpolate(text, &inputs),
            "Target mobile + desktop at intermediate level. \
             function draw() { ctx.fill(); } uses {unknown} and {}."
        );
    }

    #[test]
    fn test_interpolate_does_not_rescan() {
        let inputs = CrewInputs::new()
            .with("html_template", "<script>const s = {platform};</script>")
            .with("platform", "desktop");

        assert_eq!(
            interpolate("{html_template} for {platform}", &inputs),
            "<script>const s = {platform};</script> for desktop"
        );
        assert_eq!(interpolate("unclosed {platform", &inputs), "unclosed {platform");
    }

    #[test]
    fn test_normalize_model() {
        assert_eq!(normalize_model("openai/gpt-4o"), "gpt-4o");
        assert_eq!(normalize_model("gpt-4o-mini"), "gpt-4o-mini");
    }
}
