//! Tasks and their outputs

use crate::config::{interpolate, CrewInputs, TaskConfig};
use serde::Serialize;

/// Separates outputs of earlier tasks inside a context block
pub const CONTEXT_DIVIDER: &str = "\n\n----------\n\n";

#[derive(Debug, Clone)]
pub struct Task {
    pub name: String,
    pub description: String,
    pub expected_output: String,
    /// Key of the agent that performs this task
    pub agent: String,
    /// Explicit context; `None` means every earlier task
    pub context: Option<Vec<String>>,
}

impl Task {
    pub fn from_config(name: impl Into<String>, config: TaskConfig) -> Self {
        Self {
            name: name.into(),
            description: config.description,
            expected_output: config.expected_output,
            agent: config.agent,
            context: config.context,
        }
    }

    /// Gather the outputs this task should see: the listed tasks in list
    /// order, or every earlier task in run order.
    pub fn context_from(&self, previous: &[TaskOutput]) -> String {
        let selected: Vec<&str> = match &self.context {
            Some(names) => names
                .iter()
                .filter_map(|name| previous.iter().find(|out| out.name == *name))
                .map(|out| out.raw.as_str())
                .collect(),
            None => previous.iter().map(|out| out.raw.as_str()).collect(),
        };
        selected.join(CONTEXT_DIVIDER)
    }

    /// The user prompt sent to the agent
    pub fn prompt(&self, inputs: &CrewInputs, context: &str) -> String {
        let mut prompt = interpolate(&self.description, inputs);

        let expected = interpolate(&self.expected_output, inputs);
        if !expected.trim().is_empty() {
            prompt.push_str("\n\nThis is the expected criteria for your final answer: ");
            prompt.push_str(expected.trim());
            prompt.push_str(
                "\nyou MUST return the actual complete content as the final answer, not a summary.",
            );
        }

        if !context.trim().is_empty() {
            prompt.push_str("\n\nThis is the context you're working with:\n");
            prompt.push_str(context);
        }
        prompt
    }

    /// File-safe name: spaces to underscores, lowercased
    pub fn slug(&self) -> String {
        task_slug(&self.name)
    }
}

pub fn task_slug(name: &str) -> String {
    name.replace(' ', "_").to_lowercase()
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskOutput {
    pub name: String,
    /// Key of the agent that produced it
    pub agent: String,
    pub agent_role: String,
    pub raw: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(context: Option<Vec<&str>>) -> Task {
        Task {
            name: "Integrate Code Modules".into(),
            description: "Merge everything for {platform}.".into(),
            expected_output: "A single index.html".into(),
            agent: "code_integrator_agent".into(),
            context: context.map(|c| c.into_iter().map(String::from).collect()),
        }
    }

    fn output(name: &str, raw: &str) -> TaskOutput {
        TaskOutput {
            name: name.into(),
            agent: "a".into(),
            agent_role: "A".into(),
            raw: raw.into(),
        }
    }

    #[test]
    fn test_slug() {
        assert_eq!(task(None).slug(), "integrate_code_modules");
        assert_eq!(task_slug("generate_game_logic"), "generate_game_logic");
    }

    #[test]
    fn test_context_all_previous() {
        let previous = [output("logic", "LOGIC"), output("ui", "UI")];
        assert_eq!(task(None).context_from(&previous), "LOGIC\n\n----------\n\nUI");
    }

    #[test]
    fn test_context_explicit() {
        let previous = [output("logic", "LOGIC"), output("ui", "UI"), output("input", "INPUT")];
        assert_eq!(
            task(Some(vec!["input", "logic"])).context_from(&previous),
            "INPUT\n\n----------\n\nLOGIC"
        );
    }

    #[test]
    fn test_prompt_sections() {
        let inputs = CrewInputs::new().with("platform", "desktop");

        let prompt = task(None).prompt(&inputs, "");
        assert!(prompt.starts_with("Merge everything for desktop."));
        assert!(prompt.contains("expected criteria for your final answer: A single index.html"));
        assert!(!prompt.contains("context you're working with"));

        let prompt = task(None).prompt(&inputs, "LOGIC");
        assert!(prompt.ends_with("This is the context you're working with:\nLOGIC"));
    }
}
