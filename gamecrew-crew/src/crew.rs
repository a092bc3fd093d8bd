//! The crew: agents plus a strictly linear chain of tasks.

use crate::agent::Agent;
use crate::config::{config_error, AgentConfig, CrewInputs, TaskConfig};
use crate::task::{Task, TaskOutput};
use crate::tool::ToolSet;
use gamecrew_error::{Error, Result};
use gamecrew_llm::{LlmProvider, RateLimitPolicy, UsageTracker};
use std::collections::HashSet;

/// Receives each task's output as soon as the task finishes
pub trait TaskObserver {
    fn task_completed(&mut self, output: &TaskOutput) -> Result<()>;
}

impl TaskObserver for () {
    fn task_completed(&mut self, _output: &TaskOutput) -> Result<()> {
        Ok(())
    }
}

/// Result of a full run
#[derive(Debug, Clone)]
pub struct CrewOutput {
    /// Output of the last task
    pub raw: String,
    pub tasks_output: Vec<TaskOutput>,
    pub usage: UsageTracker,
}

pub struct Crew {
    agents: Vec<Agent>,
    tasks: Vec<Task>,
    rate_limit: RateLimitPolicy,
}

impl Crew {
    /// Build and validate a crew from parsed configuration
    pub fn from_config(
        agents: Vec<(String, AgentConfig)>,
        tasks: Vec<(String, TaskConfig)>,
        tools: &ToolSet,
    ) -> Result<Self> {
        if tasks.is_empty() {
            return Err(config_error("no tasks configured"));
        }

        let mut built_agents = Vec::with_capacity(agents.len());
        for (key, config) in agents {
            let mut agent_tools = Vec::with_capacity(config.tools.len());
            for name in &config.tools {
                let tool = tools.get(name).ok_or_else(|| {
                    Error::tool_unknown(name.clone())
                        .with_operation("crew::from_config")
                        .with_context("agent", key.clone())
                })?;
                agent_tools.push(tool);
            }
            built_agents.push(Agent::new(key, config, agent_tools));
        }

        let mut seen: HashSet<String> = HashSet::new();
        let mut built_tasks = Vec::with_capacity(tasks.len());
        for (name, config) in tasks {
            if !built_agents.iter().any(|a| a.key() == config.agent) {
                return Err(Error::agent_not_found(config.agent.clone())
                    .with_operation("crew::from_config")
                    .with_context("task", name));
            }
            for dep in config.context.iter().flatten() {
                if !seen.contains(dep) {
                    return Err(Error::task_not_found(dep.clone())
                        .with_operation("crew::from_config")
                        .with_context("task", name.clone())
                        .with_context("reason", "context must name an earlier task"));
                }
            }
            seen.insert(name.clone());
            built_tasks.push(Task::from_config(name, config));
        }

        Ok(Self {
            agents: built_agents,
            tasks: built_tasks,
            rate_limit: RateLimitPolicy::default(),
        })
    }

    pub fn with_rate_limit(mut self, policy: RateLimitPolicy) -> Self {
        self.rate_limit = policy;
        self
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn agent(&self, key: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.key() == key)
    }

    /// Run every task in order, handing each output to `observer`
    pub async fn kickoff<P, O>(
        &self,
        provider: &P,
        inputs: &CrewInputs,
        observer: &mut O,
    ) -> Result<CrewOutput>
    where
        P: LlmProvider,
        O: TaskObserver + ?Sized,
    {
        let mut outputs: Vec<TaskOutput> = Vec::with_capacity(self.tasks.len());
        let mut usage = UsageTracker::new();
        let total = self.tasks.len();

        for (index, task) in self.tasks.iter().enumerate() {
            let agent = self
                .agent(&task.agent)
                .ok_or_else(|| Error::agent_not_found(task.agent.clone()).with_operation("crew::kickoff"))?;

            tracing::info!(
                task = %task.name,
                agent = %agent.role(),
                step = index + 1,
                total,
                "Starting task"
            );

            let context = task.context_from(&outputs);
            let prompt = task.prompt(inputs, &context);
            tracing::debug!(
                task = %task.name,
                prompt_chars = prompt.len(),
                context_chars = context.len(),
                "built task prompt"
            );

            let raw = agent
                .execute(provider, &self.rate_limit, inputs, &prompt, &mut usage)
                .await
                .map_err(|e| e.with_operation("crew::kickoff").with_context("task", task.name.clone()))?;

            tracing::info!(task = %task.name, chars = raw.len(), "Task completed");

            let output = TaskOutput {
                name: task.name.clone(),
                agent: agent.key().to_string(),
                agent_role: agent.role().to_string(),
                raw,
            };
            observer
                .task_completed(&output)
                .map_err(|e| e.with_operation("crew::kickoff").with_context("task", task.name.clone()))?;
            outputs.push(output);
        }

        let raw = outputs.last().map(|o| o.raw.clone()).unwrap_or_default();
        tracing::info!(
            tasks = outputs.len(),
            llm_calls = usage.calls,
            tokens = usage.total_tokens(),
            "Crew finished"
        );

        Ok(CrewOutput {
            raw,
            tasks_output: outputs,
            usage,
        })
    }
}
