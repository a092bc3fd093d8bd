//! Agent execution: one task, one model conversation.
//!
//! The agent builds a system prompt from its role, goal and backstory, sends
//! the task prompt, and services tool calls until the model answers in text.

use crate::config::{interpolate, normalize_model, AgentConfig, CrewInputs};
use crate::tool::Tool;
use gamecrew_error::{Error, ErrorKind, Result};
use gamecrew_llm::{
    with_rate_limit_retry, ChatMessage, CompletionRequest, CompletionResponse, LlmProvider,
    RateLimitPolicy, ToolCall, ToolDefinition, UsageTracker,
};
use std::sync::Arc;

pub const DEFAULT_MAX_ITER: usize = 20;

const FORCE_FINAL_ANSWER: &str =
    "You have used the maximum number of tool calls. Do not call any more tools; \
     give your best final answer now.";

pub struct Agent {
    key: String,
    config: AgentConfig,
    tools: Vec<Arc<dyn Tool>>,
}

impl Agent {
    pub fn new(key: impl Into<String>, config: AgentConfig, tools: Vec<Arc<dyn Tool>>) -> Self {
        Self {
            key: key.into(),
            config,
            tools,
        }
    }

    /// Key of the agent in `agents.yaml`
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn role(&self) -> &str {
        &self.config.role
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Model to request, `None` for the provider default
    pub fn model(&self) -> Option<&str> {
        self.config
            .model
            .as_deref()
            .map(normalize_model)
            .filter(|m| !m.is_empty())
    }

    pub fn max_iter(&self) -> usize {
        self.config.max_iter.unwrap_or(DEFAULT_MAX_ITER)
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn system_prompt(&self, inputs: &CrewInputs) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}",
            interpolate(&self.config.role, inputs),
            interpolate(&self.config.backstory, inputs),
            interpolate(&self.config.goal, inputs),
        )
    }

    /// Run one task prompt to a final text answer
    pub async fn execute<P: LlmProvider>(
        &self,
        provider: &P,
        policy: &RateLimitPolicy,
        inputs: &CrewInputs,
        task_prompt: &str,
        usage: &mut UsageTracker,
    ) -> Result<String> {
        let mut messages = vec![
            ChatMessage::system(self.system_prompt(inputs)),
            ChatMessage::user(task_prompt),
        ];
        let definitions: Vec<ToolDefinition> = self.tools.iter().map(|t| t.definition()).collect();
        let max_iter = self.max_iter();
        let mut rounds = 0;

        loop {
            let use_tools = !definitions.is_empty() && rounds < max_iter;
            let request = self.request(messages.clone(), use_tools.then(|| definitions.clone()));

            let response = self.complete(provider, policy, request).await?;
            usage.track(&response.model, &response.usage);

            if use_tools && !response.tool_calls.is_empty() {
                rounds += 1;
                tracing::debug!(
                    agent = %self.key,
                    round = rounds,
                    calls = response.tool_calls.len(),
                    "servicing tool calls"
                );

                messages.push(ChatMessage::assistant_tool_calls(
                    response.content.clone(),
                    response.tool_calls.clone(),
                ));
                for call in &response.tool_calls {
                    let result = self.run_tool(call).await;
                    messages.push(ChatMessage::tool_result(&call.id, result));
                }
                if rounds >= max_iter {
                    tracing::warn!(agent = %self.key, max_iter, "tool budget exhausted; forcing final answer");
                    messages.push(ChatMessage::user(FORCE_FINAL_ANSWER));
                }
                continue;
            }

            if response.is_truncated() {
                tracing::warn!(
                    agent = %self.key,
                    model = %response.model,
                    "answer was cut off at the token limit"
                );
            }
            return match response.content {
                Some(content) if !content.trim().is_empty() => Ok(content),
                _ => Err(Error::inference_failed("model returned an empty answer")
                    .with_operation("agent::execute")
                    .with_context("agent", self.key.clone())),
            };
        }
    }

    fn request(&self, messages: Vec<ChatMessage>, tools: Option<Vec<ToolDefinition>>) -> CompletionRequest {
        let mut request = CompletionRequest::new(messages);
        if let Some(model) = self.model() {
            request = request.with_model(model);
        }
        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(tools) = tools {
            request = request.with_tools(tools);
        }
        request
    }

    async fn complete<P: LlmProvider>(
        &self,
        provider: &P,
        policy: &RateLimitPolicy,
        request: CompletionRequest,
    ) -> Result<CompletionResponse> {
        with_rate_limit_retry(policy, || {
            let request = request.clone();
            async move { provider.complete(request).await }
        })
        .await
        .map_err(|e| {
            let err = Error::from(e)
                .with_operation("agent::execute")
                .with_context("agent", self.key.clone());
            // only rate limits went through the retry loop
            if err.kind() == ErrorKind::RateLimited {
                err.persist()
            } else {
                err
            }
        })
    }

    async fn run_tool(&self, call: &ToolCall) -> String {
        let Some(tool) = self.tools.iter().find(|t| t.name() == call.name) else {
            tracing::warn!(agent = %self.key, tool = %call.name, "model called an unavailable tool");
            return format!("Error: tool '{}' is not available to this agent", call.name);
        };

        tracing::info!(agent = %self.key, tool = %call.name, "calling tool");
        match tool.call(&call.arguments).await {
            Ok(output) => output,
            Err(e) => format!("Error: {}", e.message()),
        }
    }
}
