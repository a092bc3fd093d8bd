//! Conversation, tool and usage types shared by every provider.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One turn of a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Option<String>,
    /// Set on assistant turns that ask for tools
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Set on tool turns: the call being answered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(Role::Assistant, content)
    }

    /// Assistant turn that requested tools; the matching tool results follow it.
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content,
            tool_calls: Some(tool_calls),
            ..Self::text(Role::Assistant, "")
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::text(Role::Tool, content)
        }
    }
}

/// A function the model may call, described by a JSON schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// A tool taking no arguments until `with_parameters` says otherwise
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: serde_json::json!({"type": "object", "properties": {}}),
        }
    }

    pub fn with_parameters(mut self, parameters: serde_json::Value) -> Self {
        self.parameters = parameters;
        self
    }
}

/// A call the model asked for; `arguments` is raw JSON text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    /// `None` uses the provider's default model
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub tools: Option<Vec<ToolDefinition>>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = Some(tools);
        self
    }
}

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub id: String,
    pub model: String,
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: FinishReason,
    pub usage: Usage,
}

impl CompletionResponse {
    /// Plain text answer with no tool calls
    pub fn text(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            model: model.into(),
            content: Some(content.into()),
            tool_calls: Vec::new(),
            finish_reason: FinishReason::Stop,
            usage: Usage::default(),
        }
    }

    /// The model stopped at its token limit, so the answer is incomplete
    pub fn is_truncated(&self) -> bool {
        self.finish_reason == FinishReason::Length
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    /// Cut off by the output token limit or the context window
    Length,
    ToolCalls,
    ContentFilter,
    Unknown,
}

impl FinishReason {
    pub(crate) fn from_api(reason: Option<&str>) -> Self {
        match reason {
            Some("stop") => FinishReason::Stop,
            Some("length") => FinishReason::Length,
            Some("tool_calls") | Some("function_call") => FinishReason::ToolCalls,
            Some("content_filter") => FinishReason::ContentFilter,
            _ => FinishReason::Unknown,
        }
    }
}

/// Tokens billed for one call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

impl std::ops::AddAssign<&Usage> for Usage {
    fn add_assign(&mut self, other: &Usage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

/// Token totals for a crew run, overall and per model
#[derive(Debug, Clone, Default)]
pub struct UsageTracker {
    pub calls: usize,
    pub overall: Usage,
    pub by_model: BTreeMap<String, Usage>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, model: &str, usage: &Usage) {
        self.calls += 1;
        self.overall += usage;
        *self.by_model.entry(model.to_string()).or_default() += usage;
    }

    /// Prompt plus completion tokens; some servers leave `total_tokens` at zero.
    pub fn total_tokens(&self) -> usize {
        self.overall.prompt_tokens + self.overall.completion_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_call() -> ToolCall {
        ToolCall {
            id: "call_1".into(),
            name: "image_generation".into(),
            arguments: r#"{"prompt": "a rusty key", "filename": "key"}"#.into(),
        }
    }

    #[test]
    fn test_message_shapes() {
        let system = ChatMessage::system("You are a game designer");
        assert_eq!(system.role, Role::System);
        assert!(system.tool_calls.is_none());

        let asking = ChatMessage::assistant_tool_calls(None, vec![image_call()]);
        assert_eq!(asking.role, Role::Assistant);
        assert!(asking.content.is_none());
        assert_eq!(asking.tool_calls.as_ref().map(Vec::len), Some(1));

        let answer = ChatMessage::tool_result("call_1", "saved");
        assert_eq!(answer.role, Role::Tool);
        assert_eq!(answer.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(answer.content.as_deref(), Some("saved"));
    }

    #[test]
    fn test_request_builder() {
        let request = CompletionRequest::new(vec![ChatMessage::user("Build a maze")])
            .with_model("gpt-4o")
            .with_temperature(0.2);

        assert_eq!(request.model.as_deref(), Some("gpt-4o"));
        assert_eq!(request.temperature, Some(0.2));
        assert!(request.tools.is_none());
    }

    #[test]
    fn test_finish_reason_mapping() {
        assert_eq!(FinishReason::from_api(Some("tool_calls")), FinishReason::ToolCalls);
        assert_eq!(FinishReason::from_api(Some("length")), FinishReason::Length);
        assert_eq!(FinishReason::from_api(None), FinishReason::Unknown);
    }

    #[test]
    fn test_truncated_answers() {
        let mut response = CompletionResponse::text("gpt-4o-mini", "<html><body>");
        assert!(!response.is_truncated());

        response.finish_reason = FinishReason::from_api(Some("length"));
        assert!(response.is_truncated());
    }

    #[test]
    fn test_usage_tracker_per_model() {
        let mut tracker = UsageTracker::new();
        let usage = |prompt, completion| Usage {
            prompt_tokens: prompt,
            completion_tokens: completion,
            total_tokens: prompt + completion,
        };

        tracker.track("gpt-4o", &usage(100, 50));
        tracker.track("gpt-4o-mini", &usage(200, 100));
        tracker.track("gpt-4o", &usage(10, 5));

        assert_eq!(tracker.calls, 3);
        assert_eq!(tracker.total_tokens(), 465);
        assert_eq!(tracker.by_model["gpt-4o"], usage(110, 55));
        assert_eq!(tracker.by_model.keys().collect::<Vec<_>>(), ["gpt-4o", "gpt-4o-mini"]);
    }
}
