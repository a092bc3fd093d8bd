//! # Chat providers
//!
//! The crew talks to models through [`LlmProvider`]. [`OpenAIProvider`] is the
//! production implementation; tests drive the crew with scripted providers.

mod config;
mod error;
mod message;
pub mod openai;

pub use config::{ProviderConfig, DEFAULT_CHAT_MODEL, OPENAI_BASE_URL};
pub use error::ProviderError;
pub use message::{
    ChatMessage, CompletionRequest, CompletionResponse, FinishReason, Role, ToolCall,
    ToolDefinition, Usage, UsageTracker,
};
pub use openai::OpenAIProvider;

/// A chat-completion backend.
///
/// Errors stay as [`ProviderError`] so callers can see rate limits and retry
/// them before converting into the crew-wide error.
#[allow(async_fn_in_trait)]
pub trait LlmProvider: Send + Sync {
    /// Short name for logs, e.g. `"openai"`
    fn name(&self) -> &str;

    /// Model used when a request doesn't name one
    fn default_model(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError>;
}
