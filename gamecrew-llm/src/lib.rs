//! # gamecrew-llm
//!
//! Clients for the hosted services the crew depends on.
//!
//! ## Core Concepts
//! - **Provider**: Trait-based chat-completion communication (OpenAI and compatibles)
//! - **Image client**: Image generation returning PNG bytes
//! - **Retry**: Sleep-and-retry wrapper for provider rate limits

pub mod image;
pub mod provider;
pub mod retry;

pub use gamecrew_error::{Error, ErrorKind, ErrorStatus, Result};
pub use image::{AspectRatio, ImageClient, ImageRequest};
pub use provider::{
    ChatMessage, CompletionRequest, CompletionResponse, FinishReason, LlmProvider,
    OpenAIProvider, ProviderConfig, ProviderError, Role, ToolCall,
    ToolDefinition, Usage, UsageTracker,
};
pub use retry::{retry_after_hint, with_rate_limit_retry, RateLimitPolicy};
