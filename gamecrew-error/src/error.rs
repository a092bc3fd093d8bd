//! The error type shared by every gamecrew crate.

use crate::{ErrorKind, ErrorStatus};
use std::fmt;

/// Error returned by every fallible gamecrew operation.
///
/// It records what went wrong (`kind`), whether trying again can help
/// (`status`), the operations it travelled through on its way up, key-value
/// context, and the wrapped cause.
///
/// ```rust
/// use gamecrew_error::{Error, ErrorKind};
///
/// let err = Error::task_not_found("design_ui_ux")
///     .with_operation("crew::from_config")
///     .with_context("referenced_by", "integrate_assets");
///
/// assert_eq!(err.kind(), ErrorKind::TaskNotFound);
/// assert_eq!(err.operation(), "crew::from_config");
/// assert_eq!(err.context_value("referenced_by"), Some("integrate_assets"));
/// assert!(!err.is_retryable());
/// ```
pub struct Error {
    kind: ErrorKind,
    message: String,
    status: ErrorStatus,
    /// Innermost first
    operations: Vec<&'static str>,
    context: Vec<(&'static str, String)>,
    source: Option<anyhow::Error>,
}

impl Error {
    /// Retryable kinds start out temporary, everything else permanent.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let status = match kind.is_retryable() {
            true => ErrorStatus::Temporary,
            false => ErrorStatus::Permanent,
        };

        Self {
            kind,
            message: message.into(),
            status,
            operations: Vec::new(),
            context: Vec::new(),
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> ErrorStatus {
        self.status
    }

    /// Outermost operation the error passed through, `""` if none
    pub fn operation(&self) -> &'static str {
        self.operations.last().copied().unwrap_or("")
    }

    /// Every operation the error passed through, innermost first
    pub fn operations(&self) -> &[&'static str] {
        &self.operations
    }

    pub fn context(&self) -> &[(&'static str, String)] {
        &self.context
    }

    /// Most recently added value for `key`
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_retryable(&self) -> bool {
        self.status.is_retryable()
    }

    /// Record that the error passed through `operation`
    pub fn with_operation(mut self, operation: &'static str) -> Self {
        if self.operations.last() != Some(&operation) {
            self.operations.push(operation);
        }
        self
    }

    pub fn with_context(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.context.push((key, value.into()));
        self
    }

    /// Attach the underlying cause. Set it once, where the error is created.
    pub fn set_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        debug_assert!(self.source.is_none(), "source error already set");
        self.source = Some(source.into());
        self
    }

    /// Mark a temporary error as persistent once retrying has given up
    pub fn persist(mut self) -> Self {
        self.status = self.status.persist();
        self
    }
}

// One line, for logs and the CLI:
// `RateLimited (temporary) at agent::execute <- provider: slow down [agent=ui_ux_agent]`
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind, self.status)?;

        for (i, op) in self.operations.iter().rev().enumerate() {
            f.write_str(if i == 0 { " at " } else { " <- " })?;
            f.write_str(op)?;
        }

        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }

        if !self.context.is_empty() {
            let pairs: Vec<String> = self.context.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            write!(f, " [{}]", pairs.join(", "))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Error");
        out.field("kind", &self.kind)
            .field("status", &self.status)
            .field("message", &self.message);
        if !self.operations.is_empty() {
            out.field("operations", &self.operations);
        }
        if !self.context.is_empty() {
            out.field("context", &self.context);
        }
        if let Some(source) = &self.source {
            out.field("source", source);
        }
        out.finish()
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| &**e as &(dyn std::error::Error + 'static))
    }
}

/// Filesystem failures while reading config or writing outputs.
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            _ => ErrorKind::IoFailed,
        };
        Error::new(kind, err.to_string()).set_source(err)
    }
}

// =============================================================================
// Shorthands for the crew's common failures
// =============================================================================

impl Error {
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    pub fn agent_not_found(agent: impl Into<String>) -> Self {
        let agent = agent.into();
        Self::new(ErrorKind::AgentNotFound, format!("agent '{}' is not configured", agent))
            .with_context("agent", agent)
    }

    pub fn task_not_found(task: impl Into<String>) -> Self {
        let task = task.into();
        Self::new(ErrorKind::TaskNotFound, format!("task '{}' not found", task))
            .with_context("task", task)
    }

    pub fn tool_unknown(tool: impl Into<String>) -> Self {
        let tool = tool.into();
        Self::new(ErrorKind::ToolUnknown, format!("unknown tool '{}'", tool))
            .with_context("tool", tool)
    }

    pub fn inference_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InferenceFailed, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimited, message)
    }

    pub fn storage_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StorageFailed, message)
    }

    pub fn parse_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseFailed, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_status_follows_kind() {
        assert_eq!(Error::rate_limited("slow down").status(), ErrorStatus::Temporary);
        assert_eq!(Error::task_not_found("design_ui_ux").status(), ErrorStatus::Permanent);
        assert_eq!(
            Error::new(ErrorKind::NetworkFailed, "refused").persist().status(),
            ErrorStatus::Persistent
        );
    }

    #[test]
    fn test_operation_chain() {
        let err = Error::storage_failed("disk full")
            .with_operation("progress::save")
            .with_operation("output::record")
            .with_operation("output::record")
            .with_operation("crew::kickoff");

        assert_eq!(err.operation(), "crew::kickoff");
        assert_eq!(err.operations(), ["progress::save", "output::record", "crew::kickoff"]);
        assert_eq!(Error::inference_failed("empty").operation(), "");
    }

    #[test]
    fn test_context_value_prefers_latest() {
        let err = Error::agent_not_found("painter")
            .with_context("task", "generate_visual_assets")
            .with_context("agent", "image_asset_agent");

        assert_eq!(err.context().len(), 3);
        assert_eq!(err.context_value("agent"), Some("image_asset_agent"));
        assert_eq!(err.context_value("task"), Some("generate_visual_assets"));
        assert_eq!(err.context_value("model"), None);
    }

    #[test]
    fn test_display_is_one_line() {
        let err = Error::rate_limited("Please try again in 20s")
            .with_operation("provider")
            .with_operation("agent::execute")
            .with_context("agent", "ui_ux_agent");

        assert_eq!(
            err.to_string(),
            "RateLimited (temporary) at agent::execute <- provider: \
             Please try again in 20s [agent=ui_ux_agent]"
        );
        assert_eq!(Error::inference_failed("").to_string(), "InferenceFailed (permanent)");
    }

    #[test]
    fn test_io_conversion_keeps_source() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "agents.yaml").into();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
        assert!(err.source().is_some());

        let err: Error = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert_eq!(err.kind(), ErrorKind::IoFailed);
    }
}
