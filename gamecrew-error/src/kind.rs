//! What went wrong, grouped by the part of a crew run that fails.

use std::fmt;

/// Callers match on the kind; the message is for humans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    // -- configuration ------------------------------------------------------
    /// agents.yaml / tasks.yaml / inputs.yaml is missing a field or inconsistent
    ConfigInvalid,
    /// A task names an agent that is not configured
    AgentNotFound,
    /// A task's context names a task that does not run before it
    TaskNotFound,
    /// An agent lists a tool nobody registered
    ToolUnknown,

    // -- model calls --------------------------------------------------------
    /// The model answered, but not with anything usable
    InferenceFailed,
    /// The provider is down or returned a 5xx
    ProviderUnavailable,
    RateLimited,
    /// Missing or rejected API key
    AuthenticationFailed,
    NetworkFailed,

    // -- files --------------------------------------------------------------
    /// A task output or the progress marker could not be written
    StorageFailed,
    SerializationFailed,
    FileNotFound,
    PermissionDenied,
    IoFailed,

    // -- input --------------------------------------------------------------
    ParseFailed,
    InvalidArgument,
}

impl ErrorKind {
    /// Kinds that start out as temporary errors
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::RateLimited | ErrorKind::ProviderUnavailable | ErrorKind::NetworkFailed
        )
    }

    /// Configuration mistakes the user has to fix before a run can work
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::ConfigInvalid
                | ErrorKind::AgentNotFound
                | ErrorKind::TaskNotFound
                | ErrorKind::ToolUnknown
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_variant_name() {
        assert_eq!(ErrorKind::RateLimited.to_string(), "RateLimited");
        assert_eq!(ErrorKind::AuthenticationFailed.to_string(), "AuthenticationFailed");
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(ErrorKind::RateLimited.is_retryable());
        assert!(ErrorKind::NetworkFailed.is_retryable());
        assert!(!ErrorKind::AuthenticationFailed.is_retryable());
        assert!(!ErrorKind::ConfigInvalid.is_retryable());
    }

    #[test]
    fn test_config_kinds() {
        assert!(ErrorKind::ToolUnknown.is_config_error());
        assert!(!ErrorKind::StorageFailed.is_config_error());
    }
}
