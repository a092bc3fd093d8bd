//! Failures at the HTTP boundary and their mapping onto the crew error.

use gamecrew_error::{Error, ErrorKind};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub enum ProviderError {
    /// The request never got an HTTP response
    Network(String),
    /// Any other non-success status
    Api { status: u16, message: String },
    /// The response body was not what the endpoint documents
    Parse(String),
    /// HTTP 429. `message` is the provider's text, which often carries a
    /// "Please try again in ..." hint.
    RateLimited {
        retry_after: Option<Duration>,
        message: String,
    },
    /// HTTP 400
    InvalidRequest(String),
    /// HTTP 401
    AuthenticationFailed,
    Other(String),
}

impl ProviderError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Build the error for a non-success response, consuming its body.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_retry_after);

        let body = response.text().await.unwrap_or_default();
        // OpenAI wraps errors as {"error": {"message": ...}}
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .unwrap_or(body);

        match status {
            400 => Self::InvalidRequest(message),
            401 => Self::AuthenticationFailed,
            429 => Self::RateLimited {
                retry_after,
                message,
            },
            _ => Self::Api { status, message },
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

/// `Retry-After` in (possibly fractional) seconds. HTTP dates and values
/// too large for a `Duration` are ignored.
fn parse_retry_after(value: &str) -> Option<Duration> {
    let secs: f64 = value.trim().parse().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(e) => write!(f, "network error: {}", e),
            Self::Api { status, message } => write!(f, "HTTP {}: {}", status, message),
            Self::Parse(e) => write!(f, "unexpected response: {}", e),
            Self::RateLimited { retry_after, message } => {
                f.write_str("rate limited")?;
                if let Some(delay) = retry_after {
                    write!(f, " (retry after {:.1}s)", delay.as_secs_f64())?;
                }
                if !message.is_empty() {
                    write!(f, ": {}", message)?;
                }
                Ok(())
            }
            Self::InvalidRequest(e) => write!(f, "invalid request: {}", e),
            Self::AuthenticationFailed => f.write_str("authentication failed; check OPENAI_API_KEY"),
            Self::Other(e) => f.write_str(e),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<ProviderError> for Error {
    fn from(err: ProviderError) -> Self {
        let kind = match &err {
            ProviderError::Network(_) => ErrorKind::NetworkFailed,
            ProviderError::Api { status, .. } if *status >= 500 => ErrorKind::ProviderUnavailable,
            ProviderError::Api { .. } | ProviderError::Other(_) => ErrorKind::InferenceFailed,
            ProviderError::Parse(_) => ErrorKind::ParseFailed,
            ProviderError::RateLimited { .. } => ErrorKind::RateLimited,
            ProviderError::InvalidRequest(_) => ErrorKind::InvalidArgument,
            ProviderError::AuthenticationFailed => ErrorKind::AuthenticationFailed,
        };
        Error::new(kind, err.to_string())
            .with_operation("provider")
            .set_source(err)
    }
}
