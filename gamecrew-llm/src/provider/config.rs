//! Where to reach the OpenAI API and with which key.

use super::ProviderError;
use gamecrew_error::Error;
use std::time::Duration;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

const API_KEY_VAR: &str = "OPENAI_API_KEY";
const BASE_URL_VAR: &str = "OPENAI_BASE_URL";

/// Shared by the chat provider and the image client
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_model: String,
    /// Whole-request timeout; image generation can take a while
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            base_url: OPENAI_BASE_URL.to_string(),
            default_model: DEFAULT_CHAT_MODEL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    /// `OPENAI_API_KEY` is required; `OPENAI_BASE_URL` redirects both the
    /// chat and image endpoints (proxies, compatible servers, mocks).
    pub fn from_env() -> gamecrew_error::Result<Self> {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                Error::config_invalid(format!("{} is not set", API_KEY_VAR))
                    .with_operation("provider::from_env")
            })?;

        let config = Self::openai(api_key);
        Ok(match std::env::var(BASE_URL_VAR) {
            Ok(url) if !url.trim().is_empty() => config.with_base_url(url),
            _ => config,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }

    pub(crate) fn http_client(&self) -> Result<reqwest::Client, ProviderError> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ProviderError::Other(format!("failed to create HTTP client: {}", e)))
    }

    pub(crate) fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => request.bearer_auth(key),
            _ => request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_defaults() {
        let config = ProviderConfig::openai("sk-test");
        assert_eq!(config.base_url(), OPENAI_BASE_URL);
        assert_eq!(config.default_model, "gpt-4o-mini");
        assert!(config.has_api_key());
    }

    #[test]
    fn test_base_url_is_normalized() {
        let config = ProviderConfig::openai("sk-test").with_base_url("http://localhost:8080/v1/");
        assert_eq!(config.base_url(), "http://localhost:8080/v1");
    }

    #[test]
    fn test_blank_key_is_not_a_key() {
        assert!(!ProviderConfig::openai("  ").has_api_key());

        let mut config = ProviderConfig::openai("sk-test");
        config.api_key = None;
        assert!(!config.has_api_key());
    }
}
