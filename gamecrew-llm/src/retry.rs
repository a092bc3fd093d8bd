//! Rate-limit retry for provider calls.
//!
//! Providers answer 429 with a message such as
//! `"Rate limit reached ... Please try again in 6.5s."`. The wrapper sleeps for
//! the hinted time (or a default) and repeats the call until it stops being
//! rate limited.

use std::future::Future;
use std::time::Duration;

use crate::provider::ProviderError;

const RETRY_HINT: &str = "Please try again in";

#[derive(Clone, Debug)]
pub struct RateLimitPolicy {
    /// Delay used when neither a `Retry-After` header nor a hint is present
    pub default_delay: Duration,
    /// `None` keeps retrying for as long as the provider rate limits
    pub max_retries: Option<u32>,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            default_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

impl RateLimitPolicy {
    #[must_use]
    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// How long to wait before retrying after `error`.
    pub fn delay_for(&self, error: &ProviderError) -> Duration {
        match error {
            ProviderError::RateLimited { retry_after: Some(delay), .. } => *delay,
            ProviderError::RateLimited { message, .. } => {
                retry_after_hint(message).unwrap_or(self.default_delay)
            }
            _ => self.default_delay,
        }
    }
}

/// Extract the wait time from a "Please try again in ..." hint.
///
/// Accepts `20s`, `6.5s`, `250ms` and compound forms like `1m2.5s`.
pub fn retry_after_hint(message: &str) -> Option<Duration> {
    let rest = message.split(RETRY_HINT).nth(1)?.trim_start();
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c.is_ascii_alphabetic()))
        .unwrap_or(rest.len());
    parse_duration(rest[..end].trim_end_matches('.'))
}

fn parse_duration(text: &str) -> Option<Duration> {
    let mut total = 0.0_f64;
    let mut number = String::new();
    let mut chars = text.chars().peekable();
    let mut matched = false;

    while let Some(c) = chars.next() {
        if c.is_ascii_digit() || c == '.' {
            number.push(c);
            continue;
        }

        let mut unit = c.to_string();
        while let Some(next) = chars.peek() {
            if next.is_ascii_alphabetic() {
                unit.push(*next);
                chars.next();
            } else {
                break;
            }
        }

        let value: f64 = number.parse().ok()?;
        number.clear();
        total += match unit.as_str() {
            "ms" => value / 1000.0,
            "s" => value,
            "m" => value * 60.0,
            "h" => value * 3600.0,
            _ => return None,
        };
        matched = true;
    }

    if !number.is_empty() || !matched {
        return None;
    }
    Duration::try_from_secs_f64(total).ok()
}

/// Run `operation`, retrying while it fails with a rate-limit error.
///
/// Any other error is returned immediately. Once `max_retries` is exhausted
/// the last rate-limit error is returned.
pub async fn with_rate_limit_retry<T, Op, Fut>(
    policy: &RateLimitPolicy,
    mut operation: Op,
) -> Result<T, ProviderError>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt: u32 = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if error.is_rate_limited() => {
                if policy.max_retries.is_some_and(|max| attempt >= max) {
                    tracing::error!(attempts = attempt + 1, "Rate limit persisted; giving up");
                    return Err(error);
                }
                attempt += 1;
                let delay = policy.delay_for(&error);
                tracing::warn!(
                    attempt = attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Rate limit reached. Retrying in {:.1} seconds...",
                    delay.as_secs_f64()
                );
                tokio::time::sleep(delay).await;
            }
            Err(error) => return Err(error),
        }
    }
}
