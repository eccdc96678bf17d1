//! Bounded retry with exponential backoff for invoker calls.
//!
//! Attempts are strictly sequential. The delay before retry `n` is
//! `base_delay * 2^(n-1)`: 1s, then 2s with the default policy.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::LlmError;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * (1u32 << attempt.saturating_sub(1).min(16))
    }
}

/// Runs `operation` until it succeeds, fails with a non-transient error, or the
/// policy's attempt budget is spent. The last error is returned on exhaustion.
pub async fn retry_with_backoff<T, F, Fut>(policy: RetryPolicy, mut operation: F) -> Result<T, LlmError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts || !e.is_transient() => return Err(e),
            Err(e) => {
                let delay = policy.delay_after(attempt);
                warn!(
                    "LLM call attempt {}/{} failed ({}), retrying after {}ms...",
                    attempt,
                    max_attempts,
                    e,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tokio::time::Instant;

    use super::*;
    use crate::llm_client::testing::ScriptedProvider;
    use crate::llm_client::{CompletionProvider, CompletionRequest};

    #[test]
    fn test_delays_double_from_base() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_secs(1));
        assert_eq!(policy.delay_after(2), Duration::from_secs(2));
        assert_eq!(policy.delay_after(3), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_twice_then_succeeds() {
        let provider = ScriptedProvider::new(vec![
            Err(LlmError::RateLimited("busy".into())),
            Err(LlmError::Network("reset".into())),
            Ok("done".into()),
        ]);
        let request = CompletionRequest::new("gpt-3.5-turbo", "hi", 10);
        let call_times = Mutex::new(Vec::new());
        let start = Instant::now();

        let result = retry_with_backoff(RetryPolicy::default(), |_| {
            call_times.lock().unwrap().push(start.elapsed());
            provider.complete(&request)
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(provider.calls(), 3);
        let times = call_times.into_inner().unwrap();
        assert_eq!(times[1] - times[0], Duration::from_secs(1));
        assert_eq!(times[2] - times[1], Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_error() {
        tokio::time::pause();

        let provider = ScriptedProvider::new(vec![
            Err(LlmError::Network("first".into())),
            Err(LlmError::Network("second".into())),
            Err(LlmError::RateLimited("third".into())),
            Ok("never reached".into()),
        ]);
        let request = CompletionRequest::new("gpt-3.5-turbo", "hi", 10);

        let err = retry_with_backoff(RetryPolicy::default(), |_| provider.complete(&request))
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::RateLimited(ref m) if m == "third"));
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_credentials_error_is_not_retried() {
        let provider = ScriptedProvider::new(vec![Err(LlmError::MissingApiKey), Ok("x".into())]);
        let request = CompletionRequest::new("gpt-3.5-turbo", "hi", 10);

        let err = retry_with_backoff(RetryPolicy::default(), |_| provider.complete(&request))
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::MissingApiKey));
        assert_eq!(provider.calls(), 1);
    }
}
