//! Retry wrapper around any [`PageFetcher`].
//!
//! Five attempts with waits of 2·2^(n−1) seconds after failed attempt n
//! (2, 4, 8, 16). Transient failures retry; 401/403/404 abort immediately.
//! Emits `fetch:start`, `fetch:retry`, and terminal `fetch:error` events.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::error::{FetchError, FetchResult};
use crate::events::{AgentEvent, Emitter};
use crate::traits::PageFetcher;

/// Sleeping seam so tests can observe the backoff schedule without waiting
/// through it.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real clock.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Decorator adding bounded exponential-backoff retry to a fetcher.
pub struct RetryFetcher {
    inner: Arc<dyn PageFetcher>,
    attempts: u32,
    emitter: Emitter,
    sleeper: Arc<dyn Sleeper>,
}

impl RetryFetcher {
    /// Wrap a fetcher with the given attempt budget.
    pub fn new(inner: Arc<dyn PageFetcher>, attempts: u32, emitter: Emitter) -> Self {
        Self {
            inner,
            attempts: attempts.max(1),
            emitter,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Substitute the clock (tests).
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    fn backoff_seconds(failed_attempt: u32) -> u64 {
        2u64 * (1u64 << (failed_attempt - 1))
    }
}

#[async_trait]
impl PageFetcher for RetryFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<String> {
        self.emitter.emit(AgentEvent::FetchStart { url: url.to_string() });

        let mut attempt = 1u32;
        loop {
            let outcome = match self.inner.fetch(url).await {
                Ok(body) if body.trim().is_empty() => Err(FetchError::EmptyBody { url: url.to_string() }),
                other => other,
            };

            match outcome {
                Ok(body) => return Ok(body),
                Err(error) => {
                    let terminal = !error.is_retryable() || attempt >= self.attempts;
                    if terminal {
                        self.emitter.emit(AgentEvent::FetchError {
                            url: url.to_string(),
                            reason: error.to_string(),
                        });
                        if error.is_retryable() {
                            return Err(FetchError::Exhausted {
                                url: url.to_string(),
                                attempts: self.attempts,
                                last: Box::new(error),
                            });
                        }
                        return Err(error);
                    }

                    let backoff = Self::backoff_seconds(attempt);
                    warn!(url = %url, attempt, backoff_seconds = backoff, error = %error, "fetch attempt failed; backing off");
                    self.emitter.emit(AgentEvent::FetchRetry {
                        url: url.to_string(),
                        attempt: attempt + 1,
                        backoff_seconds: backoff,
                    });
                    self.sleeper.sleep(Duration::from_secs(backoff)).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::events::EventSink;

    struct RecordingSleeper {
        waits: Mutex<Vec<u64>>,
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.waits.lock().unwrap().push(duration.as_secs());
        }
    }

    struct FlakyFetcher {
        failures_before_success: Mutex<u32>,
        error_status: u16,
    }

    #[async_trait]
    impl PageFetcher for FlakyFetcher {
        async fn fetch(&self, url: &str) -> FetchResult<String> {
            let mut remaining = self.failures_before_success.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(FetchError::Status { url: url.to_string(), status: self.error_status });
            }
            Ok("<html><body>ok</body></html>".to_string())
        }
    }

    struct CollectingSink(Mutex<Vec<AgentEvent>>);

    impl EventSink for CollectingSink {
        fn emit(&self, event: &AgentEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    #[tokio::test]
    async fn backoff_schedule_is_2_4_8_16() {
        let sleeper = Arc::new(RecordingSleeper { waits: Mutex::new(Vec::new()) });
        let inner = Arc::new(FlakyFetcher {
            failures_before_success: Mutex::new(4),
            error_status: 503,
        });
        let fetcher = RetryFetcher::new(inner, 5, Emitter::disabled()).with_sleeper(sleeper.clone());

        let result = fetcher.fetch("https://example.com/a").await;
        assert!(result.is_ok());
        assert_eq!(*sleeper.waits.lock().unwrap(), vec![2, 4, 8, 16]);
    }

    #[tokio::test]
    async fn exhausts_after_five_attempts() {
        let sleeper = Arc::new(RecordingSleeper { waits: Mutex::new(Vec::new()) });
        let inner = Arc::new(FlakyFetcher {
            failures_before_success: Mutex::new(99),
            error_status: 500,
        });
        let fetcher = RetryFetcher::new(inner, 5, Emitter::disabled()).with_sleeper(sleeper);

        let result = fetcher.fetch("https://example.com/a").await;
        assert!(matches!(result, Err(FetchError::Exhausted { attempts: 5, .. })));
    }

    #[tokio::test]
    async fn permanent_status_aborts_immediately() {
        let sleeper = Arc::new(RecordingSleeper { waits: Mutex::new(Vec::new()) });
        let inner = Arc::new(FlakyFetcher {
            failures_before_success: Mutex::new(99),
            error_status: 404,
        });
        let fetcher = RetryFetcher::new(inner, 5, Emitter::disabled()).with_sleeper(sleeper.clone());

        let result = fetcher.fetch("https://example.com/gone").await;
        assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
        assert!(sleeper.waits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn emits_start_retry_error_events() {
        let sink = Arc::new(CollectingSink(Mutex::new(Vec::new())));
        let sleeper = Arc::new(RecordingSleeper { waits: Mutex::new(Vec::new()) });
        let inner = Arc::new(FlakyFetcher {
            failures_before_success: Mutex::new(99),
            error_status: 503,
        });
        let fetcher = RetryFetcher::new(inner, 2, Emitter::new(sink.clone())).with_sleeper(sleeper);

        let _ = fetcher.fetch("https://example.com/a").await;

        let names: Vec<&str> = sink.0.lock().unwrap().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["fetch:start", "fetch:retry", "fetch:error"]);
    }
}
