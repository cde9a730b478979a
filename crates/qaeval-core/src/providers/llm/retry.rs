use super::{LlmClient, RequestPayload, RequestShape, SamplingParams, ShapeTable};
use crate::errors::{JudgeError, ProviderError};
use crate::model::LlmResponse;
use crate::stats::{UsageStats, UsageSummary};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// Linear backoff: attempt `n` (1-based) that fails transiently is followed
/// by a sleep of `base_sleep + step * n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_sleep: Duration,
    pub step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_sleep: Duration::from_secs(10),
            step: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// No sleeping between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_sleep: Duration::ZERO,
            step: Duration::ZERO,
        }
    }

    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_sleep.saturating_add(self.step.saturating_mul(attempt))
    }
}

/// Tagged result of a single attempt.
#[derive(Debug)]
pub enum AttemptOutcome {
    Success(LlmResponse),
    Retryable(ProviderError),
    Fatal(ProviderError),
}

impl From<Result<LlmResponse, ProviderError>> for AttemptOutcome {
    fn from(result: Result<LlmResponse, ProviderError>) -> Self {
        match result {
            Ok(response) => AttemptOutcome::Success(response),
            Err(e) if e.is_transient() => AttemptOutcome::Retryable(e),
            Err(e) => AttemptOutcome::Fatal(e),
        }
    }
}

/// Retrying, accounting front of an [`LlmClient`].
pub struct CompletionClient {
    backend: Arc<dyn LlmClient>,
    shapes: ShapeTable,
    policy: RetryPolicy,
    stats: UsageStats,
}

impl CompletionClient {
    pub fn new(backend: Arc<dyn LlmClient>, policy: RetryPolicy) -> Self {
        Self {
            backend,
            shapes: ShapeTable::default(),
            policy,
            stats: UsageStats::default(),
        }
    }

    pub fn with_shapes(mut self, shapes: ShapeTable) -> Self {
        self.shapes = shapes;
        self
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    pub fn provider_name(&self) -> &'static str {
        self.backend.provider_name()
    }

    pub fn shape(&self) -> RequestShape {
        self.shapes.shape_for(self.backend.model())
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn stats(&self) -> &UsageStats {
        &self.stats
    }

    pub fn usage_summary(&mut self, reset: bool) -> UsageSummary {
        self.stats.summary(reset)
    }

    /// Generated text for `text`, retrying transient failures.
    ///
    /// Every failed attempt counts as an error in [`UsageStats`], including
    /// fatal ones and those followed by a successful retry.
    pub async fn complete(
        &mut self,
        text: &str,
        instruction: Option<&str>,
        params: &SamplingParams,
    ) -> Result<String, JudgeError> {
        let payload = RequestPayload::build(self.shape(), text, instruction);
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let started = Instant::now();
            let outcome = AttemptOutcome::from(self.backend.complete(&payload, params).await);

            match outcome {
                AttemptOutcome::Success(response) => {
                    self.stats
                        .record_call(started.elapsed(), response.total_tokens);
                    return Ok(response.text);
                }
                AttemptOutcome::Fatal(e) => {
                    self.stats.record_error();
                    return Err(JudgeError::Provider(e));
                }
                AttemptOutcome::Retryable(e) => {
                    self.stats.record_error();
                    if attempt >= max_attempts {
                        return Err(JudgeError::ExhaustedRetries {
                            attempts: attempt,
                            last: e,
                        });
                    }

                    let backoff = self.policy.delay(attempt);
                    warn!(
                        error = %e,
                        attempt,
                        max_attempts,
                        sleep_ms = backoff.as_millis() as u64,
                        "transient completion failure, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("provider", &self.backend.provider_name())
            .field("model", &self.backend.model())
            .field("policy", &self.policy)
            .finish()
    }
}
