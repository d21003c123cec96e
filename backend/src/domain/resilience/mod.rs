//! Resilience policy composed around store calls.
//!
//! A [`ResiliencePolicy`] bounds concurrency with a bulkhead semaphore, asks
//! the rate limiter and circuit breaker to admit each attempt, and retries
//! transient failures with capped exponential backoff plus jitter. Callers
//! decide what a rejection or an exhausted call means for their operation.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use tokio::sync::Semaphore;
use tracing::warn;

mod policy;
mod runtime;

pub use policy::CircuitState;
use policy::{AdmissionDecision, CircuitBreakerConfig, PolicyState, RateLimit};
pub use runtime::{RandomJitter, TokioSleeper};

/// Tuning for one resilience policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResilienceConfig {
    /// Attempts per call, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound on any retry delay before jitter.
    pub max_backoff: Duration,
    /// Consecutive transient failures that open the breaker.
    pub circuit_failure_threshold: u32,
    /// Time the breaker stays open before a half-open probe.
    pub circuit_open_cooldown: Duration,
    /// Attempts admitted per rate window.
    pub rate_limit_per_period: u32,
    /// Rate window length.
    pub rate_limit_period: Duration,
    /// Calls allowed in flight at once.
    pub max_concurrent_calls: usize,
    /// How long a call waits for a bulkhead permit.
    pub bulkhead_wait: Duration,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
            circuit_failure_threshold: 5,
            circuit_open_cooldown: Duration::from_secs(30),
            rate_limit_per_period: 100,
            rate_limit_period: Duration::from_secs(1),
            max_concurrent_calls: 25,
            bulkhead_wait: Duration::from_millis(500),
        }
    }
}

/// Async sleep used between retries.
#[async_trait]
pub trait ResilienceSleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Turns a base backoff delay into the delay actually slept.
pub trait BackoffJitter: Send + Sync {
    fn jittered_delay(&self, base: Duration, attempt: u32) -> Duration;
}

/// Sleep and jitter strategies used by a policy.
pub struct ResilienceRuntime {
    pub sleeper: Arc<dyn ResilienceSleeper>,
    pub jitter: Arc<dyn BackoffJitter>,
}

impl Default for ResilienceRuntime {
    fn default() -> Self {
        Self {
            sleeper: Arc::new(TokioSleeper),
            jitter: Arc::new(RandomJitter),
        }
    }
}

/// Classifies errors as worth retrying.
///
/// Only transient errors are retried and counted against the breaker. A
/// non-transient error ends the call at once.
pub trait TransientError {
    fn is_transient(&self) -> bool;
}

/// Why a call never reached the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ResilienceRejection {
    #[error("bulkhead is full")]
    BulkheadFull,
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("circuit breaker is open")]
    CircuitOpen,
    #[error("resilience state is unavailable")]
    StateUnavailable,
}

/// Failure of a call made through [`ResiliencePolicy::call`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResilienceError<E> {
    /// The call was short-circuited before or between attempts.
    #[error("call rejected: {0}")]
    Rejected(ResilienceRejection),
    /// Every permitted attempt failed, or a non-transient error ended the call.
    #[error("call failed after {attempts} attempt(s): {source}")]
    Exhausted { attempts: u32, source: E },
}

enum AttemptError<E> {
    Rejected(ResilienceRejection),
    Transient(E),
    Permanent(E),
}

/// An admitted attempt whose outcome has not been recorded yet.
///
/// Dropping it unsettled (the caller's future was cancelled mid-call) hands
/// the attempt back to the breaker so a half-open probe cannot stay claimed.
struct PendingAttempt<'a> {
    state: &'a Mutex<PolicyState>,
    settled: bool,
}

impl Drop for PendingAttempt<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        if let Ok(mut state) = self.state.lock() {
            state.abandon_attempt();
        }
    }
}

/// Bulkhead, rate limiter, circuit breaker and retry in one object.
///
/// Cloning is not supported; share a policy through `Arc` so every caller
/// sees the same gate state.
pub struct ResiliencePolicy {
    name: &'static str,
    config: ResilienceConfig,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn ResilienceSleeper>,
    jitter: Arc<dyn BackoffJitter>,
    bulkhead: Semaphore,
    state: Mutex<PolicyState>,
}

impl fmt::Debug for ResiliencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResiliencePolicy")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ResiliencePolicy {
    /// Build a policy with tokio sleeping and random jitter.
    pub fn new(name: &'static str, config: ResilienceConfig, clock: Arc<dyn Clock>) -> Self {
        Self::with_runtime(name, config, clock, ResilienceRuntime::default())
    }

    /// Build a policy with injected sleep and jitter strategies.
    pub fn with_runtime(
        name: &'static str,
        config: ResilienceConfig,
        clock: Arc<dyn Clock>,
        runtime: ResilienceRuntime,
    ) -> Self {
        let state = PolicyState::new(
            clock.utc(),
            RateLimit {
                calls_per_period: config.rate_limit_per_period,
                period: config.rate_limit_period,
            },
            CircuitBreakerConfig {
                failure_threshold: config.circuit_failure_threshold,
                open_cooldown: config.circuit_open_cooldown,
            },
        );
        Self {
            name,
            bulkhead: Semaphore::new(config.max_concurrent_calls.max(1)),
            config,
            clock,
            sleeper: runtime.sleeper,
            jitter: runtime.jitter,
            state: Mutex::new(state),
        }
    }

    /// Current breaker state, or `None` if the state lock is poisoned.
    pub fn circuit_state(&self) -> Option<CircuitState> {
        self.state.lock().ok().map(|state| state.circuit_state())
    }

    /// Run `f` under the policy.
    ///
    /// `operation` labels log events. `f` is invoked once per attempt.
    pub async fn call<T, E, F, Fut>(
        &self,
        operation: &'static str,
        mut f: F,
    ) -> Result<T, ResilienceError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: TransientError + fmt::Display,
    {
        let Ok(Ok(_permit)) =
            tokio::time::timeout(self.config.bulkhead_wait, self.bulkhead.acquire()).await
        else {
            warn!(policy = self.name, operation, "bulkhead full; rejecting call");
            return Err(ResilienceError::Rejected(ResilienceRejection::BulkheadFull));
        };

        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.run_single_attempt(&mut f).await {
                Ok(value) => return Ok(value),
                Err(AttemptError::Rejected(rejection)) => {
                    warn!(policy = self.name, operation, attempt, %rejection, "call rejected");
                    return Err(ResilienceError::Rejected(rejection));
                }
                Err(AttemptError::Transient(error)) if attempt < max_attempts => {
                    let delay = self
                        .jitter
                        .jittered_delay(self.retry_base_delay(attempt), attempt);
                    warn!(
                        policy = self.name,
                        operation,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        %error,
                        "transient failure; retrying"
                    );
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                Err(AttemptError::Transient(source) | AttemptError::Permanent(source)) => {
                    return Err(ResilienceError::Exhausted {
                        attempts: attempt,
                        source,
                    });
                }
            }
        }
    }

    async fn run_single_attempt<T, E, F, Fut>(&self, f: &mut F) -> Result<T, AttemptError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: TransientError,
    {
        let admission = {
            let mut state = self
                .state
                .lock()
                .map_err(|_| AttemptError::Rejected(ResilienceRejection::StateUnavailable))?;
            state.admit_call(self.clock.utc())
        };
        match admission {
            AdmissionDecision::Allowed => {}
            AdmissionDecision::DeniedByRateLimit => {
                return Err(AttemptError::Rejected(ResilienceRejection::RateLimited));
            }
            AdmissionDecision::DeniedByCircuit => {
                return Err(AttemptError::Rejected(ResilienceRejection::CircuitOpen));
            }
        }

        let mut pending = PendingAttempt {
            state: &self.state,
            settled: false,
        };
        let result = f().await;
        pending.settled = true;
        let mut state = self
            .state
            .lock()
            .map_err(|_| AttemptError::Rejected(ResilienceRejection::StateUnavailable))?;
        match result {
            Ok(value) => {
                state.record_success();
                Ok(value)
            }
            Err(error) if error.is_transient() => {
                state.record_failure(self.clock.utc());
                Err(AttemptError::Transient(error))
            }
            Err(error) => {
                // The store answered, so the breaker sees a healthy dependency.
                state.record_success();
                Err(AttemptError::Permanent(error))
            }
        }
    }

    fn retry_base_delay(&self, attempt: u32) -> Duration {
        let exponent = 2_u32.saturating_pow(attempt.saturating_sub(1));
        let base_ms = u64::try_from(self.config.initial_backoff.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.config.max_backoff.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(base_ms.saturating_mul(u64::from(exponent)).min(max_ms))
    }
}
