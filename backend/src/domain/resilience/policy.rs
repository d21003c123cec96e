//! Admission state machine shared by every call through a resilience policy.
//!
//! Two independent gates decide whether one attempt may reach the store:
//! a fixed-window rate limiter and a consecutive-failure circuit breaker
//! (closed, open, half-open with a single probe). A probe that never reports
//! back is released when its attempt is abandoned, and is superseded once it
//! has been in flight for a full cooldown.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Fixed-window rate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    /// Calls admitted per window.
    pub calls_per_period: u32,
    /// Window length.
    pub period: Duration,
}

/// Circuit breaker tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures required to open the breaker.
    pub failure_threshold: u32,
    /// How long the breaker stays open before admitting a probe.
    pub open_cooldown: Duration,
}

/// Externally visible breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Outcome of asking the gates for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    Allowed,
    DeniedByRateLimit,
    DeniedByCircuit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CircuitInternalState {
    Closed { consecutive_failures: u32 },
    Open { opened_at: DateTime<Utc> },
    HalfOpen {
        probe_started_at: Option<DateTime<Utc>>,
    },
}

/// Mutable gate state, guarded by the owning policy's mutex.
#[derive(Debug, Clone)]
pub struct PolicyState {
    rate_limit: RateLimit,
    window_started_at: DateTime<Utc>,
    calls_in_window: u32,
    circuit_config: CircuitBreakerConfig,
    circuit_state: CircuitInternalState,
}

impl PolicyState {
    /// Build gate state with the rate window starting at `now`.
    ///
    /// A zero failure threshold is treated as one and a zero call budget as
    /// one so a misconfiguration cannot wedge every call.
    pub fn new(now: DateTime<Utc>, rate_limit: RateLimit, circuit: CircuitBreakerConfig) -> Self {
        Self {
            rate_limit: RateLimit {
                calls_per_period: rate_limit.calls_per_period.max(1),
                period: rate_limit.period,
            },
            window_started_at: now,
            calls_in_window: 0,
            circuit_config: CircuitBreakerConfig {
                failure_threshold: circuit.failure_threshold.max(1),
                open_cooldown: circuit.open_cooldown,
            },
            circuit_state: CircuitInternalState::Closed {
                consecutive_failures: 0,
            },
        }
    }

    /// Ask both gates for one attempt. A rate slot is consumed only when the
    /// attempt is admitted.
    pub fn admit_call(&mut self, now: DateTime<Utc>) -> AdmissionDecision {
        self.roll_window_if_needed(now);
        if self.calls_in_window >= self.rate_limit.calls_per_period {
            return AdmissionDecision::DeniedByRateLimit;
        }

        let decision = match self.circuit_state {
            CircuitInternalState::Closed { .. } => AdmissionDecision::Allowed,
            CircuitInternalState::Open { opened_at }
                if has_elapsed(opened_at, now, self.circuit_config.open_cooldown) =>
            {
                self.start_probe(now)
            }
            CircuitInternalState::Open { .. } => AdmissionDecision::DeniedByCircuit,
            CircuitInternalState::HalfOpen {
                probe_started_at: Some(started_at),
            } if !has_elapsed(started_at, now, self.circuit_config.open_cooldown) => {
                AdmissionDecision::DeniedByCircuit
            }
            CircuitInternalState::HalfOpen { .. } => self.start_probe(now),
        };

        if decision == AdmissionDecision::Allowed {
            self.calls_in_window = self.calls_in_window.saturating_add(1);
        }
        decision
    }

    /// An admitted attempt was dropped before the store answered.
    ///
    /// A pending half-open probe is released so the next call may probe
    /// again. Closed and open states are left as they are.
    pub fn abandon_attempt(&mut self) {
        if let CircuitInternalState::HalfOpen { .. } = self.circuit_state {
            self.circuit_state = CircuitInternalState::HalfOpen {
                probe_started_at: None,
            };
        }
    }

    /// The store answered; close the breaker.
    pub fn record_success(&mut self) {
        self.circuit_state = CircuitInternalState::Closed {
            consecutive_failures: 0,
        };
    }

    /// The store failed transiently.
    pub fn record_failure(&mut self, now: DateTime<Utc>) {
        self.circuit_state = match self.circuit_state {
            CircuitInternalState::Closed {
                consecutive_failures,
            } => {
                let next = consecutive_failures.saturating_add(1);
                if next >= self.circuit_config.failure_threshold {
                    CircuitInternalState::Open { opened_at: now }
                } else {
                    CircuitInternalState::Closed {
                        consecutive_failures: next,
                    }
                }
            }
            CircuitInternalState::HalfOpen { .. } => CircuitInternalState::Open { opened_at: now },
            open @ CircuitInternalState::Open { .. } => open,
        };
    }

    /// Snapshot of the breaker state.
    #[must_use]
    pub fn circuit_state(&self) -> CircuitState {
        match self.circuit_state {
            CircuitInternalState::Closed { .. } => CircuitState::Closed,
            CircuitInternalState::Open { .. } => CircuitState::Open,
            CircuitInternalState::HalfOpen { .. } => CircuitState::HalfOpen,
        }
    }

    fn start_probe(&mut self, now: DateTime<Utc>) -> AdmissionDecision {
        self.circuit_state = CircuitInternalState::HalfOpen {
            probe_started_at: Some(now),
        };
        AdmissionDecision::Allowed
    }

    fn roll_window_if_needed(&mut self, now: DateTime<Utc>) {
        if has_elapsed(self.window_started_at, now, self.rate_limit.period) {
            self.window_started_at = now;
            self.calls_in_window = 0;
        }
    }
}

fn has_elapsed(since: DateTime<Utc>, now: DateTime<Utc>, span: Duration) -> bool {
    // An unrepresentable span fails open so nothing stays blocked forever.
    let Ok(span) = chrono::Duration::from_std(span) else {
        return true;
    };
    now >= since + span
}
