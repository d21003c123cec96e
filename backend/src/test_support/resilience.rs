//! Deterministic clock, sleep and jitter doubles for resilience tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::resilience::{
    BackoffJitter, ResilienceConfig, ResilienceRuntime, ResilienceSleeper,
};
use std::sync::Arc;

/// Clock whose time only moves when a test says so.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Clock fixed at 2026-03-02T09:00:00Z.
    pub fn fixed() -> Self {
        let now = match Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).single() {
            Some(now) => now,
            None => panic!("valid fixed instant"),
        };
        Self::new(now)
    }

    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => panic!("failed to convert Duration to TimeDelta: {error}; delta={delta:?}"),
        };
        *self.lock_clock() += delta;
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock_clock() = now;
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateSleeper;

#[async_trait]
impl ResilienceSleeper for ImmediateSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

/// Records every requested sleep instead of waiting.
#[derive(Default)]
pub struct RecordingSleeper(pub Mutex<Vec<Duration>>);

impl RecordingSleeper {
    pub fn recorded(&self) -> Vec<Duration> {
        match self.0.lock() {
            Ok(entries) => entries.clone(),
            Err(_) => panic!("sleeper mutex"),
        }
    }
}

#[async_trait]
impl ResilienceSleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        match self.0.lock() {
            Ok(mut entries) => entries.push(duration),
            Err(_) => panic!("sleeper mutex"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl BackoffJitter for NoJitter {
    fn jittered_delay(&self, base: Duration, _attempt: u32) -> Duration {
        base
    }
}

/// Runtime that never waits and never jitters.
pub fn instant_runtime() -> ResilienceRuntime {
    ResilienceRuntime {
        sleeper: Arc::new(ImmediateSleeper),
        jitter: Arc::new(NoJitter),
    }
}

/// Defaults with a generous rate limit so tests only trip what they target.
pub fn relaxed_config() -> ResilienceConfig {
    ResilienceConfig {
        rate_limit_per_period: 10_000,
        ..ResilienceConfig::default()
    }
}
