//! Consecutive-failure circuit breaker for holiday sources.
//!
//! Closed: calls pass through; each transient failure bumps a counter and
//! any success resets it. When the counter reaches the threshold the
//! circuit opens and every call is rejected with
//! [`HolidayError::CircuitOpen`] until the break duration elapses. The
//! first call after that is the half-open trial: success closes the
//! circuit, a transient failure reopens it for another break. Other calls
//! arriving while the trial is in flight are rejected.
//!
//! All state lives behind a single mutex that is never held across an
//! await, so every transition is observed and applied atomically.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::holidays::{
    error::HolidayError,
    source::{HolidaySource, SourceResult},
    types::Holiday,
};

/// Externally visible breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub break_duration: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            break_duration: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum BreakerState {
    Closed { consecutive_failures: u32 },
    Open { until: Instant },
    HalfOpen { trial_in_flight: bool },
}

#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(BreakerState::Closed {
                consecutive_failures: 0,
            }),
        }
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Current state. An open circuit whose break has elapsed reports
    /// `HalfOpen`, since the next call will be admitted as the trial.
    pub fn state(&self) -> CircuitState {
        let current = *self.lock();
        match current {
            BreakerState::Closed { .. } => CircuitState::Closed,
            BreakerState::Open { until } if Instant::now() >= until => CircuitState::HalfOpen,
            BreakerState::Open { .. } => CircuitState::Open,
            BreakerState::HalfOpen { .. } => CircuitState::HalfOpen,
        }
    }

    /// Admit a call or reject it with `CircuitOpen`.
    pub fn try_acquire(&self) -> Result<CallPermit<'_>, HolidayError> {
        let mut state = self.lock();
        let current = *state;
        let trial = match current {
            BreakerState::Closed { .. } => false,
            BreakerState::Open { until } => {
                if Instant::now() < until {
                    return Err(HolidayError::CircuitOpen);
                }
                info!("Circuit half-open, admitting trial call");
                *state = BreakerState::HalfOpen {
                    trial_in_flight: true,
                };
                true
            }
            BreakerState::HalfOpen {
                trial_in_flight: true,
            } => return Err(HolidayError::CircuitOpen),
            BreakerState::HalfOpen {
                trial_in_flight: false,
            } => {
                *state = BreakerState::HalfOpen {
                    trial_in_flight: true,
                };
                true
            }
        };

        Ok(CallPermit {
            breaker: self,
            trial,
            settled: false,
        })
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record_success(&self) {
        let mut state = self.lock();
        let current = *state;
        match current {
            BreakerState::Closed { .. } => {
                *state = BreakerState::Closed {
                    consecutive_failures: 0,
                };
            }
            BreakerState::HalfOpen { .. } => {
                info!("Trial call succeeded, circuit closed");
                *state = BreakerState::Closed {
                    consecutive_failures: 0,
                };
            }
            // A call admitted before the circuit opened; the break stands.
            BreakerState::Open { .. } => {}
        }
    }

    fn record_failure(&self) {
        let mut state = self.lock();
        let current = *state;
        match current {
            BreakerState::Closed {
                consecutive_failures,
            } => {
                let failures = consecutive_failures + 1;
                if failures >= self.config.failure_threshold {
                    warn!(
                        "Circuit opened after {} consecutive failures, breaking for {:?}",
                        failures, self.config.break_duration
                    );
                    *state = BreakerState::Open {
                        until: Instant::now() + self.config.break_duration,
                    };
                } else {
                    *state = BreakerState::Closed {
                        consecutive_failures: failures,
                    };
                }
            }
            BreakerState::HalfOpen { .. } => {
                warn!(
                    "Trial call failed, circuit reopened for {:?}",
                    self.config.break_duration
                );
                *state = BreakerState::Open {
                    until: Instant::now() + self.config.break_duration,
                };
            }
            BreakerState::Open { .. } => {}
        }
    }

    fn release_trial(&self) {
        let mut state = self.lock();
        if matches!(*state, BreakerState::HalfOpen { .. }) {
            *state = BreakerState::HalfOpen {
                trial_in_flight: false,
            };
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

/// Admission ticket for one call. Dropping it unsettled (a cancelled
/// future) frees the half-open trial slot without changing the failure
/// count.
pub struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    trial: bool,
    settled: bool,
}

impl CallPermit<'_> {
    pub fn succeeded(mut self) {
        self.settled = true;
        self.breaker.record_success();
    }

    pub fn failed(mut self) {
        self.settled = true;
        self.breaker.record_failure();
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if !self.settled && self.trial {
            self.breaker.release_trial();
        }
    }
}

/// Wraps a source with a shared [`CircuitBreaker`].
///
/// Only transient failures are counted; any other outcome, including a
/// non-transient error, counts as a success. Wrap the retrying source so
/// an exhausted retry sequence counts as a single failure.
pub struct CircuitBreakerSource<S> {
    inner: S,
    breaker: Arc<CircuitBreaker>,
}

impl<S> CircuitBreakerSource<S> {
    pub fn new(inner: S, breaker: Arc<CircuitBreaker>) -> Self {
        Self { inner, breaker }
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }
}

#[async_trait]
impl<S> HolidaySource for CircuitBreakerSource<S>
where
    S: HolidaySource + Send + Sync,
{
    async fn fetch(&self, country_code: &str, year: i32) -> SourceResult<Vec<Holiday>> {
        let permit = match self.breaker.try_acquire() {
            Ok(permit) => permit,
            Err(err) => {
                warn!(
                    "{} fetch for {}/{} rejected: circuit open",
                    self.inner.source_name(),
                    country_code,
                    year
                );
                return Err(err);
            }
        };

        match self.inner.fetch(country_code, year).await {
            Ok(holidays) => {
                permit.succeeded();
                Ok(holidays)
            }
            Err(err) if err.is_transient() => {
                permit.failed();
                Err(err)
            }
            // The upstream answered; a 4xx or bad payload is not an outage.
            Err(err) => {
                permit.succeeded();
                Err(err)
            }
        }
    }

    fn source_name(&self) -> &str {
        self.inner.source_name()
    }
}
