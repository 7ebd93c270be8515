//! Fixed-schedule retry decorator for holiday sources.
//!
//! Transient failures are retried after each delay in the schedule, in
//! order. Non-transient failures are returned immediately.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::holidays::{
    source::{HolidaySource, SourceResult},
    types::Holiday,
};

/// Delays between attempts: 1s, 5s, then 10s.
pub const DEFAULT_RETRY_DELAYS: [Duration; 3] = [
    Duration::from_secs(1),
    Duration::from_secs(5),
    Duration::from_secs(10),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    delays: Vec<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_DELAYS.to_vec())
    }
}

impl RetryPolicy {
    pub fn new(delays: Vec<Duration>) -> Self {
        Self { delays }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(Vec::new())
    }

    pub fn max_retries(&self) -> usize {
        self.delays.len()
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }
}

/// Wraps a source so each logical fetch is attempted up to
/// `1 + policy.max_retries()` times.
pub struct RetryingSource<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S> RetryingSource<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<S> HolidaySource for RetryingSource<S>
where
    S: HolidaySource + Send + Sync,
{
    async fn fetch(&self, country_code: &str, year: i32) -> SourceResult<Vec<Holiday>> {
        let mut delays = self.policy.delays.iter();
        let mut attempt = 1;

        loop {
            let err = match self.inner.fetch(country_code, year).await {
                Ok(holidays) => {
                    if attempt > 1 {
                        debug!(
                            "{} fetch for {}/{} succeeded on attempt {}",
                            self.inner.source_name(),
                            country_code,
                            year,
                            attempt
                        );
                    }
                    return Ok(holidays);
                }
                Err(err) if err.is_transient() => err,
                Err(err) => return Err(err),
            };

            let Some(delay) = delays.next() else {
                warn!(
                    "{} fetch for {}/{} failed after {} attempts: {}",
                    self.inner.source_name(),
                    country_code,
                    year,
                    attempt,
                    err
                );
                return Err(err);
            };

            warn!(
                "{} fetch for {}/{} failed (attempt {}), retrying in {:?}: {}",
                self.inner.source_name(),
                country_code,
                year,
                attempt,
                delay,
                err
            );
            tokio::time::sleep(*delay).await;
            attempt += 1;
        }
    }

    fn source_name(&self) -> &str {
        self.inner.source_name()
    }
}
