//! Scripted in-memory holiday source.
//!
//! Compiled for unit tests only, in place of the holiday API. Each
//! call pops the next scripted outcome if any remain, otherwise answers
//! from the per-country tables.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::holidays::{
    error::HolidayError,
    source::{HolidaySource, SourceResult},
    types::Holiday,
};

#[derive(Default)]
pub struct MockHolidaySource {
    holidays: HashMap<String, Vec<Holiday>>,
    failures: HashMap<String, HolidayError>,
    script: Mutex<VecDeque<SourceResult<Vec<Holiday>>>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    call_log: Mutex<Vec<(String, i32, Instant)>>,
}

impl MockHolidaySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_holidays(mut self, country_code: &str, holidays: Vec<Holiday>) -> Self {
        self.holidays.insert(country_code.to_string(), holidays);
        self
    }

    pub fn with_error(mut self, country_code: &str, error: HolidayError) -> Self {
        self.failures.insert(country_code.to_string(), error);
        self
    }

    /// Outcomes returned in order before falling back to the tables.
    pub fn with_script(self, outcomes: Vec<SourceResult<Vec<Holiday>>>) -> Self {
        *lock(&self.script) = outcomes.into();
        self
    }

    /// Sleep before answering, to widen race windows in concurrency tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(country_code, year, instant)` for every call, oldest first.
    pub fn call_log(&self) -> Vec<(String, i32, Instant)> {
        lock(&self.call_log).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl HolidaySource for MockHolidaySource {
    async fn fetch(&self, country_code: &str, year: i32) -> SourceResult<Vec<Holiday>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.call_log).push((country_code.to_string(), year, Instant::now()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(outcome) = lock(&self.script).pop_front() {
            return outcome;
        }

        if let Some(error) = self.failures.get(country_code) {
            return Err(error.clone());
        }

        Ok(self.holidays.get(country_code).cloned().unwrap_or_default())
    }

    fn source_name(&self) -> &str {
        "mock"
    }
}
