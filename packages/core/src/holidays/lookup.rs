//! Cache-aside holiday lookups.
//!
//! [`HolidayLookupService`] is the only entry point callers use to get a
//! holiday list. A cache hit is decoded and returned without touching the
//! source. On a miss the list is fetched from the (retrying,
//! circuit-broken) source, written to the cache, and returned.
//!
//! Concurrent misses for the same key join a single in-flight fetch, so
//! an uncached key produces at most one upstream call at a time. The fetch
//! runs on its own task: it completes (and settles the circuit breaker)
//! even if every caller waiting on it goes away. The in-flight entry is
//! dropped as soon as that fetch completes; later lookups go through the
//! cache again.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Datelike, NaiveDate};
use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, warn};

use crate::cache::{CacheKey, HolidayCache};
use crate::holidays::{
    error::HolidayError, source::HolidaySource, types::Holiday, window::select_upcoming,
};
use crate::metrics::AppMetrics;

type LookupResult = Result<Vec<Holiday>, HolidayError>;
type InFlightFetch = Shared<BoxFuture<'static, LookupResult>>;
type InFlightMap = Arc<Mutex<HashMap<String, InFlightFetch>>>;

pub struct HolidayLookupService {
    source: Arc<dyn HolidaySource + Send + Sync>,
    cache: Arc<dyn HolidayCache + Send + Sync>,
    in_flight: InFlightMap,
    metrics: Option<Arc<AppMetrics>>,
}

impl HolidayLookupService {
    pub fn new(
        source: Arc<dyn HolidaySource + Send + Sync>,
        cache: Arc<dyn HolidayCache + Send + Sync>,
    ) -> Self {
        Self {
            source,
            cache,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<AppMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Full holiday list for `country_code` in `year`.
    ///
    /// A corrupt cache payload fails the call with
    /// [`HolidayError::Deserialization`]; it is not repaired or refetched.
    pub async fn get_holidays(&self, country_code: &str, year: i32) -> LookupResult {
        let key = CacheKey::new(country_code, year).to_string();
        self.record(|m| m.lookups_total.inc());

        match self.cache.get(&key).await {
            Ok(Some(bytes)) => {
                debug!("Cache hit for {}", key);
                self.record(|m| m.cache_hits_total.inc());
                return decode(&bytes);
            }
            Ok(None) => debug!("Cache miss for {}", key),
            Err(err) => warn!("Cache read failed for {}, treating as miss: {}", key, err),
        }
        self.record(|m| m.cache_misses_total.inc());

        self.join_or_start_fetch(key, country_code, year).await
    }

    /// Holidays of `country_code` falling in the 7-day window from `today`.
    pub async fn get_upcoming(&self, country_code: &str, today: NaiveDate) -> LookupResult {
        let holidays = self.get_holidays(country_code, today.year()).await?;
        Ok(select_upcoming(&holidays, today))
    }

    /// Number of fetches currently in flight.
    pub fn in_flight(&self) -> usize {
        lock(&self.in_flight).len()
    }

    fn join_or_start_fetch(&self, key: String, country_code: &str, year: i32) -> InFlightFetch {
        let mut in_flight = lock(&self.in_flight);
        if let Some(existing) = in_flight.get(&key) {
            debug!("Joining in-flight fetch for {}", key);
            return existing.clone();
        }

        // The map lock is held until the entry is inserted, so the task
        // cannot remove it first.
        let task = tokio::spawn(fetch_and_store(
            self.source.clone(),
            self.cache.clone(),
            self.metrics.clone(),
            self.in_flight.clone(),
            key.clone(),
            country_code.to_string(),
            year,
        ));
        let fetch = async move {
            task.await.unwrap_or_else(|err| {
                Err(HolidayError::transient(format!("Holiday fetch task failed: {}", err)))
            })
        }
        .boxed()
        .shared();
        in_flight.insert(key, fetch.clone());
        fetch
    }

    fn record(&self, f: impl FnOnce(&AppMetrics)) {
        if let Some(metrics) = self.metrics.as_deref() {
            f(metrics);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn decode(bytes: &[u8]) -> LookupResult {
    serde_json::from_slice(bytes).map_err(|err| HolidayError::deserialization(err.to_string()))
}

async fn fetch_and_store(
    source: Arc<dyn HolidaySource + Send + Sync>,
    cache: Arc<dyn HolidayCache + Send + Sync>,
    metrics: Option<Arc<AppMetrics>>,
    in_flight: InFlightMap,
    key: String,
    country_code: String,
    year: i32,
) -> LookupResult {
    let result = match source.fetch(&country_code, year).await {
        Ok(holidays) => {
            store(cache.as_ref(), &key, &holidays).await;
            Ok(holidays)
        }
        Err(err) => {
            if let Some(metrics) = metrics.as_deref() {
                match err {
                    HolidayError::CircuitOpen => metrics.circuit_open_rejections_total.inc(),
                    _ => metrics.upstream_failures_total.inc(),
                }
            }
            Err(err)
        }
    };

    lock(&in_flight).remove(&key);
    result
}

/// Best-effort write: a failure is logged and the fetched list is still
/// returned to the caller.
async fn store(cache: &(dyn HolidayCache + Send + Sync), key: &str, holidays: &[Holiday]) {
    let bytes = match serde_json::to_vec(holidays) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("Failed to serialize holiday list for {}: {}", key, err);
            return;
        }
    };

    match cache.set(key, bytes).await {
        Ok(()) => debug!("Cached {} holidays under {}", holidays.len(), key),
        Err(err) => warn!("Failed to cache holiday list under {}: {}", key, err),
    }
}
