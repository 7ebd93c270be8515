//! Holiday list cache.
//!
//! [`HolidayCache`] is the byte-oriented key/value store the lookup
//! service reads and populates. Values are opaque serialized holiday
//! lists; the core never sets per-entry expiry. [`InMemoryHolidayCache`]
//! is the default store, with an optional TTL that applies uniformly to
//! every entry.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::holidays::error::HolidayError;

/// `(country_code, year)` cache key, rendered as `HolidayList-{cc}-{year}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub country_code: String,
    pub year: i32,
}

impl CacheKey {
    pub fn new(country_code: impl Into<String>, year: i32) -> Self {
        Self {
            country_code: country_code.into(),
            year,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HolidayList-{}-{}", self.country_code, self.year)
    }
}

#[async_trait]
pub trait HolidayCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, HolidayError>;

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), HolidayError>;
}

struct CacheEntry {
    value: Vec<u8>,
    cached_at: Instant,
}

/// Process-local cache store.
pub struct InMemoryHolidayCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Option<Duration>,
}

impl InMemoryHolidayCache {
    /// Entries never expire.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: None,
        }
    }

    /// Entries older than `ttl` read as missing.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: Some(ttl),
        }
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        match self.ttl {
            Some(ttl) => entry.cached_at.elapsed() <= ttl,
            None => true,
        }
    }
}

impl Default for InMemoryHolidayCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HolidayCache for InMemoryHolidayCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, HolidayError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| self.is_fresh(entry))
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), HolidayError> {
        self.entries.write().await.insert(
            key.to_string(),
            CacheEntry {
                value,
                cached_at: Instant::now(),
            },
        );
        Ok(())
    }
}
