//! Holiday Source Interface
//!
//! The single outbound-call abstraction. The HTTP client implements it,
//! and the retry and circuit-breaker decorators wrap any implementation
//! so each policy can be tested on its own.

use std::sync::Arc;

use async_trait::async_trait;

use crate::holidays::{error::HolidayError, types::Holiday};

/// Result type for source operations
pub type SourceResult<T> = Result<T, HolidayError>;

/// Anything that can produce the public holidays of a country for a year.
#[async_trait]
pub trait HolidaySource {
    /// Fetch the full holiday list for `country_code` in `year`.
    async fn fetch(&self, country_code: &str, year: i32) -> SourceResult<Vec<Holiday>>;

    /// Name of this source for logging/debugging
    fn source_name(&self) -> &str;
}

#[async_trait]
impl<T> HolidaySource for Arc<T>
where
    T: HolidaySource + Send + Sync + ?Sized,
{
    async fn fetch(&self, country_code: &str, year: i32) -> SourceResult<Vec<Holiday>> {
        (**self).fetch(country_code, year).await
    }

    fn source_name(&self) -> &str {
        (**self).source_name()
    }
}
