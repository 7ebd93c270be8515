//! Holiday lookup core
//!
//! Cache-aside lookups over a retrying, circuit-broken holiday source,
//! plus the 7-day alert window.

pub mod circuit_breaker;
pub mod employee;
pub mod error;
pub mod lookup;
#[cfg(test)]
pub mod mock;
pub mod retry;
pub mod source;
pub mod types;
pub mod window;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerSource, CircuitState};
pub use employee::EmployeeHolidayLookup;
pub use error::HolidayError;
pub use lookup::HolidayLookupService;
pub use retry::{RetryPolicy, RetryingSource};
pub use source::HolidaySource;
pub use types::{AlertEvent, Holiday};
pub use window::select_upcoming;
