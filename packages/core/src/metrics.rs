//! Prometheus metrics registry for the holiday alert service.
//!
//! [`AppMetrics`] owns all registered metrics and the [`Registry`] they
//! belong to. Construct it once at startup, wrap in `Arc`, and hand it to
//! the lookup service and the scheduler.
//!
//! Exposed at `GET /metrics` in Prometheus text exposition format
//! (`text/plain; version=0.0.4`).

use prometheus::{Counter, Opts, Registry};

/// All application-level Prometheus metrics.
pub struct AppMetrics {
    /// Holiday lookups requested (cache hits + misses).
    pub lookups_total: Counter,
    pub cache_hits_total: Counter,
    pub cache_misses_total: Counter,
    /// Fetches that reached the holiday API and failed after retries.
    pub upstream_failures_total: Counter,
    /// Fetches rejected by the open circuit without a network call.
    pub circuit_open_rejections_total: Counter,
    pub scheduler_ticks_total: Counter,
    /// Countries whose lookup failed during a scheduler tick.
    pub country_failures_total: Counter,
    pub alerts_raised_total: Counter,
    /// The registry that owns all of the above metrics.
    pub registry: Registry,
}

fn counter(name: &str, help: &str) -> Result<Counter, prometheus::Error> {
    Counter::with_opts(Opts::new(format!("holiday_alerts_{}", name), help))
}

impl AppMetrics {
    /// Create and register all metrics. Returns an error if any metric
    /// name is invalid or duplicated.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let lookups_total = counter("lookups_total", "Holiday lookups requested")?;
        let cache_hits_total = counter("cache_hits_total", "Holiday lookups served from cache")?;
        let cache_misses_total = counter(
            "cache_misses_total",
            "Holiday lookups that missed the cache",
        )?;
        let upstream_failures_total = counter(
            "upstream_failures_total",
            "Holiday API fetches that failed",
        )?;
        let circuit_open_rejections_total = counter(
            "circuit_open_rejections_total",
            "Holiday API fetches rejected by the open circuit",
        )?;
        let scheduler_ticks_total = counter("scheduler_ticks_total", "Alert scheduler ticks run")?;
        let country_failures_total = counter(
            "country_failures_total",
            "Per-country lookup failures during scheduler ticks",
        )?;
        let alerts_raised_total = counter("alerts_raised_total", "Holiday alert events raised")?;

        registry.register(Box::new(lookups_total.clone()))?;
        registry.register(Box::new(cache_hits_total.clone()))?;
        registry.register(Box::new(cache_misses_total.clone()))?;
        registry.register(Box::new(upstream_failures_total.clone()))?;
        registry.register(Box::new(circuit_open_rejections_total.clone()))?;
        registry.register(Box::new(scheduler_ticks_total.clone()))?;
        registry.register(Box::new(country_failures_total.clone()))?;
        registry.register(Box::new(alerts_raised_total.clone()))?;

        Ok(Self {
            lookups_total,
            cache_hits_total,
            cache_misses_total,
            upstream_failures_total,
            circuit_open_rejections_total,
            scheduler_ticks_total,
            country_failures_total,
            alerts_raised_total,
            registry,
        })
    }

    /// Render all metrics as Prometheus text format (for the `/metrics` endpoint).
    pub fn render(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buf = Vec::new();
        encoder.encode(&metric_families, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap_or_default())
    }
}
