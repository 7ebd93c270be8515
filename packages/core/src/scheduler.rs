//! Holiday alert scheduler.
//!
//! Drives the alert loop: each tick walks the configured countries in
//! order, looks up each country's holidays for the current year, keeps
//! those in the 7-day window, and emits one [`AlertEvent`] per holiday
//! onto the notification channel.
//!
//! The first tick fires immediately; later ticks fire one interval after
//! the previous tick started. Shutdown is only observed between ticks, so
//! a tick in progress always runs to completion.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Local, NaiveDate};
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::holidays::{select_upcoming, AlertEvent, HolidayLookupService};
use crate::metrics::AppMetrics;

/// Default time between ticks.
pub const DEFAULT_ALERT_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Waiting for the next tick.
    Idle,
    /// Processing a tick.
    Running,
    /// Shut down; no further ticks.
    Stopped,
}

/// Outcome of a single tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub countries_processed: usize,
    pub countries_failed: usize,
    pub alerts_raised: usize,
}

/// Split a delimited country list, trimming whitespace and dropping empty
/// segments. Codes are passed through as-is otherwise.
pub fn parse_country_list(raw: &str, delimiter: &str) -> Vec<String> {
    raw.split(delimiter)
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct AlertScheduler {
    lookup: Arc<HolidayLookupService>,
    countries: Vec<String>,
    interval: Duration,
    events: mpsc::Sender<AlertEvent>,
    state: watch::Sender<SchedulerState>,
    metrics: Option<Arc<AppMetrics>>,
}

impl AlertScheduler {
    pub fn new(
        lookup: Arc<HolidayLookupService>,
        countries: Vec<String>,
        interval: Duration,
        events: mpsc::Sender<AlertEvent>,
    ) -> Self {
        let (state, _) = watch::channel(SchedulerState::Idle);
        Self {
            lookup,
            countries,
            interval,
            events,
            state,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<AppMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    /// Run ticks until `shutdown` is cancelled.
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut next_fire = Instant::now();

        tracing::info!(
            "Alert scheduler started ({} countries, interval: {}s)",
            self.countries.len(),
            self.interval.as_secs()
        );

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    tracing::info!("Shutdown signal received. Stopping alert scheduler.");
                    break;
                }

                _ = time::sleep_until(next_fire) => {
                    let started = Instant::now();
                    let summary = self.run_tick(Local::now().date_naive()).await;
                    tracing::info!(
                        "Alert tick finished: {} countries, {} failed, {} alerts",
                        summary.countries_processed,
                        summary.countries_failed,
                        summary.alerts_raised,
                    );
                    next_fire = started + self.interval;
                }
            }
        }

        self.state.send_replace(SchedulerState::Stopped);
        tracing::info!("Alert scheduler stopped cleanly");
    }

    /// Execute a single tick for `today`. Extracted for testability.
    ///
    /// A failed lookup for one country is logged and the tick moves on to
    /// the next country; nothing is retried at this level.
    pub async fn run_tick(&self, today: NaiveDate) -> TickSummary {
        self.state.send_replace(SchedulerState::Running);
        self.record(|m| m.scheduler_ticks_total.inc());

        let mut summary = TickSummary::default();

        for country_code in &self.countries {
            summary.countries_processed += 1;

            let holidays = match self.lookup.get_holidays(country_code, today.year()).await {
                Ok(holidays) => holidays,
                Err(err) => {
                    tracing::error!(
                        "Holiday lookup for {} failed, skipping country this tick: {}",
                        country_code,
                        err
                    );
                    summary.countries_failed += 1;
                    self.record(|m| m.country_failures_total.inc());
                    continue;
                }
            };

            for holiday in select_upcoming(&holidays, today) {
                let event = AlertEvent {
                    country_code: country_code.clone(),
                    holiday,
                };
                tracing::debug!(
                    "Raising alert for {} on {} ({})",
                    event.holiday.name,
                    event.holiday.date,
                    country_code
                );
                if self.events.send(event).await.is_err() {
                    tracing::warn!("Notification channel closed; alert for {} dropped", country_code);
                    continue;
                }
                summary.alerts_raised += 1;
                self.record(|m| m.alerts_raised_total.inc());
            }
        }

        self.state.send_replace(SchedulerState::Idle);
        summary
    }

    fn record(&self, f: impl FnOnce(&AppMetrics)) {
        if let Some(metrics) = self.metrics.as_deref() {
            f(metrics);
        }
    }
}
