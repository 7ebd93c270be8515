use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use holiday_alerts::alerts::{run_notification_worker, LogNotificationSink, NotificationSink};
use holiday_alerts::api::{self, AppState};
use holiday_alerts::cache::{HolidayCache, InMemoryHolidayCache};
use holiday_alerts::cli::Cli;
use holiday_alerts::config::Config;
use holiday_alerts::db;
use holiday_alerts::error::AppError;
use holiday_alerts::holidays::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerSource, EmployeeHolidayLookup,
    HolidayLookupService, HolidaySource, RetryPolicy, RetryingSource,
};
use holiday_alerts::logging::init_logging;
use holiday_alerts::metrics::AppMetrics;
use holiday_alerts::repository::{EmployeeRepository, SqliteEmployeeRepository};
use holiday_alerts::scheduler::AlertScheduler;
use holiday_alerts::services::holiday_api::HolidayApiClient;

/// Bounded so a stalled sink applies back-pressure to the scheduler.
const ALERT_CHANNEL_CAPACITY: usize = 256;

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();

    if let Err(err) = run(Cli::parse()).await {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = Config::load(&cli).map_err(AppError::Config)?;
    tracing::info!("Service started with config: {:?}", config);

    if config.countries.is_empty() {
        tracing::warn!("COUNTRY_LIST is empty; scheduled ticks will raise no alerts");
    }

    let metrics = Arc::new(
        AppMetrics::new().map_err(|err| AppError::Unknown(format!("metrics: {}", err)))?,
    );

    let pool = db::create_pool(&config.database_url)
        .await
        .map_err(|err| AppError::Config(format!("database {}: {}", config.database_url, err)))?;
    let employees: Arc<dyn EmployeeRepository + Send + Sync> =
        Arc::new(SqliteEmployeeRepository::new(pool));

    let cache: Arc<dyn HolidayCache + Send + Sync> = match config.cache_ttl() {
        Some(ttl) => Arc::new(InMemoryHolidayCache::with_ttl(ttl)),
        None => Arc::new(InMemoryHolidayCache::new()),
    };

    let client = HolidayApiClient::new(
        config.holiday_api_url.clone(),
        config.holiday_api_client.clone(),
        config.request_timeout(),
    )
    .map_err(|err| AppError::Config(err.to_string()))?;
    tracing::info!(
        "Holiday API client '{}' targeting {}",
        client.client_name(),
        client.base_url()
    );
    let breaker = Arc::new(CircuitBreaker::new(CircuitBreakerConfig::default()));
    let source: Arc<dyn HolidaySource + Send + Sync> = Arc::new(CircuitBreakerSource::new(
        RetryingSource::new(client, RetryPolicy::default()),
        breaker,
    ));

    let lookup = Arc::new(HolidayLookupService::new(source, cache).with_metrics(metrics.clone()));
    let employee_lookup = Arc::new(EmployeeHolidayLookup::new(
        employees.clone(),
        lookup.clone(),
    ));

    // ---- Notifications ----
    let (events_tx, events_rx) = mpsc::channel(ALERT_CHANNEL_CAPACITY);
    let sink: Arc<dyn NotificationSink + Send + Sync> = Arc::new(LogNotificationSink);
    let worker = tokio::spawn(run_notification_worker(events_rx, sink));

    // ---- Scheduler ----
    let shutdown = CancellationToken::new();
    let scheduler = AlertScheduler::new(
        lookup.clone(),
        config.countries.clone(),
        config.alert_interval(),
        events_tx,
    )
    .with_metrics(metrics.clone());
    let scheduler_task = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { scheduler.run(shutdown).await }
    });

    // ---- HTTP ----
    let app = api::create_router(AppState {
        lookup,
        employee_lookup,
        employees,
        metrics,
    });
    let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| AppError::Config(format!("bind {}: {}", addr, err)))?;
    tracing::info!("API listening on {}", addr);

    let serve_result = axum::serve(listener, app)
        .with_graceful_shutdown({
            let shutdown = shutdown.clone();
            async move {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for shutdown signal: {}", err);
                }
                tracing::info!("Shutdown signal received");
                shutdown.cancel();
            }
        })
        .await;

    // The server may exit on its own error; make sure the scheduler stops too.
    shutdown.cancel();

    if let Err(err) = scheduler_task.await {
        tracing::error!("Scheduler task failed: {}", err);
    }
    // The scheduler owned the last sender, so the worker drains and exits.
    match worker.await {
        Ok(delivered) => tracing::info!("Notification worker stopped after {} alerts", delivered),
        Err(err) => tracing::error!("Notification worker failed: {}", err),
    }

    serve_result.map_err(|err| AppError::Unknown(format!("server: {}", err)))
}
