use std::env;
use std::time::Duration;

use crate::cli::Cli;
use crate::scheduler::parse_country_list;

pub const DEFAULT_COUNTRY_LIST_DELIMITER: &str = ",";
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_ALERT_INTERVAL_SECONDS: u64 = 86_400;
pub const DEFAULT_API_PORT: u16 = 8080;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://employees.db?mode=rwc";

#[derive(Debug, Clone)]
pub struct Config {
    pub holiday_api_url: String,
    pub holiday_api_client: String,
    pub countries: Vec<String>,
    pub request_timeout_seconds: u64,
    pub alert_interval_seconds: u64,
    pub api_port: u16,
    pub database_url: String,
    /// `None` keeps cache entries forever.
    pub cache_ttl_seconds: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Environment values with CLI flags taking precedence.
    pub fn load(cli: &Cli) -> Result<Self, String> {
        Self::from_lookup(|key| cli.override_for(key).or_else(|| env::var(key).ok()))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let holiday_api_url = lookup("HOLIDAY_API_URL").ok_or("HOLIDAY_API_URL is required")?;

        let holiday_api_client =
            lookup("HOLIDAY_API_CLIENT").ok_or("HOLIDAY_API_CLIENT is required")?;

        let raw_countries = lookup("COUNTRY_LIST").ok_or("COUNTRY_LIST is required")?;
        let delimiter = lookup("COUNTRY_LIST_DELIMITER")
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| DEFAULT_COUNTRY_LIST_DELIMITER.to_string());
        let countries = parse_country_list(&raw_countries, &delimiter);

        let request_timeout_seconds = parse_number(
            &lookup,
            "REQUEST_TIMEOUT_SECONDS",
            DEFAULT_REQUEST_TIMEOUT_SECONDS,
        )?;
        if request_timeout_seconds == 0 {
            return Err("REQUEST_TIMEOUT_SECONDS must be greater than zero".to_string());
        }

        let alert_interval_seconds = parse_number(
            &lookup,
            "ALERT_INTERVAL_SECONDS",
            DEFAULT_ALERT_INTERVAL_SECONDS,
        )?;
        if alert_interval_seconds == 0 {
            return Err("ALERT_INTERVAL_SECONDS must be greater than zero".to_string());
        }

        let api_port = parse_number(&lookup, "API_PORT", DEFAULT_API_PORT)?;

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let cache_ttl_seconds = match lookup("CACHE_TTL_SECONDS") {
            Some(raw) => Some(
                raw.parse::<u64>()
                    .map_err(|_| "CACHE_TTL_SECONDS must be a valid number")?,
            ),
            None => None,
        };

        Ok(Self {
            holiday_api_url,
            holiday_api_client,
            countries,
            request_timeout_seconds,
            alert_interval_seconds,
            api_port,
            database_url,
            cache_ttl_seconds,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn alert_interval(&self) -> Duration {
        Duration::from_secs(self.alert_interval_seconds)
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_seconds.map(Duration::from_secs)
    }
}

fn parse_number<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, String> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| format!("{} must be a valid number", key)),
        None => Ok(default),
    }
}
