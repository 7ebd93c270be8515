use clap::Parser;

/// Holiday alert service CLI arguments
#[derive(Debug, Parser)]
#[command(
    name = "holiday-alerts",
    version,
    about = "Public holiday lookups and upcoming-holiday alerts"
)]
pub struct Cli {
    /// Holiday API base URL
    #[arg(long)]
    pub holiday_api_url: Option<String>,

    /// Delimited list of country codes to alert on
    #[arg(long)]
    pub country_list: Option<String>,

    /// Alert interval in seconds
    #[arg(long)]
    pub alert_interval: Option<u64>,

    /// HTTP API port
    #[arg(long)]
    pub port: Option<u16>,
}

impl Cli {
    /// The flag value standing in for the environment variable `key`.
    pub fn override_for(&self, key: &str) -> Option<String> {
        match key {
            "HOLIDAY_API_URL" => self.holiday_api_url.clone(),
            "COUNTRY_LIST" => self.country_list.clone(),
            "ALERT_INTERVAL_SECONDS" => self.alert_interval.map(|v| v.to_string()),
            "API_PORT" => self.port.map(|v| v.to_string()),
            _ => None,
        }
    }
}
