use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::holidays::{
    error::HolidayError,
    source::{HolidaySource, SourceResult},
    types::Holiday,
};

/// Single-attempt client for the public holiday API.
///
/// Every request carries the configured timeout, so a stalled upstream
/// surfaces as a transient failure instead of blocking the retry policy.
#[derive(Clone)]
pub struct HolidayApiClient {
    base_url: String,
    client_name: String,
    http: Client,
}

impl HolidayApiClient {
    pub fn new(
        base_url: impl Into<String>,
        client_name: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, HolidayError> {
        let client_name = client_name.into();
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(client_name.clone())
            .build()
            .map_err(|err| HolidayError::permanent(format!("Failed to build HTTP client: {}", err)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_name,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    fn holidays_url(&self, country_code: &str, year: i32) -> String {
        format!(
            "{}/api/v3/publicholidays/{}/{}",
            self.base_url, year, country_code
        )
    }
}

/// 5xx and 429 are worth retrying; any other non-success status is not.
fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

#[async_trait]
impl HolidaySource for HolidayApiClient {
    async fn fetch(&self, country_code: &str, year: i32) -> SourceResult<Vec<Holiday>> {
        let url = self.holidays_url(country_code, year);

        let response = self.http.get(&url).send().await.map_err(|err| {
            HolidayError::transient(format!("Request to {} failed: {}", url, err))
        })?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            let message = format!("Holiday API returned HTTP {} for {}", status, url);
            return Err(if is_transient_status(status) {
                HolidayError::transient(message)
            } else {
                HolidayError::permanent(message)
            });
        }

        let body = response.bytes().await.map_err(|err| {
            HolidayError::transient(format!("Failed to read response from {}: {}", url, err))
        })?;

        serde_json::from_slice(&body).map_err(|err| {
            HolidayError::permanent(format!("Malformed holiday list from {}: {}", url, err))
        })
    }

    fn source_name(&self) -> &str {
        "holiday-api"
    }
}
