//! Outbound adapter for the homework-status API.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;

use statusbot_common::config::Settings;
use statusbot_common::error::WatchError;

use crate::poller::StatusApi;

/// Thin client over the homework-status endpoint. One request per call, no
/// internal retry — retry timing belongs to the poll loop.
pub struct PracticumClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl PracticumClient {
    pub fn new(settings: &Settings) -> Result<Self, WatchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.http_timeout_secs))
            .build()
            .map_err(|err| WatchError::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            endpoint: settings.endpoint.clone(),
            token: settings.practicum_token.clone(),
        })
    }
}

impl StatusApi for PracticumClient {
    /// Fetch the status window starting at `from_date`.
    ///
    /// Transport failures, any status other than 200, and undecodable bodies
    /// all surface as `ApiRequest`.
    async fn fetch(&self, from_date: i64) -> Result<Value, WatchError> {
        let response = self
            .http
            .get(&self.endpoint)
            .header("Authorization", format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|err| WatchError::ApiRequest(format!("endpoint unreachable: {err}")))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(WatchError::ApiRequest(format!(
                "unexpected response status {status}"
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|err| WatchError::ApiRequest(format!("body is not valid JSON: {err}")))
    }
}
