use crate::error::{MonitorError, Result};
use crate::status::Session;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::info;

/// Pushes final usage counters for ended sessions to the collector API.
pub struct UsageReporter {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl UsageReporter {
    pub fn new(endpoint: String, api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    /// Send one usage report for a disconnected session.
    ///
    /// Exactly one POST per call, no retry; the caller decides what to do
    /// about failures. Anything other than a 200 counts as a failure.
    pub async fn report(&self, session: &Session) -> Result<()> {
        info!(
            "Updating {} with bandwidth {} + {}",
            session.username, session.bytes_received, session.bytes_sent
        );

        let bw_out = session.bytes_sent.to_string();
        let bw_in = session.bytes_received.to_string();
        let params = [
            ("key", self.api_key.as_str()),
            ("username", session.username.as_str()),
            ("bw_out", bw_out.as_str()),
            ("bw_in", bw_in.as_str()),
        ];

        let response = self.client.post(&self.endpoint).form(&params).send().await?;

        if response.status() != StatusCode::OK {
            return Err(MonitorError::CollectorStatus(response.status()));
        }

        Ok(())
    }
}
