use super::rate_limit::RateLimiter;
use crate::{error::DataError, instrument::VenueId};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Rate limited JSON-over-HTTP client shared by the venue adapters.
#[derive(Debug)]
pub struct RestClient {
    venue: VenueId,
    base_url: String,
    http: reqwest::Client,
    limiter: RateLimiter,
}

impl RestClient {
    pub fn new(
        venue: VenueId,
        base_url: impl Into<String>,
        request_timeout: Duration,
        min_request_gap: Duration,
    ) -> Result<Self, DataError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|error| DataError::unavailable(&venue, format!("http client: {error}")))?;

        Ok(Self {
            venue,
            base_url: base_url.into(),
            http,
            limiter: RateLimiter::new(min_request_gap),
        })
    }

    pub fn venue(&self) -> &VenueId {
        &self.venue
    }

    /// Issue a GET request and deserialise the JSON response body.
    ///
    /// Transport failures, non-success statuses and undecodable bodies all map to
    /// [`DataError::Unavailable`].
    pub async fn get<Response>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Response, DataError>
    where
        Response: DeserializeOwned,
    {
        self.limiter.acquire().await;

        let url = format!("{}{}", self.base_url, path);
        debug!(venue = %self.venue, %url, ?query, "sending request");

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|error| self.unavailable(path, format!("request failed: {error}")))?;

        if let Err(status_error) = response.error_for_status_ref() {
            return Err(self.unavailable(path, format!("request rejected: {status_error}")));
        }

        response
            .json::<Response>()
            .await
            .map_err(|error| self.unavailable(path, format!("response parse failed: {error}")))
    }

    fn unavailable(&self, path: &str, reason: String) -> DataError {
        DataError::unavailable(&self.venue, format!("{path} {reason}"))
    }
}
