//! OpenFDA drug shortages client
//!
//! HTTP client for the upstream shortage reporting API. Read-only: a single
//! capped query filtered by an update-date range. Transient failures are
//! retried with exponential backoff; errors are mapped into [`FetchError`]
//! without exposing the HTTP client types.

use super::models::ShortageResponse;
use super::ShortageFetcher;
use crate::config::schema::OpenFdaConfig;
use crate::domain::{FetchError, RawUpdateRecord, Result, ShortfallError};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, ClientBuilder, StatusCode};
use std::time::Duration;

/// Client for the OpenFDA drug shortages endpoint
pub struct OpenFdaClient {
    base_url: String,
    client: Client,
    config: OpenFdaConfig,
}

impl OpenFdaClient {
    /// Creates a new client from configuration
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if the HTTP client cannot be built.
    pub fn new(config: OpenFdaConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                ShortfallError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            base_url: config.base_url.clone(),
            client,
            config,
        })
    }

    /// Base URL this client queries
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Retry a request with exponential backoff
    async fn retry_request<F, T, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let max_retries = self.config.retry.max_retries;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    attempt += 1;
                    if attempt >= max_retries {
                        return Err(e);
                    }

                    let delay_ms = self.config.retry.initial_delay_ms
                        * (self
                            .config
                            .retry
                            .backoff_multiplier
                            .powf((attempt - 1) as f64) as u64);
                    let delay_ms = delay_ms.min(self.config.retry.max_delay_ms);

                    tracing::warn!(
                        attempt = attempt,
                        max_retries = max_retries,
                        delay_ms = delay_ms,
                        error = %e,
                        "Retrying request after error"
                    );

                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }

    async fn query_window(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        limit: usize,
    ) -> Result<ShortageResponse> {
        let search = format!(
            "update_date:[{} TO {}]",
            start_date.format("%Y-%m-%d"),
            end_date.format("%Y-%m-%d")
        );

        // TODO: page through results with the skip parameter once fetch
        // windows can exceed the per-request record cap
        let limit_text = limit.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("search", search.as_str()), ("limit", limit_text.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(e.to_string())
                } else {
                    FetchError::ConnectionFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = match status {
                StatusCode::TOO_MANY_REQUESTS => {
                    FetchError::RateLimitExceeded(body)
                }
                // The endpoint answers 404 to a query matching no reports
                StatusCode::NOT_FOUND => {
                    tracing::info!("Upstream query matched no reports");
                    return Ok(ShortageResponse { results: vec![] });
                }
                s if s.is_server_error() => FetchError::ServerError {
                    status: s.as_u16(),
                    message: body,
                },
                s => FetchError::ClientError {
                    status: s.as_u16(),
                    message: body,
                },
            };
            return Err(error.into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))?;

        serde_json::from_str(&body)
            .map_err(|e| ShortfallError::Parse(format!("Malformed shortages payload: {e}")))
    }
}

#[async_trait]
impl ShortageFetcher for OpenFdaClient {
    async fn fetch(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        limit: usize,
    ) -> Result<Vec<RawUpdateRecord>> {
        tracing::info!(
            start_date = %start_date,
            end_date = %end_date,
            limit = limit,
            "Fetching drug shortage reports"
        );

        let response = self
            .retry_request(|| self.query_window(start_date, end_date, limit))
            .await?;

        let mut records = Vec::with_capacity(response.results.len());
        for entry in response.results {
            records.push(entry.into_record()?);
        }

        tracing::info!(count = records.len(), "Fetched shortage reports");
        Ok(records)
    }
}
