use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::models::prom::{PromEnvelope, RangeResult};
use crate::resolve::RangeQueryExecutor;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request to metrics backend failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("metrics backend returned non-success status: {0}")]
    NotSuccess(String),
}

/// Client for the Prometheus HTTP API (`/api/v1/query_range`).
pub struct PromClient {
    base_url: String,
    http: reqwest::Client,
}

impl PromClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl RangeQueryExecutor for PromClient {
    async fn query_range(
        &self,
        query: &str,
        start: f64,
        end: f64,
        step: u64,
    ) -> Result<RangeResult, BackendError> {
        let url = format!("{}/api/v1/query_range", self.base_url);
        let start_param = start.to_string();
        let end_param = end.to_string();
        let step_param = step.to_string();

        let response = self
            .http
            .get(&url)
            .query(&[
                ("query", query),
                ("start", start_param.as_str()),
                ("end", end_param.as_str()),
                ("step", step_param.as_str()),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let PromEnvelope {
            status,
            data,
            error,
        } = response.json().await?;

        if status != "success" {
            return Err(BackendError::NotSuccess(error.unwrap_or(status)));
        }

        // A success envelope without a data object carries nothing to
        // aggregate; reduce() treats the unknown kind as absent.
        Ok(data.unwrap_or_default())
    }
}
