use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::models::{AuditReport, PredictionsUnavailable, Wallet};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result of asking for a league's predictions
#[derive(Debug, Clone)]
pub enum PredictionsOutcome {
    Ready(Value),
    Unavailable(PredictionsUnavailable),
}

/// HTTP client for the dashboard API, as used by the pages
#[derive(Debug, Clone)]
pub struct DashboardClient {
    http: reqwest::Client,
    base_url: String,
}

impl DashboardClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str) -> Result<Value, ClientError> {
        let response = self.http.get(self.url(path)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }

    /// Fetch the prediction payload for `league`
    pub async fn predictions(
        &self,
        league: &str,
        mode: Option<&str>,
        date: Option<&str>,
    ) -> Result<PredictionsOutcome, ClientError> {
        let mut params = vec![("league", league)];
        if let Some(mode) = mode {
            params.push(("mode", mode));
        }
        if let Some(date) = date {
            params.push(("date", date));
        }

        let response = self
            .http
            .get(self.url("/api/predictions"))
            .query(&params)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(PredictionsOutcome::Unavailable(response.json().await?)),
            status if status.is_success() => Ok(PredictionsOutcome::Ready(response.json().await?)),
            status => Err(ClientError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    pub async fn audit(&self) -> Result<AuditReport, ClientError> {
        let value = self.get_json("/api/audit").await?;
        Ok(AuditReport::from_value(value)?)
    }

    /// Payment wallets; an unreadable `wallets` entry yields an empty list
    pub async fn wallets(&self) -> Result<Vec<Wallet>, ClientError> {
        let mut settings = self.get_json("/api/admin/settings").await?;
        let wallets = settings
            .get_mut("wallets")
            .map(Value::take)
            .unwrap_or(Value::Array(Vec::new()));
        Ok(serde_json::from_value(wallets).unwrap_or_default())
    }
}
