use std::time::Duration;

use anyhow::Context;
use chrono::Utc;

use crate::config::Config;
use crate::remote::{AnalysisRequest, FailureReason, RemoteAnalysis, StructuredAnalysis};

/// Client for the automation webhook that performs full journal analysis.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl WebhookClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client for the analysis webhook")?;

        Ok(Self {
            http,
            url: url.into(),
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Option<Self>> {
        config
            .webhook_url
            .as_ref()
            .map(|url| Self::new(url.clone(), config.remote_timeout))
            .transpose()
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl WebhookClient {
    /// Posts a payload flagged `"test": true` so the workflow can tell it
    /// apart from a journal entry.
    pub async fn ping(&self) -> Result<(), FailureReason> {
        let response = self
            .http
            .post(&self.url)
            .json(&serde_json::json!({
                "test": true,
                "text": "connectivity check",
                "timestamp": Utc::now(),
            }))
            .send()
            .await
            .map_err(|error| FailureReason::from_reqwest(error, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FailureReason::Status(status.as_u16()));
        }
        Ok(())
    }
}

impl StructuredAnalysis for WebhookClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<RemoteAnalysis, FailureReason> {
        let response = self
            .http
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|error| FailureReason::from_reqwest(error, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FailureReason::Status(status.as_u16()));
        }

        response
            .json::<RemoteAnalysis>()
            .await
            .map_err(|error| FailureReason::from_reqwest(error, self.timeout))
    }
}
