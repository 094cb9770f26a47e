use anyhow::{Context, Result};
use tracing::info;

use super::models::{InterviewReport, LatestReportResponse, StartSessionResponse, TrendPoint, TrendResponse};

/// REST client for the interview-coach backend.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Request a fresh interview session id.
    pub async fn start_session(&self) -> Result<String> {
        let url = format!("{}/api/interview/start", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .context("Session initiation request failed")?
            .error_for_status()
            .context("Session initiation rejected by server")?
            .json::<StartSessionResponse>()
            .await
            .context("Malformed session initiation response")?;

        info!("Started interview session {}", response.session_id);

        Ok(response.session_id)
    }

    /// Fetch the scored report for the most recent completed session, if any.
    pub async fn latest_report(&self) -> Result<Option<InterviewReport>> {
        let url = format!("{}/api/interview/latest", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .context("Report request failed")?
            .error_for_status()
            .context("Report request rejected by server")?
            .json::<LatestReportResponse>()
            .await
            .context("Malformed report response")?;

        Ok(response.report)
    }

    /// Fetch the per-session score history.
    pub async fn score_trend(&self) -> Result<Vec<TrendPoint>> {
        let url = format!("{}/api/interview/trend", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .context("Trend request failed")?
            .error_for_status()
            .context("Trend request rejected by server")?
            .json::<TrendResponse>()
            .await
            .context("Malformed trend response")?;

        Ok(response.data)
    }
}
