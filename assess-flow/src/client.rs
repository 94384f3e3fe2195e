use tracing::{error, info};

use crate::config::ClientConfig;
use crate::error::{AssessError, Result};
use crate::model::{AssessmentRequest, AssessmentResult, HealthAssessmentResponse};

/// Client for the remote plant health assessment service.
///
/// One `assess` call makes exactly one outbound request. There is no retry,
/// no cache, and no local validation of the image payload; the remote
/// service is the sole validator. The transport's default timeout applies.
pub struct HealthAssessmentClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl HealthAssessmentClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Submit one base64-encoded image and normalize the outcome.
    ///
    /// A non-success status collapses to a fixed generic message without
    /// reading the body; transport and decode failures surface the caught
    /// failure's description. All three reach the user through the same
    /// single error channel.
    pub async fn assess(&self, base64_payload: &str) -> Result<AssessmentResult> {
        let request = AssessmentRequest::for_image(base64_payload);

        info!(endpoint = %self.config.endpoint, "submitting health assessment");

        let response = self
            .http
            .post(&self.config.endpoint)
            .header("Api-Key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("health assessment request failed: {}", e);
                AssessError::Transport(e.to_string())
            })?;

        if !response.status().is_success() {
            error!(status = %response.status(), "health assessment rejected");
            return Err(AssessError::Endpoint);
        }

        let body: HealthAssessmentResponse = response.json().await.map_err(|e| {
            error!("failed to decode health assessment response: {}", e);
            AssessError::Parse(e.to_string())
        })?;

        let result = AssessmentResult::from(body);
        info!(
            is_plant = result.is_plant,
            is_healthy = result.is_healthy,
            suggestions = result.disease_suggestions.len(),
            "health assessment completed"
        );

        Ok(result)
    }
}
