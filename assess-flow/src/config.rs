use crate::error::{AssessError, Result};

/// Default health assessment endpoint, including the detail fields the result
/// renderer relies on.
pub const DEFAULT_ENDPOINT: &str = "https://plant.id/api/v3/health_assessment?details=local_name,description,url,treatment,classification,common_names,cause";

/// Connection details for the remote assessment service, injected into the
/// client at construction so the credential never lives in source.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub api_key: String,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    /// Read configuration from `PLANT_ID_API_KEY` (required) and
    /// `PLANT_ID_ENDPOINT` (optional, defaults to [`DEFAULT_ENDPOINT`]).
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("PLANT_ID_API_KEY")
            .map_err(|_| AssessError::Configuration("PLANT_ID_API_KEY not set".to_string()))?;
        let endpoint = std::env::var("PLANT_ID_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        Ok(Self { endpoint, api_key })
    }
}
