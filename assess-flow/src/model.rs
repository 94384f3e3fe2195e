use serde::{Deserialize, Serialize};

/// Body of one health assessment submission. Built fresh per submission and
/// immutable once sent.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentRequest {
    pub images: Vec<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub similar_images: bool,
    pub health: HealthMode,
}

/// Which assessment the remote service should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthMode {
    /// Health assessment only, no species identification.
    Only,
    All,
    Auto,
}

impl AssessmentRequest {
    /// Request for a single base64-encoded image.
    ///
    /// Latitude and longitude are fixed at zero: device geolocation is never
    /// consulted. Known simplification, not a defect.
    pub fn for_image(base64_payload: impl Into<String>) -> Self {
        Self {
            images: vec![base64_payload.into()],
            latitude: 0.0,
            longitude: 0.0,
            similar_images: true,
            health: HealthMode::Only,
        }
    }
}

// Wire shapes below mirror the remote schema with every field optional. The
// service gives no schema guarantee, so shape defensiveness lives here at the
// boundary and nowhere else.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthAssessmentResponse {
    pub result: Option<AssessmentPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssessmentPayload {
    pub is_plant: Option<BinaryVerdict>,
    pub is_healthy: Option<BinaryVerdict>,
    pub disease: Option<DiseaseBlock>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BinaryVerdict {
    pub binary: Option<bool>,
    pub probability: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiseaseBlock {
    pub suggestions: Option<Vec<WireSuggestion>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireSuggestion {
    pub name: Option<String>,
    pub probability: Option<f64>,
    pub details: Option<WireSuggestionDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireSuggestionDetails {
    pub description: Option<String>,
    pub local_name: Option<String>,
    pub classification: Option<String>,
    pub treatment: Option<WireTreatment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireTreatment {
    pub biological: Option<Vec<String>>,
    pub prevention: Option<Vec<String>>,
}

/// Normalized view of a remote assessment, ready for rendering. Missing wire
/// fields have already been defaulted, so consumers never re-check shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AssessmentResult {
    pub is_plant: bool,
    pub is_healthy: bool,
    pub health_probability: f64,
    pub disease_suggestions: Vec<DiseaseSuggestion>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DiseaseSuggestion {
    pub name: String,
    pub probability: f64,
    pub details: DiseaseDetails,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DiseaseDetails {
    pub description: Option<String>,
    pub local_name: Option<String>,
    pub classification: Option<String>,
    pub treatment: Option<Treatment>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Treatment {
    pub biological: Vec<String>,
    pub prevention: Vec<String>,
}

impl From<HealthAssessmentResponse> for AssessmentResult {
    fn from(response: HealthAssessmentResponse) -> Self {
        let payload = response.result.unwrap_or_default();

        let is_plant = payload
            .is_plant
            .and_then(|v| v.binary)
            .unwrap_or(false);

        let (is_healthy, health_probability) = match payload.is_healthy {
            Some(verdict) => (
                verdict.binary.unwrap_or(false),
                verdict.probability.unwrap_or(0.0),
            ),
            None => (false, 0.0),
        };

        let disease_suggestions = payload
            .disease
            .and_then(|d| d.suggestions)
            .unwrap_or_default()
            .into_iter()
            .map(DiseaseSuggestion::from)
            .collect();

        Self {
            is_plant,
            is_healthy,
            health_probability,
            disease_suggestions,
        }
    }
}

impl From<WireSuggestion> for DiseaseSuggestion {
    fn from(wire: WireSuggestion) -> Self {
        let details = wire.details.unwrap_or_default();
        Self {
            name: wire.name.unwrap_or_default(),
            probability: wire.probability.unwrap_or(0.0),
            details: DiseaseDetails {
                description: details.description,
                local_name: details.local_name,
                classification: details.classification,
                treatment: details.treatment.map(|t| Treatment {
                    biological: t.biological.unwrap_or_default(),
                    prevention: t.prevention.unwrap_or_default(),
                }),
            },
        }
    }
}
