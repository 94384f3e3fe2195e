use thiserror::Error;

/// Errors produced by the assessment flow.
///
/// Every client-side failure collapses to a single user-visible string via
/// `Display`; callers render the message in place of results and nothing else.
#[derive(Error, Debug)]
pub enum AssessError {
    /// The request never reached the remote service.
    #[error("Error identifying crop: {0}")]
    Transport(String),

    /// The remote service answered with a non-success status. The response
    /// body is not inspected.
    #[error("Failed to fetch data. Please check your API key and URL.")]
    Endpoint,

    /// The response body was not valid JSON.
    #[error("Error identifying crop: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The image source failed before producing a selection. Distinct from a
    /// cancellation, which is not an error.
    #[error("Image acquisition failed: {0}")]
    Acquisition(String),
}

pub type Result<T> = std::result::Result<T, AssessError>;
