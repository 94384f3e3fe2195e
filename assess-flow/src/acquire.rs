use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One picked or captured photo: a URI the renderer can display plus the
/// base64 payload submitted for assessment. Held only until superseded by a
/// newer selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageSelection {
    pub display_uri: String,
    pub base64_payload: String,
}

impl ImageSelection {
    pub fn new(display_uri: impl Into<String>, base64_payload: impl Into<String>) -> Self {
        Self {
            display_uri: display_uri.into(),
            base64_payload: base64_payload.into(),
        }
    }
}

/// Outcome of one acquisition attempt. A cancellation is not an error: the
/// flow treats it as a no-op and leaves session state untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquired {
    Selected(ImageSelection),
    Canceled,
}

/// Seam to the device image picker. Permission prompts and base64 encoding
/// happen behind this trait; the flow only sees the resulting selection.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Let the user pick an existing photo from the library.
    async fn pick_from_library(&self) -> Result<Acquired>;

    /// Let the user capture a new photo with the camera.
    async fn capture_photo(&self) -> Result<Acquired>;
}
