use assess_flow::{Phase, SessionState, ViewState};
use serde::{Deserialize, Serialize};

/// One acquired photo submitted for assessment. The caller plays the image
/// acquisition role: it already holds the display URI and the base64 payload.
#[derive(Debug, Deserialize)]
pub struct SubmitAssessmentRequest {
    /// Existing session to drive; a new session is created when omitted.
    pub session_id: Option<String>,
    pub display_uri: String,
    pub image_base64: String,
}

/// Session snapshot returned after a submission or a session lookup: the raw
/// state record plus the presentation flags derived from it.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub phase: Phase,
    pub state: SessionState,
    pub view: ViewState,
}

impl SessionResponse {
    pub fn from_session(session: &assess_flow::Session) -> Self {
        Self {
            session_id: session.id.clone(),
            phase: session.state.phase(),
            state: session.state.clone(),
            view: ViewState::from(&session.state),
        }
    }
}
