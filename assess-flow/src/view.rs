use serde::{Deserialize, Serialize};

use crate::session::SessionState;

/// Vertical placement of the screen's content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentAnchor {
    /// Pinned to the top, making room for the scrollable result list.
    Top,
    /// Vertically centered, pre-submission.
    Center,
}

/// Presentation flags derived from [`SessionState`].
///
/// A pure two-branch mapping on the presence of a result, re-derived on every
/// state change. It has no state of its own and no hidden transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub content_anchor: ContentAnchor,
    pub show_instructions: bool,
    pub show_spinner: bool,
    pub error_text: Option<String>,
    /// URI of the currently selected image, shown even when the assessment
    /// failed.
    pub selected_image: Option<String>,
}

impl From<&SessionState> for ViewState {
    fn from(state: &SessionState) -> Self {
        let has_result = state.result.is_some();
        Self {
            content_anchor: if has_result {
                ContentAnchor::Top
            } else {
                ContentAnchor::Center
            },
            show_instructions: !has_result,
            show_spinner: state.is_loading,
            error_text: state.error.clone(),
            selected_image: state.selection.as_ref().map(|s| s.display_uri.clone()),
        }
    }
}
