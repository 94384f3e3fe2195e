use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::acquire::ImageSelection;
use crate::model::AssessmentResult;

/// Lifecycle phase of a submission. Transitions are strictly sequential:
/// Idle -> Pending -> {Succeeded | Failed}. Terminal phases are exited only
/// by a new acquisition, which restarts the cycle at Pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// Events the reducer understands.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A new image was acquired; a submission starts.
    Acquired(ImageSelection),
    /// The assessment for generation `generation` resolved.
    Resolved {
        generation: u64,
        outcome: Result<AssessmentResult, String>,
    },
}

/// The single mutable record driving rendering.
///
/// Invariant: `result` and `error` are never both set. A new acquisition
/// clears both before the request goes out, and a resolution sets exactly
/// one of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionState {
    pub selection: Option<ImageSelection>,
    pub is_loading: bool,
    pub result: Option<AssessmentResult>,
    pub error: Option<String>,
    /// Monotonic submission counter. A resolution carrying a stale
    /// generation lost the race to a newer acquisition and is discarded,
    /// so the newest submission always wins.
    pub generation: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.is_loading {
            Phase::Pending
        } else if self.result.is_some() {
            Phase::Succeeded
        } else if self.error.is_some() {
            Phase::Failed
        } else {
            Phase::Idle
        }
    }

    /// Apply one event and return the generation current afterwards.
    pub fn apply(&mut self, event: SessionEvent) -> u64 {
        match event {
            SessionEvent::Acquired(selection) => {
                self.selection = Some(selection);
                self.is_loading = true;
                self.result = None;
                self.error = None;
                self.generation += 1;
            }
            SessionEvent::Resolved {
                generation,
                outcome,
            } => {
                if generation != self.generation {
                    debug!(
                        stale = generation,
                        current = self.generation,
                        "discarding stale assessment resolution"
                    );
                    return self.generation;
                }
                self.is_loading = false;
                match outcome {
                    Ok(result) => {
                        self.result = Some(result);
                        self.error = None;
                    }
                    Err(message) => {
                        self.error = Some(message);
                        self.result = None;
                    }
                }
            }
        }
        self.generation
    }
}
