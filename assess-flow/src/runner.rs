//! SubmissionRunner – wrapper around the common _acquire → assess → resolve_
//! sequence of one photo submission.
//!
//! Interactive surfaces (the HTTP service, a future UI shell) want one
//! submission per user action, with the session persisted between the
//! Pending transition and the resolution so observers can see the loading
//! state. `SubmissionRunner` makes that a one-liner; callers needing custom
//! persistence can drive `SessionState::apply` and a `SessionStorage`
//! directly.

use std::sync::Arc;

use crate::acquire::{Acquired, ImageSelection, ImageSource};
use crate::client::HealthAssessmentClient;
use crate::error::Result;
use crate::session::SessionEvent;
use crate::storage::{Session, SessionStorage};

/// Orchestrates acquisition, assessment, and session state updates.
#[derive(Clone)]
pub struct SubmissionRunner {
    client: Arc<HealthAssessmentClient>,
    storage: Arc<dyn SessionStorage>,
}

impl SubmissionRunner {
    pub fn new(client: Arc<HealthAssessmentClient>, storage: Arc<dyn SessionStorage>) -> Self {
        Self { client, storage }
    }

    /// Drive one full submission for `session_id` and return the session in
    /// its final state.
    ///
    /// Both state transitions go through [`SessionStorage::apply`], which is
    /// atomic per session id: each acquisition observes its own generation,
    /// and a resolution that lost the race to a newer acquisition carries a
    /// stale generation and is discarded by the reducer instead of
    /// clobbering the newer submission's state. The Pending state is
    /// persisted before the request goes out.
    pub async fn submit(&self, session_id: &str, selection: ImageSelection) -> Result<Session> {
        let session = self
            .storage
            .apply(session_id, SessionEvent::Acquired(selection.clone()))
            .await?;
        let generation = session.state.generation;

        // Single attempt; every failure collapses to its display string.
        let outcome = self
            .client
            .assess(&selection.base64_payload)
            .await
            .map_err(|e| e.to_string());

        self.storage
            .apply(
                session_id,
                SessionEvent::Resolved {
                    generation,
                    outcome,
                },
            )
            .await
    }

    /// Pick a photo from the library and submit it. A canceled pick is a
    /// no-op: the session is returned unchanged.
    pub async fn acquire_from_library(
        &self,
        session_id: &str,
        source: &dyn ImageSource,
    ) -> Result<Session> {
        match source.pick_from_library().await? {
            Acquired::Selected(selection) => self.submit(session_id, selection).await,
            Acquired::Canceled => self.current(session_id).await,
        }
    }

    /// Capture a photo with the camera and submit it. A canceled capture is
    /// a no-op: the session is returned unchanged.
    pub async fn acquire_via_camera(
        &self,
        session_id: &str,
        source: &dyn ImageSource,
    ) -> Result<Session> {
        match source.capture_photo().await? {
            Acquired::Selected(selection) => self.submit(session_id, selection).await,
            Acquired::Canceled => self.current(session_id).await,
        }
    }

    /// Current session record, creating (and persisting) an Idle one when the
    /// id is unknown.
    pub async fn current(&self, session_id: &str) -> Result<Session> {
        if let Some(session) = self.storage.get(session_id).await? {
            return Ok(session);
        }
        let session = Session::new(session_id.to_string());
        self.storage.save(session.clone()).await?;
        Ok(session)
    }
}
