use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;
use crate::session::{SessionEvent, SessionState};

/// One screen session: an id plus the state record driving rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub state: SessionState,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: String) -> Self {
        Self {
            id,
            state: SessionState::new(),
            updated_at: Utc::now(),
        }
    }

    /// Refresh the modification timestamp; called right before persisting.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Trait for storing and retrieving sessions.
///
/// `apply` is the write path for submissions: implementations must make the
/// load-apply-store step atomic with respect to concurrent `apply` calls for
/// the same id, so the generation counter in [`SessionState`] is handed out
/// once per acquisition even under parallel submissions.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn save(&self, session: Session) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<Session>>;
    async fn delete(&self, id: &str) -> Result<()>;

    /// Atomically load the session (creating an Idle one when the id is
    /// unknown), run one event through the reducer, and store the outcome.
    /// Returns the session as stored afterwards.
    async fn apply(&self, id: &str, event: SessionEvent) -> Result<Session>;
}

/// In-memory implementation of SessionStorage. Session history is never
/// persisted; a restart starts every screen at Idle.
pub struct InMemorySessionStorage {
    sessions: Arc<DashMap<String, Session>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemorySessionStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn save(&self, session: Session) -> Result<()> {
        self.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Session>> {
        Ok(self.sessions.get(id).map(|entry| entry.clone()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.sessions.remove(id);
        Ok(())
    }

    async fn apply(&self, id: &str, event: SessionEvent) -> Result<Session> {
        // The entry guard holds the shard write lock for the whole
        // read-modify-write, so concurrent applies for one id serialize.
        let mut entry = self
            .sessions
            .entry(id.to_string())
            .or_insert_with(|| Session::new(id.to_string()));
        entry.state.apply(event);
        entry.touch();
        Ok(entry.clone())
    }
}
