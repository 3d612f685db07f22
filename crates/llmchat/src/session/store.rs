//! In-memory session store.
//!
//! Each session sits behind its own async mutex: prompts within a session are
//! handled one at a time, while different sessions never wait on each other.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;
use ulid::Ulid;

use super::transcript::Transcript;
use crate::llm::Message;

/// Shared handle to one session.
pub type SessionHandle = Arc<Mutex<Session>>;

/// One isolated conversation.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    transcript: Transcript,
}

impl Session {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: format!("session_{}", Ulid::new()),
            created_at: now,
            updated_at: now,
            transcript: Transcript::new(),
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn append(&mut self, message: Message) {
        self.transcript.append(message);
        self.updated_at = Utc::now();
    }

    pub fn clear(&mut self) {
        self.transcript.clear();
        self.updated_at = Utc::now();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Sessions keyed by id. Cloning shares the same underlying map.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session and return its handle.
    pub fn create(&self) -> SessionHandle {
        let session = Session::new();
        let id = session.id.clone();
        let handle = Arc::new(Mutex::new(session));
        self.sessions.insert(id.clone(), Arc::clone(&handle));
        debug!(session_id = %id, "Session created");
        handle
    }

    pub fn get(&self, session_id: &str) -> Option<SessionHandle> {
        self.sessions
            .get(session_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Drop a session and its transcript. Returns false if it did not exist.
    pub fn remove(&self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id).is_some();
        if removed {
            debug!(session_id = %session_id, "Session removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("count", &self.sessions.len())
            .finish()
    }
}
