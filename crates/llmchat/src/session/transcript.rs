//! Ordered, append-only message log for one session.

use serde::Serialize;

use crate::llm::Message;

/// The messages exchanged in a session, in insertion order.
///
/// Role alternation is not enforced; the caller drives turn-taking.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Remove every message. Calling it on an empty transcript is a no-op.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
