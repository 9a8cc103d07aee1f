//! In-memory conversation history keyed by session id.

use crate::provider::ChatMessage;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Per-session message log.
///
/// When a window is set, only the most recent `window` messages are kept.
#[derive(Debug, Default)]
pub struct SessionHistoryStore {
    sessions: Mutex<HashMap<String, Vec<ChatMessage>>>,
    window: Option<usize>,
}

impl SessionHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(window: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            window: Some(window),
        }
    }

    /// Copy of the session's messages; empty for unknown sessions.
    pub fn history(&self, session_id: &str) -> Vec<ChatMessage> {
        self.sessions
            .lock()
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn append(&self, session_id: &str, messages: impl IntoIterator<Item = ChatMessage>) {
        let mut sessions = self.sessions.lock();
        let log = sessions.entry(session_id.to_string()).or_default();
        log.extend(messages);
        if let Some(window) = self.window {
            if log.len() > window {
                let excess = log.len() - window;
                log.drain(..excess);
            }
        }
    }

    /// Drop a session. Returns whether it existed.
    pub fn clear(&self, session_id: &str) -> bool {
        self.sessions.lock().remove(session_id).is_some()
    }
}
