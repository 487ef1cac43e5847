use crate::session::types::Session;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Shared handle to one user's session
///
/// Holding the lock for a whole message makes each user's session
/// single-writer while different users proceed in parallel.
pub type SessionHandle = Arc<Mutex<Session>>;

/// In-memory mapping from user id to session
///
/// Entries live for the process lifetime; there is no removal.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets an existing session or creates a new one.
    ///
    /// **Lock Scope Pattern**: tries a brief read lock first; only a miss takes
    /// the write lock, and the entry API keeps two racing creators from
    /// replacing each other's session.
    pub async fn get_or_create(&self, user_id: &str) -> SessionHandle {
        {
            let guard = self.sessions.read().await;
            if let Some(handle) = guard.get(user_id) {
                return Arc::clone(handle);
            }
        }

        let mut guard = self.sessions.write().await;
        let handle = guard.entry(user_id.to_string()).or_insert_with(|| {
            debug!(user_id = %user_id, "Creating new session");
            Arc::new(Mutex::new(Session::new(user_id)))
        });
        Arc::clone(handle)
    }

    /// Returns a snapshot of a session, if one exists.
    ///
    /// Waits for any in-flight message on that session to finish.
    pub async fn get_session(&self, user_id: &str) -> Option<Session> {
        let handle = {
            let guard = self.sessions.read().await;
            guard.get(user_id).cloned()
        }?;
        let session = handle.lock().await;
        Some(session.clone())
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
