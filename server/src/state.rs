use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::sessions::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL};
use crate::storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<HashMap<String, Arc<RwLock<Session>>>>>,
    pub storage: Arc<dyn Storage>,
    /// Idle time after which the sweep drops a session.
    pub session_ttl: Duration,
    /// Opening past this many live sessions evicts the least recently seen one.
    pub max_sessions: usize,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            storage,
            session_ttl: DEFAULT_SESSION_TTL,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

/// A tool-open session: the image the editor was opened with and the masks saved from it.
#[derive(Clone, Debug)]
pub struct Session {
    /// Data URL exactly as the opener sent it.
    pub initial_image: Option<String>,
    pub file_name: Option<String>,
    pub saved_masks: Vec<String>,
    pub last_seen: Instant,
}

impl Session {
    pub fn new(initial_image: Option<String>, file_name: Option<String>) -> Self {
        Self {
            initial_image,
            file_name,
            saved_masks: Vec::new(),
            last_seen: Instant::now(),
        }
    }
}
