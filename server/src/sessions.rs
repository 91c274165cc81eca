use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{info, warn};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::state::{AppState, Session};

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 256;

type SessionMap = HashMap<String, Arc<RwLock<Session>>>;

pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn normalize_session_id(value: &str) -> Option<String> {
    let parsed = Uuid::parse_str(value).ok()?;
    Some(parsed.to_string())
}

pub async fn create_session(state: &AppState, session: Session) -> String {
    let session_id = new_session_id();
    info!(
        "Session opened session={session_id} image={}",
        session.initial_image.is_some()
    );
    let mut sessions = state.sessions.write().await;
    while sessions.len() >= state.max_sessions.max(1) {
        let Some(oldest) = least_recently_seen(&sessions).await else {
            break;
        };
        sessions.remove(&oldest);
        info!("Session evicted to make room session={oldest}");
    }
    sessions.insert(session_id.clone(), Arc::new(RwLock::new(session)));
    session_id
}

async fn least_recently_seen(sessions: &SessionMap) -> Option<String> {
    let mut oldest: Option<(Instant, &String)> = None;
    for (session_id, session) in sessions {
        let last_seen = session.read().await.last_seen;
        if oldest.map_or(true, |(seen, _)| last_seen < seen) {
            oldest = Some((last_seen, session_id));
        }
    }
    oldest.map(|(_, session_id)| session_id.clone())
}

pub async fn find_session(state: &AppState, session_id: &str) -> Option<Arc<RwLock<Session>>> {
    state.sessions.read().await.get(session_id).cloned()
}

/// Notes a saved mask on its session. Unknown sessions are logged and otherwise ignored.
pub async fn record_saved_mask(state: &AppState, session_id: &str, file_path: &str) {
    let Some(session_id) = normalize_session_id(session_id) else {
        warn!("Mask saved for malformed session id={session_id:?}");
        return;
    };
    match find_session(state, &session_id).await {
        Some(session) => {
            let mut session = session.write().await;
            session.saved_masks.push(file_path.to_string());
            session.last_seen = Instant::now();
        }
        None => warn!("Mask saved for unknown session={session_id}"),
    }
}

/// Drops every session idle for longer than the state's TTL. Returns how many went.
pub async fn prune_expired_sessions(state: &AppState, now: Instant) -> usize {
    let sessions = {
        let sessions = state.sessions.read().await;
        sessions
            .iter()
            .map(|(session_id, session)| (session_id.clone(), session.clone()))
            .collect::<Vec<_>>()
    };
    let mut expired = Vec::new();
    for (session_id, session) in sessions {
        let last_seen = session.read().await.last_seen;
        if now.saturating_duration_since(last_seen) > state.session_ttl {
            expired.push((session_id, session));
        }
    }
    if expired.is_empty() {
        return 0;
    }
    let mut sessions = state.sessions.write().await;
    let mut removed = 0;
    for (session_id, session) in expired {
        if let Some(current) = sessions.get(&session_id) {
            if Arc::ptr_eq(current, &session) {
                sessions.remove(&session_id);
                info!("Session expired session={session_id}");
                removed += 1;
            }
        }
    }
    removed
}
