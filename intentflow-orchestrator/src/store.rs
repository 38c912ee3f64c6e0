//! In-memory session store with idle expiry and a capacity bound.

use std::{collections::HashMap, sync::Arc, time::Duration};

use intentflow_core::session::ExecutionSession;
use tokio::{
    sync::{Mutex, RwLock},
    time::Instant,
};
use tracing::debug;

/// Shared, lockable session. The lock is held for a whole step execution.
pub type SessionHandle = Arc<Mutex<ExecutionSession>>;

struct Entry {
    session: SessionHandle,
    last_access: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.duration_since(self.last_access) >= ttl
    }
}

/// Live sessions keyed by id
///
/// Every lookup refreshes the session's last-access time. Sessions idle for
/// longer than the TTL are treated as absent. When full, inserting drops
/// expired sessions first and then the least recently used one.
pub struct SessionStore {
    entries: RwLock<HashMap<String, Entry>>,
    ttl: Duration,
    capacity: usize,
}

impl SessionStore {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Store a session, replacing any session with the same id
    pub async fn insert(&self, session: ExecutionSession) -> SessionHandle {
        let id = session.session_id.clone();
        let handle = Arc::new(Mutex::new(session));
        let now = Instant::now();

        let mut entries = self.entries.write().await;
        if !entries.contains_key(&id) && entries.len() >= self.capacity {
            entries.retain(|_, entry| !entry.is_expired(now, self.ttl));
            if entries.len() >= self.capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.last_access)
                    .map(|(key, _)| key.clone());
                if let Some(oldest) = oldest {
                    debug!(session_id = %oldest, "evicting least recently used session");
                    entries.remove(&oldest);
                }
            }
        }
        entries.insert(
            id,
            Entry {
                session: Arc::clone(&handle),
                last_access: now,
            },
        );
        handle
    }

    /// Look up a live session, refreshing its last-access time
    pub async fn get(&self, session_id: &str) -> Option<SessionHandle> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(session_id)?;
        if entry.is_expired(now, self.ttl) {
            debug!(session_id, "session expired");
            entries.remove(session_id);
            return None;
        }
        entry.last_access = now;
        Some(Arc::clone(&entry.session))
    }

    pub async fn remove(&self, session_id: &str) -> Option<SessionHandle> {
        let mut entries = self.entries.write().await;
        entries.remove(session_id).map(|entry| entry.session)
    }

    /// Drop every expired session; returns how many were dropped
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now, self.ttl));
        before - entries.len()
    }

    /// Number of stored sessions, expired ones included until purged
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("ttl", &self.ttl)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
