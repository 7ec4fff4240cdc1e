//! Server-side session storage keyed by the browser cookie

use crate::error::CoreResult;
use crate::session::{Session, SessionHandle, SessionId};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Idle time after which a session is forgotten
pub const DEFAULT_IDLE_TIMEOUT_HOURS: i64 = 24;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a new session and return its identifier
    async fn create(&self, session: Session) -> CoreResult<(SessionId, SessionHandle)>;

    /// Look up a live session, refreshing its idle timer
    async fn load(&self, id: &SessionId) -> CoreResult<Option<SessionHandle>>;

    /// Forget a session
    async fn destroy(&self, id: &SessionId) -> CoreResult<()>;

    /// Remove every session idle for longer than the timeout, returning how
    /// many were removed
    async fn purge_expired(&self) -> CoreResult<usize>;
}

struct Entry {
    handle: SessionHandle,
    last_seen: DateTime<Utc>,
}

/// Process-local session store
pub struct InMemorySessionStore {
    entries: RwLock<HashMap<SessionId, Entry>>,
    idle_timeout: Duration,
}

impl InMemorySessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn is_expired(&self, entry: &Entry, now: DateTime<Utc>) -> bool {
        now - entry.last_seen > self.idle_timeout
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_IDLE_TIMEOUT_HOURS))
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: Session) -> CoreResult<(SessionId, SessionHandle)> {
        let id = SessionId::generate();
        let handle = SessionHandle::new(session);
        self.entries.write().await.insert(
            id,
            Entry {
                handle: handle.clone(),
                last_seen: Utc::now(),
            },
        );
        Ok((id, handle))
    }

    async fn load(&self, id: &SessionId) -> CoreResult<Option<SessionHandle>> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;

        let expired = match entries.get(id) {
            Some(entry) => self.is_expired(entry, now),
            None => return Ok(None),
        };
        if expired {
            entries.remove(id);
            return Ok(None);
        }

        Ok(entries.get_mut(id).map(|entry| {
            entry.last_seen = now;
            entry.handle.clone()
        }))
    }

    async fn destroy(&self, id: &SessionId) -> CoreResult<()> {
        self.entries.write().await.remove(id);
        Ok(())
    }

    async fn purge_expired(&self) -> CoreResult<usize> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry, now));
        Ok(before - entries.len())
    }
}
