use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::session::models::Session;

/// In-memory session store. Sessions are independent: each owns its live text
/// and nothing is shared between them. Idle sessions expire after `ttl`.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Inserts a new session, purging expired ones first.
    pub async fn insert(&self, session: Session, now: DateTime<Utc>) {
        let mut sessions = self.sessions.write().await;
        let purged = purge_expired(&mut sessions, now, self.ttl);
        if purged > 0 {
            info!("Purged {purged} expired session(s)");
        }
        sessions.insert(session.id, session);
    }

    /// Runs `f` against a live session under the write lock and marks it active.
    /// Returns `None` if the session does not exist or has expired.
    pub async fn update<R>(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Option<R> {
        let mut sessions = self.sessions.write().await;

        if sessions
            .get(&id)
            .is_some_and(|s| is_expired(s, now, self.ttl))
        {
            sessions.remove(&id);
            info!("Session {id} expired");
            return None;
        }

        let session = sessions.get_mut(&id)?;
        session.last_active = now;
        Some(f(session))
    }

    /// Runs `f` against a live session without refreshing its activity.
    pub async fn read<R>(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        f: impl FnOnce(&Session) -> R,
    ) -> Option<R> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&id)
            .filter(|s| !is_expired(s, now, self.ttl))
            .map(f)
    }

    /// Discards a session. Returns whether it existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    #[cfg(test)]
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

fn is_expired(session: &Session, now: DateTime<Utc>, ttl: Duration) -> bool {
    now - session.last_active >= ttl
}

fn purge_expired(sessions: &mut HashMap<Uuid, Session>, now: DateTime<Utc>, ttl: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|_, s| !is_expired(s, now, ttl));
    before - sessions.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::fixtures::{analysis, RESUME_TEXT};

    fn new_session(now: DateTime<Utc>) -> Session {
        Session::new(analysis(), RESUME_TEXT.to_string(), now)
    }

    #[tokio::test]
    async fn test_insert_and_read() {
        let store = SessionStore::new(Duration::minutes(60));
        let now = Utc::now();
        let session = new_session(now);
        let id = session.id;

        store.insert(session, now).await;

        let text = store.read(id, now, |s| s.live_text().to_string()).await;
        assert_eq!(text.as_deref(), Some(RESUME_TEXT));
        assert_eq!(store.read(Uuid::new_v4(), now, |_| ()).await, None);
    }

    #[tokio::test]
    async fn test_update_refreshes_activity() {
        let store = SessionStore::new(Duration::minutes(10));
        let start = Utc::now();
        let session = new_session(start);
        let id = session.id;
        store.insert(session, start).await;

        let later = start + Duration::minutes(9);
        store.update(id, later, |_| ()).await.unwrap();

        // Still alive 9 minutes after the touch, 18 after creation.
        let much_later = later + Duration::minutes(9);
        assert!(store.read(id, much_later, |_| ()).await.is_some());
    }

    #[tokio::test]
    async fn test_expired_session_is_gone() {
        let store = SessionStore::new(Duration::minutes(10));
        let start = Utc::now();
        let session = new_session(start);
        let id = session.id;
        store.insert(session, start).await;

        let expired = start + Duration::minutes(10);
        assert!(store.read(id, expired, |_| ()).await.is_none());
        assert!(store.update(id, expired, |_| ()).await.is_none());
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_insert_purges_expired_sessions() {
        let store = SessionStore::new(Duration::minutes(10));
        let start = Utc::now();
        store.insert(new_session(start), start).await;

        let later = start + Duration::minutes(30);
        store.insert(new_session(later), later).await;
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new(Duration::minutes(60));
        let now = Utc::now();
        let a = new_session(now);
        let b = new_session(now);
        let (a_id, b_id) = (a.id, b.id);
        store.insert(a, now).await;
        store.insert(b, now).await;

        store
            .update(a_id, now, |s| s.apply_rewrite(0, now, Duration::seconds(3)))
            .await
            .unwrap()
            .unwrap();

        let b_text = store.read(b_id, now, |s| s.live_text().to_string()).await;
        assert_eq!(b_text.as_deref(), Some(RESUME_TEXT));
    }

    #[tokio::test]
    async fn test_remove() {
        let store = SessionStore::new(Duration::minutes(60));
        let now = Utc::now();
        let session = new_session(now);
        let id = session.id;
        store.insert(session, now).await;

        assert!(store.remove(id).await);
        assert!(!store.remove(id).await);
    }
}
