use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use flashcards_core::{Session, SpeechPlayer};
use parking_lot::Mutex;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// One learner's session plus its playback surface
#[derive(Debug)]
pub struct SessionEntry {
    session: Mutex<Session>,
    speech: SpeechPlayer,
    last_access: Mutex<Instant>,
}

impl SessionEntry {
    fn new(session: Session, max_chunk_chars: usize) -> Self {
        Self {
            session: Mutex::new(session),
            speech: SpeechPlayer::new(max_chunk_chars),
            last_access: Mutex::new(Instant::now()),
        }
    }

    /// Runs `f` against the session while holding its lock.
    pub fn with_session<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        self.touch();
        let mut session = self.session.lock();
        f(&mut session)
    }

    pub fn speech(&self) -> &SpeechPlayer {
        &self.speech
    }

    fn touch(&self) {
        *self.last_access.lock() = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        self.last_access.lock().elapsed()
    }
}

/// In-memory session registry. State never outlives the process.
#[derive(Debug)]
pub struct SessionStore {
    entries: RwLock<HashMap<Uuid, Arc<SessionEntry>>>,
    ttl: Duration,
    max_chunk_chars: usize,
}

impl SessionStore {
    pub fn new(ttl: Duration, max_chunk_chars: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_chunk_chars,
        }
    }

    pub async fn insert(&self, session: Session) -> (Uuid, Arc<SessionEntry>) {
        let id = Uuid::new_v4();
        let entry = Arc::new(SessionEntry::new(session, self.max_chunk_chars));
        self.entries.write().await.insert(id, Arc::clone(&entry));
        debug!(session_id = %id, "session created");
        (id, entry)
    }

    /// Live entry for `id`; an expired entry is dropped and reported missing.
    pub async fn get(&self, id: Uuid) -> Option<Arc<SessionEntry>> {
        let entry = self.entries.read().await.get(&id).cloned()?;
        if self.is_expired(&entry) {
            self.entries.write().await.remove(&id);
            debug!(session_id = %id, "session expired");
            return None;
        }
        entry.touch();
        Some(entry)
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.entries.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drops idle sessions; speaking sessions are kept. Returns the number
    /// removed.
    pub async fn prune_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry));
        before - entries.len()
    }

    fn is_expired(&self, entry: &SessionEntry) -> bool {
        !entry.speech.is_playing() && entry.idle_for() >= self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashcards_core::Level;

    fn store(ttl: Duration) -> SessionStore {
        SessionStore::new(ttl, 200)
    }

    #[tokio::test]
    async fn test_insert_get_remove() {
        let store = store(Duration::from_secs(60));
        let (id, _) = store.insert(Session::new(Level::Basic, Vec::new())).await;

        let entry = store.get(id).await.unwrap();
        assert_eq!(entry.with_session(|s| s.level()), Level::Basic);
        assert_eq!(store.len().await, 1);

        assert!(store.remove(id).await);
        assert!(!store.remove(id).await);
        assert!(store.get(id).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_sessions_are_pruned() {
        let store = store(Duration::ZERO);
        let (id, _) = store.insert(Session::new(Level::Quiz, Vec::new())).await;
        store.insert(Session::new(Level::Quiz, Vec::new())).await;

        assert!(store.get(id).await.is_none());
        assert_eq!(store.prune_expired().await, 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_speaking_session_is_not_pruned() {
        let store = store(Duration::ZERO);
        let (_, entry) = store.insert(Session::new(Level::Quiz, Vec::new())).await;
        let lease = entry.speech().try_acquire().unwrap();

        assert_eq!(store.prune_expired().await, 0);
        drop(lease);
        assert_eq!(store.prune_expired().await, 1);
    }
}
