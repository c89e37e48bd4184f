//! In-process [`HistoryStore`] backed by a map of per-session deques.
//!
//! The outer `RwLock` only guards the map shape; each session has its own
//! `Mutex`, so overlapping requests for one session serialize while other
//! sessions proceed untouched.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;

use super::{HistoryStore, StoreError};

type Slot<T> = Arc<Mutex<VecDeque<T>>>;

pub struct MemoryStore<T> {
    capacity: usize,
    sessions: RwLock<HashMap<String, Slot<T>>>,
}

impl<T> std::fmt::Debug for MemoryStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.sessions.read().map(|s| s.len()).unwrap_or(0);
        write!(f, "MemoryStore(capacity {}, {count} sessions)", self.capacity)
    }
}

impl<T> MemoryStore<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    fn existing(&self, session_id: &str) -> Result<Option<Slot<T>>, StoreError> {
        let sessions = self.sessions.read().map_err(|_| StoreError::Poisoned)?;
        Ok(sessions.get(session_id).cloned())
    }

    fn get_or_create(&self, session_id: &str) -> Result<Slot<T>, StoreError> {
        if let Some(slot) = self.existing(session_id)? {
            return Ok(slot);
        }
        let mut sessions = self.sessions.write().map_err(|_| StoreError::Poisoned)?;
        Ok(Arc::clone(
            sessions
                .entry(session_id.to_owned())
                .or_insert_with(|| Arc::new(Mutex::new(VecDeque::new()))),
        ))
    }

    fn trim(&self, entries: &mut VecDeque<T>) {
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }
}

#[async_trait]
impl<T> HistoryStore<T> for MemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn get(&self, session_id: &str) -> Result<Vec<T>, StoreError> {
        let Some(slot) = self.existing(session_id)? else {
            return Ok(Vec::new());
        };
        let entries = slot.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.iter().cloned().collect())
    }

    async fn put(&self, session_id: &str, entries: Vec<T>) -> Result<(), StoreError> {
        let slot = self.get_or_create(session_id)?;
        let mut stored = slot.lock().map_err(|_| StoreError::Poisoned)?;
        *stored = entries.into();
        self.trim(&mut stored);
        Ok(())
    }

    async fn append(&self, session_id: &str, entries: Vec<T>) -> Result<usize, StoreError> {
        let slot = self.get_or_create(session_id)?;
        let mut stored = slot.lock().map_err(|_| StoreError::Poisoned)?;
        stored.extend(entries);
        self.trim(&mut stored);
        Ok(stored.len())
    }

    async fn clear(&self, session_id: &str) -> Result<(), StoreError> {
        if let Some(slot) = self.existing(session_id)? {
            slot.lock().map_err(|_| StoreError::Poisoned)?.clear();
        }
        Ok(())
    }

    async fn session_count(&self) -> Result<usize, StoreError> {
        let sessions = self.sessions.read().map_err(|_| StoreError::Poisoned)?;
        Ok(sessions.len())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn unknown_session_is_empty() {
        let store = MemoryStore::<u32>::new(3);
        assert!(store.get("nobody").await.unwrap().is_empty());
        assert_eq!(store.session_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn append_evicts_oldest_beyond_capacity() {
        let store = MemoryStore::new(4);
        for i in 0..10u32 {
            let prior = store.get("s").await.unwrap().len();
            let len = store.append("s", vec![i]).await.unwrap();
            assert_eq!(len, (prior + 1).min(4));
        }
        assert_eq!(store.get("s").await.unwrap(), vec![6, 7, 8, 9]);
    }

    #[tokio::test]
    async fn pair_append_keeps_order() {
        let store = MemoryStore::new(20);
        store.append("s", vec!["user", "assistant"]).await.unwrap();
        store.append("s", vec!["user2", "assistant2"]).await.unwrap();
        assert_eq!(
            store.get("s").await.unwrap(),
            vec!["user", "assistant", "user2", "assistant2"]
        );
    }

    #[tokio::test]
    async fn put_keeps_newest_entries() {
        let store = MemoryStore::new(2);
        store.put("s", vec![1, 2, 3]).await.unwrap();
        assert_eq!(store.get("s").await.unwrap(), vec![2, 3]);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = MemoryStore::new(5);
        store.append("a", vec![1]).await.unwrap();
        store.append("b", vec![2, 3]).await.unwrap();
        store.clear("a").await.unwrap();

        assert!(store.get("a").await.unwrap().is_empty());
        assert_eq!(store.get("b").await.unwrap(), vec![2, 3]);
        assert_eq!(store.session_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn concurrent_appends_to_one_session_are_not_lost() {
        let store = Arc::new(MemoryStore::new(1000));
        let handles: Vec<_> = (0..50u32)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.append("s", vec![i, i]).await.unwrap() })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let entries = store.get("s").await.unwrap();
        assert_eq!(entries.len(), 100);
        // Each pair was appended atomically, so pairs stay adjacent.
        for pair in entries.chunks(2) {
            assert_eq!(pair[0], pair[1]);
        }
    }
}
