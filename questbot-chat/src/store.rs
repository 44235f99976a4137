//! Session store: player key → conversation.
//!
//! Conversations are created on first contact and live for the life of the
//! process. Each one sits behind its own mutex, so events from different
//! players never contend and events from one player run one at a time.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use questbot_core::PlayerKey;

use crate::machine::Conversation;

/// Shared handle to one conversation.
pub type ConversationHandle = Arc<Mutex<Conversation>>;

/// Keyed repository of conversations.
pub trait SessionStore: Send + Sync {
    /// Existing conversation for `key`, or a fresh one. The flag is `true`
    /// when the conversation was created by this call.
    fn get_or_create(&self, key: PlayerKey) -> (ConversationHandle, bool);

    /// Existing conversation for `key`.
    fn get(&self, key: PlayerKey) -> Option<ConversationHandle>;

    /// Forget the conversation for `key`.
    fn remove(&self, key: PlayerKey) -> Option<ConversationHandle>;

    /// Number of conversations.
    fn len(&self) -> usize;

    /// Whether there are no conversations.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-lifetime store on a concurrent hash map.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<PlayerKey, ConversationHandle>,
}

impl InMemorySessionStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get_or_create(&self, key: PlayerKey) -> (ConversationHandle, bool) {
        let mut created = false;
        let entry = self.sessions.entry(key).or_insert_with(|| {
            created = true;
            Arc::new(Mutex::new(Conversation::new()))
        });
        (Arc::clone(entry.value()), created)
    }

    fn get(&self, key: PlayerKey) -> Option<ConversationHandle> {
        self.sessions.get(&key).map(|entry| Arc::clone(entry.value()))
    }

    fn remove(&self, key: PlayerKey) -> Option<ConversationHandle> {
        self.sessions.remove(&key).map(|(_, conv)| conv)
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_contact_creates_once() {
        let store = InMemorySessionStore::new();
        let (a, created) = store.get_or_create(PlayerKey(1));
        assert!(created);
        let (b, created) = store.get_or_create(PlayerKey(1));
        assert!(!created);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn keys_are_independent() {
        let store = InMemorySessionStore::new();
        store.get_or_create(PlayerKey(1));
        store.get_or_create(PlayerKey(2));
        assert_eq!(store.len(), 2);
        assert!(store.remove(PlayerKey(1)).is_some());
        assert!(store.get(PlayerKey(1)).is_none());
        assert!(store.get(PlayerKey(2)).is_some());
        assert!(!store.is_empty());
    }
}
