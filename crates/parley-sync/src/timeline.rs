use std::collections::{BTreeMap, HashMap};

use parley_shared::models::Message;
use parley_shared::types::MessageId;

type Key = (i64, MessageId);

/// Messages of one chat, ordered by `(created_at, id)` with unique ids.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    ordered: BTreeMap<Key, Message>,
    keys: HashMap<MessageId, Key>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a message not seen before. Returns `false` for a known id.
    pub fn insert(&mut self, message: Message) -> bool {
        if self.keys.contains_key(&message.id) {
            return false;
        }
        let key = message.order_key();
        self.keys.insert(message.id, key);
        self.ordered.insert(key, message);
        true
    }

    /// Replace a known message in place. Unknown ids are ignored.
    pub fn replace(&mut self, message: Message) -> bool {
        let Some(old_key) = self.keys.get(&message.id).copied() else {
            return false;
        };
        if self.ordered.get(&old_key) == Some(&message) {
            return false;
        }
        self.ordered.remove(&old_key);
        let key = message.order_key();
        self.keys.insert(message.id, key);
        self.ordered.insert(key, message);
        true
    }

    pub fn remove(&mut self, id: MessageId) -> Option<Message> {
        let key = self.keys.remove(&id)?;
        self.ordered.remove(&key)
    }

    pub fn pop_oldest(&mut self) -> Option<Message> {
        let (_, message) = self.ordered.pop_first()?;
        self.keys.remove(&message.id);
        Some(message)
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.keys.get(&id).and_then(|k| self.ordered.get(k))
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.keys.contains_key(&id)
    }

    pub fn newest(&self) -> Option<&Message> {
        self.ordered.values().next_back()
    }

    pub fn oldest(&self) -> Option<&Message> {
        self.ordered.values().next()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Message> {
        self.ordered.values()
    }

    pub fn to_vec(&self) -> Vec<Message> {
        self.ordered.values().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.ordered.clear();
        self.keys.clear();
    }
}
