//! In-memory, per-conversation message store.
//!
//! One coarse mutex guards the whole map: message volume is chat-bot scale,
//! so simplicity wins over lock granularity. Appends are unbounded; only
//! reads apply the freshness window.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;

use super::message::Message;

/// Thread-safe append log of conversation turns, keyed by chat id.
///
/// Sequences are created lazily on first append and live for the lifetime of
/// the process. Stored growth is unbounded by contract; `fresh_messages`
/// bounds what callers see, not what is kept.
pub struct ConversationStore {
    conversations: Mutex<HashMap<i64, Vec<Message>>>,
}

impl ConversationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            conversations: Mutex::new(HashMap::new()),
        }
    }

    /// Append a message to the end of a conversation.
    ///
    /// Infallible: the sequence is created if the conversation is unknown.
    /// Each append is atomic with respect to concurrent reads.
    pub fn add(&self, chat_id: i64, message: Message) {
        let mut conversations = self
            .conversations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        conversations.entry(chat_id).or_default().push(message);
    }

    /// Return the suffix of a conversation that is still fresh.
    ///
    /// Keeps messages younger than `ttl` at the time of the call, then keeps
    /// only the last `limit` of those (truncating from the front, so the most
    /// recent survive). An unknown conversation yields an empty vec, as does
    /// `limit == 0`. The result is an independent copy; mutating it does not
    /// affect stored state.
    #[must_use]
    pub fn fresh_messages(&self, chat_id: i64, limit: usize, ttl: Duration) -> Vec<Message> {
        let conversations = self
            .conversations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(history) = conversations.get(&chat_id) else {
            return Vec::new();
        };

        let cutoff = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_sub_signed(ttl));

        let fresh: Vec<&Message> = history
            .iter()
            .filter(|m| cutoff.is_none_or(|cutoff| m.timestamp > cutoff))
            .collect();

        let skip = fresh.len().saturating_sub(limit);
        fresh[skip..].iter().map(|m| (*m).clone()).collect()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use chrono::Utc;

    use super::*;
    use crate::history::message::Role;

    const LONG_TTL: Duration = Duration::from_secs(60 * 60);

    fn aged(content: &str, age: Duration) -> Message {
        let mut msg = Message::user(content);
        msg.timestamp = Utc::now() - chrono::Duration::from_std(age).unwrap();
        msg
    }

    #[test]
    fn test_unknown_conversation_is_empty() {
        let store = ConversationStore::new();
        assert!(store.fresh_messages(42, 10, LONG_TTL).is_empty());
    }

    #[test]
    fn test_append_then_read_returns_in_order() {
        let store = ConversationStore::new();
        store.add(1, Message::user("first"));
        store.add(1, Message::assistant("second"));
        store.add(1, Message::user("third"));

        let messages = store.fresh_messages(1, 10, LONG_TTL);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, "first");
        assert_eq!(messages[1].content, "second");
        assert_eq!(messages[2].content, "third");
        assert_eq!(messages[1].role, Role::Assistant);
    }

    #[test]
    fn test_conversations_are_isolated() {
        let store = ConversationStore::new();
        store.add(1, Message::user("for one"));
        store.add(2, Message::user("for two"));

        let messages = store.fresh_messages(1, 10, LONG_TTL);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "for one");
    }

    #[test]
    fn test_stale_message_excluded_even_with_room() {
        let store = ConversationStore::new();
        store.add(1, aged("stale", Duration::from_secs(600)));
        store.add(1, Message::user("fresh"));

        let messages = store.fresh_messages(1, 10, Duration::from_secs(300));
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "fresh");
    }

    #[test]
    fn test_all_stale_yields_empty() {
        let store = ConversationStore::new();
        store.add(1, aged("old", Duration::from_secs(600)));
        assert!(store.fresh_messages(1, 10, Duration::from_secs(60)).is_empty());
    }

    #[test]
    fn test_front_truncation_keeps_most_recent() {
        let store = ConversationStore::new();
        for i in 0..5 {
            store.add(1, Message::user(format!("message {i}")));
        }

        let messages = store.fresh_messages(1, 2, LONG_TTL);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "message 3");
        assert_eq!(messages[1].content, "message 4");
    }

    #[test]
    fn test_limit_exactly_matching_count_keeps_all() {
        let store = ConversationStore::new();
        for i in 0..3 {
            store.add(1, Message::user(format!("message {i}")));
        }
        assert_eq!(store.fresh_messages(1, 3, LONG_TTL).len(), 3);
    }

    #[test]
    fn test_zero_limit_yields_empty() {
        let store = ConversationStore::new();
        store.add(1, Message::user("hello"));
        assert!(store.fresh_messages(1, 0, LONG_TTL).is_empty());
    }

    #[test]
    fn test_age_filter_applies_before_count_cap() {
        // Two stale then two fresh: the cap must count only fresh entries.
        let store = ConversationStore::new();
        store.add(1, aged("stale a", Duration::from_secs(600)));
        store.add(1, aged("stale b", Duration::from_secs(600)));
        store.add(1, Message::user("fresh a"));
        store.add(1, Message::user("fresh b"));

        let messages = store.fresh_messages(1, 2, Duration::from_secs(300));
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "fresh a");
        assert_eq!(messages[1].content, "fresh b");
    }

    #[test]
    fn test_read_is_a_defensive_copy() {
        let store = ConversationStore::new();
        store.add(1, Message::user("original"));

        let mut messages = store.fresh_messages(1, 10, LONG_TTL);
        messages[0].content = "mutated".to_string();
        messages.clear();

        let reread = store.fresh_messages(1, 10, LONG_TTL);
        assert_eq!(reread.len(), 1);
        assert_eq!(reread[0].content, "original");
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let store = ConversationStore::new();
        store.add(1, Message::user("hello"));
        assert_eq!(store.fresh_messages(1, 10, Duration::MAX).len(), 1);
    }

    #[test]
    fn test_concurrent_appends_all_land() {
        let store = Arc::new(ConversationStore::new());
        let mut handles = Vec::new();

        for t in 0..8 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for i in 0..50 {
                    store.add(7, Message::user(format!("t{t} m{i}")));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.fresh_messages(7, 1000, LONG_TTL).len(), 400);
    }

    #[test]
    fn test_concurrent_readers_and_writers() {
        let store = Arc::new(ConversationStore::new());
        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..200 {
                    store.add(9, Message::user(format!("message {i}")));
                }
            })
        };
        let reader = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..200 {
                    // Every observed snapshot is a prefix in insertion order.
                    let seen = store.fresh_messages(9, 1000, LONG_TTL);
                    for (i, msg) in seen.iter().enumerate() {
                        assert_eq!(msg.content, format!("message {i}"));
                    }
                }
            })
        };
        writer.join().unwrap();
        reader.join().unwrap();
    }
}
