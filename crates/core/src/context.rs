use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// One completed exchange retained for short-term disambiguation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversationTurn {
    pub user_text: String,
    pub bot_text: String,
}

/// Turns retained per user. Follow-up detection only ever looks one turn
/// back; the price extractor scans all retained turns for an item mention.
pub const MAX_TURNS: usize = 3;

#[derive(Debug)]
struct UserContext {
    turns: VecDeque<ConversationTurn>,
    last_active: Instant,
}

impl UserContext {
    fn new() -> Self {
        Self { turns: VecDeque::with_capacity(MAX_TURNS), last_active: Instant::now() }
    }
}

/// Process-lifetime map of user id to recent conversation turns.
///
/// All access goes through one lock, so concurrent turns for the same user
/// serialize on append and cannot lose updates. Entries carry a last-active
/// stamp and are dropped by [`ContextStore::evict_idle`], which the server
/// sweeps on a timer.
#[derive(Debug, Default)]
pub struct ContextStore {
    users: Mutex<HashMap<String, UserContext>>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a completed (user, bot) turn, evicting the oldest retained
    /// turn once the ring is full.
    pub fn append(&self, user_id: &str, user_text: &str, bot_text: &str) {
        let mut users = self.users.lock().expect("context store lock poisoned");
        let entry = users.entry(user_id.to_string()).or_insert_with(UserContext::new);
        if entry.turns.len() == MAX_TURNS {
            entry.turns.pop_front();
        }
        entry.turns.push_back(ConversationTurn {
            user_text: user_text.to_string(),
            bot_text: bot_text.to_string(),
        });
        entry.last_active = Instant::now();
    }

    /// Most recent turn for the user, if any.
    pub fn last(&self, user_id: &str) -> Option<ConversationTurn> {
        let users = self.users.lock().expect("context store lock poisoned");
        users.get(user_id).and_then(|entry| entry.turns.back().cloned())
    }

    /// All retained turns, oldest first.
    pub fn all(&self, user_id: &str) -> Vec<ConversationTurn> {
        let users = self.users.lock().expect("context store lock poisoned");
        users.get(user_id).map(|entry| entry.turns.iter().cloned().collect()).unwrap_or_default()
    }

    /// Drops users whose last activity is older than `max_idle`. Returns the
    /// number of evicted users.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut users = self.users.lock().expect("context store lock poisoned");
        let before = users.len();
        users.retain(|_, entry| entry.last_active.elapsed() < max_idle);
        before - users.len()
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().expect("context store lock poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{ContextStore, MAX_TURNS};

    #[test]
    fn append_beyond_capacity_evicts_oldest_first() {
        let store = ContextStore::new();
        for i in 1..=4 {
            store.append("u1", &format!("질문{i}"), &format!("답변{i}"));
        }

        let turns = store.all("u1");
        assert_eq!(turns.len(), MAX_TURNS);
        assert_eq!(turns[0].user_text, "질문2");
        assert_eq!(turns[2].user_text, "질문4");
    }

    #[test]
    fn last_returns_most_recent_turn() {
        let store = ContextStore::new();
        assert!(store.last("u1").is_none());

        store.append("u1", "배추 가격", "배추 가격 안내");
        store.append("u1", "어제는?", "어제 가격 안내");
        assert_eq!(store.last("u1").unwrap().user_text, "어제는?");
    }

    #[test]
    fn users_are_isolated() {
        let store = ContextStore::new();
        store.append("u1", "a", "b");
        assert!(store.all("u2").is_empty());
        assert_eq!(store.all("u1").len(), 1);
    }

    #[test]
    fn evict_idle_drops_stale_users_only() {
        let store = ContextStore::new();
        store.append("u1", "a", "b");

        assert_eq!(store.evict_idle(Duration::from_secs(3600)), 0);
        assert_eq!(store.user_count(), 1);

        assert_eq!(store.evict_idle(Duration::ZERO), 1);
        assert_eq!(store.user_count(), 0);
    }
}
