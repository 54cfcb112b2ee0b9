//! In-memory session storage
//!
//! Sessions are volatile: they do not survive a process restart and have no
//! expiry. The mutex only guards the map itself; the platform delivers the
//! events of a single conversation sequentially, so no per-session locking
//! is needed.

use std::collections::HashMap;
use std::sync::Mutex;

use super::flow::ConversationState;

/// Per-user conversation state store, keyed by Telegram user id.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<i64, ConversationState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of a user, if any flow is in progress.
    pub fn get(&self, user_id: i64) -> Option<ConversationState> {
        self.lock().get(&user_id).cloned()
    }

    /// Replace the user's state. Captured values travel inside the state
    /// variant, so a transition and a field update are one operation.
    pub fn set(&self, user_id: i64, state: ConversationState) {
        self.lock().insert(user_id, state);
    }

    /// Reset the user to no-state, discarding captured values.
    pub fn clear(&self, user_id: i64) {
        self.lock().remove(&user_id);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<i64, ConversationState>> {
        // No handler panics while holding the guard, but recover anyway.
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::flow::{BroadcastState, RegistrationState};
    use teloxide::types::{ChatId, MessageId};

    #[test]
    fn starts_empty() {
        let store = SessionStore::new();
        assert_eq!(store.get(1), None);
    }

    #[test]
    fn registration_advances_one_state_per_step() {
        let store = SessionStore::new();
        store.set(1, ConversationState::Registration(RegistrationState::AwaitingName));

        store.set(
            1,
            ConversationState::Registration(RegistrationState::AwaitingCity {
                full_name: "Ann Smith".to_string(),
            }),
        );
        assert_eq!(
            store.get(1),
            Some(ConversationState::Registration(RegistrationState::AwaitingCity {
                full_name: "Ann Smith".to_string(),
            }))
        );

        store.set(
            1,
            ConversationState::Registration(RegistrationState::AwaitingAddress {
                full_name: "Ann Smith".to_string(),
                city: "Riga".to_string(),
            }),
        );
        assert_eq!(
            store.get(1),
            Some(ConversationState::Registration(RegistrationState::AwaitingAddress {
                full_name: "Ann Smith".to_string(),
                city: "Riga".to_string(),
            }))
        );
    }

    #[test]
    fn clear_resets_to_no_state() {
        let store = SessionStore::new();
        store.set(
            7,
            ConversationState::Broadcast(BroadcastState::AwaitingConfirmation {
                source_chat: ChatId(7),
                message_id: MessageId(42),
            }),
        );
        store.clear(7);
        assert_eq!(store.get(7), None);
    }

    #[test]
    fn sessions_are_scoped_per_user() {
        let store = SessionStore::new();
        store.set(1, ConversationState::AwaitingBanHandle);
        store.set(2, ConversationState::Broadcast(BroadcastState::AwaitingContent));

        assert_eq!(store.get(1), Some(ConversationState::AwaitingBanHandle));
        assert_eq!(
            store.get(2),
            Some(ConversationState::Broadcast(BroadcastState::AwaitingContent))
        );
    }
}
