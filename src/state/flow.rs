//! Conversation flow states
//!
//! One tagged union per flow. Each state variant carries exactly the fields
//! captured up to that point, so a handler can never read a field that has
//! not been populated yet.

use teloxide::types::{ChatId, MessageId};

/// Top-level conversation state for a single user.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationState {
    Registration(RegistrationState),
    Broadcast(BroadcastState),
    /// Admin is expected to send the handle of the user to ban.
    AwaitingBanHandle,
}

/// Three-step registration form: name, then city, then shop address.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationState {
    AwaitingName,
    AwaitingCity {
        full_name: String,
    },
    AwaitingAddress {
        full_name: String,
        city: String,
    },
}

/// Admin-only broadcast flow.
#[derive(Debug, Clone, PartialEq)]
pub enum BroadcastState {
    /// Admin confirmed they want a broadcast; the next message is staged.
    AwaitingContent,
    /// A message reference is staged; only the reference is kept, the
    /// content itself is replayed from its source chat at delivery time.
    AwaitingConfirmation {
        source_chat: ChatId,
        message_id: MessageId,
    },
}
