//! Admin gate
//!
//! Admin rights are derived from live membership in the configured admin
//! group. The lookup is repeated on every admin-only action on purpose: a
//! revoked membership must take effect on the next action, so there is no
//! caching and no session-level memo.

use teloxide::prelude::*;
use teloxide::types::{ChatId, ChatMemberKind, UserId};
use tracing::warn;

/// Membership check against the configured admin group.
#[derive(Debug, Clone)]
pub struct AdminGate {
    bot: Bot,
    admin_group: ChatId,
}

impl AdminGate {
    pub fn new(bot: Bot, admin_group: ChatId) -> Self {
        Self { bot, admin_group }
    }

    /// True iff the user is currently a member of the admin group.
    /// Any lookup failure is logged and treated as "not an admin".
    pub async fn is_admin(&self, user_id: UserId) -> bool {
        match self.bot.get_chat_member(self.admin_group, user_id).await {
            Ok(member) => membership_grants_admin(&member.kind),
            Err(e) => {
                warn!(user_id = user_id.0, error = %e, "Admin membership lookup failed");
                false
            }
        }
    }
}

/// Owners, administrators and plain members all count as admins; users who
/// left, were restricted out or were banned from the group do not.
pub fn membership_grants_admin(kind: &ChatMemberKind) -> bool {
    kind.is_owner() || kind.is_administrator() || kind.is_member()
}
