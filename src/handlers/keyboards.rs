//! Inline keyboard layouts
//!
//! Three fixed menus: the admin main menu and the two broadcast
//! start/confirm choices. Callback data values are the opaque action
//! identifiers matched in `handlers::callbacks`.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

pub const ACTION_BROADCAST: &str = "broadcast";
pub const ACTION_BAN_USER: &str = "ban_user";
pub const ACTION_START_BROADCAST: &str = "start_broadcast";
pub const ACTION_CONFIRM_BROADCAST: &str = "confirm_broadcast";
pub const ACTION_CANCEL_BROADCAST: &str = "cancel_broadcast";

/// Admin main menu: broadcast | ban
pub fn admin_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("📢 Broadcast", ACTION_BROADCAST)],
        vec![InlineKeyboardButton::callback("🚫 Ban a user", ACTION_BAN_USER)],
    ])
}

/// Broadcast entry choice: yes | no
pub fn broadcast_start() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "✅ Yes, start a broadcast",
            ACTION_START_BROADCAST,
        )],
        vec![InlineKeyboardButton::callback(
            "❌ No, cancel",
            ACTION_CANCEL_BROADCAST,
        )],
    ])
}

/// Broadcast final confirmation: yes | no
pub fn broadcast_confirmation() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "✅ Yes, send it",
            ACTION_CONFIRM_BROADCAST,
        )],
        vec![InlineKeyboardButton::callback(
            "❌ Cancel",
            ACTION_CANCEL_BROADCAST,
        )],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    fn callback_data(markup: &InlineKeyboardMarkup) -> Vec<String> {
        markup
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|button| match &button.kind {
                InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn menus_carry_the_expected_actions() {
        assert_eq!(
            callback_data(&admin_menu()),
            vec![ACTION_BROADCAST, ACTION_BAN_USER]
        );
        assert_eq!(
            callback_data(&broadcast_start()),
            vec![ACTION_START_BROADCAST, ACTION_CANCEL_BROADCAST]
        );
        assert_eq!(
            callback_data(&broadcast_confirmation()),
            vec![ACTION_CONFIRM_BROADCAST, ACTION_CANCEL_BROADCAST]
        );
    }
}
