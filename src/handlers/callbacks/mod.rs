//! Callback query handlers module
//!
//! Routes the inline keyboard actions: the admin menu entries and the
//! broadcast start/confirm/cancel choices. The admin check runs fresh on
//! every menu entry so a revoked membership takes effect immediately.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, ChatId, InlineKeyboardMarkup, MessageId};
use tracing::{info, warn};

use crate::database::UserRepository;
use crate::handlers::keyboards::{
    self, ACTION_BAN_USER, ACTION_BROADCAST, ACTION_CANCEL_BROADCAST, ACTION_CONFIRM_BROADCAST,
    ACTION_START_BROADCAST,
};
use crate::services::{broadcast, AdminGate, TelegramCourier};
use crate::state::{BroadcastState, ConversationState, SessionStore};
use crate::utils::errors::Result;

/// Main callback query dispatcher
pub async fn handle_callback_query(
    bot: Bot,
    query: CallbackQuery,
    repo: Arc<UserRepository>,
    gate: Arc<AdminGate>,
    sessions: Arc<SessionStore>,
) -> Result<()> {
    let user_id = query.from.id.0 as i64;

    let Some(data) = query.data.clone() else {
        bot.answer_callback_query(query.id.clone()).await?;
        return Ok(());
    };

    info!(user_id = user_id, action = %data, "Processing callback query");

    match data.as_str() {
        ACTION_BROADCAST => {
            if !require_admin(&bot, &query, &gate).await? {
                return Ok(());
            }
            bot.answer_callback_query(query.id.clone()).await?;
            edit_or_send(
                &bot,
                &query,
                "📢 Broadcast\n\nSend a message to every registered user?",
                Some(keyboards::broadcast_start()),
            )
            .await?;
        }
        ACTION_START_BROADCAST => {
            bot.answer_callback_query(query.id.clone()).await?;
            edit_or_send(&bot, &query, "📝 Enter the message to broadcast:", None).await?;
            sessions.set(
                user_id,
                ConversationState::Broadcast(BroadcastState::AwaitingContent),
            );
        }
        ACTION_CONFIRM_BROADCAST => {
            confirm_broadcast(bot, query, repo, sessions).await?;
        }
        ACTION_CANCEL_BROADCAST => {
            bot.answer_callback_query(query.id.clone()).await?;
            sessions.clear(user_id);
            edit_or_send(
                &bot,
                &query,
                "❌ Broadcast cancelled.\n\nChoose an action:",
                Some(keyboards::admin_menu()),
            )
            .await?;
        }
        ACTION_BAN_USER => {
            if !require_admin(&bot, &query, &gate).await? {
                return Ok(());
            }
            bot.answer_callback_query(query.id.clone()).await?;
            edit_or_send(
                &bot,
                &query,
                "🚫 Ban a user\n\nEnter the username (with or without @):",
                None,
            )
            .await?;
            sessions.set(user_id, ConversationState::AwaitingBanHandle);
        }
        other => {
            warn!(user_id = user_id, action = %other, "Unknown callback action");
            bot.answer_callback_query(query.id.clone()).await?;
        }
    }

    Ok(())
}

/// Run the staged broadcast. Requires the session to hold a staged message
/// reference; otherwise only an inline error notice is shown and the
/// session is left untouched so the admin can cancel or retry.
async fn confirm_broadcast(
    bot: Bot,
    query: CallbackQuery,
    repo: Arc<UserRepository>,
    sessions: Arc<SessionStore>,
) -> Result<()> {
    let user_id = query.from.id.0 as i64;

    let Some((source_chat, message_id)) = staged_broadcast(sessions.get(user_id)) else {
        bot.answer_callback_query(query.id.clone())
            .text("❌ Error: broadcast message not found!")
            .await?;
        return Ok(());
    };

    bot.answer_callback_query(query.id.clone()).await?;
    edit_or_send(&bot, &query, "🚀 Broadcast started! Sending messages...", None).await?;

    // Snapshot taken once; users banned while the run is in flight still
    // receive the message.
    let recipients = repo.list_active().await?;

    info!(
        admin_id = user_id,
        recipients = recipients.len(),
        "Broadcast confirmed"
    );

    let progress_chat = query_chat(&query).unwrap_or(ChatId(user_id));
    let courier = TelegramCourier::new(bot.clone(), progress_chat);
    broadcast::run_broadcast(&courier, &recipients, source_chat, message_id).await?;

    bot.send_message(progress_chat, "🎛 Admin panel\n\nChoose an action:")
        .reply_markup(keyboards::admin_menu())
        .await?;

    sessions.clear(user_id);
    Ok(())
}

/// Fresh admin check for a menu action; rejects with an inline ephemeral
/// notice on failure.
async fn require_admin(bot: &Bot, query: &CallbackQuery, gate: &AdminGate) -> Result<bool> {
    if gate.is_admin(query.from.id).await {
        return Ok(true);
    }

    warn!(user_id = query.from.id.0, "Admin action rejected");
    bot.answer_callback_query(query.id.clone())
        .text("❌ You do not have admin rights!")
        .await?;
    Ok(false)
}

/// Edit the menu message the button lives on; fall back to a fresh message
/// when the original is inaccessible.
async fn edit_or_send(
    bot: &Bot,
    query: &CallbackQuery,
    text: &str,
    keyboard: Option<InlineKeyboardMarkup>,
) -> Result<()> {
    match query_message(query) {
        Some((chat_id, message_id)) => {
            let request = bot.edit_message_text(chat_id, message_id, text);
            match keyboard {
                Some(kb) => request.reply_markup(kb).await?,
                None => request.await?,
            };
        }
        None => {
            let chat_id = ChatId(query.from.id.0 as i64);
            let request = bot.send_message(chat_id, text);
            match keyboard {
                Some(kb) => request.reply_markup(kb).await?,
                None => request.await?,
            };
        }
    }

    Ok(())
}

fn query_message(query: &CallbackQuery) -> Option<(ChatId, MessageId)> {
    match query.message.as_ref() {
        Some(teloxide::types::MaybeInaccessibleMessage::Regular(message)) => {
            Some((message.chat.id, message.id))
        }
        _ => None,
    }
}

fn query_chat(query: &CallbackQuery) -> Option<ChatId> {
    query.message.as_ref().map(|m| m.chat().id)
}

/// Staged message reference, if and only if the session is at the
/// confirmation step. Anything else means confirm must not deliver.
fn staged_broadcast(state: Option<ConversationState>) -> Option<(ChatId, MessageId)> {
    match state {
        Some(ConversationState::Broadcast(BroadcastState::AwaitingConfirmation {
            source_chat,
            message_id,
        })) => Some((source_chat, message_id)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::RegistrationState;

    #[test]
    fn confirm_requires_a_staged_message() {
        assert_eq!(
            staged_broadcast(Some(ConversationState::Broadcast(
                BroadcastState::AwaitingConfirmation {
                    source_chat: ChatId(77),
                    message_id: MessageId(42),
                }
            ))),
            Some((ChatId(77), MessageId(42)))
        );
    }

    #[test]
    fn confirm_without_a_session_never_delivers() {
        assert_eq!(staged_broadcast(None), None);
    }

    #[test]
    fn confirm_in_any_other_state_never_delivers() {
        // Content not yet staged
        assert_eq!(
            staged_broadcast(Some(ConversationState::Broadcast(
                BroadcastState::AwaitingContent
            ))),
            None
        );
        // Unrelated flows
        assert_eq!(
            staged_broadcast(Some(ConversationState::Registration(
                RegistrationState::AwaitingName
            ))),
            None
        );
        assert_eq!(
            staged_broadcast(Some(ConversationState::AwaitingBanHandle)),
            None
        );
    }
}
