//! Message handlers module
//!
//! Routes free-text messages by the sender's conversation state: the
//! registration form steps, broadcast content staging, the ban-handle
//! prompt, and a fallback hint when no flow is active.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{ChatId, Message};
use tracing::{debug, error, info};

use crate::config::Settings;
use crate::database::UserRepository;
use crate::handlers::keyboards;
use crate::models::HANDLE_PLACEHOLDER;
use crate::services::AdminGate;
use crate::state::{BroadcastState, ConversationState, RegistrationState, SessionStore};
use crate::utils::errors::{Result, ShopcastError};

/// Numeric id of the message sender. A sender-less update is malformed
/// and must never be mapped onto a session key.
fn sender_id(from: Option<&teloxide::types::User>) -> Result<i64> {
    from.map(|u| u.id.0 as i64)
        .ok_or_else(|| ShopcastError::InvalidInput("No user in message".to_string()))
}

/// Handle an incoming non-command message
pub async fn handle_message(
    bot: Bot,
    msg: Message,
    repo: Arc<UserRepository>,
    gate: Arc<AdminGate>,
    sessions: Arc<SessionStore>,
    settings: Arc<Settings>,
) -> Result<()> {
    // Conversations only happen in private chats; admin-group chatter and
    // the like is ignored.
    if !msg.chat.id.is_user() {
        return Ok(());
    }

    let user_id = sender_id(msg.from.as_ref())?;

    debug!(user_id = user_id, "Processing message");

    match sessions.get(user_id) {
        Some(ConversationState::Registration(step)) => {
            handle_registration_step(bot, msg, step, repo, sessions, settings).await
        }
        Some(ConversationState::Broadcast(BroadcastState::AwaitingContent)) => {
            stage_broadcast_content(bot, msg, repo, sessions).await
        }
        Some(ConversationState::AwaitingBanHandle) => {
            handle_ban_handle(bot, msg, repo, sessions).await
        }
        // A message while a broadcast awaits confirmation is neither a
        // confirm nor a cancel; leave the session alone and hint at the
        // buttons via the fallback.
        Some(ConversationState::Broadcast(BroadcastState::AwaitingConfirmation { .. })) | None => {
            handle_fallback(bot, msg, gate).await
        }
    }
}

/// Advance the registration form by exactly one step.
async fn handle_registration_step(
    bot: Bot,
    msg: Message,
    step: RegistrationState,
    repo: Arc<UserRepository>,
    sessions: Arc<SessionStore>,
    settings: Arc<Settings>,
) -> Result<()> {
    let user_id = sender_id(msg.from.as_ref())?;

    let Some(text) = msg
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
    else {
        bot.send_message(msg.chat.id, "Please answer with plain text.")
            .await?;
        return Ok(());
    };

    match step {
        RegistrationState::AwaitingName => {
            sessions.set(
                user_id,
                ConversationState::Registration(RegistrationState::AwaitingCity {
                    full_name: text.to_string(),
                }),
            );
            bot.send_message(msg.chat.id, "Great! Now enter your city:")
                .await?;
        }
        RegistrationState::AwaitingCity { full_name } => {
            sessions.set(
                user_id,
                ConversationState::Registration(RegistrationState::AwaitingAddress {
                    full_name,
                    city: text.to_string(),
                }),
            );
            bot.send_message(
                msg.chat.id,
                "Now enter the address of your shop (or shops):",
            )
            .await?;
        }
        RegistrationState::AwaitingAddress { full_name, city } => {
            complete_registration(bot, msg, full_name, city, &text, repo, sessions, settings)
                .await?;
        }
    }

    Ok(())
}

/// Persist the registration, notify the admin group and acknowledge the
/// user. A failed admin notification is logged and swallowed; the
/// registration itself already succeeded.
#[allow(clippy::too_many_arguments)]
async fn complete_registration(
    bot: Bot,
    msg: Message,
    full_name: String,
    city: String,
    shop_address: &str,
    repo: Arc<UserRepository>,
    sessions: Arc<SessionStore>,
    settings: Arc<Settings>,
) -> Result<()> {
    let user = msg
        .from
        .as_ref()
        .ok_or_else(|| ShopcastError::InvalidInput("No user in message".to_string()))?;
    let user_id = user.id.0 as i64;
    let username = user.username.as_deref();

    repo.upsert(user_id, username, &full_name, &city, shop_address)
        .await?;

    info!(user_id = user_id, "Registration completed");

    let handle = username.unwrap_or(HANDLE_PLACEHOLDER);
    let admin_notification = format!(
        "🆕 New registration!\n\n\
         👤 Name: {full_name}\n\
         🌍 City: {city}\n\
         🏪 Shop address: {shop_address}\n\
         📱 Username: @{handle}\n\
         🆔 ID: {user_id}"
    );

    if let Err(e) = bot
        .send_message(ChatId(settings.bot.admin_group_id), admin_notification)
        .await
    {
        error!(user_id = user_id, error = %e, "Failed to notify admin group about registration");
    }

    bot.send_message(
        msg.chat.id,
        "✅ Registration complete!\n\nYour details were forwarded to the administrators. \
         You will now receive broadcasts from this bot.",
    )
    .await?;

    sessions.clear(user_id);
    Ok(())
}

/// Stage the admin's message for broadcasting. Only the chat/message
/// reference is kept; the content is replayed from its source chat when
/// the broadcast actually runs, so any message type works here.
async fn stage_broadcast_content(
    bot: Bot,
    msg: Message,
    repo: Arc<UserRepository>,
    sessions: Arc<SessionStore>,
) -> Result<()> {
    let user_id = sender_id(msg.from.as_ref())?;

    sessions.set(
        user_id,
        ConversationState::Broadcast(BroadcastState::AwaitingConfirmation {
            source_chat: msg.chat.id,
            message_id: msg.id,
        }),
    );

    let recipient_count = repo.count_active().await?;

    bot.send_message(
        msg.chat.id,
        format!(
            "📢 Broadcast message staged!\n\n👥 Recipients: {recipient_count}\n\nStart the broadcast?"
        ),
    )
    .reply_markup(keyboards::broadcast_confirmation())
    .await?;

    Ok(())
}

/// Ban the user owning the given handle.
async fn handle_ban_handle(
    bot: Bot,
    msg: Message,
    repo: Arc<UserRepository>,
    sessions: Arc<SessionStore>,
) -> Result<()> {
    let user_id = sender_id(msg.from.as_ref())?;

    let Some(text) = msg.text().map(str::trim).filter(|t| !t.is_empty()) else {
        bot.send_message(msg.chat.id, "Please answer with plain text.")
            .await?;
        return Ok(());
    };

    let handle = text.trim_start_matches('@');
    let banned = repo.ban_by_username(handle).await?;

    if banned {
        info!(admin_id = user_id, handle = handle, "User banned");
        bot.send_message(msg.chat.id, format!("✅ User @{handle} has been banned!"))
            .await?;
    } else {
        bot.send_message(
            msg.chat.id,
            format!("❌ User @{handle} was not found or is already banned!"),
        )
        .await?;
    }

    bot.send_message(msg.chat.id, "🎛 Admin panel\n\nChoose an action:")
        .reply_markup(keyboards::admin_menu())
        .await?;

    sessions.clear(user_id);
    Ok(())
}

/// No active flow: point the sender at /start.
async fn handle_fallback(bot: Bot, msg: Message, gate: Arc<AdminGate>) -> Result<()> {
    let user = msg
        .from
        .as_ref()
        .ok_or_else(|| ShopcastError::InvalidInput("No user in message".to_string()))?;

    if gate.is_admin(user.id).await {
        bot.send_message(msg.chat.id, "Use /start to open the admin panel.")
            .reply_markup(keyboards::admin_menu())
            .await?;
    } else {
        bot.send_message(msg.chat.id, "Use /start to begin.").await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn a_message_without_a_sender_is_rejected() {
        assert_matches!(sender_id(None), Err(ShopcastError::InvalidInput(_)));
    }
}
