//! Start command handler
//!
//! `/start` is the single entry point: it always resets the caller's
//! session, then routes to a rejection (banned), the admin menu (admin),
//! a welcome-back reply (already registered) or the registration form.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::Message;
use tracing::{debug, info};

use crate::database::UserRepository;
use crate::handlers::keyboards;
use crate::services::AdminGate;
use crate::state::{ConversationState, RegistrationState, SessionStore};
use crate::utils::errors::{Result, ShopcastError};

/// Handle the /start command
pub async fn handle_start(
    bot: Bot,
    msg: Message,
    repo: Arc<UserRepository>,
    gate: Arc<AdminGate>,
    sessions: Arc<SessionStore>,
) -> Result<()> {
    let user = msg
        .from
        .as_ref()
        .ok_or_else(|| ShopcastError::InvalidInput("No user in message".to_string()))?;

    let user_id = user.id.0 as i64;
    let chat_id = msg.chat.id;

    debug!(user_id = user_id, "Processing /start command");

    // /start always aborts whatever flow was in progress.
    sessions.clear(user_id);

    if repo.is_banned(user_id).await? {
        bot.send_message(chat_id, "❌ You are banned and cannot use this bot.")
            .await?;
        return Ok(());
    }

    if gate.is_admin(user.id).await {
        bot.send_message(chat_id, "👋 Welcome, administrator!\n\nChoose an action:")
            .reply_markup(keyboards::admin_menu())
            .await?;
        return Ok(());
    }

    if repo.find_by_telegram_id(user_id).await?.is_some() {
        bot.send_message(
            chat_id,
            "👋 Welcome back!\n\nYou are already registered.",
        )
        .await?;
        return Ok(());
    }

    info!(user_id = user_id, "New user starting registration");

    bot.send_message(
        chat_id,
        "👋 Welcome!\n\nRegistration is required before you can use this bot.\n\
         Please enter your full name:",
    )
    .await?;
    sessions.set(
        user_id,
        ConversationState::Registration(RegistrationState::AwaitingName),
    );

    Ok(())
}
