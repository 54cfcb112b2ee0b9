//! Broadcast delivery engine
//!
//! Replays one staged message to a snapshot of recipients, reporting every
//! delivery individually and a tally at the end. Delivery goes through the
//! `Courier` trait so the engine can be exercised without the Telegram API.

use std::time::Duration;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId};
use teloxide::{ApiError, RequestError};
use thiserror::Error;
use tracing::info;

use crate::models::User;
use crate::utils::errors::Result;

/// Pause after every delivery attempt to stay under platform rate limits.
pub const DELIVERY_PAUSE: Duration = Duration::from_millis(100);

/// Why a single recipient could not be reached.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The platform refused this recipient (blocked bot, deactivated
    /// account, chat not found). The reason is safe to show to the admin.
    #[error("{0}")]
    Rejected(String),
    /// Anything else. The reason is suppressed in reports.
    #[error("unknown error")]
    Unknown,
}

/// Delivery seam between the engine and the messaging platform.
#[async_trait]
pub trait Courier: Send + Sync {
    /// Replay the staged message from its source chat to one recipient.
    async fn deliver(
        &self,
        recipient: ChatId,
        source_chat: ChatId,
        message_id: MessageId,
    ) -> std::result::Result<(), DeliveryError>;

    /// Send a progress line to the admin running the broadcast.
    async fn report(&self, text: String) -> Result<()>;
}

/// Final tally of one broadcast run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BroadcastOutcome {
    pub delivered: u32,
    pub failed: u32,
    pub total: u32,
}

/// Deliver the staged message to every recipient in snapshot order.
///
/// A failed recipient never aborts the run; there is no retry and no
/// resume. Reporting failures do propagate, since without them the admin
/// is blind anyway.
pub async fn run_broadcast<C: Courier>(
    courier: &C,
    recipients: &[User],
    source_chat: ChatId,
    message_id: MessageId,
) -> Result<BroadcastOutcome> {
    let mut outcome = BroadcastOutcome {
        total: recipients.len() as u32,
        ..Default::default()
    };

    info!(recipients = recipients.len(), "Broadcast run started");

    for user in recipients {
        let label = format!("{} (@{})", user.full_name, user.handle());

        match courier
            .deliver(ChatId(user.user_id), source_chat, message_id)
            .await
        {
            Ok(()) => {
                outcome.delivered += 1;
                courier.report(format!("✅ {label}: delivered")).await?;
            }
            Err(DeliveryError::Rejected(reason)) => {
                outcome.failed += 1;
                courier
                    .report(format!("❌ {label}: failed: {reason}"))
                    .await?;
            }
            Err(DeliveryError::Unknown) => {
                outcome.failed += 1;
                courier
                    .report(format!("❌ {label}: failed: unknown error"))
                    .await?;
            }
        }

        tokio::time::sleep(DELIVERY_PAUSE).await;
    }

    courier
        .report(format!(
            "📊 Broadcast finished!\n\n✅ Delivered: {}\n❌ Failed: {}\n👥 Total: {}",
            outcome.delivered, outcome.failed, outcome.total
        ))
        .await?;

    info!(
        delivered = outcome.delivered,
        failed = outcome.failed,
        total = outcome.total,
        "Broadcast run finished"
    );

    Ok(outcome)
}

/// Production courier backed by the Telegram API. Progress lines go to the
/// chat of the admin who confirmed the broadcast.
pub struct TelegramCourier {
    bot: Bot,
    progress_chat: ChatId,
}

impl TelegramCourier {
    pub fn new(bot: Bot, progress_chat: ChatId) -> Self {
        Self { bot, progress_chat }
    }
}

#[async_trait]
impl Courier for TelegramCourier {
    async fn deliver(
        &self,
        recipient: ChatId,
        source_chat: ChatId,
        message_id: MessageId,
    ) -> std::result::Result<(), DeliveryError> {
        self.bot
            .copy_message(recipient, source_chat, message_id)
            .await
            .map(|_| ())
            .map_err(classify_delivery_error)
    }

    async fn report(&self, text: String) -> Result<()> {
        self.bot.send_message(self.progress_chat, text).await?;
        Ok(())
    }
}

/// Distinguish recipient-side platform rejections, whose reason is shown
/// to the admin, from everything else, whose reason is suppressed.
fn classify_delivery_error(error: RequestError) -> DeliveryError {
    match error {
        RequestError::Api(
            api @ (ApiError::BotBlocked | ApiError::UserDeactivated | ApiError::ChatNotFound),
        ) => DeliveryError::Rejected(api.to_string()),
        _ => DeliveryError::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn recognized_rejections_keep_their_reason() {
        assert_matches!(
            classify_delivery_error(RequestError::Api(ApiError::BotBlocked)),
            DeliveryError::Rejected(_)
        );
        assert_matches!(
            classify_delivery_error(RequestError::Api(ApiError::UserDeactivated)),
            DeliveryError::Rejected(_)
        );
        assert_matches!(
            classify_delivery_error(RequestError::Api(ApiError::ChatNotFound)),
            DeliveryError::Rejected(_)
        );
    }

    #[test]
    fn other_api_errors_are_suppressed() {
        assert_matches!(
            classify_delivery_error(RequestError::Api(ApiError::MessageNotModified)),
            DeliveryError::Unknown
        );
    }
}
