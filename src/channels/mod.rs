//! Outbound notification channels.

pub mod telegram;

pub use telegram::TelegramNotifier;

use async_trait::async_trait;

use crate::error::ChannelError;

/// Something that can deliver a text message to the operator.
///
/// No deduplication happens here: two calls with the same text send twice.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    async fn notify(&self, text: &str) -> Result<(), ChannelError>;
}

/// Send `text`, logging instead of returning any failure.
///
/// Returns whether the message went out.
pub async fn deliver(notifier: &dyn Notifier, text: &str) -> bool {
    tracing::info!(channel = notifier.name(), "Sending message");
    match notifier.notify(text).await {
        Ok(()) => {
            tracing::info!(channel = notifier.name(), message = %text, "Message sent");
            true
        }
        Err(e) => {
            tracing::warn!(channel = notifier.name(), "Notification failed: {e}");
            false
        }
    }
}
