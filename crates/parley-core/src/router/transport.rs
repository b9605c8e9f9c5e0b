//! Transport seam between the router and a chat platform

use super::trigger::ChannelKind;
use crate::error::Result;

/// Outbound half of a chat platform, plus the lookups routing needs
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// The bot's own user id
    fn bot_user_id(&self) -> String;

    /// Resolve whether `channel_id` is a direct or group channel
    async fn channel_kind(&self, channel_id: &str) -> Result<ChannelKind>;

    /// Show a transient typing indicator
    async fn send_typing(&self, channel_id: &str) -> Result<()>;

    /// Post `text` to the channel without threading
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<()>;

    /// Post `text` as a reply to `reply_to`
    async fn send_reply(&self, channel_id: &str, reply_to: &str, text: &str) -> Result<()>;
}
