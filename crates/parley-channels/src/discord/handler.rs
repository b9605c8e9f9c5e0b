use super::adapter::DiscordAdapter;
use crate::util::mask_for_logging;
use parley_core::{ChannelKind, InboundEvent, MessageRouter};
use serenity::all::{Context, EventHandler, Message, Ready};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{debug, info};

/// Discord event handler
pub struct DiscordHandler {
    adapter: Arc<DiscordAdapter>,
    router: Arc<MessageRouter>,
}

impl DiscordHandler {
    /// Create a new Discord event handler.
    pub fn new(adapter: Arc<DiscordAdapter>, router: Arc<MessageRouter>) -> Self {
        Self { adapter, router }
    }
}

/// Convert a serenity message into the router's event shape
pub(crate) fn to_inbound(msg: &Message) -> InboundEvent {
    InboundEvent {
        message_id: msg.id.get().to_string(),
        author_id: msg.author.id.get().to_string(),
        channel_id: msg.channel_id.get().to_string(),
        content: msg.content.clone(),
        mentions: msg.mentions.iter().map(|u| u.id.get().to_string()).collect(),
    }
}

#[serenity::async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("Discord bot connected as {}", ready.user.name);

        self.adapter
            .bot_user_id
            .store(ready.user.id.get(), Ordering::SeqCst);
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        // Guild messages are never direct; DMs still go through the lookup
        if msg.guild_id.is_some() {
            self.adapter
                .remember_channel_kind(msg.channel_id.get(), ChannelKind::Group)
                .await;
        }

        let event = to_inbound(&msg);
        debug!(
            channel_id = %event.channel_id,
            user_id = %event.author_id,
            text = %mask_for_logging(&event.content),
            "Received Discord message"
        );

        let outcome = self.router.handle(self.adapter.as_ref(), event).await;
        debug!(?outcome, "Discord message handled");
    }
}
