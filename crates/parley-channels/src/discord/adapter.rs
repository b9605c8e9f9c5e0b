use super::config::DiscordConfig;
use super::handler::DiscordHandler;
use crate::error::{Error, Result};
use crate::util::parse_id;

use parley_core::{ChannelKind, MessageRouter, Transport};
use serenity::all::{
    Channel, ChannelId, Client, CreateMessage, GatewayIntents, MessageId, MessageReference,
};
use serenity::http::Http;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Channel kinds remembered before the cache is reset
pub(crate) const MAX_CACHED_CHANNELS: usize = 10_000;

/// Discord bot adapter
pub struct DiscordAdapter {
    pub(crate) config: DiscordConfig,
    pub(crate) bot_user_id: AtomicU64,
    http: RwLock<Option<Arc<Http>>>,
    channel_kinds: RwLock<HashMap<u64, ChannelKind>>,
}

impl DiscordAdapter {
    /// Create a new Discord adapter
    #[must_use]
    pub fn new(config: DiscordConfig) -> Self {
        Self {
            config,
            bot_user_id: AtomicU64::new(0),
            http: RwLock::new(None),
            channel_kinds: RwLock::new(HashMap::new()),
        }
    }

    /// Connect to the gateway and dispatch messages to `router` until
    /// `shutdown` fires. In-flight turns are not awaited.
    #[instrument(skip(self, router, shutdown))]
    pub async fn run(
        self: Arc<Self>,
        router: Arc<MessageRouter>,
        shutdown: CancellationToken,
    ) -> Result<()> {
        info!("Starting Discord bot");

        let intents = GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        let handler = DiscordHandler::new(self.clone(), router);

        let mut client = Client::builder(&self.config.bot_token, intents)
            .event_handler(handler)
            .await
            .map_err(|e| Error::Discord(format!("Failed to create client: {}", e)))?;

        {
            let mut http_guard = self.http.write().await;
            *http_guard = Some(client.http.clone());
        }

        let shard_manager = client.shard_manager.clone();
        tokio::spawn(async move {
            shutdown.cancelled().await;
            info!("Closing Discord gateway");
            shard_manager.shutdown_all().await;
        });

        client
            .start()
            .await
            .map_err(|e| Error::Discord(format!("Client error: {}", e)))?;

        info!("Discord bot stopped");
        Ok(())
    }

    /// Record a channel kind learned from an incoming event
    ///
    /// The cache is cleared once it reaches [`MAX_CACHED_CHANNELS`]; evicted
    /// kinds are re-learned from the next event or a REST lookup.
    pub(crate) async fn remember_channel_kind(&self, channel_id: u64, kind: ChannelKind) {
        let mut kinds = self.channel_kinds.write().await;
        if kinds.len() >= MAX_CACHED_CHANNELS && !kinds.contains_key(&channel_id) {
            debug!(cached = kinds.len(), "Channel kind cache full, clearing");
            kinds.clear();
        }
        kinds.insert(channel_id, kind);
    }

    async fn http(&self) -> Result<Arc<Http>> {
        self.http.read().await.clone().ok_or(Error::NotConnected)
    }

    async fn resolve_channel_kind(&self, channel_id: u64) -> Result<ChannelKind> {
        if let Some(kind) = self.channel_kinds.read().await.get(&channel_id) {
            return Ok(*kind);
        }

        let http = self.http().await?;
        let channel = ChannelId::new(channel_id)
            .to_channel(&http)
            .await
            .map_err(|e| Error::Discord(format!("Failed to fetch channel: {}", e)))?;

        let kind = match channel {
            Channel::Private(_) => ChannelKind::Direct,
            _ => ChannelKind::Group,
        };
        debug!(channel_id, ?kind, "Resolved channel kind");
        self.remember_channel_kind(channel_id, kind).await;
        Ok(kind)
    }

    async fn send(&self, channel_id: &str, reply_to: Option<&str>, text: &str) -> Result<()> {
        let channel_id = parse_id(channel_id, "channel")?;
        let http = self.http().await?;
        let channel = ChannelId::new(channel_id);

        let mut builder = CreateMessage::new().content(text);
        if let Some(reply_to) = reply_to {
            let msg_id = parse_id(reply_to, "message")?;
            builder = builder.reference_message(MessageReference::from((
                channel,
                MessageId::new(msg_id),
            )));
        }

        channel
            .send_message(&http, builder)
            .await
            .map_err(|e| Error::Discord(format!("Failed to send message: {}", e)))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Transport for DiscordAdapter {
    fn bot_user_id(&self) -> String {
        self.bot_user_id.load(Ordering::SeqCst).to_string()
    }

    async fn channel_kind(&self, channel_id: &str) -> parley_core::Result<ChannelKind> {
        let id = parse_id(channel_id, "channel")?;
        Ok(self.resolve_channel_kind(id).await?)
    }

    async fn send_typing(&self, channel_id: &str) -> parley_core::Result<()> {
        let id = parse_id(channel_id, "channel")?;
        let http = self.http().await?;
        ChannelId::new(id)
            .broadcast_typing(&http)
            .await
            .map_err(|e| Error::Discord(format!("Failed to send typing: {}", e)))?;
        Ok(())
    }

    async fn send_message(&self, channel_id: &str, text: &str) -> parley_core::Result<()> {
        Ok(self.send(channel_id, None, text).await?)
    }

    async fn send_reply(
        &self,
        channel_id: &str,
        reply_to: &str,
        text: &str,
    ) -> parley_core::Result<()> {
        Ok(self.send(channel_id, Some(reply_to), text).await?)
    }
}
