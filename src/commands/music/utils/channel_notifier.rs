//! Discord text-channel implementation of the core `Notifier` trait.

use std::sync::Arc;

use dashmap::DashMap;
use poise::serenity_prelude as serenity;
use serenity::all::CreateMessage;
use serenity::async_trait;
use serenity::model::id::{ChannelId, GuildId, MessageId};
use tracing::warn;

use super::embedded_messages;
use crate::player::{Notifier, TrackMetadata};

/// Sends playback notifications into each guild's bound text channel and
/// remembers the latest now-playing message so it can be retracted.
pub struct ChannelNotifier {
    http: Arc<serenity::Http>,
    channels: DashMap<GuildId, ChannelId>,
    messages: DashMap<GuildId, MessageId>,
}

impl ChannelNotifier {
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self {
            http,
            channels: DashMap::new(),
            messages: DashMap::new(),
        }
    }

    /// Bind the text channel used for a guild's notifications. Called by the
    /// front-end whenever a playback command arrives.
    pub fn bind_channel(&self, guild_id: GuildId, channel_id: ChannelId) {
        self.channels.insert(guild_id, channel_id);
    }

    fn channel(&self, guild_id: GuildId) -> Option<ChannelId> {
        self.channels.get(&guild_id).map(|entry| *entry)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn now_playing(&self, guild_id: GuildId, track: &TrackMetadata) {
        let Some(channel_id) = self.channel(guild_id) else {
            return;
        };

        let message = CreateMessage::new().embed(embedded_messages::now_playing(track));
        match channel_id.send_message(self.http.clone(), message).await {
            Ok(message) => {
                self.messages.insert(guild_id, message.id);
            }
            Err(e) => warn!(
                "Failed to send now-playing message for guild {}: {}",
                guild_id, e
            ),
        }
    }

    async fn playback_error(&self, guild_id: GuildId, locator: &str, reason: &str) {
        let Some(channel_id) = self.channel(guild_id) else {
            return;
        };

        let message =
            CreateMessage::new().embed(embedded_messages::playback_error(locator, reason));
        if let Err(e) = channel_id.send_message(self.http.clone(), message).await {
            warn!(
                "Failed to send playback-error message for guild {}: {}",
                guild_id, e
            );
        }
    }

    async fn retract_now_playing(&self, guild_id: GuildId) {
        let Some((_, message_id)) = self.messages.remove(&guild_id) else {
            return;
        };
        let Some(channel_id) = self.channel(guild_id) else {
            return;
        };

        if let Err(e) = self.http.delete_message(channel_id, message_id, None).await {
            warn!(
                "Failed to retract now-playing message {} for guild {}: {}",
                message_id, guild_id, e
            );
        }
    }
}
