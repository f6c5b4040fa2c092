//! Voice-connection plumbing shared by the music commands.

use std::sync::Arc;

use poise::serenity_prelude as serenity;
use serenity::client::Context;
use serenity::model::id::{ChannelId, GuildId, UserId};
use serenity::prelude::Mutex as SerenityMutex;
use songbird::{Call, Songbird};

use crate::player::{PlayerError, PlayerResult};

/// Get the songbird voice client registered at startup.
pub async fn manager(ctx: &Context) -> PlayerResult<Arc<Songbird>> {
    songbird::get(ctx).await.ok_or(PlayerError::NoVoiceManager)
}

/// The voice channel the user currently occupies, if any.
pub fn user_voice_channel(
    ctx: &Context,
    guild_id: GuildId,
    user_id: UserId,
) -> PlayerResult<ChannelId> {
    let guild = ctx.cache.guild(guild_id).ok_or(PlayerError::NotInGuild)?;

    let voice_state = guild
        .voice_states
        .get(&user_id)
        .ok_or(PlayerError::UserNotInVoiceChannel)?;

    voice_state
        .channel_id
        .ok_or(PlayerError::UserNotInVoiceChannel)
}

/// Join `channel_id`, or return the existing call when already connected to
/// this guild.
pub async fn join(
    ctx: &Context,
    guild_id: GuildId,
    channel_id: ChannelId,
) -> PlayerResult<Arc<SerenityMutex<Call>>> {
    let manager = manager(ctx).await?;

    if let Some(call) = manager.get(guild_id) {
        return Ok(call);
    }

    manager
        .join(guild_id, channel_id)
        .await
        .map_err(|e| PlayerError::JoinError(e.to_string()))
}
