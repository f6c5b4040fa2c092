use super::*;
use std::sync::Arc;

use poise::CreateReply;
use tracing::info;

use crate::commands::music::utils::{embedded_messages, voice, voice_device::SongbirdDevice};
use crate::player::{PlayerError, QueueEntry};

/// Play a track from a URL or search query
#[poise::command(slash_command, category = "Music")]
pub async fn play(
    ctx: Context<'_>,
    #[description = "URL or search query"] query: String,
) -> CommandResult {
    info!("Received play command with query: {}", query);
    let guild_id = ctx.guild_id().ok_or_else(|| {
        Box::new(PlayerError::NotInGuild) as Box<dyn std::error::Error + Send + Sync>
    })?;

    // The requester has to be in a voice channel for us to know where to go.
    let channel_id =
        match voice::user_voice_channel(ctx.serenity_context(), guild_id, ctx.author().id) {
            Ok(channel_id) => channel_id,
            Err(err) => {
                ctx.send(
                    embedded_messages::error(format!("You need to be in a voice channel: {}", err))
                        .ephemeral(true),
                )
                .await?;
                return Ok(());
            }
        };

    // Resolution can take a while; let Discord know we're working on it.
    ctx.defer().await?;

    let call = match voice::join(ctx.serenity_context(), guild_id, channel_id).await {
        Ok(call) => call,
        Err(err) => {
            ctx.send(embedded_messages::error(format!(
                "Failed to join voice channel: {}",
                err
            )))
            .await?;
            return Ok(());
        }
    };

    let manager = voice::manager(ctx.serenity_context()).await?;
    let data = ctx.data();

    // Playback notifications for this guild go to the channel the command
    // came from.
    data.notifier.bind_channel(guild_id, ctx.channel_id());

    // Resolve eagerly so the reply can name the track; raw locators queued
    // through other paths are resolved lazily by the coordinator instead.
    let track = match data.registry.resolver().resolve(&query).await {
        Ok(mut track) => {
            track.requested_by = Some(ctx.author().name.clone());
            track
        }
        Err(err) => {
            ctx.send(embedded_messages::error(format!(
                "Failed to process audio source: {}",
                err
            )))
            .await?;
            return Ok(());
        }
    };

    let device = Arc::new(SongbirdDevice::new(manager, guild_id, call));
    let position = data
        .registry
        .enqueue(guild_id, QueueEntry::Track(track.clone()), device)
        .await?;

    ctx.send(CreateReply::default().embed(embedded_messages::added_to_queue(&track, position)))
        .await?;

    Ok(())
}
