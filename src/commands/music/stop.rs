use super::*;

use crate::commands::music::utils::embedded_messages;
use crate::player::PlayerError;

/// Stop the music and clear the queue
#[poise::command(slash_command, category = "Music")]
pub async fn stop(ctx: Context<'_>) -> CommandResult {
    let guild_id = ctx.guild_id().ok_or_else(|| {
        Box::new(PlayerError::NotInGuild) as Box<dyn std::error::Error + Send + Sync>
    })?;

    // The queue is emptied before the device stops, so the player cannot
    // pick up a track that was queued behind the one being stopped.
    ctx.data().registry.stop_and_clear(guild_id).await;

    ctx.send(embedded_messages::success(
        "🛑 Stopped",
        "Stopped playing music and cleared the queue",
    ))
    .await?;

    Ok(())
}
