use super::*;

use crate::commands::music::utils::embedded_messages;
use crate::player::PlayerError;

/// Leave the voice channel
#[poise::command(slash_command, category = "Music")]
pub async fn leave(ctx: Context<'_>) -> CommandResult {
    let guild_id = ctx.guild_id().ok_or_else(|| {
        Box::new(PlayerError::NotInGuild) as Box<dyn std::error::Error + Send + Sync>
    })?;

    // Tears down the whole player: pending queue entries are discarded, the
    // voice connection is dropped, and the coordinator loop is cancelled.
    // Idempotent, so leaving twice is fine.
    ctx.data().registry.leave(guild_id).await;

    ctx.send(embedded_messages::success(
        "👋 Left",
        "Left the voice channel",
    ))
    .await?;

    Ok(())
}
