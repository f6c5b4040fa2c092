use super::*;

use crate::commands::music::utils::embedded_messages;
use crate::player::PlayerError;

/// Queue the current track to play again
#[poise::command(slash_command, category = "Music", rename = "loop")]
pub async fn loop_track(ctx: Context<'_>) -> CommandResult {
    let guild_id = ctx.guild_id().ok_or_else(|| {
        Box::new(PlayerError::NotInGuild) as Box<dyn std::error::Error + Send + Sync>
    })?;

    // Re-queues the current track's URL as a raw locator; it resolves
    // freshly when it reaches the front again.
    let reply = match ctx.data().registry.loop_current(guild_id).await {
        Ok(title) => embedded_messages::success(
            "🔁 Looping",
            format!("Looping current song: {}", title),
        ),
        Err(_) => embedded_messages::error("No song is currently playing.").ephemeral(true),
    };

    ctx.send(reply).await?;

    Ok(())
}
