use super::*;

use crate::commands::music::utils::embedded_messages;
use crate::player::{PlayerError, SkipOutcome};

/// Skip the currently playing track
#[poise::command(slash_command, category = "Music")]
pub async fn skip(ctx: Context<'_>) -> CommandResult {
    let guild_id = ctx.guild_id().ok_or_else(|| {
        Box::new(PlayerError::NotInGuild) as Box<dyn std::error::Error + Send + Sync>
    })?;

    let reply = match ctx.data().registry.skip(guild_id).await {
        SkipOutcome::Skipped => {
            embedded_messages::success("⏭️ Skipped Track", "Skipped to the next track")
        }
        SkipOutcome::NotPlaying => {
            embedded_messages::error("Not playing any music right now.").ephemeral(true)
        }
        SkipOutcome::NoPlayer => {
            embedded_messages::error("Not connected to a voice channel.").ephemeral(true)
        }
    };

    ctx.send(reply).await?;

    Ok(())
}
