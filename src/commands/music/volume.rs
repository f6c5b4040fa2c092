use super::*;

use crate::commands::music::utils::embedded_messages;
use crate::player::PlayerError;

/// Set the playback volume for this server
#[poise::command(slash_command, category = "Music")]
pub async fn volume(
    ctx: Context<'_>,
    #[description = "Volume percentage"]
    #[min = 0]
    #[max = 100]
    level: u32,
) -> CommandResult {
    let guild_id = ctx.guild_id().ok_or_else(|| {
        Box::new(PlayerError::NotInGuild) as Box<dyn std::error::Error + Send + Sync>
    })?;

    let reply = match ctx
        .data()
        .registry
        .set_volume(guild_id, level as f32 / 100.0)
        .await
    {
        Ok(applied) => embedded_messages::success(
            "🔊 Volume",
            format!(
                "Volume set to {}%, starting with the next track",
                (applied * 100.0).round() as u32
            ),
        ),
        Err(_) => embedded_messages::error("Nothing is playing on this server.").ephemeral(true),
    };

    ctx.send(reply).await?;

    Ok(())
}
