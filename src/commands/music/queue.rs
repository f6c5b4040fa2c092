use super::*;
use poise::CreateReply;

use crate::commands::music::utils::embedded_messages;
use crate::player::PlayerError;

/// View the current music queue
#[poise::command(slash_command, category = "Music")]
pub async fn queue(ctx: Context<'_>) -> CommandResult {
    let guild_id = ctx.guild_id().ok_or_else(|| {
        Box::new(PlayerError::NotInGuild) as Box<dyn std::error::Error + Send + Sync>
    })?;

    let registry = &ctx.data().registry;
    let current = registry.current_track(guild_id).await;
    let upcoming = registry.queue_snapshot(guild_id).await;

    ctx.send(CreateReply::default().embed(embedded_messages::queue_list(&current, &upcoming)))
        .await?;

    Ok(())
}
