//! Fire-and-forget playback notifications toward the front-end.

use serenity::async_trait;
use serenity::model::id::GuildId;

use super::track_metadata::TrackMetadata;

/// Receives playback events for delivery to the guild's text channel.
///
/// Delivery is best-effort: implementations swallow their own failures and
/// never propagate them back into the coordinator loop.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Announce the track that just started playing.
    async fn now_playing(&self, guild_id: GuildId, track: &TrackMetadata);

    /// Report a failed resolution or playback attempt.
    async fn playback_error(&self, guild_id: GuildId, locator: &str, reason: &str);

    /// Best-effort removal of the last now-playing announcement.
    async fn retract_now_playing(&self, guild_id: GuildId);
}
