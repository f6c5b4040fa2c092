//! The playback device abstraction: one audio output sink per guild.

use serenity::async_trait;

use super::signal::TrackEndSignal;
use super::track_metadata::TrackMetadata;
use super::PlayerResult;

/// An audio output bound to one guild's playback session.
///
/// `play` must fire `on_end` exactly once per call, whether the track
/// finishes naturally, is stopped, or errors; `stop` triggers that same
/// signal, so the coordinator never distinguishes the two. Implementations
/// must tolerate `disconnect` being called more than once.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaybackDevice: Send + Sync {
    /// Start streaming `track` at `volume`. Returns an error only when
    /// playback could not be started at all; failures after a successful
    /// start are reported through `on_end`.
    async fn play(
        &self,
        track: &TrackMetadata,
        volume: f32,
        on_end: TrackEndSignal,
    ) -> PlayerResult<()>;

    /// Stop the current track, if any.
    async fn stop(&self);

    async fn is_playing(&self) -> bool;

    /// Tear down the output connection. Idempotent.
    async fn disconnect(&self);
}
