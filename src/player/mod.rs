//! Per-guild sequential playback coordination.
//!
//! Each guild gets exactly one [`PlayerState`] and one coordinator loop that
//! drains its queue, resolves raw locators on demand, drives the guild's
//! [`PlaybackDevice`] one track at a time, and tears the whole thing down
//! after a configurable stretch of inactivity. The Discord/voice specifics
//! live behind the collaborator traits so the coordination logic stays
//! independent of the transport.

pub(crate) mod coordinator;
pub mod device;
pub mod notifier;
pub mod registry;
pub mod resolver;
pub mod signal;
pub mod state;
pub mod track_metadata;

use std::env;
use std::time::Duration;

use thiserror::Error;

pub use device::PlaybackDevice;
pub use notifier::Notifier;
pub use registry::{PlayerRegistry, SkipOutcome};
pub use resolver::MediaResolver;
pub use signal::TrackEndSignal;
pub use state::PlayerState;
pub use track_metadata::{QueueEntry, TrackMetadata};

/// Errors that can occur during playback operations
#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("Not in a guild")]
    NotInGuild,

    #[error("Failed to join voice channel: {0}")]
    JoinError(String),

    #[error("Failed to get voice manager")]
    NoVoiceManager,

    #[error("User is not in a voice channel")]
    UserNotInVoiceChannel,

    #[error("Track not found: {0}")]
    TrackNotFound(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Audio source error: {0}")]
    AudioSourceError(String),

    #[error("Playback error: {0}")]
    PlaybackError(String),

    #[error("No track is currently playing")]
    NothingPlaying,

    #[error("Player is shutting down")]
    PlayerClosed,
}

/// Result type for playback operations
pub type PlayerResult<T> = Result<T, PlayerError>;

/// Tunables shared by every per-guild player.
#[derive(Debug, Clone, Copy)]
pub struct PlayerSettings {
    /// How long the coordinator waits on an empty queue before tearing the
    /// player down.
    pub idle_timeout: Duration,
    /// Volume applied to a guild's tracks until changed, in `[0, 1]`.
    pub default_volume: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(300),
            default_volume: 0.5,
        }
    }
}

impl PlayerSettings {
    /// Read settings from the environment, falling back to the defaults for
    /// anything missing or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let idle_timeout = env::var("IDLE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.idle_timeout);

        let default_volume = env::var("DEFAULT_VOLUME")
            .ok()
            .and_then(|v| v.parse::<f32>().ok())
            .map(state::clamp_volume)
            .unwrap_or(defaults.default_volume);

        Self {
            idle_timeout,
            default_volume,
        }
    }
}
