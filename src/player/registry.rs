//! Guild-to-player map with atomic find-or-create, plus the operations the
//! command front-end calls into.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serenity::model::id::GuildId;
use tracing::{debug, info};

use super::coordinator::{self, DestroyOrigin, PlayerMap};
use super::device::PlaybackDevice;
use super::notifier::Notifier;
use super::resolver::MediaResolver;
use super::state::PlayerState;
use super::track_metadata::{QueueEntry, TrackMetadata};
use super::{PlayerError, PlayerResult, PlayerSettings};

/// Outcome of a skip request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipOutcome {
    /// The current track was stopped; the loop advances to the next entry.
    Skipped,
    /// A player exists but nothing is playing right now.
    NotPlaying,
    /// No player exists for this guild.
    NoPlayer,
}

/// Owns every active per-guild player and the collaborators their loops
/// share. The map is the only structure touched across guilds; each value is
/// owned by exactly one coordinator loop.
pub struct PlayerRegistry {
    players: PlayerMap,
    resolver: Arc<dyn MediaResolver>,
    notifier: Arc<dyn Notifier>,
    settings: PlayerSettings,
}

impl PlayerRegistry {
    pub fn new(
        resolver: Arc<dyn MediaResolver>,
        notifier: Arc<dyn Notifier>,
        settings: PlayerSettings,
    ) -> Self {
        Self {
            players: Arc::new(DashMap::new()),
            resolver,
            notifier,
            settings,
        }
    }

    /// The resolver shared by the coordinator loops, for front-ends that want
    /// to resolve eagerly before enqueueing.
    pub fn resolver(&self) -> Arc<dyn MediaResolver> {
        self.resolver.clone()
    }

    /// Find the player for `guild_id`, or create it and spawn its coordinator
    /// loop. Concurrent callers for an unseen guild observe exactly one
    /// creation; the `device` of every other caller is dropped unused.
    pub fn get_or_create(
        &self,
        guild_id: GuildId,
        device: Arc<dyn PlaybackDevice>,
    ) -> Arc<PlayerState> {
        match self.players.entry(guild_id) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                info!("Creating player for guild {}", guild_id);
                let state = Arc::new(PlayerState::new(
                    guild_id,
                    device,
                    self.settings.default_volume,
                ));
                let task = coordinator::spawn(
                    self.players.clone(),
                    state.clone(),
                    self.resolver.clone(),
                    self.notifier.clone(),
                    self.settings,
                );
                state.store_loop_task(task);
                entry.insert(state.clone());
                state
            }
        }
    }

    pub fn get(&self, guild_id: GuildId) -> Option<Arc<PlayerState>> {
        self.players.get(&guild_id).map(|entry| entry.clone())
    }

    pub fn contains(&self, guild_id: GuildId) -> bool {
        self.players.contains_key(&guild_id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Append an entry to the guild's queue, creating the player on first
    /// use. Returns the queue length after the append. Never blocks on
    /// resolution or playback. A player caught mid-teardown is skipped past
    /// by retrying against a fresh one.
    pub async fn enqueue(
        &self,
        guild_id: GuildId,
        entry: QueueEntry,
        device: Arc<dyn PlaybackDevice>,
    ) -> PlayerResult<usize> {
        loop {
            let state = self.get_or_create(guild_id, device.clone());
            match state.push(entry.clone()).await {
                Ok(len) => return Ok(len),
                Err(PlayerError::PlayerClosed) => {
                    debug!(
                        "Player for guild {} closed mid-enqueue, retrying",
                        guild_id
                    );
                    self.players
                        .remove_if(&guild_id, |_, existing| Arc::ptr_eq(existing, &state));
                    tokio::task::yield_now().await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Read-only copy of the guild's pending queue; empty when no player
    /// exists.
    pub async fn queue_snapshot(&self, guild_id: GuildId) -> Vec<QueueEntry> {
        match self.get(guild_id) {
            Some(state) => state.snapshot().await,
            None => Vec::new(),
        }
    }

    pub async fn current_track(&self, guild_id: GuildId) -> Option<TrackMetadata> {
        self.get(guild_id)?.current().await
    }

    /// Re-enqueue the currently playing track's URL as a raw locator, so it
    /// resolves freshly when it comes around again. Returns its title.
    pub async fn loop_current(&self, guild_id: GuildId) -> PlayerResult<String> {
        let state = self.get(guild_id).ok_or(PlayerError::NothingPlaying)?;
        let current = state.current().await.ok_or(PlayerError::NothingPlaying)?;
        let locator = current.url.clone().ok_or_else(|| {
            PlayerError::AudioSourceError("current track has no URL to re-queue".to_string())
        })?;
        state.push(QueueEntry::Locator(locator)).await?;
        Ok(current.title)
    }

    /// Stop the current track so the loop advances to the next entry.
    pub async fn skip(&self, guild_id: GuildId) -> SkipOutcome {
        let Some(state) = self.get(guild_id) else {
            return SkipOutcome::NoPlayer;
        };
        if state.device().is_playing().await {
            state.device().stop().await;
            SkipOutcome::Skipped
        } else {
            SkipOutcome::NotPlaying
        }
    }

    /// Empty the queue, then stop the device. The queue is emptied first so
    /// the coordinator cannot pick up a stale entry when the stop completes
    /// the in-flight track.
    pub async fn stop_and_clear(&self, guild_id: GuildId) {
        if let Some(state) = self.get(guild_id) {
            let dropped = state.clear_queue().await;
            debug!(
                "Stop request dropped {} queued entries for guild {}",
                dropped, guild_id
            );
            state.device().stop().await;
        }
    }

    /// Explicitly tear down the guild's player: disconnect the device, drop
    /// the registry entry, cancel the loop. Idempotent, and safe against the
    /// loop's own idle-timeout teardown running at the same moment.
    pub async fn leave(&self, guild_id: GuildId) {
        if let Some(state) = self.get(guild_id) {
            coordinator::destroy(&self.players, &state, DestroyOrigin::External).await;
        }
    }

    /// Set the guild's volume, applied to each track started afterwards.
    pub async fn set_volume(&self, guild_id: GuildId, volume: f32) -> PlayerResult<f32> {
        let state = self.get(guild_id).ok_or(PlayerError::NothingPlaying)?;
        Ok(state.set_volume(volume).await)
    }
}
