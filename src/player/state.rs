//! Per-guild player state: the pending queue, the now-playing slot, volume,
//! the completion signal, and the coordinator task's lifecycle.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use serenity::model::id::GuildId;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::warn;

use super::device::PlaybackDevice;
use super::signal::TrackEndSignal;
use super::track_metadata::{QueueEntry, TrackMetadata};
use super::{PlayerError, PlayerResult};

/// Clamp a requested volume into the supported `[0, 1]` range.
pub(crate) fn clamp_volume(volume: f32) -> f32 {
    volume.clamp(0.0, 1.0)
}

/// State owned by one guild's player. The queue accepts appends from any
/// number of request contexts; only the guild's coordinator loop pops.
pub struct PlayerState {
    guild_id: GuildId,
    queue: Mutex<VecDeque<QueueEntry>>,
    queue_added: Notify,
    current: Mutex<Option<TrackMetadata>>,
    volume: Mutex<f32>,
    track_end: TrackEndSignal,
    // Sync mutex: stored while the registry holds a map-shard guard.
    loop_task: StdMutex<Option<JoinHandle<()>>>,
    destroyed: AtomicBool,
    device: Arc<dyn PlaybackDevice>,
}

impl PlayerState {
    pub fn new(guild_id: GuildId, device: Arc<dyn PlaybackDevice>, volume: f32) -> Self {
        Self {
            guild_id,
            queue: Mutex::new(VecDeque::new()),
            queue_added: Notify::new(),
            current: Mutex::new(None),
            volume: Mutex::new(clamp_volume(volume)),
            track_end: TrackEndSignal::new(),
            loop_task: StdMutex::new(None),
            destroyed: AtomicBool::new(false),
            device,
        }
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    pub fn device(&self) -> &Arc<dyn PlaybackDevice> {
        &self.device
    }

    pub fn track_end(&self) -> &TrackEndSignal {
        &self.track_end
    }

    /// Append an entry to the queue and wake the coordinator. Returns the
    /// queue length after the append, or `PlayerClosed` once teardown has
    /// begun.
    pub async fn push(&self, entry: QueueEntry) -> PlayerResult<usize> {
        let mut queue = self.queue.lock().await;
        if self.destroyed.load(Ordering::SeqCst) {
            return Err(PlayerError::PlayerClosed);
        }
        queue.push_back(entry);
        self.queue_added.notify_one();
        Ok(queue.len())
    }

    /// Pop the front entry, suspending until one is available. Single
    /// consumer: only the coordinator loop calls this.
    pub(crate) async fn next_entry(&self) -> QueueEntry {
        loop {
            let notified = self.queue_added.notified();
            if let Some(entry) = self.queue.lock().await.pop_front() {
                return entry;
            }
            notified.await;
        }
    }

    /// Read-only copy of the pending queue.
    pub async fn snapshot(&self) -> Vec<QueueEntry> {
        self.queue.lock().await.iter().cloned().collect()
    }

    /// Drop every pending entry. Returns how many were discarded.
    pub async fn clear_queue(&self) -> usize {
        let mut queue = self.queue.lock().await;
        let dropped = queue.len();
        queue.clear();
        dropped
    }

    pub async fn current(&self) -> Option<TrackMetadata> {
        self.current.lock().await.clone()
    }

    pub(crate) async fn set_current(&self, track: TrackMetadata) {
        *self.current.lock().await = Some(track);
    }

    pub(crate) async fn clear_current(&self) {
        self.current.lock().await.take();
    }

    pub async fn volume(&self) -> f32 {
        *self.volume.lock().await
    }

    /// Update the guild's volume. Applies to each track started afterwards.
    pub async fn set_volume(&self, volume: f32) -> f32 {
        let volume = clamp_volume(volume);
        *self.volume.lock().await = volume;
        volume
    }

    /// Flip into the destroyed state. Returns true for the one caller that
    /// performs the actual teardown.
    pub(crate) fn begin_destroy(&self) -> bool {
        !self.destroyed.swap(true, Ordering::SeqCst)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    pub(crate) fn store_loop_task(&self, task: JoinHandle<()>) {
        match self.loop_task.lock() {
            Ok(mut slot) => *slot = Some(task),
            Err(e) => warn!("Loop-task slot poisoned for guild {}: {}", self.guild_id, e),
        }
    }

    pub(crate) fn abort_loop_task(&self) {
        if let Ok(mut slot) = self.loop_task.lock() {
            if let Some(task) = slot.take() {
                task.abort();
            }
        }
    }
}
