//! Songbird-backed implementation of the core `PlaybackDevice` trait.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serenity::async_trait;
use serenity::model::id::GuildId;
use serenity::prelude::Mutex as SerenityMutex;
use songbird::input::YoutubeDl;
use songbird::tracks::{PlayMode, Track, TrackHandle};
use songbird::{Call, Event, EventContext, EventHandler as VoiceEventHandler, Songbird, TrackEvent};
use tokio::sync::Mutex;
use tracing::debug;

use crate::player::{PlaybackDevice, PlayerError, PlayerResult, TrackEndSignal, TrackMetadata};
use crate::HTTP_CLIENT;

/// One guild's voice output: wraps the songbird `Call` and reports track
/// completion through the coordinator's signal.
pub struct SongbirdDevice {
    guild_id: GuildId,
    manager: Arc<Songbird>,
    call: Arc<SerenityMutex<Call>>,
    current: Arc<Mutex<Option<TrackHandle>>>,
}

impl SongbirdDevice {
    pub fn new(manager: Arc<Songbird>, guild_id: GuildId, call: Arc<SerenityMutex<Call>>) -> Self {
        Self {
            guild_id,
            manager,
            call,
            current: Arc::new(Mutex::new(None)),
        }
    }
}

#[async_trait]
impl PlaybackDevice for SongbirdDevice {
    async fn play(
        &self,
        track: &TrackMetadata,
        volume: f32,
        on_end: TrackEndSignal,
    ) -> PlayerResult<()> {
        let url = track.url.clone().ok_or_else(|| {
            PlayerError::AudioSourceError(format!("track '{}' has no playable URL", track.title))
        })?;

        let input = YoutubeDl::new(HTTP_CLIENT.clone(), url);
        let handle = {
            let mut call = self.call.lock().await;
            call.play(Track::from(input).volume(volume))
        };

        let notifier = TrackEndNotifier {
            signal: on_end,
            handle_slot: self.current.clone(),
            fired: Arc::new(AtomicBool::new(false)),
        };
        // An errored track does not always emit End, so listen for both; the
        // signal itself dedups.
        for event in [TrackEvent::End, TrackEvent::Error] {
            handle
                .add_event(Event::Track(event), notifier.clone())
                .map_err(|e| {
                    PlayerError::PlaybackError(format!("failed to attach track event: {}", e))
                })?;
        }

        *self.current.lock().await = Some(handle);
        Ok(())
    }

    async fn stop(&self) {
        if let Some(handle) = self.current.lock().await.take() {
            if let Err(e) = handle.stop() {
                debug!("Stop on finished track for guild {}: {}", self.guild_id, e);
            }
        }
    }

    async fn is_playing(&self) -> bool {
        let handle = match self.current.lock().await.as_ref() {
            Some(handle) => handle.clone(),
            None => return false,
        };
        match handle.get_info().await {
            Ok(info) => matches!(info.playing, PlayMode::Play),
            Err(_) => false,
        }
    }

    async fn disconnect(&self) {
        self.current.lock().await.take();
        if let Err(e) = self.manager.remove(self.guild_id).await {
            debug!(
                "Voice disconnect for guild {} was a no-op: {}",
                self.guild_id, e
            );
        }
    }
}

/// Fires the coordinator's completion signal when songbird reports the end
/// (or failure) of a track. One instance per `play` call, registered for
/// both the End and Error events; the `fired` flag keeps the completion
/// exactly-once even when songbird emits both for the same track.
#[derive(Clone)]
struct TrackEndNotifier {
    signal: TrackEndSignal,
    handle_slot: Arc<Mutex<Option<TrackHandle>>>,
    fired: Arc<AtomicBool>,
}

#[async_trait]
impl VoiceEventHandler for TrackEndNotifier {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        if let EventContext::Track(tracks) = ctx {
            if self.fired.swap(true, Ordering::SeqCst) {
                return None;
            }
            let error = tracks.iter().find_map(|(state, _)| match &state.playing {
                PlayMode::Errored(e) => Some(e.to_string()),
                _ => None,
            });
            self.handle_slot.lock().await.take();
            self.signal.fire(error).await;
        }
        None
    }
}
