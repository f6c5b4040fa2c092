//! Shared recording fakes for the playback integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serenity::async_trait;
use serenity::model::id::GuildId;

use quaver::player::{
    MediaResolver, Notifier, PlaybackDevice, PlayerError, PlayerRegistry, PlayerResult,
    PlayerSettings, TrackEndSignal, TrackMetadata,
};

pub fn guild() -> GuildId {
    GuildId::new(99)
}

/// Build a registry wired to the given fakes.
pub fn registry(
    resolver: Arc<FakeResolver>,
    notifier: Arc<RecordingNotifier>,
    idle_timeout: Duration,
) -> Arc<PlayerRegistry> {
    Arc::new(PlayerRegistry::new(
        resolver,
        notifier,
        PlayerSettings {
            idle_timeout,
            default_volume: 0.5,
        },
    ))
}

/// A resolved track with a predictable URL.
pub fn track(title: &str) -> TrackMetadata {
    TrackMetadata {
        title: title.to_string(),
        url: Some(format!(
            "https://tracks.example/{}",
            title.replace(' ', "-").to_lowercase()
        )),
        ..Default::default()
    }
}

/// Poll `cond` until it holds, panicking after a generous deadline.
pub async fn wait_for(what: &str, mut cond: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !cond() {
        if tokio::time::Instant::now() > deadline {
            panic!("timed out waiting for {what}");
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Async-condition variant of [`wait_for`].
pub async fn wait_for_async<F, Fut>(what: &str, mut cond: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !cond().await {
        if tokio::time::Instant::now() > deadline {
            panic!("timed out waiting for {what}");
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Playback device that records every interaction and lets tests decide when
/// (and how) each track finishes.
pub struct FakeDevice {
    auto_complete: bool,
    played: Mutex<Vec<String>>,
    volumes: Mutex<Vec<f32>>,
    pending: Mutex<Option<TrackEndSignal>>,
    stops: AtomicUsize,
    disconnects: AtomicUsize,
    playing: AtomicBool,
}

impl FakeDevice {
    /// Every track completes the instant it starts.
    pub fn auto() -> Arc<Self> {
        Arc::new(Self::new(true))
    }

    /// Tracks play until the test calls [`FakeDevice::complete`] or the
    /// device is stopped.
    pub fn manual() -> Arc<Self> {
        Arc::new(Self::new(false))
    }

    fn new(auto_complete: bool) -> Self {
        Self {
            auto_complete,
            played: Mutex::new(Vec::new()),
            volumes: Mutex::new(Vec::new()),
            pending: Mutex::new(None),
            stops: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
            playing: AtomicBool::new(false),
        }
    }

    pub fn played(&self) -> Vec<String> {
        self.played.lock().unwrap().clone()
    }

    pub fn volumes(&self) -> Vec<f32> {
        self.volumes.lock().unwrap().clone()
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    pub fn is_busy(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    /// Finish the in-flight track the way the real device callback would.
    pub async fn complete(&self, error: Option<String>) {
        let signal = self.pending.lock().unwrap().take();
        self.playing.store(false, Ordering::SeqCst);
        if let Some(signal) = signal {
            signal.fire(error).await;
        }
    }
}

#[async_trait]
impl PlaybackDevice for FakeDevice {
    async fn play(
        &self,
        track: &TrackMetadata,
        volume: f32,
        on_end: TrackEndSignal,
    ) -> PlayerResult<()> {
        self.played.lock().unwrap().push(track.title.clone());
        self.volumes.lock().unwrap().push(volume);
        if self.auto_complete {
            on_end.fire(None).await;
        } else {
            self.playing.store(true, Ordering::SeqCst);
            *self.pending.lock().unwrap() = Some(on_end);
        }
        Ok(())
    }

    async fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.complete(None).await;
    }

    async fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    async fn disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        self.playing.store(false, Ordering::SeqCst);
    }
}

/// Resolver with a scripted response per locator; unknown locators fail.
#[derive(Default)]
pub struct FakeResolver {
    responses: Mutex<HashMap<String, Result<TrackMetadata, String>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeResolver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_track(&self, locator: &str, title: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(locator.to_string(), Ok(track(title)));
    }

    pub fn with_failure(&self, locator: &str, reason: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(locator.to_string(), Err(reason.to_string()));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaResolver for FakeResolver {
    async fn resolve(&self, locator: &str) -> PlayerResult<TrackMetadata> {
        self.calls.lock().unwrap().push(locator.to_string());
        match self.responses.lock().unwrap().get(locator) {
            Some(Ok(track)) => Ok(track.clone()),
            Some(Err(reason)) => Err(PlayerError::AudioSourceError(reason.clone())),
            None => Err(PlayerError::TrackNotFound(locator.to_string())),
        }
    }
}

/// What a notifier saw, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum NotifierEvent {
    NowPlaying(String),
    PlaybackError { locator: String, reason: String },
    Retracted,
}

/// Notifier that records every event.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<NotifierEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<NotifierEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn now_playing_titles(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                NotifierEvent::NowPlaying(title) => Some(title),
                _ => None,
            })
            .collect()
    }

    pub fn error_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, NotifierEvent::PlaybackError { .. }))
            .count()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn now_playing(&self, _guild_id: GuildId, track: &TrackMetadata) {
        self.events
            .lock()
            .unwrap()
            .push(NotifierEvent::NowPlaying(track.title.clone()));
    }

    async fn playback_error(&self, _guild_id: GuildId, locator: &str, reason: &str) {
        self.events.lock().unwrap().push(NotifierEvent::PlaybackError {
            locator: locator.to_string(),
            reason: reason.to_string(),
        });
    }

    async fn retract_now_playing(&self, _guild_id: GuildId) {
        self.events.lock().unwrap().push(NotifierEvent::Retracted);
    }
}
