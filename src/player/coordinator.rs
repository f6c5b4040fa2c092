//! The per-guild playback loop.
//!
//! One loop per [`PlayerState`]: it blocks on the queue with the idle
//! timeout, resolves raw locators as they reach the front, starts the
//! device, and suspends until the device signals the end of the track. When
//! the queue stays empty for the whole idle window, the loop destroys its
//! own player.

use std::sync::Arc;

use dashmap::DashMap;
use serenity::model::id::GuildId;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::notifier::Notifier;
use super::resolver::MediaResolver;
use super::state::PlayerState;
use super::track_metadata::QueueEntry;
use super::PlayerSettings;

pub(crate) type PlayerMap = Arc<DashMap<GuildId, Arc<PlayerState>>>;

/// Who initiated a player's teardown.
pub(crate) enum DestroyOrigin {
    /// The loop timed out waiting for work and is shutting itself down.
    IdleTimeout,
    /// An explicit leave/cleanup request from outside the loop.
    External,
}

/// Spawn the coordinator loop for a freshly created player.
pub(crate) fn spawn(
    players: PlayerMap,
    state: Arc<PlayerState>,
    resolver: Arc<dyn MediaResolver>,
    notifier: Arc<dyn Notifier>,
    settings: PlayerSettings,
) -> JoinHandle<()> {
    tokio::spawn(run(players, state, resolver, notifier, settings))
}

async fn run(
    players: PlayerMap,
    state: Arc<PlayerState>,
    resolver: Arc<dyn MediaResolver>,
    notifier: Arc<dyn Notifier>,
    settings: PlayerSettings,
) {
    let guild_id = state.guild_id();
    info!("Starting player loop for guild {}", guild_id);

    loop {
        state.track_end().reset().await;

        // The idle window restarts at every successful dequeue simply by
        // re-issuing the timed wait.
        let entry = match timeout(settings.idle_timeout, state.next_entry()).await {
            Ok(entry) => entry,
            Err(_) => {
                info!(
                    "Player for guild {} idle for {:?}, shutting down",
                    guild_id, settings.idle_timeout
                );
                break;
            }
        };

        let track = match entry {
            QueueEntry::Track(track) => track,
            QueueEntry::Locator(locator) => match resolver.resolve(&locator).await {
                Ok(track) => track,
                Err(e) => {
                    warn!("Failed to resolve '{}' for guild {}: {}", locator, guild_id, e);
                    notifier
                        .playback_error(guild_id, &locator, &e.to_string())
                        .await;
                    continue;
                }
            },
        };

        let volume = state.volume().await;
        state.set_current(track.clone()).await;

        if let Err(e) = state
            .device()
            .play(&track, volume, state.track_end().clone())
            .await
        {
            warn!(
                "Failed to start '{}' for guild {}: {}",
                track.title, guild_id, e
            );
            state.clear_current().await;
            notifier
                .playback_error(guild_id, locator_of(&track), &e.to_string())
                .await;
            continue;
        }

        debug!("Now playing '{}' for guild {}", track.title, guild_id);
        notifier.now_playing(guild_id, &track).await;

        // Stop and skip fire the same signal as a natural end; the loop does
        // not care which one happened.
        let error = state.track_end().wait().await;
        state.clear_current().await;

        if let Some(reason) = error {
            warn!(
                "Track '{}' ended with an error for guild {}: {}",
                track.title, guild_id, reason
            );
            notifier
                .playback_error(guild_id, locator_of(&track), &reason)
                .await;
        }

        notifier.retract_now_playing(guild_id).await;
    }

    destroy(&players, &state, DestroyOrigin::IdleTimeout).await;
    info!("Player loop for guild {} finished", guild_id);
}

fn locator_of(track: &super::TrackMetadata) -> &str {
    track.url.as_deref().unwrap_or(&track.title)
}

/// Tear a player down: runs at most once per player, survives the race
/// between the idle-timeout branch and an external leave request.
pub(crate) async fn destroy(
    players: &DashMap<GuildId, Arc<PlayerState>>,
    state: &Arc<PlayerState>,
    origin: DestroyOrigin,
) {
    if !state.begin_destroy() {
        debug!(
            "Player for guild {} is already being destroyed",
            state.guild_id()
        );
        return;
    }

    let discarded = state.clear_queue().await;
    if discarded > 0 {
        debug!(
            "Discarding {} queued entries for guild {}",
            discarded,
            state.guild_id()
        );
    }

    state.device().disconnect().await;

    // Pointer-guarded removal: a successor player for the same guild must
    // never be evicted by a stale destroy.
    players.remove_if(&state.guild_id(), |_, existing| Arc::ptr_eq(existing, state));

    if matches!(origin, DestroyOrigin::External) {
        state.abort_loop_task();
    }

    info!("Destroyed player for guild {}", state.guild_id());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::resolver::MockMediaResolver;
    use crate::player::test_support::AutoDevice;
    use crate::player::TrackMetadata;
    use mockall::predicate::eq;
    use serenity::async_trait;
    use std::sync::atomic::Ordering;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingNotifier {
        events: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn now_playing(&self, _guild_id: GuildId, track: &TrackMetadata) {
            self.events.lock().unwrap().push(format!("playing:{}", track.title));
        }

        async fn playback_error(&self, _guild_id: GuildId, locator: &str, _reason: &str) {
            self.events.lock().unwrap().push(format!("error:{}", locator));
        }

        async fn retract_now_playing(&self, _guild_id: GuildId) {
            self.events.lock().unwrap().push("retract".to_string());
        }
    }

    fn settings(idle: Duration) -> PlayerSettings {
        PlayerSettings {
            idle_timeout: idle,
            default_volume: 0.5,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn resolves_locators_lazily_and_destroys_on_idle() {
        let players: PlayerMap = Arc::new(DashMap::new());
        let device = Arc::new(AutoDevice::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let guild_id = GuildId::new(7);

        let mut resolver = MockMediaResolver::new();
        resolver
            .expect_resolve()
            .with(eq("some song"))
            .times(1)
            .returning(|_| {
                Ok(TrackMetadata {
                    title: "Some Song".to_string(),
                    url: Some("https://example.com/some-song".to_string()),
                    ..Default::default()
                })
            });

        let state = Arc::new(PlayerState::new(guild_id, device.clone(), 0.5));
        players.insert(guild_id, state.clone());
        let task = spawn(
            players.clone(),
            state.clone(),
            Arc::new(resolver),
            notifier.clone(),
            settings(Duration::from_millis(100)),
        );

        state
            .push(QueueEntry::Locator("some song".to_string()))
            .await
            .unwrap();

        // The loop plays the resolved track, then idles out and destroys the
        // player, all on virtual time.
        task.await.unwrap();

        assert_eq!(device.played.lock().unwrap().as_slice(), ["Some Song"]);
        assert_eq!(notifier.events(), ["playing:Some Song", "retract"]);
        assert_eq!(state.current().await, None);
        assert!(players.is_empty());
        assert_eq!(device.disconnects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn resolution_failure_skips_only_the_failed_entry() {
        let players: PlayerMap = Arc::new(DashMap::new());
        let device = Arc::new(AutoDevice::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let guild_id = GuildId::new(8);

        let mut resolver = MockMediaResolver::new();
        resolver
            .expect_resolve()
            .with(eq("broken"))
            .times(1)
            .returning(|locator| Err(crate::player::PlayerError::TrackNotFound(locator.to_string())));

        let state = Arc::new(PlayerState::new(guild_id, device.clone(), 0.5));
        players.insert(guild_id, state.clone());
        let task = spawn(
            players.clone(),
            state.clone(),
            Arc::new(resolver),
            notifier.clone(),
            settings(Duration::from_millis(100)),
        );

        state
            .push(QueueEntry::Locator("broken".to_string()))
            .await
            .unwrap();
        state
            .push(QueueEntry::Track(TrackMetadata {
                title: "Good Track".to_string(),
                ..Default::default()
            }))
            .await
            .unwrap();

        task.await.unwrap();

        // The broken locator never reached the device; the next entry did.
        assert_eq!(device.played.lock().unwrap().as_slice(), ["Good Track"]);
        assert_eq!(
            notifier.events(),
            ["error:broken", "playing:Good Track", "retract"]
        );
    }
}
