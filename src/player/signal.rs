//! Cross-context completion signaling between a playback device and the
//! coordinator loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, Notify};
use tracing::debug;

/// One-shot, auto-resetting signal a device fires when a playback attempt
/// ends, whether it finished naturally, was stopped, or errored.
///
/// The device's completion callback may run on a foreign execution context
/// (e.g. the voice driver), so its only side effect is storing the outcome
/// and waking the one waiting coordinator. The signal is re-armed with
/// [`TrackEndSignal::reset`] at the start of each playback cycle; within a
/// cycle, the first [`TrackEndSignal::fire`] wins and later ones are ignored.
#[derive(Clone, Default)]
pub struct TrackEndSignal {
    inner: Arc<SignalInner>,
}

#[derive(Default)]
struct SignalInner {
    fired: AtomicBool,
    error: Mutex<Option<String>>,
    notify: Notify,
}

impl TrackEndSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-arm the signal for the next playback cycle.
    pub async fn reset(&self) {
        self.inner.error.lock().await.take();
        self.inner.fired.store(false, Ordering::SeqCst);
    }

    /// Report the end of the current playback attempt, with the device error
    /// if it ended abnormally. The first call per cycle wins.
    pub async fn fire(&self, error: Option<String>) {
        if self.inner.fired.swap(true, Ordering::SeqCst) {
            debug!("Duplicate track-end signal ignored");
            return;
        }
        *self.inner.error.lock().await = error;
        self.inner.notify.notify_one();
    }

    /// Suspend until the device reports the end of the current playback
    /// attempt. Returns the device error payload, if any.
    pub async fn wait(&self) -> Option<String> {
        self.inner.notify.notified().await;
        self.inner.error.lock().await.take()
    }
}
