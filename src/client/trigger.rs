//! One-shot playback readiness gate.
//!
//! The trigger watches the cumulative durable byte count and fires a single
//! ready signal the first time it reaches the threshold. Arming is a
//! compare-and-set, so the signal fires at most once per stream no matter
//! how many tasks observe the counter.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;

/// Observer side of the gate. Held by whichever task appends to the sink.
pub struct PlaybackTrigger {
    threshold: u64,
    fire_on_complete: bool,
    armed: AtomicBool,
    ready_tx: Mutex<Option<oneshot::Sender<u64>>>,
}

impl PlaybackTrigger {
    /// Create a trigger and the listener for its ready signal.
    ///
    /// `fire_on_complete` arms the trigger when a stream completes below the
    /// threshold; without it such a stream never signals.
    pub fn new(threshold: u64, fire_on_complete: bool) -> (Arc<Self>, ReadyListener) {
        let (tx, rx) = oneshot::channel();
        let trigger = Arc::new(Self {
            threshold,
            fire_on_complete,
            armed: AtomicBool::new(false),
            ready_tx: Mutex::new(Some(tx)),
        });
        (trigger, ReadyListener { rx })
    }

    /// Observe the cumulative byte count after an append.
    ///
    /// Returns true only for the call that crossed the threshold first.
    pub fn observe(&self, cumulative: u64) -> bool {
        if cumulative < self.threshold {
            return false;
        }
        self.fire(cumulative)
    }

    /// Apply the completion policy. Called only when a stream completes
    /// cleanly; failed streams never signal through this path.
    pub fn complete(&self, total: u64) -> bool {
        if self.fire_on_complete {
            return self.fire(total);
        }
        false
    }

    /// Whether the ready signal has fired.
    pub fn has_fired(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    fn fire(&self, cumulative: u64) -> bool {
        if self
            .armed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        if let Some(tx) = self.ready_tx.lock().take() {
            let _ = tx.send(cumulative);
        }
        true
    }
}

/// Awaits the one-shot ready signal.
pub struct ReadyListener {
    rx: oneshot::Receiver<u64>,
}

impl ReadyListener {
    /// Resolves with the byte count at firing time, or `None` when every
    /// trigger handle dropped without the threshold ever being crossed.
    pub async fn ready(self) -> Option<u64> {
        self.rx.await.ok()
    }
}
