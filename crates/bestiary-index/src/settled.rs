//! Settled-state signalling for scan batches.
//!
//! The index is "settled" when no scan batch is in flight. A single reusable
//! boolean flag races: a consumer that subscribes just as a batch finishes
//! could either miss the notification or observe a stale "settled" from a
//! previous batch. [`SettledSignal`] avoids both by pairing a monotonically
//! increasing start counter with a watch channel carrying the last settled
//! generation: waiters capture the start counter at subscription time and
//! wait until the settled generation catches up to it.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

/// Readiness gate indicating whether any scan batch is in flight.
///
/// # Guarantees
///
/// - [`wait`](Self::wait) returns immediately when no batch is in flight.
/// - A waiter subscribing mid-batch is woken exactly when that batch (and
///   any batch that started before the subscription) completes.
/// - Overlapping batches coalesce: settling marks every batch started so
///   far as complete, matching the worker's single drained FIFO.
///
/// # Examples
///
/// ```
/// use bestiary_index::SettledSignal;
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let signal = SettledSignal::new();
/// assert!(signal.is_settled());
///
/// signal.mark_started();
/// assert!(!signal.is_settled());
///
/// signal.mark_settled();
/// signal.wait().await; // returns immediately
/// # });
/// ```
#[derive(Debug)]
pub struct SettledSignal {
    /// Number of batches ever started.
    started: AtomicU64,

    /// Last generation known to be fully settled.
    settled_tx: watch::Sender<u64>,
}

impl SettledSignal {
    /// Creates a new signal in the settled state.
    #[must_use]
    pub fn new() -> Self {
        let (settled_tx, _rx) = watch::channel(0);
        Self {
            started: AtomicU64::new(0),
            settled_tx,
        }
    }

    /// Records that a new batch has started and returns its generation.
    pub fn mark_started(&self) -> u64 {
        self.started.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Records that every batch started so far has completed.
    pub fn mark_settled(&self) {
        let generation = self.started.load(Ordering::SeqCst);
        self.settled_tx.send_replace(generation);
    }

    /// Returns `true` if no batch is currently in flight.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        *self.settled_tx.borrow() >= self.started.load(Ordering::SeqCst)
    }

    /// Waits until every batch started before this call has completed.
    ///
    /// Returns immediately when already settled. Late subscribers joining
    /// mid-batch wait only for generations at or below their subscription
    /// point; batches started afterwards do not delay them.
    pub async fn wait(&self) {
        let target = self.started.load(Ordering::SeqCst);
        let mut rx = self.settled_tx.subscribe();
        // The sender lives in self, so wait_for can only fail if self is
        // dropped while waiting, at which point the result is moot.
        let _ = rx.wait_for(|settled| *settled >= target).await;
    }
}

impl Default for SettledSignal {
    fn default() -> Self {
        Self::new()
    }
}
