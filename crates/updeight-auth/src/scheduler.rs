//! Per-session expiry timers.
//!
//! Each timer is a spawned task that sleeps until its deadline and then
//! runs a one-shot action. Handles are kept in a registry keyed by id so
//! a timer can be cancelled (logout) or all timers aborted (shutdown).
//! Timers live only as long as the process.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::task::AbortHandle;
use tracing::debug;
use uuid::Uuid;

struct Timer {
    generation: u64,
    handle: AbortHandle,
}

/// Registry of pending one-shot timers.
#[derive(Clone, Default)]
pub struct ExpiryScheduler {
    timers: Arc<DashMap<Uuid, Timer>>,
    generation: Arc<AtomicU64>,
}

impl ExpiryScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` after `delay`. Re-scheduling an id replaces (and
    /// aborts) its previous timer.
    pub fn schedule<F>(&self, id: Uuid, delay: Duration, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let timers = Arc::clone(&self.timers);

        // The entry guard is held until the handle is stored, so the
        // task cannot deregister itself before it is registered.
        let entry = self.timers.entry(id);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
            timers.remove_if(&id, |_, timer| timer.generation == generation);
            debug!(%id, "Expiry timer fired");
        });
        let timer = Timer {
            generation,
            handle: task.abort_handle(),
        };

        match entry {
            Entry::Occupied(mut occupied) => {
                occupied.insert(timer).handle.abort();
            }
            Entry::Vacant(vacant) => {
                vacant.insert(timer);
            }
        }
    }

    /// Abort a pending timer. Returns `false` when none was registered.
    pub fn cancel(&self, id: &Uuid) -> bool {
        match self.timers.remove(id) {
            Some((_, timer)) => {
                timer.handle.abort();
                debug!(%id, "Expiry timer cancelled");
                true
            }
            None => false,
        }
    }

    pub fn is_scheduled(&self, id: &Uuid) -> bool {
        self.timers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Abort every pending timer.
    pub fn cancel_all(&self) {
        let ids: Vec<Uuid> = self.timers.iter().map(|entry| *entry.key()).collect();
        for id in ids {
            self.cancel(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use super::*;

    fn flag() -> (Arc<AtomicBool>, Arc<AtomicBool>) {
        let flag = Arc::new(AtomicBool::new(false));
        (Arc::clone(&flag), flag)
    }

    #[tokio::test(start_paused = true)]
    async fn fires_after_delay_and_deregisters() {
        let scheduler = ExpiryScheduler::new();
        let (fired, probe) = flag();
        let id = Uuid::new_v4();

        scheduler.schedule(id, Duration::from_secs(60), async move {
            fired.store(true, Ordering::SeqCst);
        });
        assert!(scheduler.is_scheduled(&id));

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert!(!probe.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(probe.load(Ordering::SeqCst));
        assert!(!scheduler.is_scheduled(&id));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_never_fires() {
        let scheduler = ExpiryScheduler::new();
        let (fired, probe) = flag();
        let id = Uuid::new_v4();

        scheduler.schedule(id, Duration::from_secs(10), async move {
            fired.store(true, Ordering::SeqCst);
        });
        assert!(scheduler.cancel(&id));
        assert!(!scheduler.cancel(&id));

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(!probe.load(Ordering::SeqCst));
        assert!(scheduler.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_replaces_previous_timer() {
        let scheduler = ExpiryScheduler::new();
        let (first, first_probe) = flag();
        let (second, second_probe) = flag();
        let id = Uuid::new_v4();

        scheduler.schedule(id, Duration::from_secs(10), async move {
            first.store(true, Ordering::SeqCst);
        });
        scheduler.schedule(id, Duration::from_secs(30), async move {
            second.store(true, Ordering::SeqCst);
        });
        assert_eq!(scheduler.len(), 1);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(!first_probe.load(Ordering::SeqCst));
        assert!(second_probe.load(Ordering::SeqCst));
        assert!(scheduler.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_all_aborts_everything() {
        let scheduler = ExpiryScheduler::new();
        let (fired, probe) = flag();

        for _ in 0..3 {
            let fired = Arc::clone(&fired);
            scheduler.schedule(Uuid::new_v4(), Duration::from_secs(5), async move {
                fired.store(true, Ordering::SeqCst);
            });
        }
        assert_eq!(scheduler.len(), 3);

        scheduler.cancel_all();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(scheduler.is_empty());
        assert!(!probe.load(Ordering::SeqCst));
    }
}
