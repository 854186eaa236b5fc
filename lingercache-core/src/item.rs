use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::Clock;
#[cfg(feature = "stats")]
use crate::GcCacheStats;

/// Counter interface a facet link holds on to.
///
/// Facets are not generic over the instance type, so links talk to items
/// through this trait object.
pub(crate) trait ReferenceCounter: Send + Sync {
    /// A new facet now references the instance.
    fn link_instance(&self);

    /// A facet that referenced the instance is gone.
    fn unlink_instance(&self);
}

#[derive(Debug, Default)]
struct ItemState {
    count: usize,
    death_time: Option<Instant>,
}

/// One cached instance together with the number of facets that reference it.
///
/// `death_time` is set when the count drops to zero and cleared when a new
/// facet links to the item again. Count and death time live under one lock,
/// so increments and decrements on an item are linearizable.
pub struct Item<I> {
    instance: Arc<I>,
    state: Mutex<ItemState>,
    clock: Arc<dyn Clock>,
    #[cfg(feature = "stats")]
    stats: Arc<GcCacheStats>,
}

impl<I> Item<I> {
    #[cfg(feature = "stats")]
    pub(crate) fn new(instance: Arc<I>, clock: Arc<dyn Clock>, stats: Arc<GcCacheStats>) -> Self {
        Self {
            instance,
            state: Mutex::new(ItemState::default()),
            clock,
            stats,
        }
    }

    #[cfg(not(feature = "stats"))]
    pub(crate) fn new(instance: Arc<I>, clock: Arc<dyn Clock>) -> Self {
        Self {
            instance,
            state: Mutex::new(ItemState::default()),
            clock,
        }
    }

    pub fn instance(&self) -> &Arc<I> {
        &self.instance
    }

    pub fn reference_count(&self) -> usize {
        self.state.lock().count
    }

    /// When the count last reached zero, if it is zero now.
    pub fn death_time(&self) -> Option<Instant> {
        self.state.lock().death_time
    }

    pub(crate) fn increment(&self) {
        let mut state = self.state.lock();
        if state.death_time.take().is_some() {
            tracing::trace!(count = state.count, "dead item revived by a new facet");
            #[cfg(feature = "stats")]
            self.stats.record_revival();
        }
        state.count += 1;
    }

    /// Returns `true` when this call brought the count to zero.
    pub(crate) fn decrement(&self) -> bool {
        let mut state = self.state.lock();
        let Some(count) = state.count.checked_sub(1) else {
            tracing::warn!("decrement on an item without live facets ignored");
            return false;
        };
        state.count = count;
        if count > 0 {
            return false;
        }

        state.death_time = Some(self.clock.now());
        drop(state);

        tracing::debug!("item died");
        #[cfg(feature = "stats")]
        self.stats.record_death();
        true
    }

    /// Returns true if no facet references the item and it has been that way
    /// for at least `ttl` as of `now`.
    pub fn is_dead(&self, ttl: Duration, now: Instant) -> bool {
        let state = self.state.lock();
        match state.death_time {
            Some(died) if state.count == 0 => now.saturating_duration_since(died) >= ttl,
            _ => false,
        }
    }
}

impl<I: Send + Sync> ReferenceCounter for Item<I> {
    fn link_instance(&self) {
        self.increment();
    }

    fn unlink_instance(&self) {
        self.decrement();
    }
}

impl<I> fmt::Debug for Item<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Item")
            .field("instance", &Arc::as_ptr(&self.instance))
            .field("count", &state.count)
            .field("death_time", &state.death_time)
            .finish()
    }
}

#[cfg(all(test, feature = "stats"))]
pub(crate) fn test_item<I>(instance: Arc<I>, clock: Arc<dyn Clock>) -> Item<I> {
    Item::new(instance, clock, Arc::new(GcCacheStats::new()))
}

#[cfg(all(test, not(feature = "stats")))]
pub(crate) fn test_item<I>(instance: Arc<I>, clock: Arc<dyn Clock>) -> Item<I> {
    Item::new(instance, clock)
}
