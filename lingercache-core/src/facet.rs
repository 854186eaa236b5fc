//! Facet handles and the links that tie them to cached items.
//!
//! A [`Facet`] is a cheap, cloneable handle. All clones are the same logical
//! facet. When the last clone is dropped, every link the facet holds is dropped
//! with it, and each link decrements the item it was counting in its cache.
//! The item never points back at the facet, so linking a facet into a cache
//! does not extend the facet's lifetime.

use parking_lot::Mutex;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crate::item::ReferenceCounter;

/// Identifies the cache a link belongs to. A facet holds at most one link per id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct TrackerId(u64);

impl TrackerId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// One-shot trigger that unlinks its item when dropped.
///
/// A cancelled notifier holds no counter and its drop does nothing.
pub(crate) struct DeathNotifier {
    counter: Option<Arc<dyn ReferenceCounter>>,
}

impl DeathNotifier {
    pub(crate) fn new(counter: Arc<dyn ReferenceCounter>) -> Self {
        Self {
            counter: Some(counter),
        }
    }

    pub(crate) fn cancel(mut self) {
        self.counter = None;
    }
}

impl Drop for DeathNotifier {
    fn drop(&mut self) {
        let Some(counter) = self.counter.take() else {
            return;
        };
        // The drop runs on whichever thread released the facet; a failure here
        // must stay here.
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| counter.unlink_instance())) {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(%message, "panic while unlinking a dropped facet");
        }
    }
}

struct FacetInner<F> {
    value: F,
    links: Mutex<HashMap<TrackerId, DeathNotifier>>,
}

/// A lightweight handle that keeps cached instances alive while it lives.
///
/// Link a facet to an instance with `GcCache::add_instance`. Cloning a facet
/// does not create a new reference in any cache; dropping the last clone
/// releases every reference the facet holds.
///
/// # Examples
///
/// ```
/// use lingercache_core::{Facet, GcCache};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let cache: GcCache<&str, Vec<u8>> = GcCache::new();
/// let buffer = Arc::new(vec![0u8; 1024]);
///
/// let facet = Facet::new("vertex view");
/// cache.add_instance(&facet, Arc::clone(&buffer));
/// assert_eq!(cache.reference_count(&buffer), Some(1));
///
/// drop(facet);
/// assert_eq!(cache.reference_count(&buffer), Some(0));
/// assert_eq!(cache.get_dead_instances(Duration::ZERO).len(), 1);
/// ```
pub struct Facet<F> {
    inner: Arc<FacetInner<F>>,
}

impl<F> Facet<F> {
    pub fn new(value: F) -> Self {
        Self {
            inner: Arc::new(FacetInner {
                value,
                links: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Creates a non-owning handle to this facet.
    pub fn downgrade(&self) -> WeakFacet<F> {
        WeakFacet {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Returns true if both handles are the same facet.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.inner, &other.inner)
    }

    /// Number of live clones of this facet.
    pub fn handle_count(this: &Self) -> usize {
        Arc::strong_count(&this.inner)
    }

    /// Number of caches this facet is currently linked into.
    pub fn link_count(this: &Self) -> usize {
        this.inner.links.lock().len()
    }

    pub(crate) fn links(&self) -> &Mutex<HashMap<TrackerId, DeathNotifier>> {
        &self.inner.links
    }
}

impl<F> Clone for Facet<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F> Deref for Facet<F> {
    type Target = F;

    fn deref(&self) -> &F {
        &self.inner.value
    }
}

impl<F: fmt::Debug> fmt::Debug for Facet<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Facet")
            .field("value", &self.inner.value)
            .field("links", &self.inner.links.lock().len())
            .finish()
    }
}

/// Non-owning counterpart of [`Facet`].
pub struct WeakFacet<F> {
    inner: Weak<FacetInner<F>>,
}

impl<F> WeakFacet<F> {
    /// Returns the facet if any strong handle is still alive.
    pub fn upgrade(&self) -> Option<Facet<F>> {
        self.inner.upgrade().map(|inner| Facet { inner })
    }
}

impl<F> Clone for WeakFacet<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<F> fmt::Debug for WeakFacet<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakFacet")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

/// Links facets to items for one cache.
pub(crate) struct FacetTracker {
    id: TrackerId,
}

impl FacetTracker {
    pub(crate) fn new() -> Self {
        Self {
            id: TrackerId::next(),
        }
    }

    /// Links `facet` to `item` and counts the new reference.
    ///
    /// Returns `false` and leaves the count alone if the facet is already
    /// linked in this tracker.
    pub(crate) fn register<F, C>(&self, facet: &Facet<F>, item: &Arc<C>) -> bool
    where
        C: ReferenceCounter + 'static,
    {
        let counter: Arc<dyn ReferenceCounter> = Arc::clone(item) as Arc<dyn ReferenceCounter>;
        let notifier = DeathNotifier::new(counter);

        let mut links = facet.links().lock();
        match links.entry(self.id) {
            Entry::Occupied(_) => {
                notifier.cancel();
                tracing::trace!("facet already linked, registration absorbed");
                false
            }
            Entry::Vacant(slot) => {
                item.link_instance();
                slot.insert(notifier);
                tracing::trace!("facet linked");
                true
            }
        }
    }

    pub(crate) fn is_linked<F>(&self, facet: &Facet<F>) -> bool {
        facet.links().lock().contains_key(&self.id)
    }
}
