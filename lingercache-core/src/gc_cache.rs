use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};
use std::time::Duration;

use crate::error::{GcCacheError, Result};
use crate::facet::FacetTracker;
use crate::repo::ItemsRepo;
use crate::{Clock, Facet, Item, SystemClock, WeakFacet};
#[cfg(feature = "stats")]
use crate::{stats_registry, GcCacheStats};

/// A cache that hands instances back for disposal once nothing uses them anymore.
///
/// Instances are shared resources (`Arc<I>`) that are expensive to build or to
/// hold. Facets (`Facet<F>`) are the lightweight handles user code passes
/// around. `add_instance` records that a facet references an instance; when the
/// facet's last handle is dropped, the reference is released automatically. An
/// instance with no references left is *dead*. `get_dead_instances(ttl)`
/// removes every instance that has been dead for at least `ttl` and returns it
/// to the caller, who decides how to dispose of it.
///
/// # Lifecycle
///
/// An instance's entry moves through these states:
///
/// - **Created**: first seen by `add_instance`, count 0
/// - **Live**: one or more facets reference it
/// - **Dead**: the last facet went away; the death time is recorded
/// - **Removed**: a sweep found it dead for at least the grace period
///
/// A dead entry goes back to live if a new facet registers for the same
/// instance before a sweep removes it.
///
/// # Sweeping
///
/// The cache owns no timer and no thread. Call `get_dead_instances` from
/// whatever schedule suits the application. The call never waits for a grace
/// period to elapse; it only collects instances whose grace period is already
/// over.
///
/// # Thread Safety
///
/// `add_instance` and `get_dead_instances` each run their lookup and update
/// steps under the repo's `parking_lot::Mutex`, so a sweep can neither evict an
/// instance that is being revived nor leave a revived instance unaccounted
/// for. Facets may be dropped on any thread.
///
/// # Examples
///
/// ```
/// use lingercache_core::{Facet, GcCache, ManualClock};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let clock = Arc::new(ManualClock::new());
/// let cache: GcCache<u32, String> = GcCache::builder().clock(clock.clone()).build();
///
/// let connection = Arc::new("db://primary".to_string());
/// let session = Facet::new(1);
/// cache.add_instance(&session, Arc::clone(&connection));
/// drop(session);
///
/// clock.advance(Duration::from_secs(2));
/// assert!(cache.get_dead_instances(Duration::from_secs(5)).is_empty());
///
/// clock.advance(Duration::from_secs(4));
/// let dead = cache.get_dead_instances(Duration::from_secs(5));
/// assert!(Arc::ptr_eq(&dead[0], &connection));
/// assert!(!cache.contains(&connection));
/// ```
pub struct GcCache<F, I> {
    repo: ItemsRepo<I>,
    tracker: FacetTracker,
    clock: Arc<dyn Clock>,
    name: Option<String>,
    #[cfg(feature = "stats")]
    stats: Arc<GcCacheStats>,
    _facet: PhantomData<fn(&Facet<F>)>,
}

impl<F, I: Send + Sync + 'static> GcCache<F, I> {
    /// Creates an unnamed cache on the system clock.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> GcCacheBuilder<F, I> {
        GcCacheBuilder::new()
    }

    /// Records that `facet` references `instance`.
    ///
    /// The first call for an instance creates its entry. The first call for a
    /// facet links it and increments the instance's count; later calls with the
    /// same facet are absorbed without counting again, even if they name a
    /// different instance. The reference is released when the facet's last
    /// handle is dropped.
    pub fn add_instance(&self, facet: &Facet<F>, instance: Arc<I>) {
        let mut repo = self.repo.lock();

        let (item, created) = match repo.get_by(&instance) {
            Some(item) => (item, false),
            None => (repo.add(Arc::new(self.new_item(instance))), true),
        };

        if self.tracker.register(facet, &item) {
            if created {
                tracing::debug!(cache = self.name(), "new instance cached");
                #[cfg(feature = "stats")]
                self.stats.record_item_created();
            }
            #[cfg(feature = "stats")]
            self.stats.record_link();
        } else {
            // Nothing will ever count this entry, so it must not stay behind.
            if created {
                repo.remove(&[item]);
            }
            #[cfg(feature = "stats")]
            self.stats.record_duplicate_link();
        }
    }

    /// Like [`add_instance`](Self::add_instance), for callers holding weak handles.
    ///
    /// # Errors
    ///
    /// Returns [`GcCacheError::InvalidArgument`] naming `facet` or `instance`
    /// if that handle can no longer be upgraded.
    pub fn try_add_instance(&self, facet: &WeakFacet<F>, instance: &Weak<I>) -> Result<()> {
        let facet = facet
            .upgrade()
            .ok_or(GcCacheError::InvalidArgument("facet"))?;
        let instance = instance
            .upgrade()
            .ok_or(GcCacheError::InvalidArgument("instance"))?;

        self.add_instance(&facet, instance);
        Ok(())
    }

    /// Removes and returns every instance that has had no facets for at least `ttl`.
    ///
    /// Returns an empty vector when nothing qualifies. Order is unspecified. A
    /// returned instance is no longer tracked; registering it again starts a
    /// fresh entry.
    pub fn get_dead_instances(&self, ttl: Duration) -> Vec<Arc<I>> {
        let now = self.clock.now();

        let dead = {
            let mut repo = self.repo.lock();
            let dead = repo.get_dead_items(ttl, now);
            if !dead.is_empty() {
                repo.remove(&dead);
            }
            dead
        };

        #[cfg(feature = "stats")]
        self.stats.record_sweep(dead.len());

        if !dead.is_empty() {
            tracing::debug!(
                cache = self.name(),
                count = dead.len(),
                ttl_ms = ttl.as_millis() as u64,
                "swept dead instances"
            );
        }

        dead.into_iter()
            .map(|item| Arc::clone(item.instance()))
            .collect()
    }

    /// Number of instances currently tracked, live or dead.
    pub fn len(&self) -> usize {
        self.repo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if `instance` is tracked and not yet swept.
    pub fn contains(&self, instance: &Arc<I>) -> bool {
        self.repo.get_by(instance).is_some()
    }

    /// Number of live facets referencing `instance`, or `None` if it is not tracked.
    pub fn reference_count(&self, instance: &Arc<I>) -> Option<usize> {
        self.repo
            .get_by(instance)
            .map(|item| item.reference_count())
    }

    /// Returns true if `facet` holds a reference in this cache.
    pub fn is_linked(&self, facet: &Facet<F>) -> bool {
        self.tracker.is_linked(facet)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[cfg(feature = "stats")]
    pub fn stats(&self) -> &GcCacheStats {
        &self.stats
    }

    #[cfg(feature = "stats")]
    fn new_item(&self, instance: Arc<I>) -> Item<I> {
        Item::new(instance, Arc::clone(&self.clock), Arc::clone(&self.stats))
    }

    #[cfg(not(feature = "stats"))]
    fn new_item(&self, instance: Arc<I>) -> Item<I> {
        Item::new(instance, Arc::clone(&self.clock))
    }
}

impl<F, I: Send + Sync + 'static> Default for GcCache<F, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F, I> fmt::Debug for GcCache<F, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GcCache")
            .field("name", &self.name)
            .field("instances", &self.repo.len())
            .field("clock", &self.clock)
            .finish()
    }
}

impl<F, I> Drop for GcCache<F, I> {
    fn drop(&mut self) {
        #[cfg(feature = "stats")]
        if let Some(name) = &self.name {
            stats_registry::unregister(name, &self.stats);
        }
    }
}

/// Configuration for a [`GcCache`].
///
/// # Examples
///
/// ```
/// use lingercache_core::{GcCache, SystemClock};
/// use std::sync::Arc;
///
/// let cache: GcCache<u64, Vec<u8>> = GcCache::builder()
///     .name("upload_buffers")
///     .clock(Arc::new(SystemClock))
///     .build();
///
/// assert_eq!(cache.name(), Some("upload_buffers"));
/// ```
pub struct GcCacheBuilder<F, I> {
    name: Option<String>,
    clock: Option<Arc<dyn Clock>>,
    _marker: PhantomData<fn() -> (F, I)>,
}

impl<F, I: Send + Sync + 'static> GcCacheBuilder<F, I> {
    pub fn new() -> Self {
        Self {
            name: None,
            clock: None,
            _marker: PhantomData,
        }
    }

    /// Names the cache. With the `stats` feature its statistics become
    /// reachable through `stats_registry` under this name until the cache is
    /// dropped.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Time source for death times and grace periods. Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> GcCache<F, I> {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        #[cfg(feature = "stats")]
        let stats = Arc::new(GcCacheStats::new());
        #[cfg(feature = "stats")]
        if let Some(name) = &self.name {
            stats_registry::register(name, Arc::clone(&stats));
        }

        GcCache {
            repo: ItemsRepo::new(),
            tracker: FacetTracker::new(),
            clock,
            name: self.name,
            #[cfg(feature = "stats")]
            stats,
            _facet: PhantomData,
        }
    }
}

impl<F, I: Send + Sync + 'static> Default for GcCacheBuilder<F, I> {
    fn default() -> Self {
        Self::new()
    }
}
