use std::sync::atomic::{AtomicU64, Ordering};

/// Lifecycle statistics for a single `GcCache`.
///
/// Counters are updated with atomic operations using `Relaxed` ordering. They
/// describe what happened, not the current state: `deaths` counts every time an
/// item's reference count reached zero, including items that were later revived.
///
/// # Examples
///
/// ```
/// use lingercache_core::GcCacheStats;
///
/// let stats = GcCacheStats::new();
///
/// stats.record_item_created();
/// stats.record_link();
/// stats.record_link();
/// stats.record_duplicate_link();
///
/// assert_eq!(stats.items_created(), 1);
/// assert_eq!(stats.links_created(), 2);
/// assert_eq!(stats.duplicate_links(), 1);
/// ```
#[derive(Debug)]
pub struct GcCacheStats {
    items_created: AtomicU64,
    links_created: AtomicU64,
    duplicate_links: AtomicU64,
    deaths: AtomicU64,
    revivals: AtomicU64,
    evictions: AtomicU64,
    sweeps: AtomicU64,
}

impl GcCacheStats {
    /// Creates a new `GcCacheStats` instance with zero counters.
    pub fn new() -> Self {
        Self {
            items_created: AtomicU64::new(0),
            links_created: AtomicU64::new(0),
            duplicate_links: AtomicU64::new(0),
            deaths: AtomicU64::new(0),
            revivals: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            sweeps: AtomicU64::new(0),
        }
    }

    /// Records that an instance was seen for the first time and got an item.
    #[inline]
    pub fn record_item_created(&self) {
        self.items_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a new facet link.
    #[inline]
    pub fn record_link(&self) {
        self.links_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a registration that was absorbed because the facet was already linked.
    #[inline]
    pub fn record_duplicate_link(&self) {
        self.duplicate_links.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an item whose reference count dropped to zero.
    #[inline]
    pub fn record_death(&self) {
        self.deaths.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a dead item brought back to life by a new facet.
    #[inline]
    pub fn record_revival(&self) {
        self.revivals.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one sweep that handed `count` instances back to the caller.
    #[inline]
    pub fn record_sweep(&self, count: usize) {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        self.evictions.fetch_add(count as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn items_created(&self) -> u64 {
        self.items_created.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn links_created(&self) -> u64 {
        self.links_created.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn duplicate_links(&self) -> u64 {
        self.duplicate_links.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn deaths(&self) -> u64 {
        self.deaths.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn revivals(&self) -> u64 {
        self.revivals.load(Ordering::Relaxed)
    }

    /// Total number of instances returned by sweeps.
    #[inline]
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Number of `get_dead_instances` calls, including the ones that found nothing.
    #[inline]
    pub fn sweeps(&self) -> u64 {
        self.sweeps.load(Ordering::Relaxed)
    }

    /// Resets all statistics counters to zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use lingercache_core::GcCacheStats;
    ///
    /// let stats = GcCacheStats::new();
    /// stats.record_link();
    /// stats.record_sweep(3);
    ///
    /// stats.reset();
    /// assert_eq!(stats.links_created(), 0);
    /// assert_eq!(stats.evictions(), 0);
    /// assert_eq!(stats.sweeps(), 0);
    /// ```
    pub fn reset(&self) {
        self.items_created.store(0, Ordering::Relaxed);
        self.links_created.store(0, Ordering::Relaxed);
        self.duplicate_links.store(0, Ordering::Relaxed);
        self.deaths.store(0, Ordering::Relaxed);
        self.revivals.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
        self.sweeps.store(0, Ordering::Relaxed);
    }
}

impl Default for GcCacheStats {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for GcCacheStats {
    fn clone(&self) -> Self {
        Self {
            items_created: AtomicU64::new(self.items_created()),
            links_created: AtomicU64::new(self.links_created()),
            duplicate_links: AtomicU64::new(self.duplicate_links()),
            deaths: AtomicU64::new(self.deaths()),
            revivals: AtomicU64::new(self.revivals()),
            evictions: AtomicU64::new(self.evictions()),
            sweeps: AtomicU64::new(self.sweeps()),
        }
    }
}
