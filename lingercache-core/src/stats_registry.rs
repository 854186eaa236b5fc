use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::GcCacheStats;

/// Global registry for the statistics of named caches.
///
/// A cache built with `GcCache::builder().name(..)` registers its stats here and
/// removes them again when it is dropped. Unnamed caches are never registered.
///
/// # Examples
///
/// ```
/// use lingercache_core::stats_registry;
///
/// if let Some(stats) = stats_registry::get("texture_cache") {
///     println!("Evicted: {}", stats.evictions());
/// }
///
/// for name in stats_registry::list() {
///     println!("Cache: {}", name);
/// }
/// ```
static STATS_REGISTRY: Lazy<RwLock<HashMap<String, Arc<GcCacheStats>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Register a cache's statistics under a given name.
///
/// A later registration under the same name replaces the earlier one.
pub fn register(name: &str, stats: Arc<GcCacheStats>) {
    let mut registry = STATS_REGISTRY.write();
    registry.insert(name.to_string(), stats);
}

/// Remove `name` from the registry if it still points at `stats`.
///
/// Returns `false` when the name is unknown or was taken over by another cache.
pub fn unregister(name: &str, stats: &Arc<GcCacheStats>) -> bool {
    let mut registry = STATS_REGISTRY.write();
    match registry.get(name) {
        Some(current) if Arc::ptr_eq(current, stats) => {
            registry.remove(name);
            true
        }
        _ => false,
    }
}

/// Get a snapshot of the statistics registered under `name`.
pub fn get(name: &str) -> Option<GcCacheStats> {
    let registry = STATS_REGISTRY.read();
    registry.get(name).map(|stats| (**stats).clone())
}

/// Get the live statistics registered under `name`, without cloning the counters.
pub fn get_arc(name: &str) -> Option<Arc<GcCacheStats>> {
    let registry = STATS_REGISTRY.read();
    registry.get(name).cloned()
}

/// List all registered cache names.
pub fn list() -> Vec<String> {
    let registry = STATS_REGISTRY.read();
    registry.keys().cloned().collect()
}

/// Clear all registered statistics.
///
/// This removes all entries from the registry but does not reset the statistics themselves.
pub fn clear() {
    let mut registry = STATS_REGISTRY.write();
    registry.clear();
}

/// Reset the counters of the cache registered under `name`.
///
/// Returns `false` if no cache with that name is registered.
pub fn reset(name: &str) -> bool {
    let registry = STATS_REGISTRY.read();
    if let Some(stats) = registry.get(name) {
        stats.reset();
        true
    } else {
        false
    }
}
