#![cfg(feature = "stats")]

use lingercache::{stats_registry, Facet, GcCache};
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;

#[test]
#[serial]
fn test_named_cache_is_registered() {
    let cache: GcCache<u32, String> = GcCache::builder().name("named_registered").build();
    let instance = Arc::new("buffer".to_string());

    let facet = Facet::new(1);
    cache.add_instance(&facet, Arc::clone(&instance));
    drop(facet);
    cache.get_dead_instances(Duration::ZERO);

    assert!(stats_registry::list().contains(&"named_registered".to_string()));
    let stats = stats_registry::get("named_registered").unwrap();
    assert_eq!(stats.items_created(), 1);
    assert_eq!(stats.links_created(), 1);
    assert_eq!(stats.deaths(), 1);
    assert_eq!(stats.evictions(), 1);
}

#[test]
#[serial]
fn test_dropping_cache_unregisters_it() {
    let cache: GcCache<u32, String> = GcCache::builder().name("named_dropped").build();
    assert!(stats_registry::get("named_dropped").is_some());

    drop(cache);
    assert!(stats_registry::get("named_dropped").is_none());
}

#[test]
#[serial]
fn test_unnamed_cache_is_not_registered() {
    stats_registry::clear();
    let _cache: GcCache<u32, String> = GcCache::new();
    assert!(stats_registry::list().is_empty());
}

#[test]
#[serial]
fn test_registry_reset_resets_live_counters() {
    let cache: GcCache<u32, String> = GcCache::builder().name("named_reset").build();
    let facet = Facet::new(1);
    cache.add_instance(&facet, Arc::new("x".to_string()));
    assert_eq!(cache.stats().links_created(), 1);

    assert!(stats_registry::reset("named_reset"));
    assert_eq!(cache.stats().links_created(), 0);
}
