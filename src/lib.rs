//! # Lingercache
//!
//! A thread-safe cache for shared, expensive instances whose lifetime is driven
//! by lightweight facet handles.
//!
//! ## Features
//!
//! - **Automatic release**: a facet's references end when its last handle is dropped
//! - **Grace periods**: dead instances linger for a caller-chosen `ttl` before eviction
//! - **Caller-driven sweeps**: `get_dead_instances` runs only when you call it
//! - **Thread-safe**: facets may be created, linked and dropped on any thread
//!
//! ## Quick Start
//!
//! ```rust
//! use lingercache::{Facet, GcCache};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! struct GpuTexture {
//!     id: u32,
//! }
//!
//! let cache: GcCache<&str, GpuTexture> = GcCache::new();
//! let texture = Arc::new(GpuTexture { id: 7 });
//!
//! let diffuse = Facet::new("diffuse view");
//! let normal = Facet::new("normal view");
//! cache.add_instance(&diffuse, Arc::clone(&texture));
//! cache.add_instance(&normal, Arc::clone(&texture));
//! assert_eq!(cache.reference_count(&texture), Some(2));
//!
//! drop(diffuse);
//! drop(normal);
//!
//! // Called periodically by the application
//! for dead in cache.get_dead_instances(Duration::ZERO) {
//!     assert_eq!(dead.id, 7);
//! }
//! assert!(cache.is_empty());
//! ```
//!
//! ## Grace Periods
//!
//! An instance is only returned once it has had no facets for at least the
//! requested `ttl`. A new facet registering in the meantime revives it:
//!
//! ```rust
//! use lingercache::{Facet, GcCache, ManualClock};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let clock = Arc::new(ManualClock::new());
//! let cache: GcCache<u32, String> = GcCache::builder().clock(clock.clone()).build();
//! let font = Arc::new("NotoSans".to_string());
//!
//! cache.add_instance(&Facet::new(1), Arc::clone(&font));
//! clock.advance(Duration::from_secs(3));
//!
//! let label = Facet::new(2);
//! cache.add_instance(&label, Arc::clone(&font));
//! clock.advance(Duration::from_secs(10));
//!
//! assert!(cache.get_dead_instances(Duration::from_secs(5)).is_empty());
//! ```
//!
//! ## Error Handling
//!
//! Callers that only hold weak handles use `try_add_instance`, which reports
//! handles that can no longer be upgraded:
//!
//! ```rust
//! use lingercache::{Facet, GcCache, GcCacheError};
//! use std::sync::Arc;
//!
//! let cache: GcCache<u32, String> = GcCache::new();
//! let instance = Arc::new("shader".to_string());
//! let weak_facet = Facet::new(1).downgrade();
//!
//! assert_eq!(
//!     cache.try_add_instance(&weak_facet, &Arc::downgrade(&instance)),
//!     Err(GcCacheError::InvalidArgument("facet"))
//! );
//! ```

pub use lingercache_core::*;
