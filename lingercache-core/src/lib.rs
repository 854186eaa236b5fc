//! # Lingercache Core
//!
//! Deferred cleanup for shared, expensive instances.
//!
//! Many lightweight *facets* may reference one *instance*. The instance stays
//! cached while any facet referencing it is alive. Once the last facet is
//! dropped the instance is *dead*, and after a caller-chosen grace period a
//! sweep hands it back for disposal.
//!
//! ## Features
//!
//! - **Automatic release**: dropping the last clone of a [`Facet`] releases its references
//! - **Identity-based deduplication**: instances are `Arc`s compared by address
//! - **Grace periods**: dead instances are only returned after `ttl` has elapsed
//! - **Revival**: a dead instance picked up by a new facet before the sweep stays cached
//! - **Caller-driven sweeps**: no background thread, no timer
//! - **Statistics**: lifecycle counters per cache (with the `stats` feature)
//!
//! ## Module Organization
//!
//! - `item` - Reference-counted record for one instance
//! - `repo` - Identity-keyed store of items behind one mutex
//! - [`facet`] - Facet handles and the per-cache links they own
//! - `gc_cache` - The [`GcCache`] facade
//! - [`clock`] - Monotonic time sources, including [`ManualClock`] for tests
//! - [`stats_registry`] - Lookup of named caches' statistics
//!
mod error;
mod gc_cache;
mod item;
mod repo;

pub mod clock;
pub mod facet;

#[cfg(feature = "stats")]
mod stats;

#[cfg(feature = "stats")]
pub mod stats_registry;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::GcCacheError;
pub use facet::{Facet, WeakFacet};
pub use gc_cache::{GcCache, GcCacheBuilder};

pub(crate) use item::Item;

#[cfg(feature = "stats")]
pub use stats::GcCacheStats;
