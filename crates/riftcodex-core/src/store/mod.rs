//! In-memory two-tier entity caching.
//!
//! This module provides the `EntityStore`, a cache for one entity kind
//! (champions, items) holding:
//! - the bulk index: every entity's summary record from one collection fetch
//! - detail records: richer per-entity documents fetched lazily, once per id
//! - the name index resolving display names to ids
//!
//! Nothing is evicted; data lives until the store is dropped or the bulk
//! index is explicitly refetched.

pub mod entity;
pub mod index;
pub mod kind;
pub mod snapshot;

pub use entity::EntityStore;
pub use index::NameIndex;
pub use kind::{DetailSource, EntityKind};
pub use snapshot::Snapshot;
