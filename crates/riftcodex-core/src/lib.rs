//! Core library for riftcodex.
//!
//! Champion, item and summoner spell data from Data Dragon and Meraki,
//! cached in memory in two tiers: a bulk index fetched once per kind and
//! per-entity detail records fetched lazily on first access. A navigation
//! history and a background randomizer drive the browsing front end.
//!
//! Everything remote goes through the [`api::RemoteFetcher`] seam, so the
//! stores can be exercised without a network.

pub mod api;
pub mod catalog;
pub mod config;
pub mod history;
pub mod models;
pub mod randomizer;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{FetchError, HttpFetcher, RemoteFetcher};
pub use catalog::{resolve_view, Catalog, ItemView};
pub use config::Config;
pub use history::{HistoryError, NavigationHistory, ViewState};
pub use randomizer::Randomizer;
