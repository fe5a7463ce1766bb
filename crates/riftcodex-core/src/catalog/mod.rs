//! Champion and item query surface.
//!
//! `Catalog` composes one `EntityStore` per entity kind and answers the
//! questions a browser asks: names, id resolution, tag lists, build graphs,
//! shop fields, lore and tips.
//!
//! Two kinds of accessors live here:
//! - fetching accessors (`async`, return `Result`) make sure the detail
//!   record is resident, fetching it on first use
//! - soft accessors read resident data only and degrade to empty values or
//!   sentinels when a field is absent

pub mod spells;
pub mod tags;
pub mod view;

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde_json::{Map, Value};
use tracing::warn;

use crate::api::{FetchError, RemoteFetcher};
use crate::config::Config;
use crate::models::{DetailRecord, Document, EntityRecord};
use crate::store::{EntityKind, EntityStore};

pub use spells::SpellBook;
pub use tags::{filter_allowed, is_allowed_tag, ALLOWED_TAGS};
pub use view::{resolve_view, ItemView};

// ============================================================================
// Constants
// ============================================================================

/// Price reported when an item has no shop data
pub const NO_PRICE: i64 = -1;

/// Maximum concurrent detail requests when prefetching.
/// Limits parallel requests to avoid hammering the CDN.
const MAX_CONCURRENT_REQUESTS: usize = 10;

const UNKNOWN_ITEM: &str = "Unknown Item";
const NO_DESCRIPTION: &str = "No description available";

pub struct Catalog {
    config: Config,
    champions: EntityStore,
    items: EntityStore,
    spells: SpellBook,
}

impl Catalog {
    /// Wire every store to the same fetcher using the configured endpoints
    pub fn new(config: Config, fetcher: Arc<dyn RemoteFetcher>) -> Self {
        let champions = EntityStore::new(EntityKind::champions(&config), Arc::clone(&fetcher));
        let items = EntityStore::new(EntityKind::items(&config), Arc::clone(&fetcher));
        let spells = SpellBook::new(
            fetcher,
            config.game_modes_url.clone(),
            config.summoner_spells_url(),
        );

        Self {
            config,
            champions,
            items,
            spells,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn champions(&self) -> &EntityStore {
        &self.champions
    }

    pub fn items(&self) -> &EntityStore {
        &self.items
    }

    pub fn spells(&self) -> &SpellBook {
        &self.spells
    }

    // =========================================================================
    // Champions
    // =========================================================================

    pub async fn fetch_champions(&self) -> Result<(), FetchError> {
        self.champions.fetch_bulk().await
    }

    pub fn champion_names(&self) -> Vec<String> {
        self.champions.names()
    }

    pub fn champion_ids(&self) -> Vec<String> {
        self.champions.ids()
    }

    /// Champion id for a display name; unknown names pass through unchanged
    pub fn champion_id(&self, name: &str) -> String {
        self.champions.resolve_id(name)
    }

    pub fn champion_summary(&self, id: &str) -> Option<Arc<EntityRecord>> {
        self.champions.record(id)
    }

    pub fn champion_title(&self, name: &str) -> String {
        self.champions
            .record(&self.champion_id(name))
            .and_then(|r| r.str_at("/title").map(str::to_string))
            .unwrap_or_default()
    }

    pub fn champion_tags(&self, name: &str) -> Vec<String> {
        self.champions
            .record(&self.champion_id(name))
            .map(|r| filter_allowed(r.strings_at("/tags")))
            .unwrap_or_default()
    }

    pub fn champion_splash_url(&self, id: &str) -> String {
        self.config.champion_splash_url(id)
    }

    pub fn champion_icon_url(&self, id: &str) -> String {
        self.config.champion_icon_url(id)
    }

    pub fn champion_skin_url(&self, id: &str, skin_num: &str) -> String {
        self.config.champion_skin_url(id, skin_num)
    }

    /// Detail record for a champion given its display name or id
    pub async fn champion_detail(&self, name: &str) -> Result<Arc<DetailRecord>, FetchError> {
        let id = self.champion_id(name);
        self.champions.fetch_detail(&id).await
    }

    pub async fn champion_lore(&self, name: &str) -> Result<String, FetchError> {
        let detail = self.champion_detail(name).await?;
        Ok(detail.str_at("/lore").unwrap_or_default().to_string())
    }

    /// Base stats object; empty when the payload has none
    pub async fn champion_stats(&self, name: &str) -> Result<Value, FetchError> {
        let detail = self.champion_detail(name).await?;
        Ok(object_or_empty(detail.value_at("/stats")))
    }

    pub async fn champion_spells(&self, name: &str) -> Result<Vec<Value>, FetchError> {
        let detail = self.champion_detail(name).await?;
        Ok(array_or_empty(detail.value_at("/spells")))
    }

    pub async fn champion_passive(&self, name: &str) -> Result<Option<Value>, FetchError> {
        let detail = self.champion_detail(name).await?;
        Ok(detail.value_at("/passive").cloned())
    }

    pub async fn champion_skins(&self, name: &str) -> Result<Vec<Value>, FetchError> {
        let detail = self.champion_detail(name).await?;
        Ok(array_or_empty(detail.value_at("/skins")))
    }

    pub async fn champion_ally_tips(&self, name: &str) -> Result<Vec<String>, FetchError> {
        let detail = self.champion_detail(name).await?;
        Ok(detail.strings_at("/allytips"))
    }

    pub async fn champion_enemy_tips(&self, name: &str) -> Result<Vec<String>, FetchError> {
        let detail = self.champion_detail(name).await?;
        Ok(detail.strings_at("/enemytips"))
    }

    // =========================================================================
    // Items
    // =========================================================================

    pub async fn fetch_items(&self) -> Result<(), FetchError> {
        self.items.fetch_bulk().await
    }

    pub fn item_names(&self) -> Vec<String> {
        self.items.names()
    }

    pub fn item_ids(&self) -> Vec<String> {
        self.items.ids()
    }

    /// Item id for a display name; unknown names pass through unchanged
    pub fn item_id(&self, name: &str) -> String {
        self.items.resolve_id(name)
    }

    pub fn items_by_tag(&self, tag: &str) -> Vec<String> {
        self.items.query_by_tag(tag)
    }

    pub fn item_exists(&self, id: &str) -> bool {
        self.items.exists(id)
    }

    pub fn item_summary(&self, id: &str) -> Option<Arc<EntityRecord>> {
        self.items.record(id)
    }

    pub fn item_name(&self, id: &str) -> String {
        self.items
            .name_of(id)
            .unwrap_or_else(|| UNKNOWN_ITEM.to_string())
    }

    pub fn item_description(&self, id: &str) -> String {
        self.items
            .record(id)
            .and_then(|r| r.str_at("/simpleDescription").map(str::to_string))
            .unwrap_or_else(|| NO_DESCRIPTION.to_string())
    }

    pub fn item_icon_url(&self, id: &str) -> Option<String> {
        self.items
            .record(id)
            .and_then(|r| r.str_at("/icon").map(str::to_string))
    }

    /// Reverse lookup from an icon URL
    pub fn item_id_from_icon_url(&self, url: &str) -> Option<String> {
        self.items.find_id(|record| record.str_at("/icon") == Some(url))
    }

    pub fn item_tags(&self, id: &str) -> Vec<String> {
        self.items
            .record(id)
            .map(|r| filter_allowed(r.strings_at("/shop/tags")))
            .unwrap_or_default()
    }

    /// Stats object; empty when the item has none
    pub fn item_stats(&self, id: &str) -> Value {
        self.items
            .record(id)
            .map(|r| object_or_empty(r.value_at("/stats")))
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    /// Total cost, or `NO_PRICE`
    pub fn item_cost(&self, id: &str) -> i64 {
        self.item_shop_i64(id, "/shop/prices/total").unwrap_or(NO_PRICE)
    }

    /// Sell price, or `NO_PRICE`
    pub fn item_sell_price(&self, id: &str) -> i64 {
        self.item_shop_i64(id, "/shop/prices/sell").unwrap_or(NO_PRICE)
    }

    pub fn item_purchasable(&self, id: &str) -> bool {
        let purchasable = match self.items.cached_detail(id) {
            Some(detail) => detail.bool_at("/shop/purchasable"),
            None => self.items.record(id).and_then(|r| r.bool_at("/shop/purchasable")),
        };
        purchasable.unwrap_or(false)
    }

    /// Shop fields prefer the resident detail record over the bulk summary
    fn item_shop_i64(&self, id: &str, pointer: &str) -> Option<i64> {
        match self.items.cached_detail(id) {
            Some(detail) => detail.i64_at(pointer),
            None => self.items.record(id).and_then(|r| r.i64_at(pointer)),
        }
    }

    pub async fn item_detail(&self, id: &str) -> Result<Arc<DetailRecord>, FetchError> {
        self.items.fetch_detail(id).await
    }

    /// Components this item is built from
    pub async fn builds_from(&self, id: &str) -> Result<Vec<String>, FetchError> {
        let detail = self.item_detail(id).await?;
        Ok(detail.ids_at("/buildsFrom").into_vec())
    }

    /// Items this item builds into
    pub async fn builds_into(&self, id: &str) -> Result<Vec<String>, FetchError> {
        let detail = self.item_detail(id).await?;
        Ok(detail.ids_at("/buildsInto").into_vec())
    }

    pub async fn item_shop_info(&self, id: &str) -> Result<Value, FetchError> {
        let detail = self.item_detail(id).await?;
        Ok(object_or_empty(detail.value_at("/shop")))
    }

    /// Warm the item detail cache; returns how many ids are now resident.
    pub async fn prefetch_item_details(&self, ids: &[String]) -> usize {
        stream::iter(ids)
            .map(|id| async move { (id, self.items.fetch_detail(id).await) })
            .buffer_unordered(MAX_CONCURRENT_REQUESTS)
            .filter(|(id, result)| {
                if let Err(e) = result {
                    warn!(id = %id, error = %e, "Prefetch skipped item");
                }
                futures::future::ready(result.is_ok())
            })
            .count()
            .await
    }
}

fn object_or_empty(value: Option<&Value>) -> Value {
    match value {
        Some(v @ Value::Object(_)) => v.clone(),
        _ => Value::Object(Map::new()),
    }
}

fn array_or_empty(value: Option<&Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(entries)) => entries.clone(),
        _ => Vec::new(),
    }
}

// ============================================================================
// Tests
// ============================================================================
