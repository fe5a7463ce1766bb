//! Turns a `ViewState` into what the item browser shows.
//!
//! Resolution reads resident bulk data only. Replaying history through here
//! never reaches the network.

use tracing::warn;

use super::Catalog;
use crate::history::ViewState;

/// Resolved contents of the item browser for one view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    /// Item ids to list, in bulk-index order
    pub items: Vec<String>,
    pub active_tag: Option<String>,
    /// Selected row in `items`
    pub selected: Option<usize>,
    /// Whitelisted tags of the single displayed item
    pub item_tags: Vec<String>,
    /// Position of the displayed item's name in `Catalog::item_names`
    pub name_position: Option<usize>,
}

/// Resolve `view` against the catalog. `previous_tag` is the tag that was
/// active before this view was applied.
///
/// Returns `None` for an entity view whose id is not in the item index.
pub fn resolve_view(
    catalog: &Catalog,
    view: &ViewState,
    previous_tag: Option<&str>,
) -> Option<ItemView> {
    if view.is_tag_view {
        let tag = view.tag.clone();
        let items = tag
            .as_deref()
            .map(|t| catalog.items_by_tag(t))
            .unwrap_or_default();
        return Some(ItemView {
            items,
            active_tag: tag,
            selected: None,
            item_tags: Vec::new(),
            name_position: None,
        });
    }

    let id = view.entity_id();
    if !catalog.item_exists(id) {
        warn!(id, "View references an unknown item");
        return None;
    }

    let item_tags = catalog.item_tags(id);
    let active_tag = previous_tag
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .or_else(|| item_tags.first().cloned());
    let items = vec![id.to_string()];
    let selected = usize::try_from(view.selected_index)
        .ok()
        .filter(|&index| index < items.len());
    let name_position = catalog.items().name_position(&catalog.item_name(id));

    Some(ItemView {
        items,
        active_tag,
        selected,
        item_tags,
        name_position,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{catalog_with, item_payload, ITEMS};
    use crate::testing::StubFetcher;
    use std::sync::Arc;

    async fn loaded() -> (Arc<StubFetcher>, Catalog) {
        let fetcher = Arc::new(StubFetcher::new().with_json(ITEMS, item_payload()));
        let catalog = catalog_with(&fetcher);
        catalog.fetch_items().await.expect("items load");
        (fetcher, catalog)
    }

    #[tokio::test]
    async fn test_tag_view() {
        let (_, catalog) = loaded().await;
        let view = resolve_view(&catalog, &ViewState::tag("TANK"), Some("MAGE")).unwrap();
        assert_eq!(view.items, vec!["1029", "3047"]);
        assert_eq!(view.active_tag.as_deref(), Some("TANK"));
        assert_eq!(view.selected, None);
        assert!(view.item_tags.is_empty());
    }

    #[tokio::test]
    async fn test_initial_view_is_empty_listing() {
        let (_, catalog) = loaded().await;
        let view = resolve_view(&catalog, &ViewState::initial(), None).unwrap();
        assert!(view.items.is_empty());
        assert_eq!(view.active_tag, None);
    }

    #[tokio::test]
    async fn test_entity_view() {
        let (fetcher, catalog) = loaded().await;

        let view = resolve_view(&catalog, &ViewState::entity("3047", None), None).unwrap();
        assert_eq!(view.items, vec!["3047"]);
        assert_eq!(view.selected, Some(0));
        assert_eq!(view.item_tags, vec!["TANK"]);
        assert_eq!(view.active_tag.as_deref(), Some("TANK"));
        // Names in id order: Boots, Cloth Armor, Berserker's Greaves, Plated Steelcaps
        assert_eq!(view.name_position, Some(3));

        let kept = resolve_view(&catalog, &ViewState::entity("3047", None), Some("MAGE")).unwrap();
        assert_eq!(kept.active_tag.as_deref(), Some("MAGE"));

        assert_eq!(fetcher.total_calls(), 1);
    }

    #[tokio::test]
    async fn test_entity_view_without_tags() {
        let (_, catalog) = loaded().await;
        let view = resolve_view(&catalog, &ViewState::entity("1001", None), Some("")).unwrap();
        assert_eq!(view.active_tag, None);
        assert!(view.item_tags.is_empty());

        let unselected = ViewState::entity("1001", None).with_selected_index(-1);
        assert_eq!(resolve_view(&catalog, &unselected, None).unwrap().selected, None);
    }

    #[tokio::test]
    async fn test_unknown_entity_is_none() {
        let (_, catalog) = loaded().await;
        assert_eq!(resolve_view(&catalog, &ViewState::entity("4242", None), None), None);
    }
}
