use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex as AsyncMutex, OnceCell};
use tracing::{debug, info, warn};

use super::{DetailSource, EntityKind, NameIndex, Snapshot};
use crate::api::{fetch_ok, FetchError, RemoteFetcher};
use crate::models::{DetailRecord, Document, EntityRecord};

type Records = BTreeMap<String, Arc<EntityRecord>>;

/// Per-id detail slot.
///
/// `attempt` is held for the whole of a fetch, so at most one request per id
/// is in flight. `failures` counts failed attempts: a caller that queued
/// behind an attempt which then failed gets that attempt's error instead of
/// issuing a request of its own.
#[derive(Debug, Default)]
struct DetailSlot {
    record: OnceCell<Arc<DetailRecord>>,
    failures: AtomicU64,
    attempt: AsyncMutex<Option<FetchError>>,
}

#[derive(Debug, Default)]
struct BulkState {
    records: Option<Snapshot<Records>>,
    names: NameIndex,
}

/// Two-tier cache for one entity kind.
///
/// Bulk state sits behind a `RwLock` that is never held across an await.
/// Detail records are memoized per id, so concurrent callers asking for the
/// same id share one request (and its outcome) while unrelated ids proceed
/// independently.
pub struct EntityStore {
    kind: EntityKind,
    fetcher: Arc<dyn RemoteFetcher>,
    bulk: RwLock<BulkState>,
    details: Mutex<HashMap<String, Arc<DetailSlot>>>,
}

impl EntityStore {
    pub fn new(kind: EntityKind, fetcher: Arc<dyn RemoteFetcher>) -> Self {
        Self {
            kind,
            fetcher,
            bulk: RwLock::new(BulkState::default()),
            details: Mutex::new(HashMap::new()),
        }
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    fn state(&self) -> RwLockReadGuard<'_, BulkState> {
        self.bulk.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, BulkState> {
        self.bulk.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, Arc<DetailSlot>>> {
        self.details.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    async fn load_bulk(&self) -> Result<BTreeMap<String, EntityRecord>, FetchError> {
        let body = fetch_ok(self.fetcher.as_ref(), &self.kind.bulk_path).await?;
        self.kind.parse_bulk(&body)
    }

    /// Fetch the whole collection and replace the bulk index and name index.
    ///
    /// On failure the previous state is left exactly as it was.
    pub async fn fetch_bulk(&self) -> Result<(), FetchError> {
        let records = match self.load_bulk().await {
            Ok(records) => records,
            Err(e) => {
                warn!(kind = self.kind.label, error = %e, "Bulk fetch failed");
                return Err(e);
            }
        };

        let names = NameIndex::rebuild(records.values().map(|r| (r.name(), r.id())));
        let records: Records = records
            .into_iter()
            .map(|(id, record)| (id, Arc::new(record)))
            .collect();
        let count = records.len();

        {
            let mut state = self.state_mut();
            state.records = Some(Snapshot::new(records));
            state.names = names;
        }

        info!(kind = self.kind.label, count, "Bulk index loaded");
        Ok(())
    }

    /// Return the detail record for `id`, fetching it on first use.
    ///
    /// A cached record is returned without touching the network. Callers
    /// that arrive while a fetch is running wait for it and share its result,
    /// failure included. A failed fetch stores nothing, so a call made after
    /// it tries again.
    pub async fn fetch_detail(&self, id: &str) -> Result<Arc<DetailRecord>, FetchError> {
        let slot = self.detail_slot(id);
        if let Some(detail) = slot.record.get() {
            debug!(kind = self.kind.label, id, "Detail cache hit");
            return Ok(Arc::clone(detail));
        }

        let failures_seen = slot.failures.load(Ordering::Acquire);
        let mut last_error = slot.attempt.lock().await;
        if let Some(detail) = slot.record.get() {
            return Ok(Arc::clone(detail));
        }
        if slot.failures.load(Ordering::Acquire) != failures_seen {
            if let Some(ref e) = *last_error {
                debug!(kind = self.kind.label, id, "Sharing failure of concurrent fetch");
                return Err(e.clone());
            }
        }

        match self.load_detail(id).await {
            Ok(detail) => {
                *last_error = None;
                let _ = slot.record.set(Arc::clone(&detail));
                Ok(detail)
            }
            Err(e) => {
                *last_error = Some(e.clone());
                slot.failures.fetch_add(1, Ordering::Release);
                Err(e)
            }
        }
    }

    fn detail_slot(&self, id: &str) -> Arc<DetailSlot> {
        let mut slots = self.slots();
        Arc::clone(slots.entry(id.to_string()).or_default())
    }

    async fn load_detail(&self, id: &str) -> Result<Arc<DetailRecord>, FetchError> {
        debug!(kind = self.kind.label, id, "Detail cache miss");

        let result = match self.kind.detail {
            DetailSource::Bulk => self.detail_from_bulk(id).await,
            DetailSource::Endpoint { .. } => self.detail_from_endpoint(id).await,
        };

        match result {
            Ok(detail) => {
                self.remember_name(&detail);
                Ok(Arc::new(detail))
            }
            Err(e) => {
                warn!(kind = self.kind.label, id, error = %e, "Detail fetch failed");
                Err(e)
            }
        }
    }

    /// The bulk entry is the detail. With no bulk index loaded yet, the
    /// collection is fetched but only the requested entry is kept.
    async fn detail_from_bulk(&self, id: &str) -> Result<DetailRecord, FetchError> {
        if let Some(record) = self.record(id) {
            return Ok(DetailRecord::from(EntityRecord::clone(&record)));
        }
        if self.is_loaded() {
            return Err(FetchError::NotFound(format!("{} '{}'", self.kind.label, id)));
        }

        debug!(kind = self.kind.label, id, "Bulk index empty, fetching collection for one entry");
        let mut records = self.load_bulk().await?;
        records
            .remove(id)
            .map(DetailRecord::from)
            .ok_or_else(|| FetchError::NotFound(format!("{} '{}'", self.kind.label, id)))
    }

    async fn detail_from_endpoint(&self, id: &str) -> Result<DetailRecord, FetchError> {
        if self.is_loaded() && !self.exists(id) {
            return Err(FetchError::NotFound(format!("{} '{}'", self.kind.label, id)));
        }
        let path = self
            .kind
            .detail_path(id)
            .ok_or_else(|| FetchError::NotFound(format!("{} '{}'", self.kind.label, id)))?;
        let body = fetch_ok(self.fetcher.as_ref(), &path).await?;
        self.kind.parse_detail(id, &body)
    }

    /// Add the detail's own name to the name index if it is not there yet.
    fn remember_name(&self, detail: &DetailRecord) {
        let mut state = self.state_mut();
        if state.names.insert_if_absent(detail.name(), detail.id()) {
            debug!(kind = self.kind.label, id = detail.id(), name = detail.name(), "Name indexed from detail");
        }
    }

    /// Cached detail record, never fetching
    pub fn cached_detail(&self, id: &str) -> Option<Arc<DetailRecord>> {
        self.slots().get(id).and_then(|slot| slot.record.get().cloned())
    }

    /// Number of detail records held
    pub fn detail_count(&self) -> usize {
        self.slots().values().filter(|slot| slot.record.initialized()).count()
    }

    // =========================================================================
    // Queries over the bulk index
    // =========================================================================

    /// Resolve a display name to an id, falling back to the input itself.
    pub fn resolve_id(&self, name: &str) -> String {
        self.state()
            .names
            .resolve(name)
            .unwrap_or(name)
            .to_string()
    }

    /// Ids whose tag array contains `tag`, in bulk-index order.
    pub fn query_by_tag(&self, tag: &str) -> Vec<String> {
        let pointer = self.kind.tags_pointer.as_str();
        let matches: Vec<String> = self
            .state()
            .records
            .iter()
            .flat_map(|snapshot| snapshot.data.values())
            .filter(|record| record.array_contains(pointer, tag))
            .map(|record| record.id().to_string())
            .collect();
        debug!(kind = self.kind.label, tag, count = matches.len(), "Tag query");
        matches
    }

    pub fn exists(&self, id: &str) -> bool {
        self.state()
            .records
            .as_ref()
            .is_some_and(|snapshot| snapshot.data.contains_key(id))
    }

    /// Whether a bulk index has been loaded
    pub fn is_loaded(&self) -> bool {
        self.state().records.is_some()
    }

    pub fn len(&self) -> usize {
        self.state().records.as_ref().map_or(0, |s| s.data.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn record(&self, id: &str) -> Option<Arc<EntityRecord>> {
        self.state()
            .records
            .as_ref()
            .and_then(|snapshot| snapshot.data.get(id).cloned())
    }

    pub fn name_of(&self, id: &str) -> Option<String> {
        self.record(id).map(|record| record.name().to_string())
    }

    /// Display names in bulk-index order, followed by names learned from details
    pub fn names(&self) -> Vec<String> {
        self.state().names.names().to_vec()
    }

    pub fn name_position(&self, name: &str) -> Option<usize> {
        self.state().names.position(name)
    }

    pub fn ids(&self) -> Vec<String> {
        self.state()
            .records
            .as_ref()
            .map(|snapshot| snapshot.data.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// First id, in bulk-index order, whose record satisfies `predicate`
    pub fn find_id(&self, predicate: impl Fn(&EntityRecord) -> bool) -> Option<String> {
        self.state().records.as_ref().and_then(|snapshot| {
            snapshot
                .data
                .values()
                .find(|record| predicate(record))
                .map(|record| record.id().to_string())
        })
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.state().records.as_ref().map(|s| s.fetched_at)
    }

    /// Age of the bulk index for display, or "never"
    pub fn age_display(&self) -> String {
        self.state()
            .records
            .as_ref()
            .map(Snapshot::age_display)
            .unwrap_or_else(|| "never".to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RawResponse;
    use crate::testing::StubFetcher;

    const CHAMPIONS: &str = "/champion.json";
    const SAMPLE_BULK: &str =
        r#"{"Aatrox":{"id":"Aatrox","tags":["Fighter"]},"Ahri":{"id":"Ahri","tags":["Mage"]}}"#;

    fn store_with(fetcher: &Arc<StubFetcher>, kind: EntityKind) -> EntityStore {
        EntityStore::new(kind, Arc::clone(fetcher) as Arc<dyn RemoteFetcher>)
    }

    fn endpoint_kind() -> EntityKind {
        EntityKind::new("champions", CHAMPIONS)
            .with_envelope("data")
            .with_detail_endpoint("/champion/{id}.json")
    }

    fn endpoint_fetcher() -> Arc<StubFetcher> {
        Arc::new(
            StubFetcher::new()
                .with_json(
                    CHAMPIONS,
                    r#"{"data":{"Ahri":{"id":"Ahri","name":"Ahri","tags":["Mage","Assassin"]},"MonkeyKing":{"id":"MonkeyKing","name":"Wukong","tags":["Fighter","Tank"]}}}"#,
                )
                .with_json(
                    "/champion/Ahri.json",
                    r#"{"data":{"Ahri":{"id":"Ahri","name":"Ahri","lore":"A vastaya..."}}}"#,
                )
                .with_json(
                    "/champion/MonkeyKing.json",
                    r#"{"data":{"MonkeyKing":{"id":"MonkeyKing","name":"Wukong","lore":"Monkey."}}}"#,
                ),
        )
    }

    #[tokio::test]
    async fn test_end_to_end_flat_bulk() {
        let fetcher = Arc::new(StubFetcher::new().with_json(CHAMPIONS, SAMPLE_BULK));
        let store = store_with(&fetcher, EntityKind::new("champions", CHAMPIONS));

        store.fetch_bulk().await.expect("bulk fetch succeeds");

        assert_eq!(store.resolve_id("Ahri"), "Ahri");
        assert_eq!(store.query_by_tag("Mage"), vec!["Ahri"]);
        assert!(store.query_by_tag("Support").is_empty());
        assert_eq!(store.len(), 2);
        assert_eq!(store.age_display(), "just now");
    }

    #[tokio::test]
    async fn test_tag_query_is_deterministic() {
        let fetcher = endpoint_fetcher();
        let store = store_with(&fetcher, endpoint_kind());
        store.fetch_bulk().await.expect("bulk fetch succeeds");

        let first = store.query_by_tag("Fighter");
        assert_eq!(first, vec!["MonkeyKing"]);
        assert_eq!(store.query_by_tag("Fighter"), first);
        assert!(store.query_by_tag("TANK").is_empty()); // exact match only
    }

    #[tokio::test]
    async fn test_resolve_id_fallback() {
        let fetcher = endpoint_fetcher();
        let store = store_with(&fetcher, endpoint_kind());
        assert_eq!(store.resolve_id("unknown-name"), "unknown-name");

        store.fetch_bulk().await.expect("bulk fetch succeeds");
        assert_eq!(store.resolve_id("Wukong"), "MonkeyKing");
        assert_eq!(store.resolve_id("unknown-name"), "unknown-name");
        // Raw ids pass through transparently
        assert_eq!(store.resolve_id("MonkeyKing"), "MonkeyKing");
    }

    #[tokio::test]
    async fn test_failed_bulk_refetch_keeps_cache() {
        let fetcher = endpoint_fetcher();
        let store = store_with(&fetcher, endpoint_kind());
        store.fetch_bulk().await.expect("bulk fetch succeeds");
        let ids_before = store.ids();
        let names_before = store.names();

        fetcher.fail(CHAMPIONS, "connection reset");
        let err = store.fetch_bulk().await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
        assert_eq!(store.ids(), ids_before);
        assert_eq!(store.names(), names_before);
        assert_eq!(store.resolve_id("Wukong"), "MonkeyKing");

        fetcher.respond(CHAMPIONS, RawResponse::ok("{not json"));
        let err = store.fetch_bulk().await.unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
        assert_eq!(store.ids(), ids_before);

        fetcher.respond(CHAMPIONS, RawResponse::new(503, "busy"));
        let err = store.fetch_bulk().await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_bulk_refetch_replaces_state() {
        let fetcher = endpoint_fetcher();
        let store = store_with(&fetcher, endpoint_kind());
        store.fetch_bulk().await.expect("bulk fetch succeeds");

        fetcher.respond(
            CHAMPIONS,
            RawResponse::ok(r#"{"data":{"Zed":{"id":"Zed","name":"Zed","tags":["Assassin"]}}}"#),
        );
        store.fetch_bulk().await.expect("refetch succeeds");

        assert_eq!(store.ids(), vec!["Zed"]);
        assert_eq!(store.names(), vec!["Zed"]);
        assert_eq!(store.resolve_id("Wukong"), "Wukong");
    }

    #[tokio::test]
    async fn test_detail_is_memoized() {
        let fetcher = endpoint_fetcher();
        let store = store_with(&fetcher, endpoint_kind());

        let first = store.fetch_detail("Ahri").await.expect("detail fetch");
        let second = store.fetch_detail("Ahri").await.expect("cached detail");

        assert_eq!(fetcher.total_calls(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.str_at("/lore"), Some("A vastaya..."));
        assert_eq!(store.detail_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_detail_single_flight() {
        let fetcher = endpoint_fetcher();
        let store = store_with(&fetcher, endpoint_kind());

        let (a, b, c) = tokio::join!(
            store.fetch_detail("Ahri"),
            store.fetch_detail("Ahri"),
            store.fetch_detail("MonkeyKing"),
        );

        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(fetcher.calls_to("/champion/Ahri.json"), 1);
        assert_eq!(fetcher.calls_to("/champion/MonkeyKing.json"), 1);
    }

    #[tokio::test]
    async fn test_concurrent_detail_failure_shared() {
        let fetcher = endpoint_fetcher();
        fetcher.fail("/champion/Ahri.json", "connection reset");
        let store = store_with(&fetcher, endpoint_kind());

        let (a, b) = tokio::join!(store.fetch_detail("Ahri"), store.fetch_detail("Ahri"));

        assert!(matches!(a, Err(FetchError::Network(_))));
        assert!(matches!(b, Err(FetchError::Network(_))));
        assert_eq!(fetcher.calls_to("/champion/Ahri.json"), 1);

        // A call made after the failure retries
        fetcher.respond(
            "/champion/Ahri.json",
            RawResponse::ok(r#"{"data":{"Ahri":{"id":"Ahri","name":"Ahri"}}}"#),
        );
        store.fetch_detail("Ahri").await.expect("retry succeeds");
        assert_eq!(fetcher.calls_to("/champion/Ahri.json"), 2);
    }

    #[tokio::test]
    async fn test_detail_not_found_when_absent_from_loaded_bulk() {
        let fetcher = endpoint_fetcher();
        let store = store_with(&fetcher, endpoint_kind());
        store.fetch_bulk().await.expect("bulk fetch succeeds");
        let calls = fetcher.total_calls();

        let err = store.fetch_detail("Teemo").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(fetcher.total_calls(), calls);
    }

    #[tokio::test]
    async fn test_detail_endpoint_failure_is_network_and_retryable() {
        let fetcher = endpoint_fetcher();
        let store = store_with(&fetcher, endpoint_kind());
        fetcher.fail("/champion/Ahri.json", "timeout");

        let err = store.fetch_detail("Ahri").await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
        assert!(store.cached_detail("Ahri").is_none());
        assert!(store.names().is_empty());

        fetcher.respond(
            "/champion/Ahri.json",
            RawResponse::ok(r#"{"data":{"Ahri":{"id":"Ahri","name":"Ahri"}}}"#),
        );
        store.fetch_detail("Ahri").await.expect("retry succeeds");
        assert!(store.cached_detail("Ahri").is_some());
    }

    #[tokio::test]
    async fn test_detail_payload_without_entry_is_not_found() {
        let fetcher = endpoint_fetcher();
        fetcher.respond("/champion/Ahri.json", RawResponse::ok(r#"{"data":{}}"#));
        let store = store_with(&fetcher, endpoint_kind());

        let err = store.fetch_detail("Ahri").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_detail_appends_unknown_name() {
        let fetcher = endpoint_fetcher();
        let store = store_with(&fetcher, endpoint_kind());

        store.fetch_detail("MonkeyKing").await.expect("detail fetch");
        assert_eq!(store.names(), vec!["Wukong"]);
        assert_eq!(store.resolve_id("Wukong"), "MonkeyKing");
        // No bulk index was installed by the detail fetch
        assert!(!store.is_loaded());
    }

    #[tokio::test]
    async fn test_bulk_sourced_detail_implicit_scope() {
        let fetcher = Arc::new(StubFetcher::new().with_json(
            "/items.json",
            r#"{"1001":{"id":1001,"name":"Boots"},"3006":{"id":3006,"name":"Berserker's Greaves"}}"#,
        ));
        let store = store_with(&fetcher, EntityKind::new("items", "/items.json"));

        let detail = store.fetch_detail("3006").await.expect("implicit bulk fetch");
        assert_eq!(detail.name(), "Berserker's Greaves");
        assert_eq!(fetcher.total_calls(), 1);
        // Only the requested entry is kept
        assert!(!store.is_loaded());
        assert_eq!(store.names(), vec!["Berserker's Greaves"]);

        let err = store.fetch_detail("9999").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_bulk_sourced_detail_uses_loaded_index() {
        let fetcher = Arc::new(StubFetcher::new().with_json(
            "/items.json",
            r#"{"1001":{"name":"Boots","shop":{"prices":{"sell":210}}}}"#,
        ));
        let store = store_with(&fetcher, EntityKind::new("items", "/items.json"));
        store.fetch_bulk().await.expect("bulk fetch succeeds");

        let detail = store.fetch_detail("1001").await.expect("detail from index");
        assert_eq!(detail.i64_at("/shop/prices/sell"), Some(210));
        assert_eq!(fetcher.total_calls(), 1);

        assert!(store.fetch_detail("2003").await.unwrap_err().is_not_found());
        assert_eq!(fetcher.total_calls(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_names_resolve_to_last_id() {
        let fetcher = Arc::new(StubFetcher::new().with_json(
            "/items.json",
            r#"{"3071":{"name":"Black Cleaver"},"223071":{"name":"Black Cleaver"},"1055":{"name":"Doran's Blade"}}"#,
        ));
        let store = store_with(&fetcher, EntityKind::new("items", "/items.json"));
        store.fetch_bulk().await.expect("bulk fetch succeeds");

        // Bulk-index order is ascending id: 1055, 223071, 3071
        assert_eq!(store.resolve_id("Black Cleaver"), "3071");
        assert_eq!(store.names(), vec!["Doran's Blade", "Black Cleaver", "Black Cleaver"]);
    }

    #[tokio::test]
    async fn test_find_id_and_name_of() {
        let fetcher = endpoint_fetcher();
        let store = store_with(&fetcher, endpoint_kind());
        store.fetch_bulk().await.expect("bulk fetch succeeds");

        assert_eq!(store.name_of("MonkeyKing").as_deref(), Some("Wukong"));
        assert_eq!(store.name_of("Nope"), None);
        assert_eq!(
            store.find_id(|r| r.array_contains("/tags", "Tank")).as_deref(),
            Some("MonkeyKing")
        );
        assert_eq!(store.name_position("Wukong"), Some(1));
        assert!(store.fetched_at().is_some());
    }
}
