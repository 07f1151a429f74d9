//! End-to-end selection scenarios against in-memory stores.

use adsel_core::config::{AppConfig, TieBreak};
use adsel_core::types::{
    AdvertisementContent, GeneratedAdvertisement, PredicateResult, RequestContext,
};
use adsel_selection::{AdvertisementSelectionEngine, Catalog, ContentStore, TargetingGroupStore};
use adsel_targeting::{SharedPredicate, TargetingGroup, TargetingPredicate};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct FixedPredicate {
    result: PredicateResult,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl TargetingPredicate for FixedPredicate {
    fn kind(&self) -> &'static str {
        "fixed"
    }

    fn inverse(&self) -> bool {
        false
    }

    fn params(&self) -> serde_json::Result<Map<String, Value>> {
        Ok(Map::new())
    }

    async fn evaluate(&self, _context: &RequestContext) -> anyhow::Result<PredicateResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.result)
    }
}

#[derive(Debug)]
struct BrokenPredicate;

#[async_trait]
impl TargetingPredicate for BrokenPredicate {
    fn kind(&self) -> &'static str {
        "broken"
    }

    fn inverse(&self) -> bool {
        false
    }

    fn params(&self) -> serde_json::Result<Map<String, Value>> {
        Ok(Map::new())
    }

    async fn evaluate(&self, _context: &RequestContext) -> anyhow::Result<PredicateResult> {
        anyhow::bail!("downstream signal timed out")
    }
}

fn fixed(result: PredicateResult) -> SharedPredicate {
    Arc::new(FixedPredicate {
        result,
        calls: Arc::new(AtomicUsize::new(0)),
    })
}

struct Fixture {
    contents: ContentStore,
    groups: TargetingGroupStore,
}

impl Fixture {
    fn new() -> Self {
        Self {
            contents: ContentStore::new(),
            groups: TargetingGroupStore::new(),
        }
    }

    fn content(self, id: &str, renderable: &str) -> Self {
        self.contents.insert(AdvertisementContent::new(id, "M1", renderable));
        self
    }

    fn group(self, content_id: &str, ctr: f64, predicates: Vec<SharedPredicate>) -> Self {
        let group_id = format!("{content_id}-{}", self.groups.len());
        self.groups
            .insert(TargetingGroup::new(group_id, content_id, ctr, predicates));
        self
    }

    fn engine(self, config: &AppConfig) -> AdvertisementSelectionEngine {
        AdvertisementSelectionEngine::new(Arc::new(self.contents), Arc::new(self.groups), config)
    }
}

fn selected_id(ad: &GeneratedAdvertisement) -> Option<&str> {
    ad.content().map(|c| c.content_id.as_str())
}

#[tokio::test]
async fn test_marketplace_without_content_is_empty() {
    let engine = Fixture::new().engine(&AppConfig::default());
    let ad = engine.select_advertisement("C1", "M1").await.unwrap();
    assert_eq!(ad, GeneratedAdvertisement::Empty);
}

#[tokio::test]
async fn test_group_without_predicates_is_eligible() {
    let engine = Fixture::new()
        .content("A", "<div>A</div>")
        .group("A", 0.5, Vec::new())
        .engine(&AppConfig::default());

    let ad = engine.select_advertisement("C1", "M1").await.unwrap();
    assert_eq!(selected_id(&ad), Some("A"));
}

#[tokio::test]
async fn test_highest_score_wins() {
    let engine = Fixture::new()
        .content("A", "<div>A</div>")
        .content("B", "<div>B</div>")
        .group("A", 0.3, vec![fixed(PredicateResult::True)])
        .group("B", 0.7, vec![fixed(PredicateResult::True)])
        .engine(&AppConfig::default());

    let ad = engine.select_advertisement("C1", "M1").await.unwrap();
    assert_eq!(selected_id(&ad), Some("B"));
}

#[tokio::test]
async fn test_blank_content_never_selected() {
    let only_blank = Fixture::new()
        .content("C", "   ")
        .group("C", 0.9, Vec::new())
        .engine(&AppConfig::default());
    assert!(only_blank
        .select_advertisement("C1", "M1")
        .await
        .unwrap()
        .is_empty());

    let with_fallback = Fixture::new()
        .content("C", "")
        .content("A", "<div>A</div>")
        .group("C", 0.9, Vec::new())
        .group("A", 0.1, Vec::new())
        .engine(&AppConfig::default());
    let ad = with_fallback.select_advertisement("C1", "M1").await.unwrap();
    assert_eq!(selected_id(&ad), Some("A"));
}

#[tokio::test]
async fn test_one_false_predicate_disqualifies_group() {
    let engine = Fixture::new()
        .content("D", "<div>D</div>")
        .group(
            "D",
            0.8,
            vec![fixed(PredicateResult::True), fixed(PredicateResult::False)],
        )
        .engine(&AppConfig::default());

    assert!(engine
        .select_advertisement("C1", "M1")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_failing_predicate_counts_as_false() {
    let calls = Arc::new(AtomicUsize::new(0));
    let sibling: SharedPredicate = Arc::new(FixedPredicate {
        result: PredicateResult::True,
        calls: Arc::clone(&calls),
    });

    let engine = Fixture::new()
        .content("D", "<div>D</div>")
        .content("E", "<div>E</div>")
        .group("D", 0.9, vec![Arc::new(BrokenPredicate) as SharedPredicate, sibling])
        .group("E", 0.2, Vec::new())
        .engine(&AppConfig::default());

    let ad = engine.select_advertisement("C1", "M1").await.unwrap();
    assert_eq!(selected_id(&ad), Some("E"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_content_without_groups_is_skipped() {
    let engine = Fixture::new()
        .content("A", "<div>A</div>")
        .engine(&AppConfig::default());
    assert!(engine
        .select_advertisement("C1", "M1")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_exact_tie_last_seen_wins_by_default() {
    let engine = Fixture::new()
        .content("E", "<div>E</div>")
        .content("F", "<div>F</div>")
        .group("E", 0.6, Vec::new())
        .group("F", 0.6, Vec::new())
        .engine(&AppConfig::default());

    let ad = engine.select_advertisement("C1", "M1").await.unwrap();
    assert_eq!(selected_id(&ad), Some("F"));
}

#[tokio::test]
async fn test_exact_tie_first_seen_when_configured() {
    let mut config = AppConfig::default();
    config.selection.tie_break = TieBreak::FirstSeen;

    let engine = Fixture::new()
        .content("E", "<div>E</div>")
        .content("F", "<div>F</div>")
        .group("E", 0.6, Vec::new())
        .group("F", 0.6, Vec::new())
        .engine(&config);

    let ad = engine.select_advertisement("C1", "M1").await.unwrap();
    assert_eq!(selected_id(&ad), Some("E"));
}

const CATALOG: &str = r#"{
    "contents": [
        {"content_id": "prime-books", "marketplace_id": "us", "renderable_content": "<div>Prime readers</div>"},
        {"content_id": "welcome", "marketplace_id": "us", "renderable_content": "<div>Sign in</div>"},
        {"content_id": "generic", "marketplace_id": "us", "renderable_content": "<div>Deals</div>"},
        {"content_id": "uk-only", "marketplace_id": "uk", "renderable_content": "<div>UK</div>"}
    ],
    "targeting_groups": [
        {"targeting_group_id": "g-prime", "content_id": "prime-books", "click_through_rate": 0.9,
         "predicates": [
            {"type": "prime_benefit"},
            {"type": "category_spend_frequency", "category": "books", "operator": "greater_than_or_equal", "target_count": 2}
         ]},
        {"targeting_group_id": "g-welcome", "content_id": "welcome", "click_through_rate": 0.5,
         "predicates": "[{\"type\":\"recognized\",\"inverse\":true}]"},
        {"targeting_group_id": "g-generic", "content_id": "generic", "click_through_rate": 0.1,
         "predicates": [{"type": "marketplace", "marketplace_ids": ["us", "ca"]}]},
        {"targeting_group_id": "g-uk", "content_id": "uk-only", "click_through_rate": 0.4}
    ],
    "customers": [
        {"customer_id": "reader", "prime_member": true, "purchases": [
            {"category": "books", "amount": 12.0, "purchased_at": "2024-01-02T00:00:00Z"},
            {"category": "books", "amount": 30.0, "purchased_at": "2024-03-04T00:00:00Z"}
        ]},
        {"customer_id": "casual", "prime_member": false}
    ]
}"#;

#[tokio::test]
async fn test_catalog_driven_selection() {
    let catalog = Catalog::from_json(CATALOG).unwrap();
    let engine = catalog.engine(&AppConfig::default());

    let reader = engine.select_advertisement("reader", "us").await.unwrap();
    assert_eq!(selected_id(&reader), Some("prime-books"));

    let anonymous = engine.select_advertisement("", "us").await.unwrap();
    assert_eq!(selected_id(&anonymous), Some("welcome"));

    let casual = engine.select_advertisement("casual", "us").await.unwrap();
    assert_eq!(selected_id(&casual), Some("generic"));

    let uk = engine.select_advertisement("casual", "uk").await.unwrap();
    assert_eq!(selected_id(&uk), Some("uk-only"));

    assert!(engine
        .select_advertisement("casual", "jp")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_catalog_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CATALOG.as_bytes()).unwrap();

    let catalog = Catalog::from_path(file.path()).unwrap();
    assert_eq!(catalog.contents.len(), 4);
    assert_eq!(catalog.targeting_groups.len(), 4);
}
