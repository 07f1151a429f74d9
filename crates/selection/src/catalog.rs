//! JSON catalog loader. Builds the content and targeting-group stores plus the
//! customer profiles the predicates consult.
//!
//! ```json
//! {
//!   "contents": [{"content_id": "a", "marketplace_id": "us", "renderable_content": "<div/>"}],
//!   "targeting_groups": [
//!     {"targeting_group_id": "g1", "content_id": "a", "click_through_rate": 0.3,
//!      "predicates": [{"type": "recognized"}]}
//!   ],
//!   "customers": [{"customer_id": "c1", "prime_member": true}]
//! }
//! ```
//!
//! `predicates` may also be given in stored string form, e.g.
//! `"[{\"type\":\"parent\"}]"`.

use crate::dao::{ContentStore, TargetingGroupStore};
use crate::engine::AdvertisementSelectionEngine;
use adsel_core::config::AppConfig;
use adsel_core::error::{AdResult, AdSelectionError};
use adsel_core::types::AdvertisementContent;
use adsel_targeting::{
    CustomerProfile, InMemoryProfileSource, PersistedPredicate, PredicateListConverter,
    PredicateRegistry, TargetingGroup,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    contents: Vec<AdvertisementContent>,
    #[serde(default)]
    targeting_groups: Vec<TargetingGroupRecord>,
    #[serde(default)]
    customers: Vec<CustomerProfile>,
}

#[derive(Debug, Deserialize)]
struct TargetingGroupRecord {
    targeting_group_id: String,
    content_id: String,
    click_through_rate: f64,
    #[serde(default)]
    predicates: StoredPredicates,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredPredicates {
    Encoded(String),
    Records(Vec<PersistedPredicate>),
}

impl Default for StoredPredicates {
    fn default() -> Self {
        StoredPredicates::Records(Vec::new())
    }
}

/// In-memory stores populated from a catalog document.
#[derive(Debug)]
pub struct Catalog {
    pub contents: Arc<ContentStore>,
    pub targeting_groups: Arc<TargetingGroupStore>,
    pub profiles: Arc<InMemoryProfileSource>,
}

impl Catalog {
    pub fn from_path(path: &Path) -> AdResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> AdResult<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;

        let profiles: Arc<InMemoryProfileSource> =
            Arc::new(file.customers.into_iter().collect());
        let registry = PredicateRegistry::with_builtins(profiles.clone());
        let converter = PredicateListConverter::new(Arc::new(registry));

        let contents = ContentStore::new();
        let mut content_ids = HashSet::new();
        for content in file.contents {
            if !content_ids.insert(content.content_id.clone()) {
                return Err(AdSelectionError::Catalog(format!(
                    "duplicate content id '{}'",
                    content.content_id
                )));
            }
            contents.insert(content);
        }

        let targeting_groups = TargetingGroupStore::new();
        for record in file.targeting_groups {
            if !(record.click_through_rate.is_finite() && record.click_through_rate >= 0.0) {
                return Err(AdSelectionError::Catalog(format!(
                    "targeting group '{}' has invalid click-through rate {}",
                    record.targeting_group_id, record.click_through_rate
                )));
            }
            if !content_ids.contains(&record.content_id) {
                warn!(
                    targeting_group_id = %record.targeting_group_id,
                    content_id = %record.content_id,
                    "Targeting group refers to unknown content"
                );
            }

            let predicates = match &record.predicates {
                StoredPredicates::Encoded(value) => converter.unconvert(value)?,
                StoredPredicates::Records(records) => converter.decode(records)?,
            };
            targeting_groups.insert(TargetingGroup::new(
                record.targeting_group_id,
                record.content_id,
                record.click_through_rate,
                predicates,
            ));
        }

        info!(
            contents = contents.len(),
            targeting_groups = targeting_groups.len(),
            customers = profiles.len(),
            "Catalog loaded"
        );

        Ok(Self {
            contents: Arc::new(contents),
            targeting_groups: Arc::new(targeting_groups),
            profiles,
        })
    }

    pub fn engine(&self, config: &AppConfig) -> AdvertisementSelectionEngine {
        AdvertisementSelectionEngine::new(
            self.contents.clone(),
            self.targeting_groups.clone(),
            config,
        )
    }
}
