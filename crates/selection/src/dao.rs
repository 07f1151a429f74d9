//! Read-only lookups for advertising content and targeting groups.
//! The in-memory stores keep entries in insertion order per key.

use adsel_core::error::AdResult;
use adsel_core::types::AdvertisementContent;
use adsel_targeting::TargetingGroup;
use dashmap::DashMap;

/// Synchronous keyed lookup. Missing keys yield an empty collection.
pub trait ReadableDao<K: ?Sized, V>: Send + Sync {
    fn get(&self, key: &K) -> AdResult<V>;
}

/// Content keyed by marketplace id.
#[derive(Debug, Default)]
pub struct ContentStore {
    by_marketplace: DashMap<String, Vec<AdvertisementContent>>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, content: AdvertisementContent) {
        self.by_marketplace
            .entry(content.marketplace_id.clone())
            .or_default()
            .push(content);
    }

    pub fn len(&self) -> usize {
        self.by_marketplace.iter().map(|e| e.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReadableDao<str, Vec<AdvertisementContent>> for ContentStore {
    fn get(&self, marketplace_id: &str) -> AdResult<Vec<AdvertisementContent>> {
        Ok(self
            .by_marketplace
            .get(marketplace_id)
            .map(|contents| contents.value().clone())
            .unwrap_or_default())
    }
}

/// Targeting groups keyed by content id.
#[derive(Debug, Default)]
pub struct TargetingGroupStore {
    by_content: DashMap<String, Vec<TargetingGroup>>,
}

impl TargetingGroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, group: TargetingGroup) {
        self.by_content
            .entry(group.content_id.clone())
            .or_default()
            .push(group);
    }

    pub fn len(&self) -> usize {
        self.by_content.iter().map(|e| e.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReadableDao<str, Vec<TargetingGroup>> for TargetingGroupStore {
    fn get(&self, content_id: &str) -> AdResult<Vec<TargetingGroup>> {
        Ok(self
            .by_content
            .get(content_id)
            .map(|groups| groups.value().clone())
            .unwrap_or_default())
    }
}
