//! Customer profile data consulted by profile-based predicates.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeRange {
    #[serde(rename = "under_18")]
    Under18,
    #[serde(rename = "18_24")]
    Age18To24,
    #[serde(rename = "25_34")]
    Age25To34,
    #[serde(rename = "35_44")]
    Age35To44,
    #[serde(rename = "45_54")]
    Age45To54,
    #[serde(rename = "55_64")]
    Age55To64,
    #[serde(rename = "65_plus")]
    Age65Plus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub category: String,
    pub amount: f64,
    pub purchased_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub customer_id: String,
    #[serde(default)]
    pub age_range: Option<AgeRange>,
    #[serde(default)]
    pub is_parent: Option<bool>,
    #[serde(default)]
    pub prime_member: bool,
    #[serde(default)]
    pub purchases: Vec<Purchase>,
}

impl CustomerProfile {
    pub fn new(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            age_range: None,
            is_parent: None,
            prime_member: false,
            purchases: Vec::new(),
        }
    }

    /// Purchases in `category`, limited to the last `within_days` days when given.
    /// A window reaching past the representable date range covers all history.
    pub fn purchases_in<'a>(
        &'a self,
        category: &'a str,
        within_days: Option<u32>,
    ) -> impl Iterator<Item = &'a Purchase> + 'a {
        let cutoff = within_days.and_then(window_start);
        self.purchases.iter().filter(move |p| {
            p.category.eq_ignore_ascii_case(category)
                && cutoff.map_or(true, |cutoff| p.purchased_at >= cutoff)
        })
    }
}

fn window_start(days: u32) -> Option<DateTime<Utc>> {
    Duration::try_days(i64::from(days)).and_then(|window| Utc::now().checked_sub_signed(window))
}

/// Lookup of customer profiles by customer id.
#[async_trait]
pub trait CustomerProfileSource: fmt::Debug + Send + Sync {
    async fn fetch(&self, customer_id: &str) -> anyhow::Result<Option<CustomerProfile>>;
}

/// Profile source backed by an in-process concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryProfileSource {
    profiles: DashMap<String, CustomerProfile>,
}

impl InMemoryProfileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, profile: CustomerProfile) {
        self.profiles.insert(profile.customer_id.clone(), profile);
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl FromIterator<CustomerProfile> for InMemoryProfileSource {
    fn from_iter<I: IntoIterator<Item = CustomerProfile>>(iter: I) -> Self {
        let source = Self::new();
        for profile in iter {
            source.insert(profile);
        }
        source
    }
}

#[async_trait]
impl CustomerProfileSource for InMemoryProfileSource {
    async fn fetch(&self, customer_id: &str) -> anyhow::Result<Option<CustomerProfile>> {
        Ok(self.profiles.get(customer_id).map(|p| p.value().clone()))
    }
}
