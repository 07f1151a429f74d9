//! Predicates over a customer's purchase history in one category.

use crate::comparison::ComparisonOperator;
use crate::predicate::TargetingPredicate;
use crate::predicates::{apply_inverse, load_profile, params_map};
use crate::profile::CustomerProfileSource;
use adsel_core::types::{PredicateResult, RequestContext};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

pub const FREQUENCY_KIND: &str = "category_spend_frequency";
pub const VALUE_KIND: &str = "category_spend_value";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendFrequencyParams {
    pub category: String,
    pub operator: ComparisonOperator,
    pub target_count: u64,
    /// Only purchases made in the last N days count. All history when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub within_days: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendValueParams {
    pub category: String,
    pub operator: ComparisonOperator,
    pub target_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub within_days: Option<u32>,
}

/// Compares the number of purchases a customer made in a category.
#[derive(Debug)]
pub struct CategorySpendFrequencyPredicate {
    params: SpendFrequencyParams,
    profiles: Arc<dyn CustomerProfileSource>,
    inverse: bool,
}

impl CategorySpendFrequencyPredicate {
    pub fn new(
        params: SpendFrequencyParams,
        profiles: Arc<dyn CustomerProfileSource>,
        inverse: bool,
    ) -> Self {
        Self {
            params,
            profiles,
            inverse,
        }
    }
}

#[async_trait]
impl TargetingPredicate for CategorySpendFrequencyPredicate {
    fn kind(&self) -> &'static str {
        FREQUENCY_KIND
    }

    fn inverse(&self) -> bool {
        self.inverse
    }

    fn params(&self) -> serde_json::Result<Map<String, Value>> {
        params_map(&self.params)
    }

    async fn evaluate(&self, context: &RequestContext) -> anyhow::Result<PredicateResult> {
        let Some(profile) = load_profile(self.profiles.as_ref(), context).await? else {
            return Ok(PredicateResult::Indeterminate);
        };

        let count = profile
            .purchases_in(&self.params.category, self.params.within_days)
            .count() as u64;
        let matched = self.params.operator.compare(count, self.params.target_count);
        Ok(apply_inverse(PredicateResult::from_bool(matched), self.inverse))
    }
}

/// Compares the total amount a customer spent in a category.
#[derive(Debug)]
pub struct CategorySpendValuePredicate {
    params: SpendValueParams,
    profiles: Arc<dyn CustomerProfileSource>,
    inverse: bool,
}

impl CategorySpendValuePredicate {
    pub fn new(
        params: SpendValueParams,
        profiles: Arc<dyn CustomerProfileSource>,
        inverse: bool,
    ) -> Self {
        Self {
            params,
            profiles,
            inverse,
        }
    }
}

#[async_trait]
impl TargetingPredicate for CategorySpendValuePredicate {
    fn kind(&self) -> &'static str {
        VALUE_KIND
    }

    fn inverse(&self) -> bool {
        self.inverse
    }

    fn params(&self) -> serde_json::Result<Map<String, Value>> {
        params_map(&self.params)
    }

    async fn evaluate(&self, context: &RequestContext) -> anyhow::Result<PredicateResult> {
        let Some(profile) = load_profile(self.profiles.as_ref(), context).await? else {
            return Ok(PredicateResult::Indeterminate);
        };

        let total: f64 = profile
            .purchases_in(&self.params.category, self.params.within_days)
            .map(|p| p.amount)
            .sum();
        let matched = self.params.operator.compare(total, self.params.target_value);
        Ok(apply_inverse(PredicateResult::from_bool(matched), self.inverse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicates::test_support::profiles;

    fn frequency(
        operator: ComparisonOperator,
        target_count: u64,
        within_days: Option<u32>,
    ) -> CategorySpendFrequencyPredicate {
        CategorySpendFrequencyPredicate::new(
            SpendFrequencyParams {
                category: "books".to_string(),
                operator,
                target_count,
                within_days,
            },
            profiles(),
            false,
        )
    }

    fn value(
        operator: ComparisonOperator,
        target_value: f64,
        within_days: Option<u32>,
    ) -> CategorySpendValuePredicate {
        CategorySpendValuePredicate::new(
            SpendValueParams {
                category: "books".to_string(),
                operator,
                target_value,
                within_days,
            },
            profiles(),
            false,
        )
    }

    #[tokio::test]
    async fn test_frequency_respects_window() {
        let alice = RequestContext::new("alice", "m1");

        let all_time = frequency(ComparisonOperator::Equals, 3, None);
        assert_eq!(all_time.evaluate(&alice).await.unwrap(), PredicateResult::True);

        let last_month = frequency(ComparisonOperator::GreaterThanOrEqual, 3, Some(30));
        assert_eq!(last_month.evaluate(&alice).await.unwrap(), PredicateResult::False);
    }

    #[tokio::test]
    async fn test_value_sums_amounts() {
        let alice = RequestContext::new("alice", "m1");

        let big_spender = value(ComparisonOperator::GreaterThan, 150.0, None);
        assert_eq!(big_spender.evaluate(&alice).await.unwrap(), PredicateResult::True);

        let recent = value(ComparisonOperator::LessThanOrEqual, 65.0, Some(30));
        assert_eq!(recent.evaluate(&alice).await.unwrap(), PredicateResult::True);
    }

    #[tokio::test]
    async fn test_oversized_window_means_all_history() {
        let alice = RequestContext::new("alice", "m1");

        let all_time = frequency(ComparisonOperator::Equals, 3, Some(u32::MAX));
        assert_eq!(all_time.evaluate(&alice).await.unwrap(), PredicateResult::True);

        let mut not_three = frequency(ComparisonOperator::Equals, 3, Some(100_000_000));
        not_three.inverse = true;
        let handle = tokio::spawn(async move { not_three.evaluate(&alice).await });
        assert_eq!(handle.await.unwrap().unwrap(), PredicateResult::False);

        let total = value(ComparisonOperator::GreaterThan, 150.0, Some(u32::MAX));
        assert_eq!(
            total.evaluate(&RequestContext::new("alice", "m1")).await.unwrap(),
            PredicateResult::True
        );
    }

    #[tokio::test]
    async fn test_unknown_customer_is_indeterminate() {
        let stranger = RequestContext::new("zed", "m1");
        let predicate = frequency(ComparisonOperator::Equals, 0, None);
        assert_eq!(
            predicate.evaluate(&stranger).await.unwrap(),
            PredicateResult::Indeterminate
        );
    }
}
