use crate::predicate::TargetingPredicate;
use crate::predicates::{apply_inverse, load_profile, params_map};
use crate::profile::{AgeRange, CustomerProfileSource};
use adsel_core::types::{PredicateResult, RequestContext};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

pub const KIND: &str = "age";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeParams {
    pub target_age_ranges: Vec<AgeRange>,
}

/// Matches customers whose profile age range is one of the targeted ranges.
#[derive(Debug)]
pub struct AgePredicate {
    params: AgeParams,
    profiles: Arc<dyn CustomerProfileSource>,
    inverse: bool,
}

impl AgePredicate {
    pub fn new(params: AgeParams, profiles: Arc<dyn CustomerProfileSource>, inverse: bool) -> Self {
        Self {
            params,
            profiles,
            inverse,
        }
    }
}

#[async_trait]
impl TargetingPredicate for AgePredicate {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn inverse(&self) -> bool {
        self.inverse
    }

    fn params(&self) -> serde_json::Result<Map<String, Value>> {
        params_map(&self.params)
    }

    async fn evaluate(&self, context: &RequestContext) -> anyhow::Result<PredicateResult> {
        let age_range = load_profile(self.profiles.as_ref(), context)
            .await?
            .and_then(|profile| profile.age_range);

        let result = match age_range {
            Some(range) => {
                PredicateResult::from_bool(self.params.target_age_ranges.contains(&range))
            }
            None => PredicateResult::Indeterminate,
        };
        Ok(apply_inverse(result, self.inverse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicates::test_support::profiles;

    fn predicate(ranges: Vec<AgeRange>, inverse: bool) -> AgePredicate {
        AgePredicate::new(
            AgeParams {
                target_age_ranges: ranges,
            },
            profiles(),
            inverse,
        )
    }

    #[tokio::test]
    async fn test_age_in_target() {
        let context = RequestContext::new("alice", "m1");
        let matching = predicate(vec![AgeRange::Age18To24, AgeRange::Age25To34], false);
        let other = predicate(vec![AgeRange::Age65Plus], false);

        assert_eq!(matching.evaluate(&context).await.unwrap(), PredicateResult::True);
        assert_eq!(other.evaluate(&context).await.unwrap(), PredicateResult::False);
    }

    #[tokio::test]
    async fn test_unknown_age_is_indeterminate_even_inverted() {
        let context = RequestContext::new("bob", "m1");
        let inverted = predicate(vec![AgeRange::Age25To34], true);
        assert_eq!(
            inverted.evaluate(&context).await.unwrap(),
            PredicateResult::Indeterminate
        );
    }
}
