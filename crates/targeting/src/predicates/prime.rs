use crate::predicate::TargetingPredicate;
use crate::predicates::{apply_inverse, load_profile};
use crate::profile::CustomerProfileSource;
use adsel_core::types::{PredicateResult, RequestContext};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

pub const KIND: &str = "prime_benefit";

/// Matches customers enrolled in the prime membership program.
#[derive(Debug)]
pub struct PrimeBenefitPredicate {
    profiles: Arc<dyn CustomerProfileSource>,
    inverse: bool,
}

impl PrimeBenefitPredicate {
    pub fn new(profiles: Arc<dyn CustomerProfileSource>, inverse: bool) -> Self {
        Self { profiles, inverse }
    }
}

#[async_trait]
impl TargetingPredicate for PrimeBenefitPredicate {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn inverse(&self) -> bool {
        self.inverse
    }

    fn params(&self) -> serde_json::Result<Map<String, Value>> {
        Ok(Map::new())
    }

    async fn evaluate(&self, context: &RequestContext) -> anyhow::Result<PredicateResult> {
        let result = match load_profile(self.profiles.as_ref(), context).await? {
            Some(profile) => PredicateResult::from_bool(profile.prime_member),
            None => PredicateResult::Indeterminate,
        };
        Ok(apply_inverse(result, self.inverse))
    }
}
