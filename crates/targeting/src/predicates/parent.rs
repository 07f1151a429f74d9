use crate::predicate::TargetingPredicate;
use crate::predicates::{apply_inverse, load_profile};
use crate::profile::CustomerProfileSource;
use adsel_core::types::{PredicateResult, RequestContext};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

pub const KIND: &str = "parent";

/// Matches customers whose profile marks them as a parent.
#[derive(Debug)]
pub struct ParentPredicate {
    profiles: Arc<dyn CustomerProfileSource>,
    inverse: bool,
}

impl ParentPredicate {
    pub fn new(profiles: Arc<dyn CustomerProfileSource>, inverse: bool) -> Self {
        Self { profiles, inverse }
    }
}

#[async_trait]
impl TargetingPredicate for ParentPredicate {
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
        let is_parent = load_profile(self.profiles.as_ref(), context)
            .await?
            .and_then(|profile| profile.is_parent);

        let result = is_parent.map_or(PredicateResult::Indeterminate, PredicateResult::from_bool);
        Ok(apply_inverse(result, self.inverse))
    }
}
