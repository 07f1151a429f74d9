use crate::predicate::TargetingPredicate;
use crate::predicates::{apply_inverse, load_profile};
use crate::profile::CustomerProfileSource;
use adsel_core::types::{PredicateResult, RequestContext};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

pub const KIND: &str = "recognized";

/// Matches customers that are signed in and have a known profile.
#[derive(Debug)]
pub struct RecognizedPredicate {
    profiles: Arc<dyn CustomerProfileSource>,
    inverse: bool,
}

impl RecognizedPredicate {
    pub fn new(profiles: Arc<dyn CustomerProfileSource>, inverse: bool) -> Self {
        Self { profiles, inverse }
    }
}

#[async_trait]
impl TargetingPredicate for RecognizedPredicate {
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
        let recognized = load_profile(self.profiles.as_ref(), context).await?.is_some();
        Ok(apply_inverse(PredicateResult::from_bool(recognized), self.inverse))
    }
}
