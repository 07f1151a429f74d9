use crate::predicate::TargetingPredicate;
use crate::predicates::{apply_inverse, params_map};
use adsel_core::types::{PredicateResult, RequestContext};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const KIND: &str = "marketplace";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceParams {
    pub marketplace_ids: Vec<String>,
}

/// Matches requests rendering on one of the listed marketplaces.
#[derive(Debug)]
pub struct MarketplacePredicate {
    params: MarketplaceParams,
    inverse: bool,
}

impl MarketplacePredicate {
    pub fn new(params: MarketplaceParams, inverse: bool) -> Self {
        Self { params, inverse }
    }
}

#[async_trait]
impl TargetingPredicate for MarketplacePredicate {
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
        let listed = self
            .params
            .marketplace_ids
            .iter()
            .any(|id| id == &context.marketplace_id);
        Ok(apply_inverse(PredicateResult::from_bool(listed), self.inverse))
    }
}
