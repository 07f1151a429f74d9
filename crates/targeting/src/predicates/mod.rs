//! Built-in targeting predicate variants.

pub mod age;
pub mod category_spend;
pub mod marketplace;
pub mod parent;
pub mod prime;
pub mod recognized;

pub use age::AgePredicate;
pub use category_spend::{CategorySpendFrequencyPredicate, CategorySpendValuePredicate};
pub use marketplace::MarketplacePredicate;
pub use parent::ParentPredicate;
pub use prime::PrimeBenefitPredicate;
pub use recognized::RecognizedPredicate;

use crate::profile::{CustomerProfile, CustomerProfileSource};
use adsel_core::types::{PredicateResult, RequestContext};
use serde::Serialize;
use serde_json::{Map, Value};

pub(crate) fn apply_inverse(result: PredicateResult, inverse: bool) -> PredicateResult {
    if inverse {
        result.invert()
    } else {
        result
    }
}

/// Anonymous requests have no profile to consult.
pub(crate) async fn load_profile(
    source: &dyn CustomerProfileSource,
    context: &RequestContext,
) -> anyhow::Result<Option<CustomerProfile>> {
    if context.customer_id.trim().is_empty() {
        return Ok(None);
    }
    source.fetch(&context.customer_id).await
}

pub(crate) fn params_map<T: Serialize>(params: &T) -> serde_json::Result<Map<String, Value>> {
    match serde_json::to_value(params)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}
