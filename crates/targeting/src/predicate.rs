//! The targeting predicate capability and its persisted form.

use adsel_core::types::{PredicateResult, RequestContext};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// A single targeting rule evaluated against a request.
///
/// Implementations must be side-effect free: the evaluator runs every
/// predicate of a group concurrently and in no particular order.
#[async_trait]
pub trait TargetingPredicate: fmt::Debug + Send + Sync {
    /// Type tag under which this variant is persisted and registered.
    fn kind(&self) -> &'static str;

    /// Whether the raw outcome is flipped before being reported.
    fn inverse(&self) -> bool;

    /// Variant-specific parameters, excluding the type tag and `inverse`.
    fn params(&self) -> serde_json::Result<Map<String, Value>>;

    async fn evaluate(&self, context: &RequestContext) -> anyhow::Result<PredicateResult>;

    fn to_persisted(&self) -> serde_json::Result<PersistedPredicate> {
        Ok(PersistedPredicate {
            kind: self.kind().to_string(),
            inverse: self.inverse(),
            params: self.params()?,
        })
    }
}

pub type SharedPredicate = Arc<dyn TargetingPredicate>;

/// Storage representation of a predicate: `{"type": "...", "inverse": bool, ...params}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedPredicate {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub inverse: bool,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl PersistedPredicate {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            inverse: false,
            params: Map::new(),
        }
    }

    pub fn inverted(mut self) -> Self {
        self.inverse = true;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }
}
