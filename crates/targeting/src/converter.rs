//! Converts predicate lists to and from their stored JSON string form.

use crate::predicate::{PersistedPredicate, SharedPredicate};
use crate::registry::PredicateRegistry;
use adsel_core::error::{AdResult, AdSelectionError};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PredicateListConverter {
    registry: Arc<PredicateRegistry>,
}

impl PredicateListConverter {
    pub fn new(registry: Arc<PredicateRegistry>) -> Self {
        Self { registry }
    }

    /// Serializes the list. An empty list becomes `"[]"`.
    pub fn convert(&self, predicates: &[SharedPredicate]) -> AdResult<String> {
        let records = predicates
            .iter()
            .map(|p| p.to_persisted())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AdSelectionError::PredicateCodec {
                message: format!("unable to convert the predicate list to a string: {e}"),
                value: format!("{predicates:?}"),
            })?;

        serde_json::to_string(&records).map_err(|e| AdSelectionError::PredicateCodec {
            message: format!("unable to convert the predicate list to a string: {e}"),
            value: format!("{records:?}"),
        })
    }

    /// Parses a stored string and builds live predicates through the registry.
    pub fn unconvert(&self, value: &str) -> AdResult<Vec<SharedPredicate>> {
        let records: Vec<PersistedPredicate> =
            serde_json::from_str(value).map_err(|e| AdSelectionError::PredicateCodec {
                message: format!("unable to convert the string to a list of targeting predicates: {e}"),
                value: value.to_string(),
            })?;
        self.decode(&records)
    }

    pub fn decode(&self, records: &[PersistedPredicate]) -> AdResult<Vec<SharedPredicate>> {
        debug!(count = records.len(), "Decoding targeting predicates");
        records.iter().map(|r| self.registry.build(r)).collect()
    }
}
