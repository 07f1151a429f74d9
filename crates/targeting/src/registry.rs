//! Maps persisted predicate type tags to constructors.
//!
//! Collaborators a predicate needs (such as the customer profile source) are
//! captured by its constructor when the registry is built, so decoding a
//! stored predicate yields a ready-to-evaluate instance.

use crate::predicate::{PersistedPredicate, SharedPredicate};
use crate::predicates::{
    age, category_spend, marketplace, parent, prime, recognized, AgePredicate,
    CategorySpendFrequencyPredicate, CategorySpendValuePredicate, MarketplacePredicate,
    ParentPredicate, PrimeBenefitPredicate, RecognizedPredicate,
};
use crate::profile::CustomerProfileSource;
use adsel_core::error::{AdResult, AdSelectionError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub type PredicateConstructor =
    Box<dyn Fn(&PersistedPredicate) -> AdResult<SharedPredicate> + Send + Sync>;

#[derive(Default)]
pub struct PredicateRegistry {
    constructors: HashMap<String, PredicateConstructor>,
}

impl PredicateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in variant wired to `profiles`.
    pub fn with_builtins(profiles: Arc<dyn CustomerProfileSource>) -> Self {
        let mut registry = Self::new();

        let source = profiles.clone();
        registry.register(recognized::KIND, move |record| {
            let predicate = RecognizedPredicate::new(source.clone(), record.inverse);
            Ok(Arc::new(predicate) as SharedPredicate)
        });

        let source = profiles.clone();
        registry.register(age::KIND, move |record| {
            let params = decode_params(record)?;
            let predicate = AgePredicate::new(params, source.clone(), record.inverse);
            Ok(Arc::new(predicate) as SharedPredicate)
        });

        let source = profiles.clone();
        registry.register(parent::KIND, move |record| {
            let predicate = ParentPredicate::new(source.clone(), record.inverse);
            Ok(Arc::new(predicate) as SharedPredicate)
        });

        let source = profiles.clone();
        registry.register(prime::KIND, move |record| {
            let predicate = PrimeBenefitPredicate::new(source.clone(), record.inverse);
            Ok(Arc::new(predicate) as SharedPredicate)
        });

        let source = profiles.clone();
        registry.register(category_spend::FREQUENCY_KIND, move |record| {
            let params = decode_params(record)?;
            Ok(Arc::new(CategorySpendFrequencyPredicate::new(
                params,
                source.clone(),
                record.inverse,
            )) as SharedPredicate)
        });

        let source = profiles;
        registry.register(category_spend::VALUE_KIND, move |record| {
            let params = decode_params(record)?;
            Ok(Arc::new(CategorySpendValuePredicate::new(
                params,
                source.clone(),
                record.inverse,
            )) as SharedPredicate)
        });

        registry.register(marketplace::KIND, |record| {
            let params = decode_params(record)?;
            Ok(Arc::new(MarketplacePredicate::new(params, record.inverse)) as SharedPredicate)
        });

        registry
    }

    /// Adds or replaces the constructor for `kind`.
    pub fn register<F>(&mut self, kind: impl Into<String>, constructor: F)
    where
        F: Fn(&PersistedPredicate) -> AdResult<SharedPredicate> + Send + Sync + 'static,
    {
        self.constructors.insert(kind.into(), Box::new(constructor));
    }

    pub fn build(&self, record: &PersistedPredicate) -> AdResult<SharedPredicate> {
        let constructor = self
            .constructors
            .get(&record.kind)
            .ok_or_else(|| AdSelectionError::UnknownPredicate(record.kind.clone()))?;
        constructor(record)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

impl fmt::Debug for PredicateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

fn decode_params<T: DeserializeOwned>(record: &PersistedPredicate) -> AdResult<T> {
    let params = Value::Object(record.params.clone());
    serde_json::from_value(params.clone()).map_err(|e| AdSelectionError::PredicateCodec {
        message: format!("invalid parameters for '{}' predicate: {e}", record.kind),
        value: params.to_string(),
    })
}
