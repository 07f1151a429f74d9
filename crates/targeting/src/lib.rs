//! Targeting — predicate variants, the persisted predicate codec, and the
//! concurrent evaluator that decides whether a targeting group matches a request.

pub mod comparison;
pub mod converter;
pub mod evaluator;
pub mod group;
pub mod predicate;
pub mod predicates;
pub mod profile;
pub mod registry;

pub use converter::PredicateListConverter;
pub use evaluator::TargetingEvaluator;
pub use group::TargetingGroup;
pub use predicate::{PersistedPredicate, SharedPredicate, TargetingPredicate};
pub use profile::{CustomerProfile, CustomerProfileSource, InMemoryProfileSource};
pub use registry::PredicateRegistry;
