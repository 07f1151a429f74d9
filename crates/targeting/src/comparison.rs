//! Comparison operators used by threshold predicates.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl ComparisonOperator {
    /// Applies `actual <op> expected`. Unordered values (NaN) never match.
    pub fn compare<T: PartialOrd>(self, actual: T, expected: T) -> bool {
        let Some(ordering) = actual.partial_cmp(&expected) else {
            return false;
        };
        match self {
            ComparisonOperator::Equals => ordering.is_eq(),
            ComparisonOperator::NotEquals => ordering.is_ne(),
            ComparisonOperator::GreaterThan => ordering.is_gt(),
            ComparisonOperator::GreaterThanOrEqual => ordering.is_ge(),
            ComparisonOperator::LessThan => ordering.is_lt(),
            ComparisonOperator::LessThanOrEqual => ordering.is_le(),
        }
    }
}
