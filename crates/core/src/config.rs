use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::{AdResult, AdSelectionError};

/// Root application configuration. Loaded from an optional config file
/// overlaid by environment variables with the prefix `AD_SELECTION__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub evaluator: EvaluatorConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectionConfig {
    #[serde(default)]
    pub tie_break: TieBreak,
}

/// Which candidate wins when two share the exact maximum score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// The candidate processed later in store order replaces the earlier one.
    #[default]
    LastSeen,
    /// The first candidate to reach the score keeps it.
    FirstSeen,
}

impl std::str::FromStr for TieBreak {
    type Err = AdSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "last_seen" => Ok(TieBreak::LastSeen),
            "first_seen" => Ok(TieBreak::FirstSeen),
            other => Err(AdSelectionError::Config(format!(
                "unknown tie-break policy '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvaluatorConfig {
    /// Upper bound on predicates running at once for one evaluator.
    #[serde(default = "default_max_concurrent_predicates")]
    pub max_concurrent_predicates: usize,
    /// Per-predicate deadline; a predicate that misses it counts as FALSE.
    #[serde(default)]
    pub predicate_timeout_ms: Option<u64>,
    /// Reuse one bounded pool across requests instead of one per request.
    #[serde(default)]
    pub share_pool: bool,
}

fn default_max_concurrent_predicates() -> usize {
    10
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_predicates: default_max_concurrent_predicates(),
            predicate_timeout_ms: None,
            share_pool: false,
        }
    }
}

impl EvaluatorConfig {
    pub fn predicate_timeout(&self) -> Option<Duration> {
        self.predicate_timeout_ms.map(Duration::from_millis)
    }
}

impl AppConfig {
    /// Load configuration from an optional file and environment variables.
    pub fn load(path: Option<&Path>) -> AdResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("AD_SELECTION")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: AppConfig = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> AdResult<()> {
        if self.evaluator.max_concurrent_predicates == 0 {
            return Err(AdSelectionError::Config(
                "evaluator.max_concurrent_predicates must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
