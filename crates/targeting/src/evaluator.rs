//! Concurrent evaluation of a targeting group against one request.
//!
//! Every predicate of a group is dispatched as its own Tokio task and all of
//! them are awaited before the verdict is formed, so a failing predicate never
//! stops its siblings from running. Any predicate that errors, panics, misses
//! its deadline or is cancelled contributes FALSE.

use crate::group::TargetingGroup;
use crate::predicate::SharedPredicate;
use adsel_core::config::EvaluatorConfig;
use adsel_core::types::{PredicateResult, RequestContext};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Evaluates targeting groups for a single request context.
pub struct TargetingEvaluator {
    context: Arc<RequestContext>,
    permits: Arc<Semaphore>,
    owns_pool: bool,
    predicate_timeout: Option<Duration>,
}

impl TargetingEvaluator {
    /// Creates an evaluator with its own pool of
    /// `max_concurrent_predicates` permits.
    pub fn new(context: RequestContext, config: &EvaluatorConfig) -> Self {
        Self {
            context: Arc::new(context),
            permits: Arc::new(Semaphore::new(config.max_concurrent_predicates.max(1))),
            owns_pool: true,
            predicate_timeout: config.predicate_timeout(),
        }
    }

    /// Creates an evaluator that draws from a pool shared across requests.
    /// [`shutdown`](Self::shutdown) leaves a shared pool open.
    pub fn with_shared_pool(
        context: RequestContext,
        permits: Arc<Semaphore>,
        config: &EvaluatorConfig,
    ) -> Self {
        Self {
            context: Arc::new(context),
            permits,
            owns_pool: false,
            predicate_timeout: config.predicate_timeout(),
        }
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Returns true iff every predicate in the group evaluates to TRUE.
    /// An empty group is eligible.
    pub async fn evaluate(&self, group: &TargetingGroup) -> bool {
        metrics::counter!("targeting.groups_evaluated").increment(1);

        let mut tasks = JoinSet::new();
        for predicate in &group.predicates {
            let predicate = Arc::clone(predicate);
            let context = Arc::clone(&self.context);
            let permits = Arc::clone(&self.permits);
            let timeout = self.predicate_timeout;

            tasks.spawn(async move {
                let kind = predicate.kind();
                let passed = match permits.acquire_owned().await {
                    Ok(_permit) => run_predicate(predicate, &context, timeout).await,
                    Err(_) => {
                        warn!(predicate = kind, "Evaluator pool is shut down");
                        false
                    }
                };
                if !passed {
                    debug!(predicate = kind, "Predicate did not pass");
                }
                passed
            });
        }

        let mut eligible = true;
        while let Some(joined) = tasks.join_next().await {
            let passed = match joined {
                Ok(passed) => passed,
                Err(e) if e.is_panic() => {
                    warn!(
                        targeting_group_id = %group.targeting_group_id,
                        "Predicate task panicked"
                    );
                    metrics::counter!("targeting.predicate_failures").increment(1);
                    false
                }
                Err(_) => {
                    warn!(
                        targeting_group_id = %group.targeting_group_id,
                        "Predicate task was cancelled"
                    );
                    metrics::counter!("targeting.predicate_failures").increment(1);
                    false
                }
            };
            eligible &= passed;
        }

        eligible
    }

    /// Releases an owned pool. Predicates evaluated afterwards count as FALSE.
    pub fn shutdown(&self) {
        if self.owns_pool {
            self.permits.close();
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.permits.is_closed()
    }
}

async fn run_predicate(
    predicate: SharedPredicate,
    context: &RequestContext,
    timeout: Option<Duration>,
) -> bool {
    let outcome = match timeout {
        Some(limit) => match tokio::time::timeout(limit, predicate.evaluate(context)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(
                    predicate = predicate.kind(),
                    timeout_ms = limit.as_millis() as u64,
                    "Predicate timed out"
                );
                metrics::counter!("targeting.predicate_failures").increment(1);
                return false;
            }
        },
        None => predicate.evaluate(context).await,
    };

    match outcome {
        Ok(result) => result == PredicateResult::True,
        Err(e) => {
            warn!(predicate = predicate.kind(), error = %e, "Error evaluating predicate");
            metrics::counter!("targeting.predicate_failures").increment(1);
            false
        }
    }
}
