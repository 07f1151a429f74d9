//! Selection engine — picks the advertisement to render for one request.

use crate::dao::ReadableDao;
use adsel_core::config::{AppConfig, EvaluatorConfig, SelectionConfig, TieBreak};
use adsel_core::error::AdResult;
use adsel_core::types::{AdvertisementContent, GeneratedAdvertisement, RequestContext};
use adsel_targeting::{TargetingEvaluator, TargetingGroup};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

pub type ContentDao = dyn ReadableDao<str, Vec<AdvertisementContent>>;
pub type TargetingGroupDao = dyn ReadableDao<str, Vec<TargetingGroup>>;

/// Chooses, per customer and marketplace, the eligible content with the
/// highest click-through rate.
pub struct AdvertisementSelectionEngine {
    content_dao: Arc<ContentDao>,
    targeting_group_dao: Arc<TargetingGroupDao>,
    selection: SelectionConfig,
    evaluator: EvaluatorConfig,
    shared_pool: Option<Arc<Semaphore>>,
}

impl AdvertisementSelectionEngine {
    pub fn new(
        content_dao: Arc<ContentDao>,
        targeting_group_dao: Arc<TargetingGroupDao>,
        config: &AppConfig,
    ) -> Self {
        let shared_pool = config.evaluator.share_pool.then(|| {
            Arc::new(Semaphore::new(
                config.evaluator.max_concurrent_predicates.max(1),
            ))
        });

        info!(
            tie_break = ?config.selection.tie_break,
            max_concurrent_predicates = config.evaluator.max_concurrent_predicates,
            shared_pool = config.evaluator.share_pool,
            "Selection engine initialized"
        );

        Self {
            content_dao,
            targeting_group_dao,
            selection: config.selection.clone(),
            evaluator: config.evaluator.clone(),
            shared_pool,
        }
    }

    /// Returns the eligible content with the highest click-through rate for
    /// the marketplace, or [`GeneratedAdvertisement::Empty`] when there is none.
    ///
    /// Store lookup failures are returned as errors. Predicate failures only
    /// make their targeting group ineligible.
    pub async fn select_advertisement(
        &self,
        customer_id: &str,
        marketplace_id: &str,
    ) -> AdResult<GeneratedAdvertisement> {
        metrics::counter!("selection.requests").increment(1);

        if marketplace_id.trim().is_empty() {
            warn!("MarketplaceId cannot be empty, returning empty advertisement");
            return Ok(Self::empty());
        }

        let contents = self.content_dao.get(marketplace_id)?;
        if contents.is_empty() {
            warn!(marketplace_id, "No advertisement contents found for marketplace");
            return Ok(Self::empty());
        }

        let evaluator = self.evaluator_for(RequestContext::new(customer_id, marketplace_id));
        let ranked = self.rank(&evaluator, contents).await;
        evaluator.shutdown();

        match ranked? {
            Some(content) => {
                debug!(
                    customer_id,
                    marketplace_id,
                    content_id = %content.content_id,
                    "Selected advertisement"
                );
                metrics::counter!("selection.served").increment(1);
                Ok(GeneratedAdvertisement::populated(content))
            }
            None => {
                warn!(customer_id, marketplace_id, "No eligible advertisements found");
                Ok(Self::empty())
            }
        }
    }

    fn evaluator_for(&self, context: RequestContext) -> TargetingEvaluator {
        match &self.shared_pool {
            Some(pool) => {
                TargetingEvaluator::with_shared_pool(context, Arc::clone(pool), &self.evaluator)
            }
            None => TargetingEvaluator::new(context, &self.evaluator),
        }
    }

    /// Walks contents in store order and keeps the best-scoring one.
    async fn rank(
        &self,
        evaluator: &TargetingEvaluator,
        contents: Vec<AdvertisementContent>,
    ) -> AdResult<Option<AdvertisementContent>> {
        let mut winner: Option<(f64, AdvertisementContent)> = None;

        for content in contents {
            if !content.is_renderable() {
                debug!(content_id = %content.content_id, "Skipping content with blank renderable content");
                continue;
            }

            let groups = self.targeting_group_dao.get(&content.content_id)?;
            if groups.is_empty() {
                continue;
            }

            let Some(score) = Self::best_eligible_score(evaluator, &groups).await else {
                continue;
            };

            let replaces = match &winner {
                None => true,
                Some((best, _)) => match self.selection.tie_break {
                    TieBreak::LastSeen => score >= *best,
                    TieBreak::FirstSeen => score > *best,
                },
            };
            if replaces {
                winner = Some((score, content));
            }
        }

        Ok(winner.map(|(_, content)| content))
    }

    /// Highest click-through rate among the groups that are eligible.
    async fn best_eligible_score(
        evaluator: &TargetingEvaluator,
        groups: &[TargetingGroup],
    ) -> Option<f64> {
        let mut best: Option<f64> = None;

        for group in groups {
            if !evaluator.evaluate(group).await {
                continue;
            }
            let ctr = group.click_through_rate;
            if !ctr.is_finite() {
                warn!(
                    targeting_group_id = %group.targeting_group_id,
                    click_through_rate = ctr,
                    "Ignoring targeting group with non-finite click-through rate"
                );
                continue;
            }
            best = Some(best.map_or(ctr, |b| b.max(ctr)));
        }

        best
    }

    fn empty() -> GeneratedAdvertisement {
        metrics::counter!("selection.empty").increment(1);
        GeneratedAdvertisement::Empty
    }
}
