use crate::backend::{QueryTranslator, SemanticSearch, StructuredExecutor};
use crate::classifier::{QueryClassifier, RoutingDecision};
use crate::config::RouterConfig;
use crate::error::{BackendError, Result, SearchError};
use crate::fusion::FusionEngine;
use crate::result::{FallbackReason, SearchResult, SearchResults, SearchStats};
use crate::semantic::SemanticAdapter;
use crate::structured::{StructuredAdapter, StructuredOutcome};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Single entry point for multi-index retrieval.
///
/// Collaborator handles are injected at construction and owned by the caller's
/// composition root. The orchestrator itself holds no mutable state.
pub struct SearchOrchestrator {
    config: RouterConfig,
    classifier: QueryClassifier,
    semantic: SemanticAdapter,
    structured: StructuredAdapter,
    fusion: FusionEngine,
}

impl SearchOrchestrator {
    pub fn new(
        config: RouterConfig,
        semantic_backend: Arc<dyn SemanticSearch>,
        translator: Arc<dyn QueryTranslator>,
        executor: Arc<dyn StructuredExecutor>,
    ) -> Result<Self> {
        config.validate()?;

        let semantic = SemanticAdapter::new(semantic_backend);
        let structured = StructuredAdapter::new(
            translator,
            executor,
            semantic.clone(),
            config.structured_score,
        );
        let fusion = FusionEngine::from_config(&config);

        Ok(Self {
            config,
            classifier: QueryClassifier::new(),
            semantic,
            structured,
            fusion,
        })
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn classifier(&self) -> &QueryClassifier {
        &self.classifier
    }

    /// Search with the configured default result count
    pub async fn search_default(&self, query: &str) -> Result<SearchResults> {
        self.search(query, self.config.default_k).await
    }

    /// Route, retrieve and rank.
    ///
    /// Backend failures are absorbed by fallbacks and reported through
    /// [`SearchResults::fallback`]; only [`SearchError::InvalidInput`] and
    /// [`SearchError::Exhausted`] reach the caller.
    pub async fn search(&self, query: &str, k: usize) -> Result<SearchResults> {
        let start = Instant::now();

        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::InvalidInput(
                "query must not be empty".to_string(),
            ));
        }
        if k == 0 {
            return Err(SearchError::InvalidInput("k must be at least 1".to_string()));
        }

        let mut stats = SearchStats::default();

        let classify_start = Instant::now();
        let classification = self.classifier.classify_detailed(query);
        stats.classify_time_us = classify_start.elapsed().as_micros() as u64;
        let decision = classification.decision;
        debug!(%decision, rule = classification.rule, k, "routing query");

        let retrieval_start = Instant::now();
        let (results, fallback) = match decision {
            RoutingDecision::StructuredOnly => {
                let output = self.structured.search(query, k).await?;
                if output.fallback.is_some() {
                    stats.semantic_count = output.results.len();
                } else {
                    stats.structured_count = output.results.len();
                }
                (output.results, output.fallback)
            }
            RoutingDecision::SemanticOnly => {
                let results = match self.semantic.search(query, k).await {
                    Ok(results) => results,
                    Err(primary) => {
                        return Err(SearchError::Exhausted {
                            primary,
                            fallback: None,
                        });
                    }
                };
                stats.semantic_count = results.len();
                (results, None)
            }
            RoutingDecision::Hybrid => self.hybrid(query, k, &mut stats).await?,
        };
        stats.retrieval_time_ms = retrieval_start.elapsed().as_millis() as u64;
        stats.total_time_ms = start.elapsed().as_millis() as u64;

        info!(
            %decision,
            results = results.len(),
            fallback = fallback.map(tracing::field::display),
            elapsed_ms = stats.total_time_ms,
            "search completed"
        );

        Ok(SearchResults::new(query.to_string(), decision)
            .with_results(results)
            .with_fallback(fallback)
            .with_stats(stats))
    }

    /// Run both branches under one deadline, then fuse.
    ///
    /// Expiry or failure discards whatever either branch produced and issues a
    /// fresh, separately bounded semantic search instead.
    async fn hybrid(
        &self,
        query: &str,
        k: usize,
        stats: &mut SearchStats,
    ) -> Result<(Vec<SearchResult>, Option<FallbackReason>)> {
        let pool = self.config.candidate_pool(k);
        let deadline = self.config.hybrid_timeout();
        debug!(
            pool,
            deadline_ms = deadline.as_millis() as u64,
            "launching hybrid branches"
        );

        // A semantic failure settles the outcome, so the join stops there and
        // drops the structured branch. Expiry cancels both in-flight calls.
        let semantic_branch = self.semantic.search(query, pool);
        let structured_branch = async {
            let outcome = self.structured.search_strict(query, pool).await;
            Ok::<_, BackendError>(outcome)
        };
        let branches = async { tokio::try_join!(semantic_branch, structured_branch) };

        let (reason, primary) = match tokio::time::timeout(deadline, branches).await {
            Ok(Ok((semantic, structured))) => {
                let (structured, miss) = match structured {
                    StructuredOutcome::Rows(rows) => (rows, None),
                    StructuredOutcome::Miss { reason, error } => {
                        warn!(
                            %reason,
                            error = error.as_ref().map(tracing::field::display),
                            "structured branch contributed no rows"
                        );
                        (Vec::new(), Some(reason))
                    }
                };
                stats.semantic_count = semantic.len();
                stats.structured_count = structured.len();

                let fusion_start = Instant::now();
                let fused = self.fusion.merge(&semantic, &structured, k);
                stats.fusion_time_us = fusion_start.elapsed().as_micros() as u64;
                return Ok((fused, miss));
            }
            Ok(Err(err)) => (FallbackReason::HybridFailed, err),
            Err(_elapsed) => (
                FallbackReason::HybridTimeout,
                BackendError::Timeout {
                    stage: "hybrid search",
                    after: deadline,
                },
            ),
        };

        warn!(%reason, error = %primary, "hybrid search falling back to semantic only");

        let results = match self.bounded_semantic(query, k).await {
            Ok(results) => results,
            Err(fallback) => {
                return Err(SearchError::Exhausted {
                    primary,
                    fallback: Some(fallback),
                });
            }
        };
        stats.semantic_count = results.len();
        Ok((results, Some(reason)))
    }

    async fn bounded_semantic(
        &self,
        query: &str,
        k: usize,
    ) -> std::result::Result<Vec<SearchResult>, BackendError> {
        let limit = self.config.fallback_timeout();
        match tokio::time::timeout(limit, self.semantic.search(query, k)).await {
            Ok(results) => results,
            Err(_elapsed) => Err(BackendError::Timeout {
                stage: "fallback semantic search",
                after: limit,
            }),
        }
    }
}
