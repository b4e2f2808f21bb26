use crate::backend::{QueryTranslator, StructuredExecutor, StructuredRow};
use crate::config::StructuredScorePolicy;
use crate::error::{BackendError, SearchError};
use crate::result::{FallbackReason, SearchResult, SearchSource};
use crate::semantic::SemanticAdapter;
use std::sync::Arc;
use tracing::{debug, warn};

/// Score given to a structured row that is treated as an exact match
pub const STRUCTURED_CEILING_SCORE: f32 = 1.0;

/// Result of the structured pipeline without any fallback applied
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredOutcome {
    /// Rows mapped to results tagged `structured`
    Rows(Vec<SearchResult>),
    /// The pipeline produced nothing usable
    Miss {
        reason: FallbackReason,
        error: Option<BackendError>,
    },
}

/// Results plus the degraded path that produced them, if any
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterOutput {
    pub results: Vec<SearchResult>,
    pub fallback: Option<FallbackReason>,
}

/// Translate-then-execute pipeline over the structured index.
///
/// Structured retrieval is best effort: [`StructuredAdapter::search`] falls
/// back to semantic search whenever translation yields nothing, execution
/// fails, or execution returns no rows.
#[derive(Clone)]
pub struct StructuredAdapter {
    translator: Arc<dyn QueryTranslator>,
    executor: Arc<dyn StructuredExecutor>,
    semantic: SemanticAdapter,
    score_policy: StructuredScorePolicy,
}

impl StructuredAdapter {
    pub fn new(
        translator: Arc<dyn QueryTranslator>,
        executor: Arc<dyn StructuredExecutor>,
        semantic: SemanticAdapter,
        score_policy: StructuredScorePolicy,
    ) -> Self {
        Self {
            translator,
            executor,
            semantic,
            score_policy,
        }
    }

    /// Structured search with semantic fallback.
    ///
    /// Only fails when the fallback fails too.
    pub async fn search(&self, query: &str, k: usize) -> Result<AdapterOutput, SearchError> {
        let (reason, error) = match self.search_strict(query, k).await {
            StructuredOutcome::Rows(results) => {
                return Ok(AdapterOutput {
                    results,
                    fallback: None,
                });
            }
            StructuredOutcome::Miss { reason, error } => (reason, error),
        };

        warn!(
            reason = %reason,
            error = error.as_ref().map(tracing::field::display),
            "structured search falling back to semantic"
        );

        match self.semantic.search(query, k).await {
            Ok(results) => Ok(AdapterOutput {
                results,
                fallback: Some(reason),
            }),
            Err(fallback) => Err(SearchError::Exhausted {
                primary: error.unwrap_or_else(|| miss_as_error(reason)),
                fallback: Some(fallback),
            }),
        }
    }

    /// Run translate and execute without falling back.
    pub async fn search_strict(&self, query: &str, k: usize) -> StructuredOutcome {
        let structured_query = match self.translator.translate(query).await {
            Ok(Some(generated)) if !generated.trim().is_empty() => generated,
            Ok(_) => {
                return StructuredOutcome::Miss {
                    reason: FallbackReason::TranslationUnavailable,
                    error: None,
                };
            }
            Err(e) => {
                return StructuredOutcome::Miss {
                    reason: FallbackReason::TranslationFailed,
                    error: Some(BackendError::Translation(format!("{e:#}"))),
                };
            }
        };

        debug!(%structured_query, "executing structured query");

        let rows = match self.executor.execute(&structured_query, k).await {
            Ok(rows) => rows,
            Err(e) => {
                return StructuredOutcome::Miss {
                    reason: FallbackReason::ExecutionFailed,
                    error: Some(BackendError::Execution(format!("{e:#}"))),
                };
            }
        };

        if rows.is_empty() {
            return StructuredOutcome::Miss {
                reason: FallbackReason::NoRows,
                error: None,
            };
        }

        debug!(rows = rows.len(), "structured query returned rows");

        StructuredOutcome::Rows(
            rows.into_iter()
                .take(k)
                .map(|row| self.row_result(row))
                .collect(),
        )
    }

    fn row_result(&self, row: StructuredRow) -> SearchResult {
        let score = match self.score_policy {
            StructuredScorePolicy::Ceiling => STRUCTURED_CEILING_SCORE,
            StructuredScorePolicy::BackendRelevance => row
                .relevance
                .filter(|r| r.is_finite())
                .unwrap_or(STRUCTURED_CEILING_SCORE),
        };

        SearchResult::new(row.document_id, row.text, score, SearchSource::Structured)
            .with_locator(row.locator)
            .with_metadata(row.metadata)
    }
}

fn miss_as_error(reason: FallbackReason) -> BackendError {
    match reason {
        FallbackReason::TranslationUnavailable | FallbackReason::TranslationFailed => {
            BackendError::Translation(reason.to_string())
        }
        _ => BackendError::Execution(reason.to_string()),
    }
}
