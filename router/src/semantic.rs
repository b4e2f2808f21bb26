use crate::backend::SemanticHit;
use crate::backend::SemanticSearch;
use crate::error::BackendError;
use crate::result::{SearchResult, SearchSource};
use std::sync::Arc;
use tracing::debug;

/// Maps the semantic collaborator's hits into [`SearchResult`]s.
///
/// No retries happen here. Failures surface as [`BackendError::Semantic`] so
/// callers can tell when the last-resort path is gone.
#[derive(Clone)]
pub struct SemanticAdapter {
    backend: Arc<dyn SemanticSearch>,
}

impl SemanticAdapter {
    pub fn new(backend: Arc<dyn SemanticSearch>) -> Self {
        Self { backend }
    }

    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>, BackendError> {
        let hits = self
            .backend
            .search(query, k)
            .await
            .map_err(|e| BackendError::Semantic(format!("{e:#}")))?;

        debug!(
            requested = k,
            returned = hits.len(),
            "semantic search finished"
        );

        Ok(hits.into_iter().take(k).map(into_result).collect())
    }
}

fn into_result(hit: SemanticHit) -> SearchResult {
    let score = if hit.score.is_finite() { hit.score } else { 0.0 };
    SearchResult::new(hit.document_id, hit.text, score, SearchSource::Semantic)
        .with_locator(hit.locator)
        .with_metadata(hit.metadata)
}
