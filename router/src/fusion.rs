use crate::config::{MetadataMergePolicy, RouterConfig};
use crate::result::{DedupKey, SearchResult, SearchSource, clamp_score};
use indexmap::IndexMap;
use indexmap::map::Entry;
use std::cmp::Ordering;
use tracing::debug;

/// Counts describing one merge, for tracing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FusionSummary {
    pub semantic_in: usize,
    pub structured_in: usize,
    pub overlapping: usize,
    pub emitted: usize,
}

/// Normalizes and merges a semantic list with a structured list.
///
/// Semantic scores are tiny reciprocal-rank style values while structured
/// rows sit at a constant ceiling. Each list is rescaled by its own maximum
/// before `alpha` weighting so that neither family dominates on raw scale.
#[derive(Debug, Clone)]
pub struct FusionEngine {
    alpha: f32,
    epsilon: f32,
    metadata_merge: MetadataMergePolicy,
}

impl FusionEngine {
    pub fn new(alpha: f32, epsilon: f32, metadata_merge: MetadataMergePolicy) -> Self {
        Self {
            alpha,
            epsilon,
            metadata_merge,
        }
    }

    pub fn from_config(config: &RouterConfig) -> Self {
        Self::new(config.alpha, config.epsilon, config.metadata_merge)
    }

    /// Merge two ranked lists into at most `k` results. Inputs are left untouched.
    pub fn merge(
        &self,
        semantic: &[SearchResult],
        structured: &[SearchResult],
        k: usize,
    ) -> Vec<SearchResult> {
        self.merge_with_summary(semantic, structured, k).0
    }

    pub fn merge_with_summary(
        &self,
        semantic: &[SearchResult],
        structured: &[SearchResult],
        k: usize,
    ) -> (Vec<SearchResult>, FusionSummary) {
        let mut summary = FusionSummary {
            semantic_in: semantic.len(),
            structured_in: structured.len(),
            ..Default::default()
        };

        if semantic.is_empty() || structured.is_empty() {
            let survivor = if semantic.is_empty() {
                structured
            } else {
                semantic
            };
            let results: Vec<_> = survivor.iter().take(k).cloned().collect();
            summary.emitted = results.len();
            debug!(?summary, "fusion skipped, one list empty");
            return (results, summary);
        }

        let max_semantic = self.guarded_max(semantic);
        let max_structured = self.guarded_max(structured);

        // Insertion order (semantic first) is the tie-break for equal scores.
        let mut merged: IndexMap<DedupKey, SearchResult> = IndexMap::new();

        for result in semantic {
            merged
                .entry(result.dedup_key())
                .or_insert_with(|| rescaled(result, max_semantic));
        }

        for result in structured {
            match merged.entry(result.dedup_key()) {
                Entry::Vacant(slot) => {
                    slot.insert(rescaled(result, max_structured));
                }
                Entry::Occupied(mut slot) => {
                    let existing = slot.get();
                    // A second structured row for the same key, or a key already fused.
                    if existing.source != SearchSource::Semantic {
                        continue;
                    }
                    let fused = self.fuse_pair(existing, result, max_structured);
                    slot.insert(fused);
                    summary.overlapping += 1;
                }
            }
        }

        let mut results: Vec<SearchResult> = merged.into_values().collect();
        // `sort_by` is stable, so equal scores keep insertion order.
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        results.truncate(k);

        summary.emitted = results.len();
        debug!(
            max_semantic,
            max_structured,
            alpha = self.alpha,
            ?summary,
            "fused result lists"
        );

        (results, summary)
    }

    /// `semantic` is already normalized; `structured` is raw.
    fn fuse_pair(
        &self,
        semantic: &SearchResult,
        structured: &SearchResult,
        max_structured: f32,
    ) -> SearchResult {
        let normalized_structured = clamp_score(structured.score / max_structured);
        let score = self.alpha * semantic.score + (1.0 - self.alpha) * normalized_structured;

        let mut metadata = semantic.metadata.clone();
        for (key, value) in &structured.metadata {
            match self.metadata_merge {
                MetadataMergePolicy::StructuredWins => {
                    metadata.insert(key.clone(), value.clone());
                }
                MetadataMergePolicy::SemanticWins => {
                    metadata.entry(key.clone()).or_insert_with(|| value.clone());
                }
            }
        }

        SearchResult::new(
            semantic.document_id.clone(),
            semantic.text.clone(),
            score,
            SearchSource::Fused,
        )
        .with_locator(semantic.locator)
        .with_metadata(metadata)
    }

    fn guarded_max(&self, results: &[SearchResult]) -> f32 {
        let max = results.iter().map(|r| r.score).fold(0.0_f32, f32::max);
        max.max(self.epsilon)
    }
}

impl Default for FusionEngine {
    fn default() -> Self {
        Self::from_config(&RouterConfig::default())
    }
}

fn rescaled(result: &SearchResult, max: f32) -> SearchResult {
    SearchResult {
        score: clamp_score(result.score / max),
        ..result.clone()
    }
}
