use crate::classifier::RoutingDecision;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Source of a search result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSource {
    /// From the semantic/vector index, directly or via fallback
    Semantic,
    /// From the structured/tabular index
    Structured,
    /// Present in both lists and merged by the fusion engine
    Fused,
}

impl fmt::Display for SearchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            SearchSource::Semantic => "semantic",
            SearchSource::Structured => "structured",
            SearchSource::Fused => "fused",
        };
        f.write_str(tag)
    }
}

/// Position of a result inside its document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locator {
    Page(u32),
    Row(u64),
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Page(page) => write!(f, "p.{page}"),
            Locator::Row(row) => write!(f, "row {row}"),
        }
    }
}

/// Identity used to detect the same passage or row across backends
pub type DedupKey = (String, Option<Locator>);

/// A single search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub text: String,

    /// Relevance score (0.0 - 1.0, higher is better)
    pub score: f32,

    pub source: SearchSource,

    #[serde(default)]
    pub metadata: Metadata,

    pub document_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locator: Option<Locator>,
}

impl SearchResult {
    /// Create new search result. The score is clamped into [0, 1].
    pub fn new(
        document_id: impl Into<String>,
        text: impl Into<String>,
        score: f32,
        source: SearchSource,
    ) -> Self {
        Self {
            text: text.into(),
            score: clamp_score(score),
            source,
            metadata: Metadata::new(),
            document_id: document_id.into(),
            locator: None,
        }
    }

    pub fn with_locator(mut self, locator: Option<Locator>) -> Self {
        self.locator = locator;
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn dedup_key(&self) -> DedupKey {
        (self.document_id.clone(), self.locator)
    }
}

/// Clamp into [0, 1], mapping NaN to 0
pub(crate) fn clamp_score(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// Why a search did not take the path the classifier asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// The translator could not express the query structurally
    TranslationUnavailable,
    /// The translator itself failed
    TranslationFailed,
    /// The structured backend rejected or failed the query
    ExecutionFailed,
    /// The structured query ran but matched nothing
    NoRows,
    /// The hybrid branches missed their shared deadline
    HybridTimeout,
    /// A hybrid branch failed outright
    HybridFailed,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            FallbackReason::TranslationUnavailable => "no structured query possible",
            FallbackReason::TranslationFailed => "query translation failed",
            FallbackReason::ExecutionFailed => "structured execution failed",
            FallbackReason::NoRows => "structured query returned no rows",
            FallbackReason::HybridTimeout => "hybrid deadline expired",
            FallbackReason::HybridFailed => "hybrid path failed",
        };
        f.write_str(reason)
    }
}

/// Collection of search results with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    /// Query that produced these results
    pub query: String,

    /// Route chosen by the classifier
    pub decision: RoutingDecision,

    /// Ranked results, best first
    pub results: Vec<SearchResult>,

    /// Set when a degraded path produced the results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackReason>,

    pub stats: SearchStats,
}

/// Search performance statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchStats {
    /// Total search time in milliseconds
    pub total_time_ms: u64,

    /// Classification time in microseconds
    pub classify_time_us: u64,

    /// Time spent waiting on the semantic and structured backends
    pub retrieval_time_ms: u64,

    /// Fusion time in microseconds
    pub fusion_time_us: u64,

    /// Number of semantic candidates
    pub semantic_count: usize,

    /// Number of structured candidates
    pub structured_count: usize,
}

impl SearchResults {
    pub fn new(query: String, decision: RoutingDecision) -> Self {
        Self {
            query,
            decision,
            results: Vec::new(),
            fallback: None,
            stats: SearchStats::default(),
        }
    }

    pub fn with_results(mut self, results: Vec<SearchResult>) -> Self {
        self.results = results;
        self
    }

    pub fn with_fallback(mut self, fallback: Option<FallbackReason>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_stats(mut self, stats: SearchStats) -> Self {
        self.stats = stats;
        self
    }

    /// Get top N results
    pub fn top(&self, n: usize) -> &[SearchResult] {
        &self.results[..n.min(self.results.len())]
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn into_results(self) -> Vec<SearchResult> {
        self.results
    }
}
