/*!
# Multi-Index Query Router

Routes a natural-language query to a semantic (vector) index, a structured
(tabular) index, or both, and returns one ranked list:
- **Classification** via an ordered table of keyword/pattern rules
- **Structured retrieval** via translate-then-execute with semantic fallback
- **Score fusion** that normalizes each list before alpha weighting
- **Deadlines** on the concurrent hybrid path with semantic-only fallback

## Architecture

```text
Query
  └─> QueryClassifier (rule table)
        ├─> SEMANTIC_ONLY   ─> SemanticAdapter
        ├─> STRUCTURED_ONLY ─> StructuredAdapter ──(miss)──> SemanticAdapter
        └─> HYBRID ─┬─> SemanticAdapter (2k) ─┐   one deadline
                    └─> StructuredAdapter (2k)┴─> FusionEngine
                              (expiry/failure) ─> fresh SemanticAdapter call
```

## Example

```rust,no_run
use docsearch_router::{RouterConfig, SearchOrchestrator};
use docsearch_router::backend::{QueryTranslator, SemanticSearch, StructuredExecutor};
use std::sync::Arc;

async fn run(
    semantic: Arc<dyn SemanticSearch>,
    translator: Arc<dyn QueryTranslator>,
    executor: Arc<dyn StructuredExecutor>,
) -> anyhow::Result<()> {
    let router = SearchOrchestrator::new(RouterConfig::default(), semantic, translator, executor)?;
    let results = router.search("What was EBITDA in August 2025?", 5).await?;

    for (i, result) in results.top(5).iter().enumerate() {
        println!("{}. {} ({}, {:.3})", i + 1, result.document_id, result.source, result.score);
    }
    Ok(())
}
```
*/

pub mod backend;
mod classifier;
mod config;
mod error;
mod fusion;
mod orchestrator;
mod result;
mod semantic;
mod structured;

pub use classifier::{
    Classification, QueryClassifier, QuerySignals, RoutingDecision, RoutingRule, classify,
};
pub use config::{MetadataMergePolicy, RouterConfig, StructuredScorePolicy};
pub use error::{BackendError, ConfigError, Result, SearchError};
pub use fusion::{FusionEngine, FusionSummary};
pub use orchestrator::SearchOrchestrator;
pub use result::{
    DedupKey, FallbackReason, Locator, Metadata, SearchResult, SearchResults, SearchSource,
    SearchStats,
};
pub use semantic::SemanticAdapter;
pub use structured::{AdapterOutput, STRUCTURED_CEILING_SCORE, StructuredAdapter, StructuredOutcome};
