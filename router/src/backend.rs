//! Interfaces of the external collaborators the router calls into.
//!
//! Implementations own their transport and connection pooling. Every call the
//! router makes is read-only and may be abandoned mid-flight by dropping the
//! returned future.

use crate::result::{Locator, Metadata};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A passage returned by the semantic index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticHit {
    pub text: String,
    /// Similarity in (0, 1]; often a small reciprocal-rank style value
    pub score: f32,
    pub document_id: String,
    #[serde(default)]
    pub locator: Option<Locator>,
    #[serde(default)]
    pub metadata: Metadata,
}

/// A row returned by the structured index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredRow {
    pub text: String,
    pub document_id: String,
    #[serde(default)]
    pub locator: Option<Locator>,
    #[serde(default)]
    pub metadata: Metadata,
    /// Match quality in [0, 1] when the backend can report one
    #[serde(default)]
    pub relevance: Option<f32>,
}

/// Ranked nearest-neighbour search over passage embeddings
#[async_trait]
pub trait SemanticSearch: Send + Sync {
    async fn search(&self, query: &str, k: usize) -> anyhow::Result<Vec<SemanticHit>>;
}

/// Natural language to structured query generation
#[async_trait]
pub trait QueryTranslator: Send + Sync {
    /// `Ok(None)` means the query cannot be expressed structurally.
    async fn translate(&self, query: &str) -> anyhow::Result<Option<String>>;
}

/// Execution of generated structured queries
#[async_trait]
pub trait StructuredExecutor: Send + Sync {
    async fn execute(
        &self,
        structured_query: &str,
        k: usize,
    ) -> anyhow::Result<Vec<StructuredRow>>;
}
