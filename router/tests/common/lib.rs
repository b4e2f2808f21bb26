//! Scriptable in-memory collaborators for router integration tests.

use async_trait::async_trait;
use docsearch_router::backend::{
    QueryTranslator, SemanticHit, SemanticSearch, StructuredExecutor, StructuredRow,
};
use docsearch_router::{
    Locator, Metadata, RouterConfig, SearchOrchestrator, SearchResult, SearchSource,
};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn semantic_hit(document_id: &str, score: f32) -> SemanticHit {
    SemanticHit {
        text: format!("passage about {document_id}"),
        score,
        document_id: document_id.to_string(),
        locator: Some(Locator::Page(1)),
        metadata: Metadata::new(),
    }
}

pub fn row(document_id: &str) -> StructuredRow {
    StructuredRow {
        text: format!("row of {document_id}"),
        document_id: document_id.to_string(),
        locator: Some(Locator::Page(1)),
        metadata: Metadata::new(),
        relevance: None,
    }
}

/// Semantic backend returning a fixed ranked list.
#[derive(Default)]
pub struct ScriptedSemantic {
    hits: Vec<SemanticHit>,
    delay: Duration,
    failure: Option<String>,
    failing_calls: usize,
    calls: AtomicUsize,
    requested_k: Mutex<Vec<usize>>,
}

impl ScriptedSemantic {
    pub fn with_hits(hits: Vec<SemanticHit>) -> Self {
        Self {
            hits,
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fail the first `n` calls, then answer normally
    pub fn failing_first(mut self, n: usize) -> Self {
        self.failing_calls = n;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `k` of every call, in call order
    pub fn requested_k(&self) -> Vec<usize> {
        self.requested_k
            .lock()
            .map(|ks| ks.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SemanticSearch for ScriptedSemantic {
    async fn search(&self, _query: &str, k: usize) -> anyhow::Result<Vec<SemanticHit>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut ks) = self.requested_k.lock() {
            ks.push(k);
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if call < self.failing_calls {
            anyhow::bail!("semantic index warming up");
        }
        match &self.failure {
            Some(message) => Err(anyhow::anyhow!("{message}")),
            None => Ok(self.hits.iter().take(k).cloned().collect()),
        }
    }
}

/// Translator with a fixed answer.
pub struct ScriptedTranslator {
    answer: Result<Option<String>, String>,
    calls: AtomicUsize,
}

impl ScriptedTranslator {
    pub fn returning(query: &str) -> Self {
        Self {
            answer: Ok(Some(query.to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn untranslatable() -> Self {
        Self {
            answer: Ok(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            answer: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryTranslator for ScriptedTranslator {
    async fn translate(&self, _query: &str) -> anyhow::Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer
            .clone()
            .map_err(|message| anyhow::anyhow!("{message}"))
    }
}

/// Structured backend returning fixed rows.
#[derive(Default)]
pub struct ScriptedExecutor {
    rows: Vec<StructuredRow>,
    delay: Duration,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedExecutor {
    pub fn with_rows(rows: Vec<StructuredRow>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StructuredExecutor for ScriptedExecutor {
    async fn execute(
        &self,
        _structured_query: &str,
        k: usize,
    ) -> anyhow::Result<Vec<StructuredRow>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.failure {
            Some(message) => Err(anyhow::anyhow!("{message}")),
            None => Ok(self.rows.iter().take(k).cloned().collect()),
        }
    }
}

/// Handles kept by a test so it can inspect call counts after searching.
pub struct Harness {
    pub semantic: Arc<ScriptedSemantic>,
    pub translator: Arc<ScriptedTranslator>,
    pub executor: Arc<ScriptedExecutor>,
    pub router: SearchOrchestrator,
}

impl Harness {
    pub fn new(
        config: RouterConfig,
        semantic: ScriptedSemantic,
        translator: ScriptedTranslator,
        executor: ScriptedExecutor,
    ) -> anyhow::Result<Self> {
        let semantic = Arc::new(semantic);
        let translator = Arc::new(translator);
        let executor = Arc::new(executor);
        let router = SearchOrchestrator::new(
            config,
            semantic.clone(),
            translator.clone(),
            executor.clone(),
        )?;
        Ok(Self {
            semantic,
            translator,
            executor,
            router,
        })
    }
}

/// Metadata map from `key => json` pairs
pub fn metadata(pairs: &[(&str, serde_json::Value)]) -> Metadata {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

/// Whether every result came from `source`
pub fn all_from(results: &[SearchResult], source: SearchSource) -> bool {
    results.iter().all(|r| r.source == source)
}
