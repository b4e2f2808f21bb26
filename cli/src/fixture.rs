//! In-memory collaborators over a [`Corpus`].
//!
//! Semantic search ranks passages by term overlap and reports reciprocal-rank
//! scores, so fused output behaves like it would against a real vector index.
//! Structured search speaks a one-verb query language: `MATCH <term>...`.

use crate::corpus::{Corpus, Table, TableRow, cell_text, terms};
use async_trait::async_trait;
use docsearch_router::Locator;
use docsearch_router::Metadata;
use docsearch_router::backend::{
    QueryTranslator, SemanticHit, SemanticSearch, StructuredExecutor, StructuredRow,
};
use serde_json::json;
use std::sync::Arc;

/// Reciprocal-rank constant used for semantic scores
const RRF_K: f32 = 60.0;

const MATCH_VERB: &str = "MATCH ";

pub struct TermOverlapSearch {
    corpus: Arc<Corpus>,
}

impl TermOverlapSearch {
    pub fn new(corpus: Arc<Corpus>) -> Self {
        Self { corpus }
    }
}

#[async_trait]
impl SemanticSearch for TermOverlapSearch {
    async fn search(&self, query: &str, k: usize) -> anyhow::Result<Vec<SemanticHit>> {
        let wanted = terms(query);

        let mut scored: Vec<(usize, usize)> = self
            .corpus
            .passages
            .iter()
            .enumerate()
            .filter_map(|(idx, passage)| {
                let have = terms(&passage.text);
                let overlap = wanted.iter().filter(|t| have.contains(*t)).count();
                (overlap > 0).then_some((idx, overlap))
            })
            .collect();
        // Stable: equal overlap keeps corpus order.
        scored.sort_by(|a, b| b.1.cmp(&a.1));

        Ok(scored
            .into_iter()
            .take(k)
            .enumerate()
            .map(|(rank, (idx, _))| {
                let passage = &self.corpus.passages[idx];
                SemanticHit {
                    text: passage.text.clone(),
                    score: 1.0 / (RRF_K + rank as f32 + 1.0),
                    document_id: passage.document_id.clone(),
                    locator: passage.page.map(Locator::Page),
                    metadata: passage.metadata.clone(),
                }
            })
            .collect())
    }
}

/// Emits `MATCH` for the query terms that appear anywhere in a table
pub struct KeywordTranslator {
    corpus: Arc<Corpus>,
}

impl KeywordTranslator {
    pub fn new(corpus: Arc<Corpus>) -> Self {
        Self { corpus }
    }
}

#[async_trait]
impl QueryTranslator for KeywordTranslator {
    async fn translate(&self, query: &str) -> anyhow::Result<Option<String>> {
        let hits: Vec<String> = terms(query)
            .into_iter()
            .filter(|term| {
                self.corpus.tables.iter().any(|table| {
                    header_terms(table).contains(term)
                        || table.rows.iter().any(|row| row_terms(row).contains(term))
                })
            })
            .collect();

        if hits.is_empty() {
            return Ok(None);
        }
        Ok(Some(format!("{MATCH_VERB}{}", hits.join(" "))))
    }
}

/// Executes `MATCH` queries. A row matches when every term occurs in its
/// table name, its column headers or its own cells.
pub struct MatchExecutor {
    corpus: Arc<Corpus>,
}

impl MatchExecutor {
    pub fn new(corpus: Arc<Corpus>) -> Self {
        Self { corpus }
    }
}

#[async_trait]
impl StructuredExecutor for MatchExecutor {
    async fn execute(
        &self,
        structured_query: &str,
        k: usize,
    ) -> anyhow::Result<Vec<StructuredRow>> {
        let Some(rest) = structured_query.trim().strip_prefix(MATCH_VERB) else {
            anyhow::bail!("unsupported structured query: {structured_query}");
        };
        let wanted = terms(rest);
        if wanted.is_empty() {
            anyhow::bail!("MATCH needs at least one term");
        }

        let mut rows = Vec::new();
        for table in &self.corpus.tables {
            let shared = header_terms(table);
            for row in &table.rows {
                let cells = row_terms(row);
                let matched = wanted
                    .iter()
                    .all(|t| shared.contains(t) || cells.contains(t));
                if !matched {
                    continue;
                }
                let in_cells = wanted.iter().filter(|t| cells.contains(*t)).count();
                rows.push(into_row(table, row, in_cells as f32 / wanted.len() as f32));
                if rows.len() == k {
                    return Ok(rows);
                }
            }
        }
        Ok(rows)
    }
}

/// Table name plus column headers
fn header_terms(table: &Table) -> Vec<String> {
    let mut all = terms(&table.name);
    for row in &table.rows {
        for column in row.cells.keys() {
            all.extend(terms(column));
        }
    }
    all
}

fn row_terms(row: &TableRow) -> Vec<String> {
    row.cells
        .values()
        .flat_map(|value| terms(&cell_text(value)))
        .collect()
}

fn into_row(table: &Table, row: &TableRow, relevance: f32) -> StructuredRow {
    let mut metadata = Metadata::new();
    metadata.insert("table".to_string(), json!(table.name));

    StructuredRow {
        text: format!("{}: {}", table.name, row.render()),
        document_id: table.document_id.clone(),
        locator: Some(Locator::Row(row.row)),
        metadata,
        relevance: Some(relevance),
    }
}
