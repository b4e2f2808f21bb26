//! JSON fixture corpus standing in for real semantic and structured indexes.

use anyhow::Context;
use anyhow::Result;
use docsearch_router::Metadata;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Corpus {
    #[serde(default)]
    pub passages: Vec<Passage>,
    #[serde(default)]
    pub tables: Vec<Table>,
}

/// Free-text chunk served by the semantic index
#[derive(Debug, Clone, Deserialize)]
pub struct Passage {
    pub document_id: String,
    #[serde(default)]
    pub page: Option<u32>,
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Named table served by the structured index
#[derive(Debug, Clone, Deserialize)]
pub struct Table {
    pub document_id: String,
    pub name: String,
    #[serde(default)]
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableRow {
    pub row: u64,
    pub cells: BTreeMap<String, Value>,
}

impl Corpus {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read corpus {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Invalid corpus {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

impl TableRow {
    /// `col=value` pairs in column order
    pub fn render(&self) -> String {
        self.cells
            .iter()
            .map(|(column, value)| format!("{column}={}", cell_text(value)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub(crate) fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Lowercased alphanumeric terms with filler words dropped
pub(crate) fn terms(text: &str) -> Vec<String> {
    const FILLER: &[&str] = &[
        "a", "an", "and", "are", "by", "did", "do", "does", "for", "from", "in", "is", "me", "of",
        "on", "or", "show", "the", "to", "was", "were", "what", "with",
    ];

    let mut out: Vec<String> = Vec::new();
    for word in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !FILLER.contains(w))
    {
        if !out.iter().any(|seen| seen == word) {
            out.push(word.to_string());
        }
    }
    out
}
