use std::path::Path;

use anyhow::Result;
use predicates::str::contains;
use pretty_assertions::assert_eq;
use serde_json::Value as JsonValue;
use tempfile::TempDir;

const CORPUS: &str = r#"{
    "passages": [
        {"document_id": "memo", "page": 2, "text": "EBITDA fell because freight costs rose."},
        {"document_id": "policy", "text": "Vendors are paid within 30 days.", "metadata": {"owner": "ap"}},
        {"document_id": "board", "page": 7, "text": "The board discussed EBITDA and freight."}
    ],
    "tables": [{
        "document_id": "kpis.xlsx",
        "name": "monthly kpis",
        "rows": [
            {"row": 1, "cells": {"month": "July 2025", "ebitda": 1100}},
            {"row": 2, "cells": {"month": "August 2025", "ebitda": 1200}}
        ]
    }]
}"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Result<Self> {
        let dir = TempDir::new()?;
        std::fs::write(dir.path().join("corpus.json"), CORPUS)?;
        Ok(Self { dir })
    }

    fn corpus(&self) -> std::path::PathBuf {
        self.dir.path().join("corpus.json")
    }

    fn write_config(&self, body: &str) -> Result<std::path::PathBuf> {
        let path = self.dir.path().join("docsearch.toml");
        std::fs::write(&path, body)?;
        Ok(path)
    }
}

fn docsearch() -> Result<assert_cmd::Command> {
    let mut cmd = assert_cmd::Command::cargo_bin("docsearch")?;
    cmd.env_remove("DOCSEARCH_CONFIG").env_remove("RUST_LOG");
    Ok(cmd)
}

fn search_json(corpus: &Path, query: &str, extra: &[&str]) -> Result<JsonValue> {
    let mut cmd = docsearch()?;
    let output = cmd
        .args(["search", query, "--json", "--corpus"])
        .arg(corpus)
        .args(extra)
        .output()?;
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(serde_json::from_slice(&output.stdout)?)
}

fn field<'a>(results: &'a JsonValue, key: &str) -> Vec<&'a str> {
    results["results"]
        .as_array()
        .map(|items| items.iter().filter_map(|r| r[key].as_str()).collect())
        .unwrap_or_default()
}

#[test]
fn classify_prints_decision_and_rule() -> Result<()> {
    docsearch()?
        .args(["classify", "What was EBITDA in August 2025?"])
        .assert()
        .success()
        .stdout(contains("structured_only"))
        .stdout(contains("structured_lookup"));
    Ok(())
}

#[test]
fn classify_json_reports_signals() -> Result<()> {
    let output = docsearch()?
        .args([
            "classify",
            "Explain why EBITDA dropped in Q3 2024",
            "--json",
        ])
        .output()?;
    assert!(output.status.success());

    let parsed: JsonValue = serde_json::from_slice(&output.stdout)?;
    assert_eq!(parsed["decision"], "hybrid");
    assert_eq!(parsed["rule"], "quantitative_explanation");
    assert_eq!(parsed["signals"]["metric_terms"], 1);
    assert_eq!(parsed["signals"]["numeric"], true);
    Ok(())
}

#[test]
fn structured_query_returns_matching_row() -> Result<()> {
    let ws = Workspace::new()?;

    let parsed = search_json(&ws.corpus(), "EBITDA August 2025", &[])?;

    assert_eq!(parsed["decision"], "structured_only");
    assert!(parsed.get("fallback").is_none());
    assert_eq!(field(&parsed, "source"), vec!["structured"]);
    assert_eq!(field(&parsed, "document_id"), vec!["kpis.xlsx"]);
    assert_eq!(parsed["results"][0]["score"], 1.0);
    Ok(())
}

#[test]
fn explanatory_query_ranks_passages() -> Result<()> {
    let ws = Workspace::new()?;

    let parsed = search_json(&ws.corpus(), "Why did freight costs rise", &[])?;

    assert_eq!(parsed["decision"], "semantic_only");
    assert_eq!(field(&parsed, "document_id"), vec!["memo", "board"]);
    assert_eq!(field(&parsed, "source"), vec!["semantic", "semantic"]);
    Ok(())
}

#[test]
fn hybrid_query_mixes_both_indexes() -> Result<()> {
    let ws = Workspace::new()?;

    let parsed = search_json(&ws.corpus(), "Explain EBITDA for August 2025", &[])?;

    assert_eq!(parsed["decision"], "hybrid");
    assert!(parsed.get("fallback").is_none());
    let sources = field(&parsed, "source");
    assert!(sources.contains(&"semantic"), "{sources:?}");
    assert!(sources.contains(&"structured"), "{sources:?}");
    Ok(())
}

#[test]
fn untranslatable_hybrid_query_reports_fallback() -> Result<()> {
    let ws = Workspace::new()?;

    let parsed = search_json(&ws.corpus(), "vendors paid", &[])?;

    assert_eq!(parsed["decision"], "hybrid");
    assert_eq!(parsed["fallback"], "translation_unavailable");
    assert_eq!(field(&parsed, "document_id"), vec!["policy"]);
    assert_eq!(parsed["results"][0]["metadata"]["owner"], "ap");
    Ok(())
}

#[test]
fn limit_flag_caps_results() -> Result<()> {
    let ws = Workspace::new()?;

    let parsed = search_json(&ws.corpus(), "Why did freight costs rise", &["-k", "1"])?;

    assert_eq!(field(&parsed, "document_id"), vec!["memo"]);
    Ok(())
}

#[test]
fn config_from_env_sets_default_k() -> Result<()> {
    let ws = Workspace::new()?;
    let config = ws.write_config("default_k = 1\n")?;

    let output = docsearch()?
        .env("DOCSEARCH_CONFIG", &config)
        .args(["search", "Why did freight costs rise", "--json", "--corpus"])
        .arg(ws.corpus())
        .output()?;
    assert!(output.status.success());

    let parsed: JsonValue = serde_json::from_slice(&output.stdout)?;
    assert_eq!(field(&parsed, "document_id"), vec!["memo"]);
    Ok(())
}

#[test]
fn invalid_config_is_reported() -> Result<()> {
    let ws = Workspace::new()?;
    let config = ws.write_config("alpha = 2.0\n")?;

    docsearch()?
        .args(["search", "revenue", "--corpus"])
        .arg(ws.corpus())
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(contains("Failed to load config"))
        .stderr(contains("alpha must be in (0.0, 1.0)"));
    Ok(())
}

#[test]
fn missing_config_file_is_reported() -> Result<()> {
    let ws = Workspace::new()?;

    docsearch()?
        .args(["search", "revenue", "--corpus"])
        .arg(ws.corpus())
        .arg("--config")
        .arg(ws.dir.path().join("absent.toml"))
        .assert()
        .failure()
        .stderr(contains("Failed to load config"))
        .stderr(contains("Failed to read config file"));
    Ok(())
}

#[test]
fn blank_query_is_rejected() -> Result<()> {
    let ws = Workspace::new()?;

    docsearch()?
        .args(["search", "   ", "--corpus"])
        .arg(ws.corpus())
        .assert()
        .failure()
        .stderr(contains("query must not be empty"));
    Ok(())
}

#[test]
fn missing_corpus_is_reported() -> Result<()> {
    let ws = Workspace::new()?;

    docsearch()?
        .args(["search", "revenue", "--corpus"])
        .arg(ws.dir.path().join("absent.json"))
        .assert()
        .failure()
        .stderr(contains("Failed to read corpus"));
    Ok(())
}

#[test]
fn text_output_lists_ranked_results() -> Result<()> {
    let ws = Workspace::new()?;

    docsearch()?
        .args(["search", "Why did freight costs rise", "--corpus"])
        .arg(ws.corpus())
        .assert()
        .success()
        .stdout(contains("Found"))
        .stdout(contains("memo"))
        .stdout(contains("p.2"))
        .stdout(contains("EBITDA fell because freight costs rose."));
    Ok(())
}

#[test]
fn verbose_logs_routing_to_stderr() -> Result<()> {
    let ws = Workspace::new()?;

    docsearch()?
        .args(["--verbose", "search", "vendors paid", "--corpus"])
        .arg(ws.corpus())
        .assert()
        .success()
        .stdout(contains("Degraded"))
        .stdout(contains("Search Statistics"))
        .stderr(contains("loaded corpus"))
        .stderr(contains("routing query"));
    Ok(())
}
