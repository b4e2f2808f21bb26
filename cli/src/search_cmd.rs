use crate::corpus::Corpus;
use crate::fixture::{KeywordTranslator, MatchExecutor, TermOverlapSearch};
use anyhow::{Context, Result};
use clap::Parser;
use docsearch_router::{RouterConfig, SearchOrchestrator, SearchResults};
use owo_colors::OwoColorize;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Characters of passage text shown per result without `--verbose`
const PREVIEW_CHARS: usize = 160;

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// Search query
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Fixture corpus (JSON) to search
    #[arg(long, value_name = "FILE")]
    pub corpus: PathBuf,

    /// Number of results to return (defaults to `default_k` from config)
    #[arg(short = 'k', long)]
    pub limit: Option<usize>,

    /// Router configuration (TOML)
    #[arg(long, value_name = "FILE", env = "DOCSEARCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

pub(crate) async fn run_search(args: SearchArgs, verbose: bool) -> Result<()> {
    let config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RouterConfig::default(),
    };

    let corpus = Arc::new(Corpus::load(&args.corpus)?);
    debug!(
        passages = corpus.passages.len(),
        tables = corpus.tables.len(),
        "loaded corpus"
    );
    let router = SearchOrchestrator::new(
        config,
        Arc::new(TermOverlapSearch::new(corpus.clone())),
        Arc::new(KeywordTranslator::new(corpus.clone())),
        Arc::new(MatchExecutor::new(corpus)),
    )
    .context("Failed to initialize search router")?;

    let results = match args.limit {
        Some(k) => router.search(&args.query, k).await,
        None => router.search_default(&args.query).await,
    }
    .context("Search failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    print_results(&results, verbose);
    Ok(())
}

fn load_config(path: &Path) -> Result<RouterConfig> {
    let raw = std::fs::read_to_string(path).context("Failed to read config file")?;
    let config = RouterConfig::from_toml_str(&raw)?;
    debug!(path = %path.display(), alpha = config.alpha, "loaded router config");
    Ok(config)
}

fn print_results(results: &SearchResults, verbose: bool) {
    if let Some(reason) = results.fallback {
        println!("{} Degraded: {reason}", "!".bright_yellow());
    }

    if results.is_empty() {
        println!("{} No results found", "✗".bright_red());
        return;
    }

    println!(
        "{} Found {} results via {} in {}ms\n",
        "✓".bright_green(),
        results.len().to_string().bright_cyan(),
        results.decision.to_string().bright_cyan(),
        results.stats.total_time_ms.to_string().bright_cyan()
    );

    for (i, result) in results.results.iter().enumerate() {
        let locator = result
            .locator
            .map(|l| format!(" ({l})"))
            .unwrap_or_default();
        println!(
            "{}. {}{}",
            (i + 1).to_string().bright_yellow(),
            result.document_id.bright_cyan(),
            locator.bright_black()
        );
        println!(
            "   {} {} {} {}",
            "Score:".bright_black(),
            format!("{:.3}", result.score).bright_green(),
            "Source:".bright_black(),
            result.source
        );

        if verbose {
            println!("   {}", result.text.dimmed());
        } else {
            println!("   {}", preview(&result.text).dimmed());
        }
        println!();
    }

    if verbose {
        let stats = &results.stats;
        println!("{}", "Search Statistics:".bright_blue());
        println!("  Classification: {}us", stats.classify_time_us);
        println!(
            "  Retrieval: {}ms ({} semantic, {} structured)",
            stats.retrieval_time_ms, stats.semantic_count, stats.structured_count
        );
        println!("  Fusion: {}us", stats.fusion_time_us);
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(PREVIEW_CHARS).collect();
    cut.push_str("...");
    cut
}
