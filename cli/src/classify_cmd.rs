use anyhow::Result;
use clap::Parser;
use docsearch_router::QueryClassifier;
use owo_colors::OwoColorize;
use serde_json::json;

#[derive(Debug, Parser)]
pub struct ClassifyArgs {
    /// Query to classify
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Print the decision as JSON
    #[arg(long)]
    pub json: bool,
}

pub(crate) fn run_classify(args: ClassifyArgs, verbose: bool) -> Result<()> {
    let classifier = QueryClassifier::new();
    let outcome = classifier.classify_detailed(&args.query);
    let signals = &outcome.signals;

    if args.json {
        let value = json!({
            "query": args.query,
            "decision": outcome.decision,
            "rule": outcome.rule,
            "signals": {
                "structured_terms": signals.structured_terms,
                "metric_terms": signals.metric_terms,
                "temporal_tokens": signals.temporal_tokens,
                "explanatory_terms": signals.explanatory_terms,
                "numeric": signals.numeric,
            },
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "{} {} {}",
        "▶".bright_blue(),
        outcome.decision.to_string().bright_cyan(),
        format!("(rule: {})", outcome.rule).bright_black()
    );

    if verbose {
        println!("  Structured terms: {}", signals.structured_terms);
        println!("  Metric terms: {}", signals.metric_terms);
        println!("  Temporal tokens: {}", signals.temporal_tokens);
        println!("  Explanatory terms: {}", signals.explanatory_terms);
        println!("  Numeric: {}", signals.numeric);
    }

    Ok(())
}
