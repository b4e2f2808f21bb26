use anyhow::Result;
use clap::{Parser, Subcommand};

mod classify_cmd;
pub mod corpus;
pub mod fixture;
mod logging;
mod search_cmd;

pub use classify_cmd::ClassifyArgs;
pub use logging::init_tracing;
pub use search_cmd::SearchArgs;

/// Route document queries across semantic and structured indexes
#[derive(Debug, Parser)]
#[command(name = "docsearch", version)]
pub struct Cli {
    /// Log routing and fallback decisions to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search a fixture corpus
    Search(SearchArgs),

    /// Show how a query would be routed
    Classify(ClassifyArgs),
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Search(args) => search_cmd::run_search(args, self.verbose).await,
            Command::Classify(args) => classify_cmd::run_classify(args, self.verbose),
        }
    }
}
