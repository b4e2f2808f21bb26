use clap::Parser;
use docsearch_cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    docsearch_cli::init_tracing(cli.verbose);
    cli.run().await
}
