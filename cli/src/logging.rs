use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `RUST_LOG` wins over `--verbose`.
pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "docsearch_router=debug,docsearch_cli=debug,warn"
        } else {
            "warn"
        })
    });

    // Ignore a second install; the first subscriber stays in place.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
