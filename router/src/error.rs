use std::time::Duration;
use thiserror::Error;

/// Failure of a single backend call. Recovered locally by falling back
/// whenever a safe fallback target exists.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Semantic search failed: {0}")]
    Semantic(String),

    #[error("Query translation failed: {0}")]
    Translation(String),

    #[error("Structured query execution failed: {0}")]
    Execution(String),

    #[error("{stage} timed out after {}ms", .after.as_millis())]
    Timeout {
        stage: &'static str,
        after: Duration,
    },
}

#[derive(Error, Debug)]
pub enum SearchError {
    /// Rejected before any backend call.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The requested path and its fallback both failed. `fallback` is `None`
    /// when the failed path was semantic search, the last resort itself.
    #[error("All retrieval paths exhausted: {primary}{}", describe_fallback(.fallback))]
    Exhausted {
        primary: BackendError,
        fallback: Option<BackendError>,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0}")]
    Invalid(String),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

fn describe_fallback(fallback: &Option<BackendError>) -> String {
    match fallback {
        Some(err) => format!("; fallback: {err}"),
        None => "; no fallback available".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
