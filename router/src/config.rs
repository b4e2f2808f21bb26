use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which side wins when a fused result carries the same metadata key from
/// both backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MetadataMergePolicy {
    #[default]
    StructuredWins,
    SemanticWins,
}

/// How structured rows are scored before fusion normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StructuredScorePolicy {
    /// Every row is an exact match and scores 1.0
    #[default]
    Ceiling,
    /// Use the backend's own relevance when it reports one
    BackendRelevance,
}

/// Configuration for query routing, fusion and deadlines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Weight of the semantic score in a fused result (exclusive 0.0 - 1.0)
    #[serde(default = "default_alpha")]
    pub alpha: f32,

    /// Result count used when the caller does not pass one
    #[serde(default = "default_k")]
    pub default_k: usize,

    /// Each hybrid branch requests `k * candidate_multiplier` candidates
    #[serde(default = "default_candidate_multiplier")]
    pub candidate_multiplier: usize,

    /// Deadline for both hybrid branches together
    #[serde(default = "default_hybrid_timeout_ms")]
    pub hybrid_timeout_ms: u64,

    /// Deadline for the fresh semantic call issued after a hybrid failure
    #[serde(default = "default_fallback_timeout_ms")]
    pub fallback_timeout_ms: u64,

    /// Substitute for a zero or missing maximum during normalization
    #[serde(default = "default_epsilon")]
    pub epsilon: f32,

    #[serde(default)]
    pub metadata_merge: MetadataMergePolicy,

    #[serde(default)]
    pub structured_score: StructuredScorePolicy,
}

fn default_alpha() -> f32 {
    0.6
}

fn default_k() -> usize {
    5
}

fn default_candidate_multiplier() -> usize {
    2
}

fn default_hybrid_timeout_ms() -> u64 {
    5_000
}

fn default_fallback_timeout_ms() -> u64 {
    5_000
}

fn default_epsilon() -> f32 {
    1e-9
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            default_k: default_k(),
            candidate_multiplier: default_candidate_multiplier(),
            hybrid_timeout_ms: default_hybrid_timeout_ms(),
            fallback_timeout_ms: default_fallback_timeout_ms(),
            epsilon: default_epsilon(),
            metadata_merge: MetadataMergePolicy::default(),
            structured_score: StructuredScorePolicy::default(),
        }
    }
}

impl RouterConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "alpha must be in (0.0, 1.0), got {}",
                self.alpha
            )));
        }

        if self.default_k == 0 {
            return Err(ConfigError::Invalid("default_k must be > 0".to_string()));
        }

        if self.candidate_multiplier == 0 {
            return Err(ConfigError::Invalid(
                "candidate_multiplier must be > 0".to_string(),
            ));
        }

        if self.hybrid_timeout_ms == 0 || self.fallback_timeout_ms == 0 {
            return Err(ConfigError::Invalid(format!(
                "timeouts must be > 0, got hybrid={}ms fallback={}ms",
                self.hybrid_timeout_ms, self.fallback_timeout_ms
            )));
        }

        if !(self.epsilon > 0.0 && self.epsilon.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "epsilon must be a small positive number, got {}",
                self.epsilon
            )));
        }

        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn hybrid_timeout(&self) -> Duration {
        Duration::from_millis(self.hybrid_timeout_ms)
    }

    pub fn fallback_timeout(&self) -> Duration {
        Duration::from_millis(self.fallback_timeout_ms)
    }

    /// Candidates each hybrid branch requests for a final result count of `k`
    pub fn candidate_pool(&self, k: usize) -> usize {
        k.saturating_mul(self.candidate_multiplier)
    }

    /// Create config with tight deadlines for interactive use
    pub fn fast() -> Self {
        Self {
            hybrid_timeout_ms: 800,
            fallback_timeout_ms: 1_500,
            ..Default::default()
        }
    }

    /// Create config that leans harder on semantic text quality
    pub fn semantic_leaning() -> Self {
        Self {
            alpha: 0.8,
            metadata_merge: MetadataMergePolicy::SemanticWins,
            ..Default::default()
        }
    }
}
