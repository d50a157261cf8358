//! TG-CNN activation graphs
//!
//! Explains a temporal graph CNN's filters on patient pathways:
//! - Activation scoring: tiled and sliding-window responses of fixed 3D
//!   filters over (visits × nodes × nodes) patient graphs
//! - Class discrimination: which filter best separates two outcome classes
//! - Activated graph: one patient's edge list weighted by that filter, with
//!   a deterministic, overlap-free 2D layout for drawing

pub mod activation;
pub mod dataset;
pub mod error;
pub mod graph;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use activation::ScoringConfig;
pub use dataset::Dataset;
pub use error::{ActGraphError, Result};
pub use pipeline::{run_pipeline, ActivationReport};

use serde::Deserialize;
use std::path::Path;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub scoring: ScoringYamlConfig,
    pub output: OutputYamlConfig,
}

/// Scoring section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringYamlConfig {
    pub leaky_alpha: f64,
    pub parallel: bool,
}

impl Default for ScoringYamlConfig {
    fn default() -> Self {
        let defaults = ScoringConfig::default();
        Self {
            leaky_alpha: defaults.leaky_alpha,
            parallel: defaults.parallel,
        }
    }
}

/// Output section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputYamlConfig {
    /// Name of the predicted outcome, used in log lines and reports.
    pub class_name: String,
}

impl Default for OutputYamlConfig {
    fn default() -> Self {
        Self {
            class_name: "Outcome".into(),
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub scoring: ScoringConfig,
    pub class_name: String,
}

impl Config {
    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. If the file doesn't
    /// exist, falls back to pure env var / defaults. A numeric or boolean
    /// override that does not parse is an error, not a silent fallback.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> anyhow::Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        let config = Self {
            scoring: ScoringConfig {
                leaky_alpha: env_override("ACT_GRAPH_LEAKY_ALPHA")?
                    .unwrap_or(yaml.scoring.leaky_alpha),
                parallel: env_override("ACT_GRAPH_PARALLEL")?.unwrap_or(yaml.scoring.parallel),
            },
            class_name: std::env::var("ACT_GRAPH_CLASS_NAME").unwrap_or(yaml.output.class_name),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the scorer cannot work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        let alpha = self.scoring.leaky_alpha;
        if !(alpha > 0.0 && alpha < 1.0) {
            anyhow::bail!("leaky_alpha must lie in (0, 1), got {}", alpha);
        }
        Ok(())
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

/// Parse `key` from the environment if set.
fn env_override<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => Ok(Some(value)),
            Err(e) => anyhow::bail!("Invalid {}={:?}: {}", key, raw, e),
        },
        Err(_) => Ok(None),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            class_name: OutputYamlConfig::default().class_name,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
