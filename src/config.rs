//! Compiler configuration.
//!
//! Every field has a default, so an empty YAML document is a valid config:
//!
//! ```yaml
//! max_alternatives: 3
//! alternate_chart_decay: 0.9
//! ambiguous_source_factor: 0.85
//! fuzzy_threshold: 0.9
//! reference_date: 2024-06-30
//! weights:
//!   version: tuned-3
//!   chart_hint_bonus: 0.25
//! ```

use anyhow::{bail, Context};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::intent::ScoringWeights;

/// Tunables of the compiler pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Intent scoring weight table.
    pub weights: ScoringWeights,

    /// Cap on `ChartSpecification::alternatives`.
    pub max_alternatives: usize,

    /// Per-rank decay applied to chart-type alternates on the primary source.
    pub alternate_chart_decay: f64,

    /// Confidence factor when the chosen source tied with another.
    pub ambiguous_source_factor: f64,

    /// Minimum Jaro-Winkler similarity for the fuzzy term pass.
    pub fuzzy_threshold: f64,

    /// Anchor for "last 3 months", "this year" and friends. Relative
    /// expressions are ignored when unset, keeping output independent of the
    /// wall clock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_date: Option<NaiveDate>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            max_alternatives: 3,
            alternate_chart_decay: 0.9,
            ambiguous_source_factor: 0.85,
            fuzzy_threshold: 0.9,
            reference_date: None,
        }
    }
}

impl CompilerConfig {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config: CompilerConfig =
            serde_yaml::from_str(yaml).context("Failed to parse compiler config YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_yaml(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read compiler config from {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid compiler config in {}", path.display()))
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.weights.validate()?;
        for (name, value) in [
            ("alternate_chart_decay", self.alternate_chart_decay),
            ("ambiguous_source_factor", self.ambiguous_source_factor),
            ("fuzzy_threshold", self.fuzzy_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{} = {} is outside [0, 1]", name, value);
            }
        }
        Ok(())
    }
}
