//! Scoring weight table for the intent classifier.
//!
//! The table is data, not code: it is versioned, loadable from YAML and
//! replaceable between compiler instantiations (an offline feedback process
//! may publish a tuned table). The classifier never mutates it.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default table shipped with the crate.
const DEFAULT_WEIGHTS: &str = include_str!("../../config/weights.yaml");

/// Weighted rule set for intent scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub version: String,

    pub ranking_vocabulary: f64,
    /// Temporal entity and trend term together.
    pub trend_vocabulary: f64,
    /// Only one of the two trend signals.
    pub trend_partial: f64,
    pub comparison_vocabulary: f64,
    pub distribution_vocabulary: f64,
    /// Two or more metrics, no ranking or temporal cue.
    pub correlation_metrics: f64,
    pub correlation_vocabulary: f64,
    pub summary_vocabulary: f64,

    pub chart_hint_bonus: f64,
    pub completeness_bonus: f64,

    /// Confidence of the Summary default when nothing fires.
    pub fallback_confidence: f64,
    /// Scores closer than this are a tie.
    pub tie_margin: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            version: "2024.1".to_string(),
            ranking_vocabulary: 0.5,
            trend_vocabulary: 0.5,
            trend_partial: 0.25,
            comparison_vocabulary: 0.5,
            distribution_vocabulary: 0.5,
            correlation_metrics: 0.4,
            correlation_vocabulary: 0.5,
            summary_vocabulary: 0.5,
            chart_hint_bonus: 0.2,
            completeness_bonus: 0.1,
            fallback_confidence: 0.3,
            tie_margin: 0.05,
        }
    }
}

impl ScoringWeights {
    /// The table bundled in `config/weights.yaml`.
    pub fn builtin() -> anyhow::Result<Self> {
        Self::from_yaml_str(DEFAULT_WEIGHTS)
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let weights: ScoringWeights =
            serde_yaml::from_str(yaml).context("Failed to parse weight table YAML")?;
        weights.validate()?;
        Ok(weights)
    }

    pub fn load_yaml(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read weight table from {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid weight table in {}", path.display()))
    }

    /// Every weight in [0, 1] and the tie margin below 1.
    pub fn validate(&self) -> anyhow::Result<()> {
        let named = [
            ("ranking_vocabulary", self.ranking_vocabulary),
            ("trend_vocabulary", self.trend_vocabulary),
            ("trend_partial", self.trend_partial),
            ("comparison_vocabulary", self.comparison_vocabulary),
            ("distribution_vocabulary", self.distribution_vocabulary),
            ("correlation_metrics", self.correlation_metrics),
            ("correlation_vocabulary", self.correlation_vocabulary),
            ("summary_vocabulary", self.summary_vocabulary),
            ("chart_hint_bonus", self.chart_hint_bonus),
            ("completeness_bonus", self.completeness_bonus),
            ("fallback_confidence", self.fallback_confidence),
            ("tie_margin", self.tie_margin),
        ];
        for (name, value) in named {
            if !(0.0..=1.0).contains(&value) {
                bail!(
                    "Weight '{}' = {} is outside [0, 1] (table {})",
                    name,
                    value,
                    self.version
                );
            }
        }
        if self.tie_margin >= 1.0 {
            bail!("tie_margin must be below 1 (table {})", self.version);
        }
        Ok(())
    }
}
