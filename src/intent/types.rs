//! Intent types.

use serde::{Deserialize, Serialize};

/// The user's high-level visualization goal.
///
/// Declaration order is the tie-break priority (Ranking first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Ranking,
    Trend,
    Comparison,
    Distribution,
    Correlation,
    Summary,
}

impl Intent {
    /// All intents in tie-break priority order.
    pub const ALL: [Intent; 6] = [
        Intent::Ranking,
        Intent::Trend,
        Intent::Comparison,
        Intent::Distribution,
        Intent::Correlation,
        Intent::Summary,
    ];

    /// Lower is preferred on ties.
    pub fn priority(&self) -> usize {
        match self {
            Intent::Ranking => 0,
            Intent::Trend => 1,
            Intent::Comparison => 2,
            Intent::Distribution => 3,
            Intent::Correlation => 4,
            Intent::Summary => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Ranking => "ranking",
            Intent::Trend => "trend",
            Intent::Comparison => "comparison",
            Intent::Distribution => "distribution",
            Intent::Correlation => "correlation",
            Intent::Summary => "summary",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which scoring rule contributed a weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Category-defining vocabulary (or metric shape for correlation).
    Vocabulary,
    /// Only half the trend evidence (trend term or time axis alone).
    PartialVocabulary,
    /// Explicit chart-type hint consistent with the intent.
    ChartHint,
    /// At least one metric and one dimension resolved.
    Completeness,
    /// Nothing fired; lowest-confidence Summary.
    Fallback,
}

/// One triggered rule and the prompt terms that triggered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub signal: Signal,
    pub weight: f64,
    pub terms: Vec<String>,
}

/// Score of one intent with the evidence behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentScore {
    pub intent: Intent,
    /// Sum of triggered weights, clipped to [0, 1].
    pub score: f64,
    pub evidence: Vec<Evidence>,
}

/// Outcome of classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentResult {
    pub intent: Intent,
    pub confidence: f64,
    pub evidence: Vec<Evidence>,

    /// Every intent with a non-zero score, best first (tie-break applied to
    /// the head only).
    pub ranked: Vec<IntentScore>,

    /// Intents that scored within the tie margin of the winner.
    pub tied_with: Vec<Intent>,

    /// True when no rule fired and Summary was chosen by default.
    pub fallback: bool,
}

impl IntentResult {
    /// The best-scoring intent other than the chosen one.
    pub fn runner_up(&self) -> Option<&IntentScore> {
        self.ranked
            .iter()
            .find(|s| s.intent != self.intent && s.score > 0.0)
    }

    pub fn is_ambiguous(&self) -> bool {
        !self.tied_with.is_empty()
    }
}
