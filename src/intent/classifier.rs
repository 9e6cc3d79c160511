//! Intent Classifier
//!
//! Scores every intent against an [`EntitySet`] with the weighted rule set in
//! [`ScoringWeights`] and picks a winner:
//!
//! 1. (a) category vocabulary fires for an intent
//! 2. (b) chart-hint and (c) completeness bonuses, only for intents whose
//!    vocabulary fired
//! 3. scores clipped to [0, 1]
//! 4. tie-break within `tie_margin`: chart-hint family match, then fixed
//!    priority order
//! 5. nothing fired: Summary at `fallback_confidence`

use super::types::{Evidence, Intent, IntentResult, IntentScore, Signal};
use super::weights::ScoringWeights;
use crate::chart::chart_family;
use crate::lexicon::{EntityCategory, EntitySet};

/// Scores are compared with this slack so that 0.55 - 0.5 counts as 0.05.
const SCORE_EPSILON: f64 = 1e-9;

/// Deterministic, rule-based intent classifier.
#[derive(Debug, Clone, Default)]
pub struct IntentClassifier {
    weights: ScoringWeights,
}

impl IntentClassifier {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Classify an entity set. Never fails.
    pub fn classify(&self, entities: &EntitySet) -> IntentResult {
        let mut scores: Vec<IntentScore> = Intent::ALL
            .iter()
            .map(|&intent| self.score(intent, entities))
            .filter(|s| s.score > 0.0)
            .collect();

        if scores.is_empty() {
            let evidence = vec![Evidence {
                signal: Signal::Fallback,
                weight: self.weights.fallback_confidence,
                terms: Vec::new(),
            }];
            let confidence = round3(self.weights.fallback_confidence);
            return IntentResult {
                intent: Intent::Summary,
                confidence,
                evidence: evidence.clone(),
                ranked: vec![IntentScore {
                    intent: Intent::Summary,
                    score: confidence,
                    evidence,
                }],
                tied_with: Vec::new(),
                fallback: true,
            };
        }

        scores.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.intent.priority().cmp(&b.intent.priority()))
        });

        let best = scores[0].score;
        let group: Vec<Intent> = scores
            .iter()
            .filter(|s| s.score >= best - self.weights.tie_margin - SCORE_EPSILON)
            .map(|s| s.intent)
            .collect();
        let winner = self.break_tie(&group, entities);

        if let Some(pos) = scores.iter().position(|s| s.intent == winner) {
            let head = scores.remove(pos);
            scores.insert(0, head);
        }

        let head = &scores[0];
        IntentResult {
            intent: head.intent,
            confidence: head.score,
            evidence: head.evidence.clone(),
            tied_with: group.into_iter().filter(|i| *i != winner).collect(),
            ranked: scores,
            fallback: false,
        }
    }

    /// Prefer an intent whose chart family contains an explicit hint, then
    /// the fixed priority order.
    fn break_tie(&self, group: &[Intent], entities: &EntitySet) -> Intent {
        let hinted = |intent: &Intent| {
            entities
                .chart_hints()
                .iter()
                .any(|hint| chart_family(*intent).contains(hint))
        };

        let mut candidates: Vec<Intent> = group.iter().copied().filter(hinted).collect();
        if candidates.is_empty() {
            candidates = group.to_vec();
        }
        candidates
            .into_iter()
            .min_by_key(Intent::priority)
            .unwrap_or(Intent::Summary)
    }

    fn score(&self, intent: Intent, entities: &EntitySet) -> IntentScore {
        let mut evidence = self.vocabulary_evidence(intent, entities);

        if !evidence.is_empty() {
            let hints: Vec<String> = entities
                .get(EntityCategory::ChartTypeHint)
                .iter()
                .zip(entities.chart_hints())
                .filter(|(_, chart)| chart_family(intent).contains(chart))
                .map(|(surface, _)| surface.clone())
                .collect();
            if !hints.is_empty() {
                evidence.push(Evidence {
                    signal: Signal::ChartHint,
                    weight: self.weights.chart_hint_bonus,
                    terms: hints,
                });
            }

            if entities.has(EntityCategory::Metric) && entities.has(EntityCategory::Dimension) {
                let terms = entities
                    .get(EntityCategory::Metric)
                    .iter()
                    .chain(entities.get(EntityCategory::Dimension))
                    .cloned()
                    .collect();
                evidence.push(Evidence {
                    signal: Signal::Completeness,
                    weight: self.weights.completeness_bonus,
                    terms,
                });
            }
        }

        let total: f64 = evidence.iter().map(|e| e.weight).sum();
        IntentScore {
            intent,
            score: round3(total.clamp(0.0, 1.0)),
            evidence,
        }
    }

    /// Signal (a): the category-defining vocabulary for one intent.
    fn vocabulary_evidence(&self, intent: Intent, entities: &EntitySet) -> Vec<Evidence> {
        let w = &self.weights;
        let mut evidence = Vec::new();
        let mut fire = |signal: Signal, weight: f64, terms: Vec<String>| {
            if weight > 0.0 {
                evidence.push(Evidence {
                    signal,
                    weight,
                    terms,
                });
            }
        };
        let terms = |category: EntityCategory| entities.get(category).to_vec();

        match intent {
            Intent::Ranking => {
                if entities.has(EntityCategory::RankingTerm) {
                    fire(
                        Signal::Vocabulary,
                        w.ranking_vocabulary,
                        terms(EntityCategory::RankingTerm),
                    );
                }
            }
            Intent::Trend => {
                let trend_terms = terms(EntityCategory::TrendTerm);
                if !trend_terms.is_empty() && entities.has_temporal() {
                    let mut all = trend_terms;
                    all.extend(terms(EntityCategory::Temporal));
                    fire(Signal::Vocabulary, w.trend_vocabulary, all);
                } else if !trend_terms.is_empty() {
                    fire(Signal::PartialVocabulary, w.trend_partial, trend_terms);
                } else if entities.has_series_temporal() {
                    let series = entities
                        .temporal()
                        .iter()
                        .filter(|t| t.implies_series())
                        .map(|t| t.surface.clone())
                        .collect();
                    fire(Signal::PartialVocabulary, w.trend_partial, series);
                }
            }
            Intent::Comparison => {
                if entities.has(EntityCategory::ComparisonTerm) {
                    fire(
                        Signal::Vocabulary,
                        w.comparison_vocabulary,
                        terms(EntityCategory::ComparisonTerm),
                    );
                }
            }
            Intent::Distribution => {
                if entities.has(EntityCategory::DistributionTerm) {
                    fire(
                        Signal::Vocabulary,
                        w.distribution_vocabulary,
                        terms(EntityCategory::DistributionTerm),
                    );
                }
            }
            Intent::Correlation => {
                if entities.metric_names().len() >= 2
                    && !entities.has(EntityCategory::RankingTerm)
                    && !entities.has_temporal()
                {
                    fire(
                        Signal::Vocabulary,
                        w.correlation_metrics,
                        terms(EntityCategory::Metric),
                    );
                }
                if entities.has(EntityCategory::CorrelationTerm) {
                    fire(
                        Signal::Vocabulary,
                        w.correlation_vocabulary,
                        terms(EntityCategory::CorrelationTerm),
                    );
                }
            }
            Intent::Summary => {
                if entities.has(EntityCategory::SummaryTerm) {
                    fire(
                        Signal::Vocabulary,
                        w.summary_vocabulary,
                        terms(EntityCategory::SummaryTerm),
                    );
                }
            }
        }

        evidence
    }
}

pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
