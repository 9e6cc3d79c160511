//! Confidence & Alternatives Engine
//!
//! Overall confidence is the classifier's confidence times a source-match
//! factor (1.0 for a clear winner, `ambiguous_source_factor` for a tie broken
//! by declaration order).
//!
//! Alternatives come from re-running selection/build with one input swapped:
//!
//! | candidate                      | score                                         |
//! |--------------------------------|-----------------------------------------------|
//! | chart alternate `k` (0-based)  | overall × decay^(k+1)                         |
//! | next-best intent               | its score × factor                            |
//! | next-best source               | confidence × factor × runner score / winner   |
//!
//! Failed builds are dropped, the primary pair is excluded, duplicates keep
//! the higher score, then a stable sort and truncation.
//!
//! A demoted explicit hint always ranks first: its score is lifted to the
//! best competing score and it wins the tie.

use crate::chart::{select_chart, ChartSelection, ChartType, HintOutcome};
use crate::config::CompilerConfig;
use crate::intent::{round3, IntentResult};
use crate::lexicon::EntitySet;
use crate::resolver::Resolution;
use crate::spec::{Alternative, ChartSpecification, SpecificationBuilder};

/// Everything the engine needs to re-run the later stages.
pub struct ScoringInputs<'a> {
    pub entities: &'a EntitySet,
    pub intent: &'a IntentResult,
    pub selection: &'a ChartSelection,
    pub resolution: &'a Resolution,
    pub builder: &'a SpecificationBuilder<'a>,
}

#[derive(Debug, Clone)]
pub struct ConfidenceEngine {
    max_alternatives: usize,
    alternate_chart_decay: f64,
    ambiguous_source_factor: f64,
}

impl ConfidenceEngine {
    pub fn new(config: &CompilerConfig) -> Self {
        Self {
            max_alternatives: config.max_alternatives,
            alternate_chart_decay: config.alternate_chart_decay,
            ambiguous_source_factor: config.ambiguous_source_factor,
        }
    }

    pub fn source_factor(&self, resolution: &Resolution) -> f64 {
        if resolution.ambiguous {
            self.ambiguous_source_factor
        } else {
            1.0
        }
    }

    /// Overall confidence in [0, 1].
    pub fn overall(&self, intent: &IntentResult, resolution: &Resolution) -> f64 {
        round3((intent.confidence * self.source_factor(resolution)).clamp(0.0, 1.0))
    }

    /// Stamp confidence and alternatives onto a freshly built specification.
    pub fn finalize(
        &self,
        mut spec: ChartSpecification,
        inputs: &ScoringInputs<'_>,
    ) -> ChartSpecification {
        spec.confidence = self.overall(inputs.intent, inputs.resolution);
        spec.alternatives = self.alternatives(&spec, inputs);
        spec
    }

    /// Ranked alternative interpretations of the primary specification.
    pub fn alternatives(
        &self,
        primary: &ChartSpecification,
        inputs: &ScoringInputs<'_>,
    ) -> Vec<Alternative> {
        let factor = self.source_factor(inputs.resolution);
        let overall = self.overall(inputs.intent, inputs.resolution);
        let winner = inputs.resolution.winner();
        let mut pool = AlternativePool::new(primary.chart_type, &primary.data_source);

        // Other chart types on the primary source.
        let mut decay = 1.0;
        for (rank, &chart) in inputs.selection.alternates.iter().enumerate() {
            decay *= self.alternate_chart_decay;
            if rank == 0 && inputs.selection.hint == HintOutcome::Demoted {
                pool.pin(chart, &winner.name, overall * decay);
            } else {
                pool.offer(chart, &winner.name, overall * decay);
            }
        }

        // Next-best intent, primary source.
        if let Some(runner) = inputs.intent.runner_up() {
            let selection = select_chart(runner.intent, inputs.entities.chart_hints());
            match inputs
                .builder
                .build(runner.intent, selection.primary, winner, inputs.entities)
            {
                Ok(spec) => pool.offer(spec.chart_type, &spec.data_source, runner.score * factor),
                Err(e) => {
                    tracing::debug!(intent = %runner.intent, error = %e, "runner-up intent not buildable");
                }
            }
        }

        // Next-best source, primary intent and chart.
        if let Some(runner) = inputs.resolution.runner_up() {
            if winner.score > 0 {
                let ratio = runner.score as f64 / winner.score as f64;
                match inputs.builder.build(
                    inputs.intent.intent,
                    inputs.selection.primary,
                    runner,
                    inputs.entities,
                ) {
                    Ok(spec) => pool.offer(
                        spec.chart_type,
                        &spec.data_source,
                        inputs.intent.confidence * factor * ratio,
                    ),
                    Err(e) => {
                        tracing::debug!(source = %runner.name, error = %e, "runner-up source not buildable");
                    }
                }
            }
        }

        pool.into_ranked(self.max_alternatives)
    }
}

/// Deduplicating collector keyed by (chart type, source).
struct AlternativePool<'p> {
    primary: (ChartType, &'p str),
    entries: Vec<Alternative>,
    /// Candidate that must head the ranked list.
    pinned: Option<(ChartType, String)>,
}

impl<'p> AlternativePool<'p> {
    fn new(chart_type: ChartType, data_source: &'p str) -> Self {
        Self {
            primary: (chart_type, data_source),
            entries: Vec::new(),
            pinned: None,
        }
    }

    fn pin(&mut self, chart_type: ChartType, data_source: &str, confidence: f64) {
        self.offer(chart_type, data_source, confidence);
        self.pinned = Some((chart_type, data_source.to_string()));
    }

    fn offer(&mut self, chart_type: ChartType, data_source: &str, confidence: f64) {
        if (chart_type, data_source) == self.primary {
            return;
        }
        let confidence = round3(confidence.clamp(0.0, 1.0));

        match self
            .entries
            .iter_mut()
            .find(|a| a.chart_type == chart_type && a.data_source == data_source)
        {
            Some(existing) => existing.confidence = existing.confidence.max(confidence),
            None => self.entries.push(Alternative {
                chart_type,
                data_source: data_source.to_string(),
                confidence,
            }),
        }
    }

    fn into_ranked(mut self, cap: usize) -> Vec<Alternative> {
        if let Some((chart_type, data_source)) = self.pinned.take() {
            let top = self
                .entries
                .iter()
                .map(|a| a.confidence)
                .fold(0.0, f64::max);
            if let Some(pos) = self
                .entries
                .iter()
                .position(|a| a.chart_type == chart_type && a.data_source == data_source)
            {
                let mut head = self.entries.remove(pos);
                head.confidence = head.confidence.max(top);
                self.entries.insert(0, head);
            }
        }

        // sort_by is stable: equal scores keep insertion order.
        self.entries
            .sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        self.entries.truncate(cap);
        self.entries
    }
}
