//! ChartCompiler - the prompt → specification pipeline.
//!
//! ```text
//! extract ─▶ fuzzy pass ─▶ classify ─▶ select chart ─┐
//!                                   └▶ resolve source ─┴▶ build ─▶ score
//! ```
//!
//! Each stage is a pure function of its inputs plus the catalog snapshot, so
//! the compiler holds no per-request state and can be shared across threads.

use serde::Serialize;

use crate::catalog::CatalogSnapshot;
use crate::chart::{select_chart, ChartSelection};
use crate::confidence::{ConfidenceEngine, ScoringInputs};
use crate::config::CompilerConfig;
use crate::error::{CompileError, CompileErrorKind};
use crate::intent::{IntentClassifier, IntentResult};
use crate::lexicon::{EntityExtractor, EntitySet};
use crate::resolver::{DataSourceResolver, FuzzyMatch, Resolution};
use crate::spec::{ChartSpecification, SpecificationBuilder};

/// Intermediate results of one compilation, for debugging and explanation.
#[derive(Debug, Clone, Serialize)]
pub struct CompileTrace {
    pub entities: EntitySet,
    pub fuzzy_matches: Vec<FuzzyMatch>,
    pub intent: IntentResult,
    pub selection: ChartSelection,
    pub resolution: Resolution,
    pub specification: ChartSpecification,
}

/// Deterministic prompt-to-chart-specification compiler.
#[derive(Debug, Clone)]
pub struct ChartCompiler {
    config: CompilerConfig,
    classifier: IntentClassifier,
    confidence: ConfidenceEngine,
}

impl ChartCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            classifier: IntentClassifier::new(config.weights.clone()),
            confidence: ConfidenceEngine::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile a prompt against a catalog snapshot.
    pub fn compile(
        &self,
        prompt: &str,
        catalog: &CatalogSnapshot,
    ) -> Result<ChartSpecification, CompileError> {
        self.compile_traced(prompt, catalog)
            .map(|trace| trace.specification)
    }

    /// Compile and keep every intermediate result.
    pub fn compile_traced(
        &self,
        prompt: &str,
        catalog: &CatalogSnapshot,
    ) -> Result<CompileTrace, CompileError> {
        let span = tracing::debug_span!(
            "compile",
            catalog_version = %catalog.version,
            weights = %self.config.weights.version
        );
        let _enter = span.enter();

        let mut entities = EntityExtractor::new(catalog).extract(prompt)?;
        tracing::debug!(
            categories = entities.entries().len(),
            unresolved = entities.unresolved().len(),
            "extracted entities"
        );

        let resolver = DataSourceResolver::new(catalog, self.config.fuzzy_threshold);
        let fuzzy_matches = resolver.fuzzy_pass(&mut entities);

        let intent = self.classifier.classify(&entities);
        tracing::debug!(
            intent = %intent.intent,
            confidence = intent.confidence,
            fallback = intent.fallback,
            tied = intent.tied_with.len(),
            "classified intent"
        );

        let selection = select_chart(intent.intent, entities.chart_hints());
        tracing::debug!(chart = %selection.primary, hint = ?selection.hint, "selected chart type");

        let mut resolution = resolver.resolve(&entities)?;

        let builder = SpecificationBuilder::new(catalog, self.config.reference_date);
        let (skipped, spec) =
            build_first_renderable(&builder, &intent, &selection, &resolution, &entities)?;
        if skipped > 0 {
            tracing::debug!(
                skipped,
                source = %spec.data_source,
                "fell back to a lower-ranked source"
            );
            resolution.skip_leading(skipped);
        }

        let mut specification = self.confidence.finalize(
            spec,
            &ScoringInputs {
                entities: &entities,
                intent: &intent,
                selection: &selection,
                resolution: &resolution,
                builder: &builder,
            },
        );

        if intent.is_ambiguous() {
            let candidates = std::iter::once(intent.intent)
                .chain(intent.tied_with.iter().copied())
                .map(|i| i.to_string())
                .collect();
            specification.warnings.push(CompileErrorKind::AmbiguousIntent {
                candidates,
                margin: self.config.weights.tie_margin,
            });
        }

        tracing::debug!(
            source = %specification.data_source,
            confidence = specification.confidence,
            alternatives = specification.alternatives.len(),
            "compiled specification"
        );

        Ok(CompileTrace {
            entities,
            fuzzy_matches,
            intent,
            selection,
            resolution,
            specification,
        })
    }
}

/// Build against the ranked sources in order and keep the first that renders
/// (a Trend needs a temporal dimension the top source may lack). Returns how
/// many candidates were passed over. Fails with the top source's error when
/// none renders.
fn build_first_renderable(
    builder: &SpecificationBuilder<'_>,
    intent: &IntentResult,
    selection: &ChartSelection,
    resolution: &Resolution,
    entities: &EntitySet,
) -> Result<(usize, ChartSpecification), CompileError> {
    let mut first_error: Option<CompileError> = None;

    for (pos, candidate) in resolution.candidates().iter().enumerate() {
        match builder.build(intent.intent, selection.primary, candidate, entities) {
            Ok(spec) => return Ok((pos, spec)),
            Err(e) => {
                tracing::debug!(source = %candidate.name, error = %e, "source not renderable");
                first_error.get_or_insert(e);
            }
        }
    }

    Err(first_error.unwrap_or_else(|| {
        CompileError::unrenderable(&resolution.winner().name, "no renderable source")
    }))
}

impl Default for ChartCompiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}
