//! Data-Source Resolver
//!
//! Picks the catalog source covering the most requested metrics and
//! dimensions. Two passes:
//!
//! 1. fuzzy: unresolved prompt words are compared (Jaro-Winkler) against the
//!    catalog term keys and adopted above a threshold
//! 2. scoring: per-source hit counts, ties broken by declaration order
//!
//! A source must provide at least one requested metric. When none does the
//! resolver fails with `NoMatchingSource` instead of guessing.

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogSnapshot, DataSourceDef};
use crate::error::CompileError;
use crate::lexicon::{term_key, EntitySet};

/// Shortest unresolved word worth a fuzzy lookup.
const MIN_FUZZY_LEN: usize = 4;

/// One source's coverage of the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCandidate {
    /// Declaration index in the catalog.
    pub index: usize,
    pub name: String,
    pub score: usize,
    /// Requested metrics the source provides, in prompt order.
    pub metrics: Vec<String>,
    /// Requested dimensions the source provides, in prompt order.
    pub dimensions: Vec<String>,
}

/// An unresolved word adopted by the fuzzy pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyMatch {
    pub word: String,
    pub key: String,
    pub similarity: f64,
}

/// Ranked candidates, best first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    candidates: Vec<SourceCandidate>,
    /// The winner shares its score with the runner-up.
    pub ambiguous: bool,
}

impl Resolution {
    pub fn winner(&self) -> &SourceCandidate {
        // Non-empty by construction.
        &self.candidates[0]
    }

    pub fn runner_up(&self) -> Option<&SourceCandidate> {
        self.candidates.get(1)
    }

    pub fn candidates(&self) -> &[SourceCandidate] {
        &self.candidates
    }

    /// Drop the `n` best candidates after they failed to build. At least one
    /// candidate always remains.
    pub(crate) fn skip_leading(&mut self, n: usize) {
        let n = n.min(self.candidates.len().saturating_sub(1));
        if n == 0 {
            return;
        }
        self.candidates.drain(..n);
        self.ambiguous = self
            .candidates
            .get(1)
            .is_some_and(|second| second.score == self.candidates[0].score);
    }
}

pub struct DataSourceResolver<'c> {
    catalog: &'c CatalogSnapshot,
    fuzzy_threshold: f64,
}

impl<'c> DataSourceResolver<'c> {
    pub fn new(catalog: &'c CatalogSnapshot, fuzzy_threshold: f64) -> Self {
        Self {
            catalog,
            fuzzy_threshold,
        }
    }

    /// Adopt catalog terms for unresolved words that are close misspellings.
    pub fn fuzzy_pass(&self, entities: &mut EntitySet) -> Vec<FuzzyMatch> {
        let mut adopted = Vec::new();

        let words: Vec<String> = entities.unresolved().to_vec();
        for word in words {
            if word.chars().count() < MIN_FUZZY_LEN {
                continue;
            }
            let probe = term_key(&word);

            let mut best: Option<(&str, f64)> = None;
            for (key, _) in self.catalog.terms() {
                let similarity = strsim::jaro_winkler(&probe, key);
                if similarity >= self.fuzzy_threshold
                    && best.map_or(true, |(_, s)| similarity > s)
                {
                    best = Some((key, similarity));
                }
            }

            let Some((key, similarity)) = best else {
                continue;
            };
            let Some(refs) = self.catalog.lookup_term(key) else {
                continue;
            };

            tracing::debug!(word = %word, key, similarity, "fuzzy catalog match");
            entities.adopt_fuzzy(&word, key, refs.to_vec());
            adopted.push(FuzzyMatch {
                word,
                key: key.to_string(),
                similarity,
            });
        }

        adopted
    }

    /// Rank sources for the requested metrics and dimensions.
    pub fn resolve(&self, entities: &EntitySet) -> Result<Resolution, CompileError> {
        let metrics = entities.metric_names();
        let dimensions = entities.dimension_names();
        let keyword_sources = entities.keyword_sources();
        let temporal = entities.has_temporal();

        let mut candidates: Vec<SourceCandidate> = self
            .catalog
            .sources()
            .iter()
            .enumerate()
            .filter_map(|(index, source)| {
                score_source(index, source, &metrics, &dimensions, &keyword_sources, temporal)
            })
            .collect();

        if candidates.is_empty() {
            return Err(CompileError::no_matching_source(
                &self.catalog.version,
                entities.unresolved().to_vec(),
            ));
        }

        // Stable: equal scores keep declaration order.
        candidates.sort_by(|a, b| b.score.cmp(&a.score));

        let ambiguous = candidates
            .get(1)
            .is_some_and(|second| second.score == candidates[0].score);

        tracing::debug!(
            source = %candidates[0].name,
            score = candidates[0].score,
            candidates = candidates.len(),
            ambiguous,
            "resolved data source"
        );

        Ok(Resolution {
            candidates,
            ambiguous,
        })
    }
}

fn score_source(
    index: usize,
    source: &DataSourceDef,
    metrics: &[&str],
    dimensions: &[&str],
    keyword_sources: &[&str],
    temporal: bool,
) -> Option<SourceCandidate> {
    let metric_hits: Vec<String> = metrics
        .iter()
        .filter(|m| source.has_metric(m))
        .map(|m| m.to_string())
        .collect();
    if metric_hits.is_empty() {
        return None;
    }

    let dimension_hits: Vec<String> = dimensions
        .iter()
        .filter(|d| source.has_dimension(d))
        .map(|d| d.to_string())
        .collect();

    let keyword_hits = usize::from(keyword_sources.contains(&source.name.as_str()));
    let time_hit = usize::from(temporal && source.time_dimension().is_some());

    Some(SourceCandidate {
        index,
        name: source.name.clone(),
        score: metric_hits.len() + dimension_hits.len() + keyword_hits + time_hit,
        metrics: metric_hits,
        dimensions: dimension_hits,
    })
}
