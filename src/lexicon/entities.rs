//! EntitySet - categorized surface matches for one prompt.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::temporal::{DateRange, TemporalExpr};
use crate::catalog::{Granularity, TermKind, TermRef};
use crate::chart::ChartType;
use crate::spec::SortDirection;

/// Entity categories, in the order they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Number,
    ChartTypeHint,
    Metric,
    Dimension,
    Temporal,
    RankingTerm,
    ComparisonTerm,
    TrendTerm,
    DistributionTerm,
    CorrelationTerm,
    SummaryTerm,
    Keyword,
    Unresolved,
}

impl EntityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityCategory::Number => "number",
            EntityCategory::ChartTypeHint => "chart_type_hint",
            EntityCategory::Metric => "metric",
            EntityCategory::Dimension => "dimension",
            EntityCategory::Temporal => "temporal",
            EntityCategory::RankingTerm => "ranking_term",
            EntityCategory::ComparisonTerm => "comparison_term",
            EntityCategory::TrendTerm => "trend_term",
            EntityCategory::DistributionTerm => "distribution_term",
            EntityCategory::CorrelationTerm => "correlation_term",
            EntityCategory::SummaryTerm => "summary_term",
            EntityCategory::Keyword => "keyword",
            EntityCategory::Unresolved => "unresolved",
        }
    }
}

/// A prompt phrase matched against the catalog term index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogMatch {
    /// Words as they appeared in the prompt.
    pub surface: String,
    /// Normalized term key that matched.
    pub key: String,
    /// Every catalog entry the key denotes.
    pub refs: Vec<TermRef>,
    /// Adopted by the resolver's fuzzy pass rather than matched exactly.
    pub fuzzy: bool,
}

impl CatalogMatch {
    fn has_kind(&self, kind: TermKind) -> bool {
        self.refs.iter().any(|r| r.kind == kind)
    }

    /// Canonical names of the given kind, deduplicated, in reference order.
    pub fn canonical_names(&self, kind: TermKind) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for r in self.refs.iter().filter(|r| r.kind == kind) {
            if !names.contains(&r.canonical.as_str()) {
                names.push(&r.canonical);
            }
        }
        names
    }
}

/// Immutable result of entity extraction.
///
/// `entries` holds the surface strings per category in prompt order; the
/// typed fields carry the structured values later stages need.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySet {
    pub(crate) entries: BTreeMap<EntityCategory, Vec<String>>,
    pub(crate) terms: Vec<CatalogMatch>,
    pub(crate) temporal: Vec<TemporalExpr>,
    pub(crate) chart_hints: Vec<ChartType>,
    pub(crate) numbers: Vec<i64>,
    pub(crate) limit: Option<u32>,
    pub(crate) ranking_direction: Option<SortDirection>,
    pub(crate) unresolved: Vec<String>,
}

impl EntitySet {
    pub(crate) fn push(&mut self, category: EntityCategory, surface: impl Into<String>) {
        self.entries.entry(category).or_default().push(surface.into());
    }

    /// Surface strings recorded for a category.
    pub fn get(&self, category: EntityCategory) -> &[String] {
        self.entries
            .get(&category)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn has(&self, category: EntityCategory) -> bool {
        !self.get(category).is_empty()
    }

    /// All non-empty categories.
    pub fn entries(&self) -> &BTreeMap<EntityCategory, Vec<String>> {
        &self.entries
    }

    pub fn catalog_matches(&self) -> &[CatalogMatch] {
        &self.terms
    }

    pub fn temporal(&self) -> &[TemporalExpr] {
        &self.temporal
    }

    pub fn chart_hints(&self) -> &[ChartType] {
        &self.chart_hints
    }

    pub fn numbers(&self) -> &[i64] {
        &self.numbers
    }

    /// Number adjacent to a ranking or limit word.
    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    pub fn ranking_direction(&self) -> Option<SortDirection> {
        self.ranking_direction
    }

    /// Content words that matched nothing.
    pub fn unresolved(&self) -> &[String] {
        &self.unresolved
    }

    /// Distinct canonical metric names, in prompt order.
    pub fn metric_names(&self) -> Vec<&str> {
        self.canonical_names(TermKind::Metric)
    }

    /// Distinct canonical dimension names, in prompt order.
    pub fn dimension_names(&self) -> Vec<&str> {
        self.canonical_names(TermKind::Dimension)
    }

    /// Source names pointed at by keywords.
    pub fn keyword_sources(&self) -> Vec<&str> {
        self.canonical_names(TermKind::Keyword)
    }

    fn canonical_names(&self, kind: TermKind) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for term in self.terms.iter().filter(|t| t.has_kind(kind)) {
            for name in term.canonical_names(kind) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    pub fn has_temporal(&self) -> bool {
        !self.temporal.is_empty()
    }

    /// Whether any temporal expression asks for a series.
    pub fn has_series_temporal(&self) -> bool {
        self.temporal.iter().any(TemporalExpr::implies_series)
    }

    /// Bucket size requested by the prompt, if any.
    pub fn granularity(&self) -> Option<Granularity> {
        self.temporal.iter().find_map(TemporalExpr::granularity)
    }

    /// First temporal expression that resolves to a concrete window.
    pub fn date_range(&self, reference: Option<NaiveDate>) -> Option<DateRange> {
        self.temporal.iter().find_map(|t| t.resolve(reference))
    }

    /// Adopt a fuzzy catalog match for an unresolved word.
    pub(crate) fn adopt_fuzzy(&mut self, word: &str, key: &str, refs: Vec<TermRef>) {
        self.unresolved.retain(|u| u != word);
        if let Some(list) = self.entries.get_mut(&EntityCategory::Unresolved) {
            list.retain(|u| u != word);
            if list.is_empty() {
                self.entries.remove(&EntityCategory::Unresolved);
            }
        }

        let term = CatalogMatch {
            surface: word.to_string(),
            key: key.to_string(),
            refs,
            fuzzy: true,
        };
        for (kind, category) in [
            (TermKind::Metric, EntityCategory::Metric),
            (TermKind::Dimension, EntityCategory::Dimension),
            (TermKind::Keyword, EntityCategory::Keyword),
        ] {
            if term.has_kind(kind) {
                self.push(category, word);
            }
        }
        self.terms.push(term);
    }
}
