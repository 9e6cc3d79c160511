//! Specification Builder
//!
//! Combines intent, chart type, a resolved source candidate and the entity
//! set into a [`ChartSpecification`] and renders its query. Confidence and
//! alternatives are left empty here; the confidence engine stamps them.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::query::QueryTemplate;
use super::types::{
    ChartSpecification, FilterValue, Ordering, SortDirection, FILTER_DATE_RANGE, FILTER_LIMIT,
};
use crate::catalog::{CatalogSnapshot, DataSourceDef};
use crate::chart::ChartType;
use crate::error::CompileError;
use crate::intent::Intent;
use crate::lexicon::EntitySet;
use crate::resolver::SourceCandidate;

pub struct SpecificationBuilder<'c> {
    catalog: &'c CatalogSnapshot,
    reference_date: Option<NaiveDate>,
}

impl<'c> SpecificationBuilder<'c> {
    pub fn new(catalog: &'c CatalogSnapshot, reference_date: Option<NaiveDate>) -> Self {
        Self {
            catalog,
            reference_date,
        }
    }

    /// Build a specification for one (intent, chart type, source) choice.
    pub fn build(
        &self,
        intent: Intent,
        chart_type: ChartType,
        candidate: &SourceCandidate,
        entities: &EntitySet,
    ) -> Result<ChartSpecification, CompileError> {
        let source = self
            .catalog
            .source_at(candidate.index)
            .filter(|s| s.name == candidate.name)
            .ok_or_else(|| {
                CompileError::unrenderable(&candidate.name, "source is not in the catalog")
            })?;

        let metrics: Vec<String> = candidate
            .metrics
            .iter()
            .filter(|m| source.has_metric(m))
            .cloned()
            .collect();
        let primary_metric = metrics
            .first()
            .cloned()
            .ok_or_else(|| CompileError::unrenderable(&source.name, "no metrics"))?;

        let dimensions = select_dimensions(intent, source, candidate)?;

        let ordering = match intent {
            Intent::Ranking => Ordering::new(
                primary_metric,
                entities
                    .ranking_direction()
                    .unwrap_or(SortDirection::Descending),
            ),
            Intent::Trend => Ordering::new(dimensions[0].clone(), SortDirection::Ascending),
            Intent::Distribution | Intent::Summary => {
                Ordering::new(primary_metric, SortDirection::Descending)
            }
            Intent::Comparison | Intent::Correlation => {
                Ordering::new(dimensions[0].clone(), SortDirection::Ascending)
            }
        };

        let mut filters = BTreeMap::new();
        if intent == Intent::Ranking {
            if let Some(n) = entities.limit() {
                filters.insert(FILTER_LIMIT.to_string(), FilterValue::Limit(n));
            }
        }
        let date_range = entities
            .date_range(self.reference_date)
            .filter(|_| source.time_dimension().is_some());
        if let Some(range) = date_range {
            filters.insert(FILTER_DATE_RANGE.to_string(), FilterValue::DateRange(range));
        }

        let generated_query = QueryTemplate {
            source,
            metrics: &metrics,
            dimensions: &dimensions,
            ordering: &ordering,
            date_range: date_range.as_ref(),
            limit: filters.get(FILTER_LIMIT).and_then(FilterValue::as_limit),
            granularity: entities.granularity().unwrap_or(source.default_granularity),
        }
        .render()?;

        Ok(ChartSpecification {
            intent,
            chart_type,
            data_source: source.name.clone(),
            metrics,
            dimensions,
            filters,
            ordering,
            confidence: 0.0,
            alternatives: Vec::new(),
            generated_query,
            warnings: Vec::new(),
            catalog_version: self.catalog.hash.clone(),
        })
    }
}

/// Grouping dimensions for an intent. Never returns an empty list.
fn select_dimensions(
    intent: Intent,
    source: &DataSourceDef,
    candidate: &SourceCandidate,
) -> Result<Vec<String>, CompileError> {
    let requested: Vec<String> = candidate
        .dimensions
        .iter()
        .filter(|d| source.has_dimension(d))
        .cloned()
        .collect();

    if intent == Intent::Trend {
        let time = source.time_dimension().ok_or_else(|| {
            CompileError::unrenderable(&source.name, "trend needs a temporal dimension")
        })?;
        let mut dimensions = vec![time.name.clone()];
        dimensions.extend(requested.into_iter().filter(|d| *d != time.name));
        return Ok(dimensions);
    }

    if !requested.is_empty() {
        return Ok(requested);
    }

    source
        .default_dimension()
        .or_else(|| source.time_dimension())
        .map(|d| vec![d.name.clone()])
        .ok_or_else(|| CompileError::unrenderable(&source.name, "no dimensions"))
}
