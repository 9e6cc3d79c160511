//! Chart specification types.
//!
//! `ChartSpecification` is the only artifact returned to callers. It is
//! built once by the builder, stamped with confidence and alternatives by
//! the confidence engine, and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::chart::ChartType;
use crate::error::CompileErrorKind;
use crate::intent::Intent;
use crate::lexicon::DateRange;

/// Filter key for the row limit.
pub const FILTER_LIMIT: &str = "limit";

/// Filter key for the time window.
pub const FILTER_DATE_RANGE: &str = "date_range";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Sort field and direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ordering {
    pub field: String,
    pub direction: SortDirection,
}

impl Ordering {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Value of one filter entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Limit(u32),
    DateRange(DateRange),
}

impl FilterValue {
    pub fn as_limit(&self) -> Option<u32> {
        match self {
            FilterValue::Limit(n) => Some(*n),
            FilterValue::DateRange(_) => None,
        }
    }

    pub fn as_date_range(&self) -> Option<&DateRange> {
        match self {
            FilterValue::DateRange(range) => Some(range),
            FilterValue::Limit(_) => None,
        }
    }
}

/// A lower-ranked interpretation offered next to the primary one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub chart_type: ChartType,
    pub data_source: String,
    pub confidence: f64,
}

/// Final compiler output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpecification {
    pub intent: Intent,
    pub chart_type: ChartType,
    pub data_source: String,

    /// Never empty; every entry belongs to `data_source`.
    pub metrics: Vec<String>,
    pub dimensions: Vec<String>,

    pub filters: BTreeMap<String, FilterValue>,
    pub ordering: Ordering,

    /// Overall confidence in [0, 1].
    pub confidence: f64,

    /// Sorted by confidence, highest first.
    pub alternatives: Vec<Alternative>,

    pub generated_query: String,

    /// Non-fatal findings (e.g. an ambiguous intent tie).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<CompileErrorKind>,

    /// Hash of the catalog snapshot the spec was compiled against.
    pub catalog_version: String,
}

impl ChartSpecification {
    pub fn limit(&self) -> Option<u32> {
        self.filters.get(FILTER_LIMIT).and_then(FilterValue::as_limit)
    }

    pub fn date_range(&self) -> Option<&DateRange> {
        self.filters
            .get(FILTER_DATE_RANGE)
            .and_then(FilterValue::as_date_range)
    }

    pub fn primary_metric(&self) -> Option<&str> {
        self.metrics.first().map(String::as_str)
    }
}
