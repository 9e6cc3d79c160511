//! Catalog configuration types.
//!
//! These mirror the YAML layout of `config/catalog.yaml` and are the
//! read-only vocabulary the compiler resolves prompts against.

use serde::{Deserialize, Serialize};

/// Aggregation applied to a metric in the generated query.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    #[default]
    Sum,
    Avg,
    Count,
    Min,
    Max,
}

impl Aggregation {
    /// SQL function name.
    pub fn sql_fn(&self) -> &'static str {
        match self {
            Aggregation::Sum => "SUM",
            Aggregation::Avg => "AVG",
            Aggregation::Count => "COUNT",
            Aggregation::Min => "MIN",
            Aggregation::Max => "MAX",
        }
    }
}

/// Time bucket size for temporal dimensions.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl Granularity {
    /// Unit name understood by `DATE_TRUNC`.
    pub fn sql_unit(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Quarter => "quarter",
            Granularity::Year => "year",
        }
    }

    /// Parse a granularity word ("monthly", "month", "months", ...).
    pub fn parse(word: &str) -> Option<Self> {
        match word {
            "day" | "days" | "daily" => Some(Granularity::Day),
            "week" | "weeks" | "weekly" => Some(Granularity::Week),
            "month" | "months" | "monthly" => Some(Granularity::Month),
            "quarter" | "quarters" | "quarterly" => Some(Granularity::Quarter),
            "year" | "years" | "yearly" | "annual" | "annually" => Some(Granularity::Year),
            _ => None,
        }
    }
}

/// Whether a dimension is a plain category or a time axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionKind {
    #[default]
    Categorical,
    Temporal,
}

/// A measurable quantity offered by a data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDef {
    pub name: String,

    #[serde(default)]
    pub aliases: Vec<String>,

    /// Aggregation used when rendering the query (SUM unless stated).
    #[serde(default)]
    pub aggregation: Aggregation,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A grouping axis offered by a data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionDef {
    pub name: String,

    #[serde(default)]
    pub aliases: Vec<String>,

    #[serde(default)]
    pub kind: DimensionKind,
}

impl DimensionDef {
    pub fn is_temporal(&self) -> bool {
        self.kind == DimensionKind::Temporal
    }
}

/// One queryable data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceDef {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Words that point at this source without naming a metric or dimension
    /// ("geographic", "marketing").
    #[serde(default)]
    pub keywords: Vec<String>,

    #[serde(default)]
    pub default_granularity: Granularity,

    pub metrics: Vec<MetricDef>,

    #[serde(default)]
    pub dimensions: Vec<DimensionDef>,
}

impl DataSourceDef {
    pub fn metric(&self, name: &str) -> Option<&MetricDef> {
        self.metrics.iter().find(|m| m.name == name)
    }

    pub fn dimension(&self, name: &str) -> Option<&DimensionDef> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    pub fn has_metric(&self, name: &str) -> bool {
        self.metric(name).is_some()
    }

    pub fn has_dimension(&self, name: &str) -> bool {
        self.dimension(name).is_some()
    }

    /// The (single) temporal dimension, if the source has one.
    pub fn time_dimension(&self) -> Option<&DimensionDef> {
        self.dimensions.iter().find(|d| d.is_temporal())
    }

    /// First non-temporal dimension, used when a prompt names none.
    pub fn default_dimension(&self) -> Option<&DimensionDef> {
        self.dimensions.iter().find(|d| !d.is_temporal())
    }
}

/// Root of a catalog YAML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_version")]
    pub version: String,

    pub sources: Vec<DataSourceDef>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

/// What a catalog term denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermKind {
    Metric,
    Dimension,
    Keyword,
}

/// A reference from a normalized term to the catalog entry it names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TermRef {
    /// Index of the source in declaration order.
    pub source: usize,
    pub kind: TermKind,
    /// Canonical metric/dimension name, or the source name for keywords.
    pub canonical: String,
}
