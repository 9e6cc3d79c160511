//! Chart types and the chart-type selector.

mod selector;

pub use selector::{select_chart, ChartSelection, HintOutcome, MAX_ALTERNATES};

use serde::{Deserialize, Serialize};

use crate::intent::Intent;

/// Renderable chart kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Bar,
    Line,
    Area,
    Pie,
    Doughnut,
    Scatter,
    Bubble,
}

impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Area => "area",
            ChartType::Pie => "pie",
            ChartType::Doughnut => "doughnut",
            ChartType::Scatter => "scatter",
            ChartType::Bubble => "bubble",
        }
    }
}

impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chart types acceptable for an intent, preferred first.
pub fn chart_family(intent: Intent) -> &'static [ChartType] {
    match intent {
        Intent::Ranking => &[ChartType::Bar, ChartType::Pie, ChartType::Doughnut],
        Intent::Trend => &[ChartType::Line, ChartType::Area],
        Intent::Comparison => &[ChartType::Bar, ChartType::Line],
        Intent::Distribution => &[ChartType::Pie, ChartType::Doughnut],
        Intent::Correlation => &[ChartType::Scatter, ChartType::Bubble],
        Intent::Summary => &[ChartType::Bar, ChartType::Pie],
    }
}

/// Whether `chart` is canonically associated with `intent`.
pub fn is_compatible(intent: Intent, chart: ChartType) -> bool {
    chart_family(intent).contains(&chart)
}
