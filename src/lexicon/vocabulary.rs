//! Built-in cue vocabulary.
//!
//! Fixed phrase tables for chart-type synonyms and the words that signal an
//! intent. Catalog terms (metrics, dimensions, keywords) are not here; they
//! come from the catalog snapshot.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::catalog::Granularity;
use crate::chart::ChartType;
use crate::spec::SortDirection;

/// Longest phrase in the tables, in words.
pub const MAX_CUE_WORDS: usize = 3;

/// What a vocabulary phrase signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    ChartHint(ChartType),
    Ranking(SortDirection),
    /// "first", "limit": enables a limit without implying a direction.
    Limit,
    Comparison,
    Trend,
    Distribution,
    Correlation,
    Summary,
    Granularity(Granularity),
    OverTime,
}

impl Cue {
    /// Ranking and limit words sit next to the limit number.
    pub fn takes_limit(&self) -> bool {
        matches!(self, Cue::Ranking(_) | Cue::Limit)
    }
}

static CUES: Lazy<HashMap<&'static str, Cue>> = Lazy::new(|| {
    let mut table = HashMap::new();

    let charts: &[(&str, ChartType)] = &[
        ("bar", ChartType::Bar),
        ("bars", ChartType::Bar),
        ("bar chart", ChartType::Bar),
        ("bar graph", ChartType::Bar),
        ("column chart", ChartType::Bar),
        ("column graph", ChartType::Bar),
        ("histogram", ChartType::Bar),
        ("line chart", ChartType::Line),
        ("line graph", ChartType::Line),
        ("line plot", ChartType::Line),
        ("area chart", ChartType::Area),
        ("area graph", ChartType::Area),
        ("area plot", ChartType::Area),
        ("stacked area", ChartType::Area),
        ("pie", ChartType::Pie),
        ("pie chart", ChartType::Pie),
        ("pie graph", ChartType::Pie),
        ("donut", ChartType::Doughnut),
        ("doughnut", ChartType::Doughnut),
        ("donut chart", ChartType::Doughnut),
        ("doughnut chart", ChartType::Doughnut),
        ("ring chart", ChartType::Doughnut),
        ("scatter", ChartType::Scatter),
        ("scatterplot", ChartType::Scatter),
        ("scatter plot", ChartType::Scatter),
        ("scatter chart", ChartType::Scatter),
        ("scatter graph", ChartType::Scatter),
        ("xy plot", ChartType::Scatter),
        ("bubble", ChartType::Bubble),
        ("bubble chart", ChartType::Bubble),
        ("bubble plot", ChartType::Bubble),
    ];
    for (phrase, chart) in charts {
        table.insert(*phrase, Cue::ChartHint(*chart));
    }

    for phrase in [
        "top",
        "best",
        "highest",
        "largest",
        "biggest",
        "leading",
        "most",
        "greatest",
        "rank",
        "ranking",
        "ranked",
        "top performing",
        "best performing",
        "highest performing",
    ] {
        table.insert(phrase, Cue::Ranking(SortDirection::Descending));
    }
    for phrase in [
        "bottom",
        "worst",
        "lowest",
        "smallest",
        "least",
        "fewest",
        "worst performing",
        "lowest performing",
    ] {
        table.insert(phrase, Cue::Ranking(SortDirection::Ascending));
    }
    for phrase in ["first", "limit"] {
        table.insert(phrase, Cue::Limit);
    }

    for phrase in [
        "vs",
        "versus",
        "compare",
        "compared",
        "comparing",
        "comparison",
        "compared to",
        "compared with",
        "against",
        "relative to",
        "side by side",
        "contrast",
    ] {
        table.insert(phrase, Cue::Comparison);
    }

    for phrase in [
        "trend",
        "trends",
        "trending",
        "trendline",
        "growth",
        "grow",
        "growing",
        "grew",
        "change",
        "changes",
        "changed",
        "evolution",
        "evolve",
        "evolving",
        "increase",
        "increasing",
        "decrease",
        "decreasing",
        "decline",
        "declining",
        "rise",
        "rising",
        "trajectory",
        "history",
        "historical",
        "progression",
        "year over year",
        "yoy",
        "month over month",
    ] {
        table.insert(phrase, Cue::Trend);
    }

    for phrase in [
        "distribution",
        "distributed",
        "breakdown",
        "break down",
        "broken down",
        "share",
        "shares",
        "proportion",
        "proportions",
        "composition",
        "split",
        "mix",
        "percentage",
        "percent",
        "makeup",
    ] {
        table.insert(phrase, Cue::Distribution);
    }

    for phrase in [
        "correlation",
        "correlate",
        "correlated",
        "correlates",
        "relationship",
        "relation",
        "association",
        "dependence",
    ] {
        table.insert(phrase, Cue::Correlation);
    }

    for phrase in [
        "total",
        "totals",
        "summary",
        "summarize",
        "summarise",
        "overview",
        "overall",
        "kpi",
        "kpis",
        "aggregate",
    ] {
        table.insert(phrase, Cue::Summary);
    }

    for phrase in [
        "daily",
        "day",
        "weekly",
        "week",
        "monthly",
        "month",
        "quarterly",
        "quarter",
        "yearly",
        "year",
        "annual",
        "annually",
    ] {
        if let Some(granularity) = Granularity::parse(phrase) {
            table.insert(phrase, Cue::Granularity(granularity));
        }
    }

    for phrase in ["over time", "timeline", "time series", "over the years"] {
        table.insert(phrase, Cue::OverTime);
    }

    table
});

/// Look up a normalized phrase.
pub fn lookup_cue(phrase: &str) -> Option<Cue> {
    CUES.get(phrase).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_donut_synonyms() {
        assert_eq!(
            lookup_cue("donut"),
            Some(Cue::ChartHint(ChartType::Doughnut))
        );
        assert_eq!(lookup_cue("doughnut"), lookup_cue("donut"));
    }

    #[test]
    fn test_ranking_direction() {
        assert_eq!(
            lookup_cue("top"),
            Some(Cue::Ranking(SortDirection::Descending))
        );
        assert_eq!(
            lookup_cue("bottom"),
            Some(Cue::Ranking(SortDirection::Ascending))
        );
        assert!(lookup_cue("first").unwrap().takes_limit());
        assert!(!lookup_cue("vs").unwrap().takes_limit());
    }

    #[test]
    fn test_phrase_lengths_within_bound() {
        for phrase in CUES.keys() {
            assert!(phrase.split_whitespace().count() <= MAX_CUE_WORDS, "{phrase}");
        }
    }

    #[test]
    fn test_granularity_words() {
        assert_eq!(
            lookup_cue("monthly"),
            Some(Cue::Granularity(Granularity::Month))
        );
        assert_eq!(lookup_cue("over time"), Some(Cue::OverTime));
    }
}
