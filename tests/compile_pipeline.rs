//! End-to-end compile behaviour against the demonstration catalog.

use chartspec::{
    CatalogSnapshot, ChartCompiler, ChartType, CompileErrorKind, CompilerConfig, Intent,
    SortDirection, Stage,
};
use chrono::NaiveDate;

fn catalog() -> CatalogSnapshot {
    CatalogSnapshot::builtin().expect("builtin catalog")
}

fn pairs(spec: &chartspec::ChartSpecification) -> Vec<(ChartType, String)> {
    spec.alternatives
        .iter()
        .map(|a| (a.chart_type, a.data_source.clone()))
        .collect()
}

#[test]
fn test_ranking_without_hint_defaults_to_bar() {
    let spec = chartspec::compile("Show me the top 5 geographic regions by revenue", &catalog())
        .unwrap();

    assert_eq!(spec.intent, Intent::Ranking);
    assert_eq!(spec.chart_type, ChartType::Bar);
    assert_eq!(spec.data_source, "geographic_data");
    assert_eq!(spec.metrics, vec!["revenue"]);
    assert_eq!(spec.dimensions, vec!["region"]);
    assert_eq!(spec.limit(), Some(5));
    assert_eq!(spec.ordering.field, "revenue");
    assert_eq!(spec.ordering.direction, SortDirection::Descending);
    assert_eq!(spec.confidence, 0.6);
    assert_eq!(
        pairs(&spec),
        vec![
            (ChartType::Pie, "geographic_data".to_string()),
            (ChartType::Doughnut, "geographic_data".to_string()),
            (ChartType::Bar, "sales_data".to_string()),
        ]
    );
}

#[test]
fn test_incompatible_hint_becomes_first_alternative() {
    let spec = chartspec::compile(
        "Show me the top 5 geographic regions by revenue as a scatter plot",
        &catalog(),
    )
    .unwrap();

    assert_eq!(spec.intent, Intent::Ranking);
    assert_eq!(spec.chart_type, ChartType::Bar);
    assert_eq!(spec.confidence, 0.6);

    let first = &spec.alternatives[0];
    assert_eq!(first.chart_type, ChartType::Scatter);
    assert_eq!(first.data_source, "geographic_data");
    assert_eq!(first.confidence, 0.54);
}

#[test]
fn test_demoted_hint_stays_first_with_tied_sources() {
    let plain = chartspec::compile("top 5 by revenue", &catalog()).unwrap();
    let hinted = chartspec::compile("top 5 by revenue as a scatter plot", &catalog()).unwrap();

    assert_eq!(hinted.intent, plain.intent);
    assert_eq!(hinted.chart_type, plain.chart_type);
    assert_eq!(hinted.data_source, "sales_data");
    assert_eq!(hinted.confidence, 0.425);

    let ranked: Vec<(ChartType, &str, f64)> = hinted
        .alternatives
        .iter()
        .map(|a| (a.chart_type, a.data_source.as_str(), a.confidence))
        .collect();
    assert_eq!(
        ranked,
        vec![
            (ChartType::Scatter, "sales_data", 0.425),
            (ChartType::Bar, "geographic_data", 0.425),
            (ChartType::Pie, "sales_data", 0.344),
        ]
    );
}

#[test]
fn test_trend_skips_source_without_time_axis() {
    let spec = chartspec::compile("revenue trend by region", &catalog()).unwrap();
    assert_eq!(spec.intent, Intent::Trend);
    assert_eq!(spec.data_source, "sales_data");
    assert_eq!(spec.dimensions[0], "order_date");
    assert!(spec.generated_query.contains("DATE_TRUNC"));

    let err = chartspec::compile("market share trend by country", &catalog()).unwrap_err();
    assert_eq!(err.stage, Stage::Build);
    assert!(matches!(err.kind, CompileErrorKind::UnrenderableSpec { .. }));
}

#[test]
fn test_compatible_hint_overrides_default_chart() {
    let spec = chartspec::compile(
        "Show me the top 5 geographic regions by revenue in a donut chart",
        &catalog(),
    )
    .unwrap();

    assert_eq!(spec.chart_type, ChartType::Doughnut);
    assert_eq!(spec.confidence, 0.8);
    assert!(spec.generated_query.ends_with("LIMIT 5"));
}

#[test]
fn test_trend_uses_time_dimension_and_year_filter() {
    let spec = chartspec::compile("Monthly revenue trend for 2024", &catalog()).unwrap();

    assert_eq!(spec.intent, Intent::Trend);
    assert_eq!(spec.chart_type, ChartType::Line);
    assert_eq!(spec.data_source, "sales_data");
    assert_eq!(spec.dimensions[0], "order_date");
    assert_eq!(spec.ordering.field, "order_date");
    assert_eq!(spec.ordering.direction, SortDirection::Ascending);
    assert_eq!(spec.limit(), None);

    let range = spec.date_range().expect("date range filter");
    assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert_eq!(range.end, NaiveDate::from_ymd_opt(2025, 1, 1));
    assert!(spec.generated_query.contains("DATE_TRUNC('month', order_date)"));
}

#[test]
fn test_relative_period_needs_reference_date() {
    let prompt = "revenue trend over the last 3 months";

    let unanchored = chartspec::compile(prompt, &catalog()).unwrap();
    assert_eq!(unanchored.date_range(), None);

    let config = CompilerConfig::default()
        .with_reference_date(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
    let anchored = ChartCompiler::new(config).compile(prompt, &catalog()).unwrap();
    let range = anchored.date_range().expect("anchored range");
    assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
    assert_eq!(range.end, NaiveDate::from_ymd_opt(2024, 7, 1));
}

#[test]
fn test_unknown_vocabulary_fails_with_no_matching_source() {
    let err = chartspec::compile("purple elephants dancing quietly", &catalog()).unwrap_err();

    assert_eq!(err.stage, Stage::Resolve);
    match err.kind {
        CompileErrorKind::NoMatchingSource {
            catalog_version,
            unresolved,
        } => {
            assert_eq!(catalog_version, "2024.1");
            assert!(unresolved.contains(&"purple".to_string()));
        }
        other => panic!("unexpected error kind: {other:?}"),
    }

    let err = chartspec::compile("blah blah nothing meaningful", &catalog()).unwrap_err();
    assert!(matches!(err.kind, CompileErrorKind::NoMatchingSource { .. }));
}

#[test]
fn test_empty_prompt() {
    for prompt in ["", "   ", "\n\t"] {
        let err = chartspec::compile(prompt, &catalog()).unwrap_err();
        assert_eq!(err.kind, CompileErrorKind::EmptyPrompt);
        assert_eq!(err.stage, Stage::Extract);
    }
}

#[test]
fn test_output_is_byte_identical_across_runs() {
    let catalog = catalog();
    let compiler = ChartCompiler::default();
    let prompts = [
        "Show me the top 5 geographic regions by revenue in a donut chart",
        "compare the distribution of revenue by product",
        "Monthly revenue trend for 2024",
        "churn vs satisfaction by segment",
    ];

    for prompt in prompts {
        let first = serde_json::to_string(&compiler.compile(prompt, &catalog).unwrap()).unwrap();
        let second = serde_json::to_string(&compiler.compile(prompt, &catalog).unwrap()).unwrap();
        let fresh = serde_json::to_string(
            &ChartCompiler::default()
                .compile(prompt, &CatalogSnapshot::builtin().unwrap())
                .unwrap(),
        )
        .unwrap();
        assert_eq!(first, second, "{prompt}");
        assert_eq!(first, fresh, "{prompt}");
    }
}

#[test]
fn test_metrics_and_dimensions_belong_to_source() {
    let catalog = catalog();
    let prompts = [
        "top 10 products by units sold",
        "customer churn trend by segment since 2022",
        "marketing spend versus clicks by channel",
        "revenue breakdown by category as a pie",
    ];

    for prompt in prompts {
        let spec = chartspec::compile(prompt, &catalog).unwrap();
        let source = catalog.source(&spec.data_source).unwrap();
        assert!(!spec.metrics.is_empty(), "{prompt}");
        assert!(!spec.dimensions.is_empty(), "{prompt}");
        for metric in &spec.metrics {
            assert!(source.has_metric(metric), "{prompt}: {metric}");
        }
        for dimension in &spec.dimensions {
            assert!(source.has_dimension(dimension), "{prompt}: {dimension}");
        }
        assert_eq!(spec.catalog_version, catalog.hash);
    }
}

#[test]
fn test_spec_json_shape() {
    let spec = chartspec::compile("top 3 countries by customers", &catalog()).unwrap();
    let json = serde_json::to_value(&spec).unwrap();

    assert_eq!(json["intent"], "ranking");
    assert_eq!(json["chart_type"], "bar");
    assert_eq!(json["data_source"], "geographic_data");
    assert_eq!(json["filters"]["limit"], 3);
    assert_eq!(json["ordering"]["direction"], "descending");
    assert!(json.get("warnings").is_none());
}
