//! Property tests over prompts assembled from catalog and cue vocabulary.

use std::collections::HashSet;

use chartspec::chart::select_chart;
use chartspec::intent::IntentClassifier;
use chartspec::lexicon::EntityExtractor;
use chartspec::resolver::DataSourceResolver;
use chartspec::spec::SpecificationBuilder;
use chartspec::{
    CatalogSnapshot, ChartCompiler, ChartType, CompileErrorKind, CompilerConfig, Intent,
};
use once_cell::sync::Lazy;
use proptest::prelude::*;

static CATALOG: Lazy<CatalogSnapshot> =
    Lazy::new(|| CatalogSnapshot::builtin().expect("builtin catalog"));

const WORDS: &[&str] = &[
    // filler
    "show", "me", "the", "by", "for", "in", "a", "of", "as", "please",
    // metrics and dimensions
    "revenue", "sales", "profit", "units", "orders", "customers", "churn", "ltv", "spend",
    "clicks", "ctr", "region", "regions", "country", "product", "category", "channel",
    "segment", "campaign", "plan",
    // keywords
    "geographic", "marketing", "crm", "ecommerce",
    // cues
    "top", "bottom", "vs", "compare", "trend", "growth", "distribution", "share",
    "correlation", "total", "overview", "monthly", "weekly", "over", "time",
    // chart hints
    "pie", "donut", "bar", "line", "scatter", "bubble", "area",
    // numbers and dates
    "0", "3", "5", "10", "2023", "2024", "q2", "last", "months", "since", "ytd",
    // noise
    "zorblax", "purple", "!", "--",
];

fn arb_prompt() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS), 1..12).prop_map(|words| words.join(" "))
}

/// "top 5 regions by revenue" style prompts.
fn arb_ranking_prompt() -> impl Strategy<Value = String> {
    (
        prop::sample::select(&["top", "bottom", "best", "lowest"][..]),
        prop::sample::select(&["3", "5", "10", "ten"][..]),
        prop::sample::select(
            &["", "regions", "products", "countries", "segments", "channels", "campaigns"][..],
        ),
        prop::sample::select(
            &["revenue", "profit", "customers", "spend", "clicks", "churn", "units"][..],
        ),
    )
        .prop_map(|(rank, n, dimension, metric)| {
            if dimension.is_empty() {
                format!("{rank} {n} by {metric}")
            } else {
                format!("{rank} {n} {dimension} by {metric}")
            }
        })
}

/// Whether any resolved source renders for the prompt's intent and chart.
fn some_source_renders(prompt: &str) -> bool {
    let Ok(mut entities) = EntityExtractor::new(&CATALOG).extract(prompt) else {
        return false;
    };
    let config = CompilerConfig::default();
    let resolver = DataSourceResolver::new(&CATALOG, config.fuzzy_threshold);
    resolver.fuzzy_pass(&mut entities);
    let Ok(resolution) = resolver.resolve(&entities) else {
        return false;
    };

    let intent = IntentClassifier::new(config.weights.clone()).classify(&entities).intent;
    let chart = select_chart(intent, entities.chart_hints()).primary;
    let builder = SpecificationBuilder::new(&CATALOG, config.reference_date);
    resolution
        .candidates()
        .iter()
        .any(|candidate| builder.build(intent, chart, candidate, &entities).is_ok())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Same prompt and catalog, same serialized outcome.
    #[test]
    fn compile_is_deterministic(prompt in arb_prompt()) {
        let compiler = ChartCompiler::default();
        let first = serde_json::to_string(&compiler.compile(&prompt, &CATALOG)).unwrap();
        let second = serde_json::to_string(&compiler.compile(&prompt, &CATALOG)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn spec_invariants_hold(prompt in arb_prompt()) {
        let compiler = ChartCompiler::default();
        let spec = match compiler.compile(&prompt, &CATALOG) {
            Ok(spec) => spec,
            Err(e) => {
                prop_assert!(e.kind.is_fatal(), "non-fatal kind returned as error: {:?}", e);
                if matches!(e.kind, CompileErrorKind::UnrenderableSpec { .. }) {
                    prop_assert!(
                        !some_source_renders(&prompt),
                        "unrenderable although a source renders: {:?}",
                        e
                    );
                }
                return Ok(());
            }
        };

        prop_assert!((0.0..=1.0).contains(&spec.confidence));

        let source = CATALOG.source(&spec.data_source);
        prop_assert!(source.is_some());
        let source = source.unwrap();
        prop_assert!(!spec.metrics.is_empty());
        prop_assert!(!spec.dimensions.is_empty());
        for metric in &spec.metrics {
            prop_assert!(source.has_metric(metric));
        }
        for dimension in &spec.dimensions {
            prop_assert!(source.has_dimension(dimension));
        }

        if spec.intent == Intent::Trend {
            let time = source.time_dimension().map(|d| d.name.as_str());
            prop_assert_eq!(Some(spec.dimensions[0].as_str()), time);
        }
        if let Some(limit) = spec.limit() {
            prop_assert_eq!(spec.intent, Intent::Ranking);
            prop_assert!(limit > 0);
            let expected_suffix = format!("LIMIT {limit}");
            prop_assert!(spec.generated_query.ends_with(&expected_suffix));
        }
    }

    #[test]
    fn alternatives_are_ranked_and_distinct(prompt in arb_prompt()) {
        let compiler = ChartCompiler::default();
        let Ok(spec) = compiler.compile(&prompt, &CATALOG) else {
            return Ok(());
        };

        prop_assert!(spec.alternatives.len() <= compiler.config().max_alternatives);

        let mut seen = HashSet::new();
        for alt in &spec.alternatives {
            prop_assert!((0.0..=1.0).contains(&alt.confidence));
            prop_assert!(
                (alt.chart_type, alt.data_source.as_str())
                    != (spec.chart_type, spec.data_source.as_str())
            );
            prop_assert!(seen.insert((alt.chart_type, alt.data_source.clone())));
        }
        for pair in spec.alternatives.windows(2) {
            prop_assert!(pair[0].confidence >= pair[1].confidence);
        }
    }

    /// Appending an incompatible chart hint keeps the interpretation and
    /// lists the hinted chart first.
    #[test]
    fn incompatible_hint_is_first_alternative(prompt in arb_ranking_prompt()) {
        let compiler = ChartCompiler::default();
        let plain = compiler.compile(&prompt, &CATALOG);
        prop_assert!(plain.is_ok(), "{}: {:?}", prompt, plain);
        let plain = plain.unwrap();

        let hinted_prompt = format!("{prompt} as a scatter plot");
        let hinted = compiler.compile(&hinted_prompt, &CATALOG);
        prop_assert!(hinted.is_ok(), "{}: {:?}", hinted_prompt, hinted);
        let hinted = hinted.unwrap();

        prop_assert_eq!(plain.intent, Intent::Ranking);
        prop_assert_eq!(hinted.intent, plain.intent);
        prop_assert_eq!(hinted.chart_type, plain.chart_type);
        prop_assert_eq!(&hinted.data_source, &plain.data_source);
        prop_assert_eq!(
            hinted.alternatives.first().map(|a| a.chart_type),
            Some(ChartType::Scatter)
        );
    }
}
