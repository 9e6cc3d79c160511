//! Golden Corpus test — compiles every prompt in tests/golden_corpus/ against
//! the demonstration catalog and checks the expected outcome.
//!
//! It validates:
//! - All YAML files in tests/golden_corpus/ parse correctly
//! - No duplicate IDs across files
//! - Compiled prompts match the expected intent, chart type, source and limit
//! - Error prompts fail with the expected kind

use std::collections::HashSet;
use std::path::PathBuf;

use serde::Deserialize;

use chartspec::{CatalogSnapshot, ChartCompiler, CompileErrorKind};

#[derive(Debug, Deserialize)]
struct CorpusEntry {
    id: String,
    category: String,
    prompt: String,
    outcome: String,
    intent: Option<String>,
    chart_type: Option<String>,
    data_source: Option<String>,
    limit: Option<u32>,
    #[serde(default)]
    tags: Vec<String>,
}

fn corpus_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/golden_corpus")
}

fn load_corpus() -> Vec<CorpusEntry> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(corpus_dir())
        .expect("read golden_corpus dir")
        .map(|e| e.expect("dir entry").path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "yaml"))
        .collect();
    files.sort();

    files
        .iter()
        .flat_map(|path| {
            let content = std::fs::read_to_string(path)
                .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
            serde_yaml::from_str::<Vec<CorpusEntry>>(&content)
                .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e))
        })
        .collect()
}

fn wire_name<T: serde::Serialize>(value: T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

#[test]
fn test_corpus_is_well_formed() {
    let entries = load_corpus();
    assert!(entries.len() >= 10, "corpus too small: {}", entries.len());

    let mut ids = HashSet::new();
    for entry in &entries {
        assert!(ids.insert(entry.id.as_str()), "duplicate id {}", entry.id);
        assert!(!entry.category.is_empty(), "{} has no category", entry.id);
        assert!(
            ["compiled", "no_match", "empty"].contains(&entry.outcome.as_str()),
            "{} has invalid outcome: {}",
            entry.id,
            entry.outcome
        );
        if entry.outcome == "compiled" {
            assert!(entry.intent.is_some(), "{} compiled but no intent", entry.id);
        }
    }
}

#[test]
fn test_corpus_outcomes() {
    let catalog = CatalogSnapshot::builtin().expect("builtin catalog");
    let compiler = ChartCompiler::default();
    let mut failures = Vec::new();

    for entry in load_corpus() {
        let result = compiler.compile(&entry.prompt, &catalog);

        match (entry.outcome.as_str(), result) {
            ("compiled", Ok(spec)) => {
                let checks = [
                    ("intent", entry.intent.clone(), wire_name(spec.intent)),
                    ("chart_type", entry.chart_type.clone(), wire_name(spec.chart_type)),
                    ("data_source", entry.data_source.clone(), spec.data_source.clone()),
                ];
                for (field, expected, actual) in checks {
                    if let Some(expected) = expected {
                        if expected != actual {
                            failures.push(format!(
                                "{}: {} expected {}, got {}",
                                entry.id, field, expected, actual
                            ));
                        }
                    }
                }
                if entry.limit.is_some() && entry.limit != spec.limit() {
                    failures.push(format!(
                        "{}: limit expected {:?}, got {:?}",
                        entry.id,
                        entry.limit,
                        spec.limit()
                    ));
                }
                if entry.tags.iter().any(|t| t == "ambiguous") && spec.warnings.is_empty() {
                    failures.push(format!("{}: expected an ambiguity warning", entry.id));
                }
            }
            ("no_match", Err(e)) if matches!(e.kind, CompileErrorKind::NoMatchingSource { .. }) => {}
            ("empty", Err(e)) if e.kind == CompileErrorKind::EmptyPrompt => {}
            (expected, Ok(spec)) => failures.push(format!(
                "{}: expected {}, compiled to {} / {}",
                entry.id, expected, spec.intent, spec.data_source
            )),
            (expected, Err(e)) => {
                failures.push(format!("{}: expected {}, failed with {}", entry.id, expected, e))
            }
        }
    }

    assert!(failures.is_empty(), "golden corpus mismatches:\n{}", failures.join("\n"));
}
