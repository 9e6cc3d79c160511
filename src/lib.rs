//! Deterministic prompt-to-chart-specification compiler
//!
//! Turns a short natural-language request ("top 5 regions by revenue as a
//! donut") into a structured chart specification: intent, chart type, data
//! source, metrics, dimensions, filters, ordering, a parameterized query
//! string, a confidence score and ranked alternatives.
//!
//! No model calls and no I/O on the compile path: the same prompt, catalog
//! snapshot and weight table always produce the same specification.
//!
//! ## Architecture
//!
//! ```text
//! Prompt → Tokenizer → Entity Extractor ─┬→ Intent Classifier → Chart Selector ─┐
//!          (catalog terms, nom temporal) └→ Source Resolver ────────────────────┴→ Builder → Confidence
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use chartspec::{CatalogSnapshot, ChartCompiler};
//!
//! let catalog = CatalogSnapshot::builtin()?;
//! let spec = ChartCompiler::default()
//!     .compile("Show me the top 5 geographic regions by revenue", &catalog)?;
//! println!("{}", spec.generated_query);
//! # Ok::<(), anyhow::Error>(())
//! ```

// Reference data
pub mod catalog;
pub mod config;
pub mod error;

// Pipeline stages
pub mod chart;
pub mod confidence;
pub mod intent;
pub mod lexicon;
pub mod resolver;
pub mod spec;

pub mod compiler;

// Re-exports for convenience
pub use catalog::{CatalogSnapshot, CatalogStore};
pub use chart::ChartType;
pub use compiler::{ChartCompiler, CompileTrace};
pub use config::CompilerConfig;
pub use error::{CompileError, CompileErrorKind, Stage};
pub use intent::{Intent, ScoringWeights};
pub use spec::{Alternative, ChartSpecification, FilterValue, Ordering, SortDirection};

/// Compile with the default configuration.
pub fn compile(prompt: &str, catalog: &CatalogSnapshot) -> Result<ChartSpecification, CompileError> {
    ChartCompiler::default().compile(prompt, catalog)
}
