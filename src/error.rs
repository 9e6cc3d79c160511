//! Typed compile error model.
//!
//! Every failure of [`crate::ChartCompiler::compile`] maps to exactly one
//! `CompileErrorKind` variant, tagged with the pipeline stage that raised it:
//!
//! ```text
//! extract  → EmptyPrompt
//! classify → AmbiguousIntent (informational, never returned as Err)
//! resolve  → NoMatchingSource
//! build    → UnrenderableSpec
//! ```
//!
//! ## Rules
//!
//! - `thiserror` for enum derivation, no manual `Display` impls.
//! - Only fatal kinds travel through `Err`. `AmbiguousIntent` is recorded in
//!   `ChartSpecification::warnings` instead.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CompileError
// ---------------------------------------------------------------------------

/// A compile failure carrying both the failure kind and the stage that
/// produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{stage}: {kind}")]
pub struct CompileError {
    /// What went wrong.
    pub kind: CompileErrorKind,

    /// Which pipeline stage failed (for telemetry/logging).
    pub stage: Stage,
}

impl CompileError {
    /// Convenience constructor.
    pub fn new(kind: CompileErrorKind, stage: Stage) -> Self {
        Self { kind, stage }
    }

    pub fn empty_prompt() -> Self {
        Self::new(CompileErrorKind::EmptyPrompt, Stage::Extract)
    }

    pub fn no_matching_source(catalog_version: &str, unresolved: Vec<String>) -> Self {
        Self::new(
            CompileErrorKind::NoMatchingSource {
                catalog_version: catalog_version.to_string(),
                unresolved,
            },
            Stage::Resolve,
        )
    }

    pub fn unrenderable(source_name: &str, reason: impl Into<String>) -> Self {
        Self::new(
            CompileErrorKind::UnrenderableSpec {
                source_name: source_name.to_string(),
                reason: reason.into(),
            },
            Stage::Build,
        )
    }
}

// ---------------------------------------------------------------------------
// CompileErrorKind
// ---------------------------------------------------------------------------

/// All failure and ambiguity modes of the compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "error_kind", rename_all = "snake_case")]
pub enum CompileErrorKind {
    /// The prompt was empty or whitespace-only.
    #[error("Prompt is empty")]
    EmptyPrompt,

    /// No catalog source provides any requested metric.
    #[error(
        "No data source in catalog {catalog_version} matches the prompt (unresolved terms: [{}])",
        .unresolved.join(", ")
    )]
    NoMatchingSource {
        catalog_version: String,
        unresolved: Vec<String>,
    },

    /// A required query field is missing or not a valid identifier.
    #[error("Cannot render query for {source_name}: {reason}")]
    UnrenderableSpec { source_name: String, reason: String },

    /// Two or more intents scored within the tie margin.
    #[error("Ambiguous intent between {} (margin {margin})", .candidates.join(" / "))]
    AmbiguousIntent { candidates: Vec<String>, margin: f64 },
}

impl CompileErrorKind {
    /// Whether this kind aborts compilation.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, CompileErrorKind::AmbiguousIntent { .. })
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Pipeline stage names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extract,
    Classify,
    Select,
    Resolve,
    Build,
    Score,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Extract => "extract",
            Stage::Classify => "classify",
            Stage::Select => "select",
            Stage::Resolve => "resolve",
            Stage::Build => "build",
            Stage::Score => "score",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
