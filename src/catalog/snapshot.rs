//! CatalogSnapshot - validated, indexed, immutable catalog.
//!
//! The snapshot is built once from a [`CatalogConfig`] and never mutated
//! afterwards. Share it via `Arc<CatalogSnapshot>`; reloads publish a new
//! snapshot through [`super::CatalogStore`] instead of editing this one.
//!
//! Lookups are in-memory only:
//! - term key → `TermRef`s (metric, dimension or source keyword)
//! - source name → definition

use anyhow::{bail, Context};
use sha2::{Digest, Sha256};
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use super::types::*;
use crate::lexicon::term_key;

/// Demonstration catalog shipped with the crate.
const BUILTIN_CATALOG: &str = include_str!("../../config/catalog.yaml");

/// Compiled catalog for in-memory lookup.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    /// SHA-256 of the canonical catalog content. Equal content, equal hash.
    pub hash: String,

    /// Version string declared by the catalog file.
    pub version: String,

    sources: Vec<DataSourceDef>,

    /// Normalized term key → catalog references, ordered for deterministic
    /// iteration (the fuzzy pass walks this map).
    term_index: BTreeMap<String, SmallVec<[TermRef; 4]>>,

    /// Word count of the longest indexed term.
    max_term_words: usize,
}

impl CatalogSnapshot {
    /// Validate and index a catalog configuration.
    pub fn from_config(config: CatalogConfig) -> anyhow::Result<Self> {
        validate(&config)?;

        let hash = compute_hash(&config)?;
        let mut term_index: BTreeMap<String, SmallVec<[TermRef; 4]>> = BTreeMap::new();

        for (idx, source) in config.sources.iter().enumerate() {
            for metric in &source.metrics {
                for label in std::iter::once(&metric.name).chain(&metric.aliases) {
                    add_term(&mut term_index, label, idx, TermKind::Metric, &metric.name);
                }
            }
            for dimension in &source.dimensions {
                for label in std::iter::once(&dimension.name).chain(&dimension.aliases) {
                    add_term(
                        &mut term_index,
                        label,
                        idx,
                        TermKind::Dimension,
                        &dimension.name,
                    );
                }
            }
            for keyword in &source.keywords {
                add_term(&mut term_index, keyword, idx, TermKind::Keyword, &source.name);
            }
        }

        let max_term_words = term_index
            .keys()
            .map(|k| k.split_whitespace().count())
            .max()
            .unwrap_or(1);

        Ok(Self {
            hash,
            version: config.version,
            sources: config.sources,
            term_index,
            max_term_words,
        })
    }

    /// Parse and build from a YAML document.
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config: CatalogConfig =
            serde_yaml::from_str(yaml).context("Failed to parse catalog YAML")?;
        Self::from_config(config)
    }

    /// Load from a YAML file.
    pub fn load_yaml(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog from {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid catalog in {}", path.display()))
    }

    /// The demonstration catalog bundled in `config/catalog.yaml`.
    pub fn builtin() -> anyhow::Result<Self> {
        Self::from_yaml_str(BUILTIN_CATALOG)
    }

    // =========================================================================
    // Query Methods
    // =========================================================================

    /// Sources in declaration order.
    pub fn sources(&self) -> &[DataSourceDef] {
        &self.sources
    }

    pub fn source(&self, name: &str) -> Option<&DataSourceDef> {
        self.sources.iter().find(|s| s.name == name)
    }

    pub fn source_at(&self, index: usize) -> Option<&DataSourceDef> {
        self.sources.get(index)
    }

    /// References for an already-normalized term key.
    pub fn lookup_term(&self, key: &str) -> Option<&[TermRef]> {
        self.term_index.get(key).map(|refs| refs.as_slice())
    }

    /// All indexed term keys in sorted order.
    pub fn terms(&self) -> impl Iterator<Item = (&str, &[TermRef])> {
        self.term_index
            .iter()
            .map(|(k, refs)| (k.as_str(), refs.as_slice()))
    }

    pub fn max_term_words(&self) -> usize {
        self.max_term_words
    }

    /// Whether two snapshots describe the same catalog content.
    pub fn same_content(&self, other: &CatalogSnapshot) -> bool {
        self.hash == other.hash
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            hash: self.hash.clone(),
            version: self.version.clone(),
            source_count: self.sources.len(),
            metric_count: self.sources.iter().map(|s| s.metrics.len()).sum(),
            dimension_count: self.sources.iter().map(|s| s.dimensions.len()).sum(),
            term_index_size: self.term_index.len(),
        }
    }
}

/// Statistics about a catalog snapshot.
#[derive(Debug, Clone)]
pub struct CatalogStats {
    pub hash: String,
    pub version: String,
    pub source_count: usize,
    pub metric_count: usize,
    pub dimension_count: usize,
    pub term_index_size: usize,
}

impl std::fmt::Display for CatalogStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Catalog Snapshot Statistics:")?;
        writeln!(f, "  Hash: {}", self.hash)?;
        writeln!(f, "  Version: {}", self.version)?;
        writeln!(f, "  Sources: {}", self.source_count)?;
        writeln!(f, "  Metrics: {}", self.metric_count)?;
        writeln!(f, "  Dimensions: {}", self.dimension_count)?;
        writeln!(f, "  Term index entries: {}", self.term_index_size)?;
        Ok(())
    }
}

// =============================================================================
// Build helpers
// =============================================================================

fn validate(config: &CatalogConfig) -> anyhow::Result<()> {
    if config.sources.is_empty() {
        bail!("Catalog {} declares no data sources", config.version);
    }

    let mut names = HashSet::new();
    for source in &config.sources {
        if source.name.trim().is_empty() {
            bail!("Catalog {} has a source with an empty name", config.version);
        }
        if !names.insert(source.name.as_str()) {
            bail!("Duplicate data source '{}'", source.name);
        }
        if source.metrics.is_empty() {
            bail!("Data source '{}' declares no metrics", source.name);
        }

        let mut metric_names = HashSet::new();
        for metric in &source.metrics {
            if !metric_names.insert(metric.name.as_str()) {
                bail!("Duplicate metric '{}' in '{}'", metric.name, source.name);
            }
        }

        let mut dimension_names = HashSet::new();
        for dimension in &source.dimensions {
            if !dimension_names.insert(dimension.name.as_str()) {
                bail!(
                    "Duplicate dimension '{}' in '{}'",
                    dimension.name,
                    source.name
                );
            }
        }
        if source.dimensions.is_empty() {
            tracing::warn!(
                source = %source.name,
                "data source declares no dimensions, specifications against it will not build"
            );
        }

        let temporal = source.dimensions.iter().filter(|d| d.is_temporal()).count();
        if temporal > 1 {
            bail!(
                "Data source '{}' declares {} temporal dimensions (at most one allowed)",
                source.name,
                temporal
            );
        }
    }

    Ok(())
}

fn compute_hash(config: &CatalogConfig) -> anyhow::Result<String> {
    let canonical = serde_json::to_vec(config).context("Failed to serialize catalog")?;
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Ok(hex::encode(hasher.finalize()))
}

fn add_term(
    index: &mut BTreeMap<String, SmallVec<[TermRef; 4]>>,
    label: &str,
    source: usize,
    kind: TermKind,
    canonical: &str,
) {
    let key = term_key(label);
    if key.is_empty() {
        tracing::warn!(label, "catalog term normalizes to nothing, skipped");
        return;
    }

    let term = TermRef {
        source,
        kind,
        canonical: canonical.to_string(),
    };
    let refs = index.entry(key).or_default();
    if !refs.contains(&term) {
        refs.push(term);
    }
}

// =============================================================================
// Tests
// =============================================================================
