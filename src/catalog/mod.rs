//! Data-source catalog.
//!
//! The catalog is process-wide, read-only configuration: which data sources
//! exist, which metrics and dimensions each offers, how metrics aggregate and
//! which time granularity a source defaults to.
//!
//! ```text
//! config/catalog.yaml ──▶ CatalogConfig ──▶ CatalogSnapshot (validated, indexed, hashed)
//!                                                │
//!                                   CatalogStore (RwLock<Arc<_>> swap)
//!                                                │
//!                                   Arc<CatalogSnapshot> per compile call
//! ```

mod snapshot;
mod store;
mod types;

pub use snapshot::{CatalogSnapshot, CatalogStats};
pub use store::CatalogStore;
pub use types::{
    Aggregation, CatalogConfig, DataSourceDef, DimensionDef, DimensionKind, Granularity,
    MetricDef, TermKind, TermRef,
};
