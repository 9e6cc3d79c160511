//! Chart specification: types, builder and query rendering.

mod builder;
mod query;
mod types;

pub use builder::SpecificationBuilder;
pub use query::QueryTemplate;
pub use types::{
    Alternative, ChartSpecification, FilterValue, Ordering, SortDirection, FILTER_DATE_RANGE,
    FILTER_LIMIT,
};
