//! Query template rendering.
//!
//! Pure templating, not a planner:
//!
//! ```text
//! SELECT <dims>, <AGG(metric)> AS <metric> FROM <source>
//!   [WHERE <time> >= 'start' [AND <time> < 'end']]
//!   GROUP BY <dims> ORDER BY <expr> ASC|DESC [LIMIT n]
//! ```
//!
//! Every identifier is checked against the source definition and a strict
//! identifier pattern; anything else is an `UnrenderableSpec` error rather
//! than a broken query.

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::Ordering;
use crate::catalog::{DataSourceDef, Granularity};
use crate::error::CompileError;
use crate::lexicon::DateRange;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("identifier pattern is valid"));

fn is_identifier(s: &str) -> bool {
    IDENTIFIER.is_match(s)
}

/// Inputs for one rendered query.
#[derive(Debug, Clone)]
pub struct QueryTemplate<'a> {
    pub source: &'a DataSourceDef,
    pub metrics: &'a [String],
    pub dimensions: &'a [String],
    pub ordering: &'a Ordering,
    pub date_range: Option<&'a DateRange>,
    pub limit: Option<u32>,
    pub granularity: Granularity,
}

impl QueryTemplate<'_> {
    pub fn render(&self) -> Result<String, CompileError> {
        let source = &self.source.name;
        if !is_identifier(source) {
            return Err(CompileError::unrenderable(
                source,
                format!("'{source}' is not a valid identifier"),
            ));
        }
        if self.metrics.is_empty() {
            return Err(CompileError::unrenderable(source, "no metrics"));
        }
        if self.dimensions.is_empty() {
            return Err(CompileError::unrenderable(source, "no dimensions"));
        }

        let mut select = Vec::with_capacity(self.dimensions.len() + self.metrics.len());
        let mut group_by = Vec::with_capacity(self.dimensions.len());
        for name in self.dimensions {
            let (expr, alias) = self.dimension_expr(name)?;
            select.push(match alias {
                Some(alias) => format!("{expr} AS {alias}"),
                None => expr.clone(),
            });
            group_by.push(expr);
        }
        for name in self.metrics {
            let expr = self.metric_expr(name)?;
            select.push(format!("{expr} AS {name}"));
        }

        let mut sql = format!("SELECT {} FROM {}", select.join(", "), source);

        if let (Some(range), Some(time)) = (self.date_range, self.source.time_dimension()) {
            if !is_identifier(&time.name) {
                return Err(self.bad_identifier(&time.name));
            }
            sql.push_str(&format!(" WHERE {} >= '{}'", time.name, range.start));
            if let Some(end) = range.end {
                sql.push_str(&format!(" AND {} < '{}'", time.name, end));
            }
        }

        sql.push_str(&format!(" GROUP BY {}", group_by.join(", ")));
        sql.push_str(&format!(
            " ORDER BY {} {}",
            self.order_expr()?,
            self.ordering.direction.sql()
        ));

        if let Some(n) = self.limit {
            sql.push_str(&format!(" LIMIT {n}"));
        }

        Ok(sql)
    }

    /// Select expression and optional alias for a dimension.
    fn dimension_expr(&self, name: &str) -> Result<(String, Option<String>), CompileError> {
        let dimension = self.source.dimension(name).ok_or_else(|| {
            CompileError::unrenderable(
                &self.source.name,
                format!("dimension '{name}' is not offered by the source"),
            )
        })?;
        if !is_identifier(name) {
            return Err(self.bad_identifier(name));
        }

        if dimension.is_temporal() {
            let unit = self.granularity.sql_unit();
            Ok((
                format!("DATE_TRUNC('{unit}', {name})"),
                Some(format!("{name}_{unit}")),
            ))
        } else {
            Ok((name.to_string(), None))
        }
    }

    fn metric_expr(&self, name: &str) -> Result<String, CompileError> {
        let metric = self.source.metric(name).ok_or_else(|| {
            CompileError::unrenderable(
                &self.source.name,
                format!("metric '{name}' is not offered by the source"),
            )
        })?;
        if !is_identifier(name) {
            return Err(self.bad_identifier(name));
        }
        Ok(format!("{}({})", metric.aggregation.sql_fn(), name))
    }

    fn order_expr(&self) -> Result<String, CompileError> {
        let field = &self.ordering.field;
        if self.metrics.contains(field) {
            return self.metric_expr(field);
        }
        if self.dimensions.contains(field) {
            return self.dimension_expr(field).map(|(expr, _)| expr);
        }
        Err(CompileError::unrenderable(
            &self.source.name,
            format!("ordering field '{field}' is not selected"),
        ))
    }

    fn bad_identifier(&self, name: &str) -> CompileError {
        CompileError::unrenderable(
            &self.source.name,
            format!("'{name}' is not a valid identifier"),
        )
    }
}
