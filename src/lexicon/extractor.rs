//! Entity extractor.
//!
//! Turns a raw prompt into an [`EntitySet`] in four passes over the token
//! stream:
//!
//! 1. temporal grammar (years, ranges, relative periods)
//! 2. longest-match phrases against the catalog term index, then the cue
//!    vocabulary (catalog wins at equal length)
//! 3. limit detection: a number directly next to a ranking/limit word
//! 4. leftovers: plain numbers and unresolved content words

use super::entities::{CatalogMatch, EntityCategory, EntitySet};
use super::temporal::{self, TemporalExpr, TemporalKind};
use super::tokenizer::{tokenize, Token};
use super::vocabulary::{lookup_cue, Cue, MAX_CUE_WORDS};
use crate::catalog::{CatalogSnapshot, TermKind, TermRef};
use crate::error::CompileError;

/// Minimum phrase window, in words.
const MIN_WINDOW: usize = 4;

/// What a phrase window matched.
enum PhraseMatch {
    Catalog { key: String, refs: Vec<TermRef> },
    Cue(Cue),
}

/// Extracts entities against one catalog snapshot.
pub struct EntityExtractor<'c> {
    catalog: &'c CatalogSnapshot,
    window: usize,
}

impl<'c> EntityExtractor<'c> {
    pub fn new(catalog: &'c CatalogSnapshot) -> Self {
        let window = catalog
            .max_term_words()
            .max(MAX_CUE_WORDS)
            .max(MIN_WINDOW);
        Self { catalog, window }
    }

    /// Extract entities from a prompt. Fails only on empty input.
    pub fn extract(&self, prompt: &str) -> Result<EntitySet, CompileError> {
        if prompt.trim().is_empty() {
            return Err(CompileError::empty_prompt());
        }

        let tokens = tokenize(prompt);
        let (mut temporal, mut consumed) = temporal::scan(&tokens);
        let mut set = EntitySet::default();
        let mut limit_anchors: Vec<(usize, usize)> = Vec::new();

        let mut i = 0;
        while i < tokens.len() {
            if consumed[i] {
                i += 1;
                continue;
            }
            let Some((len, matched)) = self.longest_match(&tokens, &consumed, i) else {
                i += 1;
                continue;
            };

            let span = &tokens[i..i + len];
            let surface = join_text(span);
            match matched {
                PhraseMatch::Catalog { key, refs } => {
                    record_catalog_match(&mut set, surface, key, refs);
                }
                PhraseMatch::Cue(cue) => {
                    if cue.takes_limit() {
                        limit_anchors.push((i, i + len));
                    }
                    match cue {
                        Cue::Granularity(unit) => {
                            temporal.push(TemporalExpr::new(span, TemporalKind::Granularity { unit }));
                        }
                        Cue::OverTime => {
                            temporal.push(TemporalExpr::new(span, TemporalKind::OverTime));
                        }
                        _ => record_cue(&mut set, cue, surface),
                    }
                }
            }

            consumed[i..i + len].iter_mut().for_each(|c| *c = true);
            i += len;
        }

        temporal.sort_by_key(|t| t.position);
        for expr in &temporal {
            set.push(EntityCategory::Temporal, expr.surface.clone());
        }
        set.temporal = temporal;

        set.limit = find_limit(&tokens, &consumed, &limit_anchors);

        let mut seen: Vec<&str> = Vec::new();
        for (token, used) in tokens.iter().zip(&consumed) {
            if *used {
                continue;
            }
            if let Some(n) = token.number {
                set.numbers.push(n);
                set.push(EntityCategory::Number, token.text.clone());
            } else if token.is_content_word() && !seen.contains(&token.text.as_str()) {
                seen.push(&token.text);
                set.unresolved.push(token.text.clone());
                set.push(EntityCategory::Unresolved, token.text.clone());
            }
        }

        Ok(set)
    }

    /// Longest phrase starting at `start` that the catalog or the cue
    /// vocabulary knows.
    fn longest_match(
        &self,
        tokens: &[Token],
        consumed: &[bool],
        start: usize,
    ) -> Option<(usize, PhraseMatch)> {
        let max_len = self.window.min(tokens.len() - start);

        for len in (1..=max_len).rev() {
            let span = &tokens[start..start + len];
            if consumed[start..start + len].iter().any(|c| *c) {
                continue;
            }
            if len == 1 && span[0].is_stop {
                continue;
            }

            let key = join_keys(span);
            if let Some(refs) = self.catalog.lookup_term(&key) {
                return Some((
                    len,
                    PhraseMatch::Catalog {
                        key,
                        refs: refs.to_vec(),
                    },
                ));
            }

            let text = join_text(span);
            if let Some(cue) = lookup_cue(&text).or_else(|| lookup_cue(&key)) {
                return Some((len, PhraseMatch::Cue(cue)));
            }
        }

        None
    }
}

fn join_text(span: &[Token]) -> String {
    span.iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_keys(span: &[Token]) -> String {
    span.iter()
        .map(|t| t.key.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn record_catalog_match(set: &mut EntitySet, surface: String, key: String, refs: Vec<TermRef>) {
    for (kind, category) in [
        (TermKind::Metric, EntityCategory::Metric),
        (TermKind::Dimension, EntityCategory::Dimension),
        (TermKind::Keyword, EntityCategory::Keyword),
    ] {
        if refs.iter().any(|r| r.kind == kind) {
            set.push(category, surface.clone());
        }
    }
    set.terms.push(CatalogMatch {
        surface,
        key,
        refs,
        fuzzy: false,
    });
}

fn record_cue(set: &mut EntitySet, cue: Cue, surface: String) {
    let category = match cue {
        Cue::ChartHint(chart) => {
            set.chart_hints.push(chart);
            EntityCategory::ChartTypeHint
        }
        Cue::Ranking(direction) => {
            set.ranking_direction.get_or_insert(direction);
            EntityCategory::RankingTerm
        }
        Cue::Limit => EntityCategory::RankingTerm,
        Cue::Comparison => EntityCategory::ComparisonTerm,
        Cue::Trend => EntityCategory::TrendTerm,
        Cue::Distribution => EntityCategory::DistributionTerm,
        Cue::Correlation => EntityCategory::CorrelationTerm,
        Cue::Summary => EntityCategory::SummaryTerm,
        Cue::Granularity(_) | Cue::OverTime => EntityCategory::Temporal,
    };
    set.push(category, surface);
}

/// First number directly after (preferred) or before a ranking/limit word.
fn find_limit(tokens: &[Token], consumed: &[bool], anchors: &[(usize, usize)]) -> Option<u32> {
    let as_limit = |idx: usize| -> Option<u32> {
        let token = tokens.get(idx)?;
        if *consumed.get(idx)? {
            return None;
        }
        let n = token.number?;
        u32::try_from(n).ok().filter(|n| *n > 0)
    };

    anchors.iter().find_map(|&(start, end)| {
        as_limit(end).or_else(|| start.checked_sub(1).and_then(as_limit))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartType;
    use crate::spec::SortDirection;

    fn extract(prompt: &str) -> EntitySet {
        let catalog = CatalogSnapshot::builtin().unwrap();
        EntityExtractor::new(&catalog).extract(prompt).unwrap()
    }

    #[test]
    fn test_empty_prompt_fails() {
        let catalog = CatalogSnapshot::builtin().unwrap();
        let extractor = EntityExtractor::new(&catalog);
        for prompt in ["", "   ", "\n\t"] {
            let err = extractor.extract(prompt).unwrap_err();
            assert_eq!(err, CompileError::empty_prompt());
        }
    }

    #[test]
    fn test_ranking_prompt() {
        let set = extract("Show me the top 5 geographic regions by revenue in a donut chart");

        assert_eq!(set.limit(), Some(5));
        assert_eq!(set.ranking_direction(), Some(SortDirection::Descending));
        assert_eq!(set.get(EntityCategory::RankingTerm), ["top".to_string()]);
        assert_eq!(set.chart_hints(), [ChartType::Doughnut]);
        assert_eq!(set.metric_names(), vec!["revenue"]);
        assert_eq!(set.dimension_names(), vec!["region"]);
        assert_eq!(set.keyword_sources(), vec!["geographic_data"]);
        assert_eq!(set.numbers(), [5]);
        assert!(set.unresolved().is_empty());
        assert!(!set.has_temporal());
    }

    #[test]
    fn test_trend_prompt() {
        let set = extract("Monthly revenue trend for 2024");

        assert_eq!(
            set.get(EntityCategory::Temporal),
            ["monthly".to_string(), "for 2024".to_string()]
        );
        assert_eq!(set.get(EntityCategory::TrendTerm), ["trend".to_string()]);
        assert_eq!(set.granularity(), Some(crate::catalog::Granularity::Month));
        assert!(set.has_series_temporal());
        assert!(set.numbers().is_empty());
        assert_eq!(set.limit(), None);

        let range = set.date_range(None).unwrap();
        assert_eq!(range.start.to_string(), "2024-01-01");
        assert_eq!(range.end.unwrap().to_string(), "2025-01-01");
    }

    #[test]
    fn test_year_is_not_a_limit() {
        let set = extract("top products for 2023");
        assert_eq!(set.limit(), None);
        assert!(set.numbers().is_empty());
        assert!(set.has_temporal());
    }

    #[test]
    fn test_limit_before_ranking_word_and_number_words() {
        assert_eq!(extract("5 best products by revenue").limit(), Some(5));
        assert_eq!(extract("first ten campaigns by clicks").limit(), Some(10));

        let bottom = extract("bottom 3 channels by spend");
        assert_eq!(bottom.limit(), Some(3));
        assert_eq!(bottom.ranking_direction(), Some(SortDirection::Ascending));
    }

    #[test]
    fn test_longest_match_prefers_multiword_terms() {
        let set = extract("market share by country");
        assert_eq!(set.metric_names(), vec!["market_share"]);
        assert!(!set.has(EntityCategory::DistributionTerm));

        let set = extract("revenue by area as an area chart");
        assert_eq!(set.dimension_names(), vec!["region"]);
        assert_eq!(set.chart_hints(), [ChartType::Area]);
    }

    #[test]
    fn test_plural_and_case_insensitive_matching() {
        let set = extract("REVENUES by Products");
        assert_eq!(set.metric_names(), vec!["revenue"]);
        assert_eq!(set.dimension_names(), vec!["product"]);
    }

    #[test]
    fn test_unresolved_words_are_kept_once() {
        let set = extract("blah blah nothing meaningful");
        assert_eq!(set.unresolved(), ["blah", "nothing", "meaningful"]);
        assert!(set.metric_names().is_empty());
    }

    #[test]
    fn test_comparison_vocabulary() {
        let set = extract("revenue vs profit compared to last year");
        assert_eq!(
            set.get(EntityCategory::ComparisonTerm),
            ["vs".to_string(), "compared to".to_string()]
        );
        assert_eq!(set.metric_names(), vec!["revenue", "profit"]);
        assert_eq!(set.temporal().len(), 1);
    }
}
