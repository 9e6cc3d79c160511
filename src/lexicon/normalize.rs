//! Text normalization for prompt and catalog matching.
//!
//! Provides:
//! - Unicode NFKC normalization
//! - Lowercase conversion
//! - Punctuation stripping (underscores included, digits kept)
//! - Whitespace collapsing
//! - Rule-based singularization so "regions" and "region" share a key

use once_cell::sync::Lazy;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

/// Words with no lexical weight of their own. They stay in the token stream
/// (flagged) so adjacency rules can still see them.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "the", "me", "my", "our", "us", "we", "i", "you", "show", "display", "give",
        "get", "list", "see", "view", "plot", "draw", "make", "create", "please", "can", "could",
        "would", "will", "let", "want", "need", "what", "which", "who", "how", "is", "are", "was",
        "were", "be", "been", "do", "does", "did", "of", "in", "on", "at", "by", "for", "to",
        "from", "with", "as", "and", "or", "per", "into", "across", "each", "every", "all",
        "chart", "charts", "graph", "graphs", "visualization", "visualize", "using", "via",
        "that", "this", "these", "those", "it", "its", "their", "there", "here", "some", "any",
        "about", "like", "just", "also", "than", "then", "so", "up", "down", "out", "over",
        "under", "between", "during", "since", "through", "until", "within", "value", "values",
        "number", "data", "report", "metric", "metrics",
    ]
    .into_iter()
    .collect()
});

/// Normalize free text for matching.
///
/// # Examples
///
/// ```
/// use chartspec::lexicon::normalize_text;
///
/// assert_eq!(normalize_text("Top-5 Regions, by REVENUE!"), "top 5 regions by revenue");
/// assert_eq!(normalize_text("units_sold"), "units sold");
/// ```
pub fn normalize_text(s: &str) -> String {
    let folded: String = s.nfkc().collect();

    let stripped: String = folded
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    stripped
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reduce an English plural to its singular form.
///
/// Deliberately small: the catalog and the prompt go through the same rules,
/// so they only need to agree with each other.
pub fn singularize(word: &str) -> String {
    if word.len() < 4 || !word.chars().all(|c| c.is_alphabetic()) {
        return word.to_string();
    }

    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    if let Some(stem) = word.strip_suffix("sses") {
        return format!("{stem}ss");
    }
    for suffix in ["xes", "ches", "shes"] {
        if let Some(stem) = word.strip_suffix(suffix) {
            return format!("{stem}{}", &suffix[..suffix.len() - 2]);
        }
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    match word.strip_suffix('s') {
        Some(stem) => stem.to_string(),
        None => word.to_string(),
    }
}

/// Lookup key for a catalog term or prompt phrase: normalized and singularized
/// word by word.
pub fn term_key(s: &str) -> String {
    normalize_text(s)
        .split_whitespace()
        .map(singularize)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Revenue   TREND "), "revenue trend");
        assert_eq!(normalize_text("year-over-year"), "year over year");
        assert_eq!(normalize_text("Ｑ１ ２０２４"), "q1 2024");
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("regions"), "region");
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("addresses"), "address");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("branches"), "branch");
        assert_eq!(singularize("status"), "status");
        assert_eq!(singularize("analysis"), "analysis");
        assert_eq!(singularize("business"), "business");
        assert_eq!(singularize("revenue"), "revenue");
        assert_eq!(singularize("vs"), "vs");
        assert_eq!(singularize("2024s"), "2024s");
    }

    #[test]
    fn test_term_key_aligns_catalog_and_prompt() {
        assert_eq!(term_key("units_sold"), term_key("Units Sold"));
        assert_eq!(term_key("Product Categories"), "product category");
    }

    #[test]
    fn test_stop_words() {
        assert!(is_stop_word("the"));
        assert!(is_stop_word("chart"));
        assert!(!is_stop_word("top"));
        assert!(!is_stop_word("vs"));
    }
}
