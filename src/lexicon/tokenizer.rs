//! Tokenizer for raw prompts.
//!
//! Splits the normalized prompt into positioned tokens. Stop words are kept
//! in the stream and flagged so that adjacency rules ("for 2024", "top 5")
//! can still see them; later passes skip them when collecting nouns.

use super::normalize::{is_stop_word, normalize_text, singularize};

/// One normalized word of the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Normalized surface form (lowercase, punctuation stripped).
    pub text: String,

    /// Singularized lookup key.
    pub key: String,

    /// Zero-based word position in the normalized prompt.
    pub position: usize,

    /// Whether the word is a stop word.
    pub is_stop: bool,

    /// Integer value for digit strings and number words.
    pub number: Option<i64>,
}

impl Token {
    pub fn new(text: &str, position: usize) -> Self {
        Self {
            text: text.to_string(),
            key: singularize(text),
            position,
            is_stop: is_stop_word(text),
            number: parse_number(text),
        }
    }

    /// Four-digit number in the plausible calendar range.
    pub fn as_year(&self) -> Option<i32> {
        match self.number {
            Some(n) if self.text.len() == 4 && (1900..=2100).contains(&n) => i32::try_from(n).ok(),
            _ => None,
        }
    }

    /// Whether the token is a content word worth keeping as an unresolved
    /// candidate.
    pub fn is_content_word(&self) -> bool {
        !self.is_stop && self.number.is_none() && self.text.chars().all(|c| c.is_alphabetic())
    }
}

/// Tokenize a prompt into normalized, positioned words.
pub fn tokenize(prompt: &str) -> Vec<Token> {
    normalize_text(prompt)
        .split_whitespace()
        .enumerate()
        .map(|(position, word)| Token::new(word, position))
        .collect()
}

/// Digit strings and the number words one through twenty.
fn parse_number(word: &str) -> Option<i64> {
    if !word.is_empty() && word.len() <= 9 && word.chars().all(|c| c.is_ascii_digit()) {
        return word.parse().ok();
    }

    let value = match word {
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        "thirteen" => 13,
        "fourteen" => 14,
        "fifteen" => 15,
        "sixteen" => 16,
        "seventeen" => 17,
        "eighteen" => 18,
        "nineteen" => 19,
        "twenty" => 20,
        _ => return None,
    };
    Some(value)
}
