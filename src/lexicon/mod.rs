//! Lexical front end: prompt → [`EntitySet`].
//!
//! ```text
//! prompt ─▶ normalize ─▶ tokenize ─▶ temporal grammar (nom)
//!                                  ─▶ longest-match (catalog terms, cue vocabulary)
//!                                  ─▶ limits, numbers, unresolved words
//! ```
//!
//! Everything here is a pure function of the prompt and a catalog snapshot.

mod entities;
mod extractor;
mod normalize;
mod temporal;
mod tokenizer;
mod vocabulary;

pub use entities::{CatalogMatch, EntityCategory, EntitySet};
pub use extractor::EntityExtractor;
pub use normalize::{is_stop_word, normalize_text, singularize, term_key};
pub use temporal::{DateRange, TemporalExpr, TemporalKind};
pub use tokenizer::{tokenize, Token};
pub use vocabulary::{lookup_cue, Cue};
