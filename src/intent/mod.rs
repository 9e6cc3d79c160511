//! Intent classification.
//!
//! Maps an [`crate::lexicon::EntitySet`] to one of six fixed intents with a
//! reproducible confidence. The weight table is a construction parameter so
//! an external tuning process can replace it without touching code.

mod classifier;
mod types;
mod weights;

pub(crate) use classifier::round3;
pub use classifier::IntentClassifier;
pub use types::{Evidence, Intent, IntentResult, IntentScore, Signal};
pub use weights::ScoringWeights;
