//! Chart-type selector.
//!
//! Static table lookup plus two rules for explicit hints:
//! - a hint inside the intent's family replaces the table's first choice
//! - a hint outside it is kept as the first alternate

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{chart_family, ChartType};
use crate::intent::Intent;

/// Most alternates a selection carries.
pub const MAX_ALTERNATES: usize = 2;

/// How the prompt's explicit hint was treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintOutcome {
    NoHint,
    Honored,
    Demoted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSelection {
    pub primary: ChartType,
    pub alternates: SmallVec<[ChartType; MAX_ALTERNATES]>,
    pub hint: HintOutcome,
}

/// Pick a chart type for an intent given the prompt's chart hints (prompt
/// order). Only the first hint is considered.
pub fn select_chart(intent: Intent, hints: &[ChartType]) -> ChartSelection {
    let family = chart_family(intent);
    let default = family.first().copied().unwrap_or(ChartType::Bar);

    let (primary, mut alternates, hint) = match hints.first() {
        Some(&hint) if family.contains(&hint) => (hint, SmallVec::new(), HintOutcome::Honored),
        Some(&hint) => {
            let mut alternates: SmallVec<[ChartType; MAX_ALTERNATES]> = SmallVec::new();
            alternates.push(hint);
            (default, alternates, HintOutcome::Demoted)
        }
        None => (default, SmallVec::new(), HintOutcome::NoHint),
    };

    for &chart in family {
        if alternates.len() >= MAX_ALTERNATES {
            break;
        }
        if chart != primary && !alternates.contains(&chart) {
            alternates.push(chart);
        }
    }

    ChartSelection {
        primary,
        alternates,
        hint,
    }
}
