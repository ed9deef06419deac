//! Resolution outcome for a drawn question.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::PlayerId;

/// Inline storage for resolved targets (at most two players).
pub type TargetList = SmallVec<[PlayerId; 2]>;

/// Result of resolving targets for one question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetOutcome {
    /// The question needs no targets (votes, free-for-all).
    None,
    /// One target player was selected.
    Single(PlayerId),
    /// A pair was selected. For same-gender dynamics both members share
    /// a gender.
    Pair(PlayerId, PlayerId),
    /// No valid selection exists with the current roster; the engine must
    /// redraw without consuming the round.
    Skip,
}

impl TargetOutcome {
    /// Whether this outcome lets the question be shown.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !matches!(self, TargetOutcome::Skip)
    }

    /// The selected players, in selection order.
    #[must_use]
    pub fn players(&self) -> TargetList {
        match self {
            TargetOutcome::None | TargetOutcome::Skip => TargetList::new(),
            TargetOutcome::Single(p) => std::iter::once(p.clone()).collect(),
            TargetOutcome::Pair(a, b) => [a.clone(), b.clone()].into_iter().collect(),
        }
    }
}
