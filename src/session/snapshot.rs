//! Full-session snapshot for persistence.
//!
//! The engine only produces and consumes this plain serializable object;
//! where it is written (disk, cloud sync) is the caller's concern. The
//! roster is deliberately absent: players are caller-owned and re-supplied
//! on resume via `update_players`.

use serde::{Deserialize, Serialize};

use crate::core::{EngineResult, GameRngState};
use crate::scheduler::{ResolvedQuestion, SchedulerSnapshot};
use crate::targeting::{TargetOutcome, TargetingSnapshot};

use super::state::{GamePhase, GameSettings, RoundRecord};

/// Snapshot format version written by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything needed to resume a session across process restarts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Format version; checked on load.
    pub version: u32,
    /// Settings in force (including any extensions applied).
    pub settings: GameSettings,
    /// Current round.
    pub current_round: u32,
    /// Rounds budget.
    pub total_rounds: u32,
    /// Extended budget mirror.
    pub max_rounds: u32,
    /// Lifecycle phase.
    pub phase: GamePhase,
    /// Active question, if one was on display.
    pub current_question: Option<ResolvedQuestion>,
    /// Targets resolved for the active question.
    pub current_targets: Option<TargetOutcome>,
    /// Game start, milliseconds since the Unix epoch.
    pub started_at_ms: Option<u64>,
    /// Audit log.
    pub round_history: Vec<RoundRecord>,
    /// Rotation scheduler state.
    pub scheduler: SchedulerSnapshot,
    /// Targeting ledgers and blocked markers.
    pub targeting: TargetingSnapshot,
    /// RNG position, so a restored game continues the same sequence.
    pub rng: GameRngState,
}

impl GameSnapshot {
    /// Encode to bytes for storage.
    pub fn to_bytes(&self) -> EngineResult<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from stored bytes.
    pub fn from_bytes(bytes: &[u8]) -> EngineResult<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    fn minimal() -> GameSnapshot {
        GameSnapshot {
            version: SNAPSHOT_VERSION,
            settings: GameSettings::default(),
            current_round: 3,
            total_rounds: 50,
            max_rounds: 50,
            phase: GamePhase::Playing,
            current_question: None,
            current_targets: None,
            started_at_ms: Some(1_700_000_000_000),
            round_history: Vec::new(),
            scheduler: SchedulerSnapshot {
                used_questions: FxHashMap::default(),
                last_dynamic: None,
                available_dynamics: Vec::new(),
            },
            targeting: TargetingSnapshot {
                single: FxHashMap::default(),
                paired: FxHashMap::default(),
                blocked: Vec::new(),
            },
            rng: GameRngState {
                seed: 42,
                word_pos: 16,
            },
        }
    }

    #[test]
    fn test_bytes_round_trip() {
        let snapshot = minimal();
        let bytes = snapshot.to_bytes().unwrap();
        let decoded = GameSnapshot::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_json_round_trip() {
        let snapshot = minimal();
        let json = serde_json::to_string(&snapshot).unwrap();
        let decoded: GameSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert!(GameSnapshot::from_bytes(&[0xFF, 0x01, 0x02]).is_err());
    }
}
