//! Lifecycle state: phases, settings, round history, and round outcomes.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::content::{DynamicId, QuestionId};
use crate::scheduler::ResolvedQuestion;
use crate::targeting::{TargetList, TargetOutcome};

/// Lifecycle phase of a session.
///
/// `Waiting -> Playing -> {Paused <-> Playing} -> Finished`, with a direct
/// `Playing -> Finished` edge when content or rounds run out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// No game started yet.
    #[default]
    Waiting,
    /// Rounds are being played.
    Playing,
    /// Temporarily paused; resumable.
    Paused,
    /// Game over. Terminal until a new `start_game`.
    Finished,
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GamePhase::Waiting => "waiting",
            GamePhase::Playing => "playing",
            GamePhase::Paused => "paused",
            GamePhase::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Session settings supplied at `start_game`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    /// Rounds budget for the game.
    pub max_rounds: u32,
    /// Rounds added by a default `extend_game`.
    pub extend_by: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            max_rounds: 50,
            extend_by: 25,
        }
    }
}

/// Why a game ended (or signalled it is about to).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The rounds budget was reached. Extendable.
    RoundsCompleted,
    /// The content pool ran dry.
    NoMoreQuestions,
    /// The caller ended the game explicitly.
    HostEnded,
}

/// How a round concluded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundResult {
    /// Played to completion.
    Played,
    /// Replaced before playing (caller skip or auto-skip).
    Skipped,
}

/// Append-only audit entry for one resolved round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Round number the question was shown in.
    pub round: u32,
    /// Dynamic the question came from.
    pub dynamic_id: DynamicId,
    /// The question shown.
    pub question_id: QuestionId,
    /// Resolved target players, if any.
    pub targets: TargetList,
    /// Played or skipped.
    pub result: RoundResult,
    /// Wall-clock milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
}

/// Observable lifecycle state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Current round, 1-based while playing.
    pub current_round: u32,
    /// Rounds budget, grown by `extend_game`.
    pub total_rounds: u32,
    /// Mirror of the (possibly extended) settings budget.
    pub max_rounds: u32,
    /// Lifecycle phase.
    pub phase: GamePhase,
    /// The active question, fully resolved, if one is on display.
    pub current_question: Option<ResolvedQuestion>,
    /// Targets resolved for the active question.
    pub current_targets: Option<TargetOutcome>,
    /// When the game started, milliseconds since the Unix epoch.
    pub started_at_ms: Option<u64>,
    /// Audit log of every shown round.
    pub round_history: Vector<RoundRecord>,
}

/// A fully resolved round, ready to render: the question plus its targets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRound {
    /// Round number.
    pub round: u32,
    /// The drawn question with denormalized dynamic fields.
    pub question: ResolvedQuestion,
    /// Selected target players.
    pub targets: TargetOutcome,
}

/// What a draw operation produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoundOutcome {
    /// A new round to display.
    Round(ResolvedRound),
    /// The game ended, or signalled the rounds budget is spent.
    ///
    /// With `can_extend` the engine has *not* finished the game: the caller
    /// decides between `extend_game` and `end_game`.
    GameEnded {
        /// Why drawing stopped.
        reason: EndReason,
        /// Whether `extend_game` is a meaningful next call.
        can_extend: bool,
    },
}

impl RoundOutcome {
    /// The resolved round, if one was drawn.
    #[must_use]
    pub fn round(&self) -> Option<&ResolvedRound> {
        match self {
            RoundOutcome::Round(round) => Some(round),
            RoundOutcome::GameEnded { .. } => None,
        }
    }
}

/// Final report produced by `end_game`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    /// Why the game ended.
    pub reason: EndReason,
    /// Completed rounds.
    pub rounds_played: u32,
    /// Elapsed wall-clock time, milliseconds.
    pub duration_ms: u64,
    /// Questions left undrawn in the pool.
    pub questions_remaining: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_display() {
        assert_eq!(GamePhase::Waiting.to_string(), "waiting");
        assert_eq!(GamePhase::Playing.to_string(), "playing");
        assert_eq!(GamePhase::Paused.to_string(), "paused");
        assert_eq!(GamePhase::Finished.to_string(), "finished");
    }

    #[test]
    fn test_default_settings() {
        let settings = GameSettings::default();
        assert_eq!(settings.max_rounds, 50);
        assert_eq!(settings.extend_by, 25);
    }

    #[test]
    fn test_round_outcome_accessor() {
        let ended = RoundOutcome::GameEnded {
            reason: EndReason::RoundsCompleted,
            can_extend: true,
        };
        assert!(ended.round().is_none());
    }

    #[test]
    fn test_end_reason_serde_tags() {
        assert_eq!(
            serde_json::to_string(&EndReason::RoundsCompleted).unwrap(),
            "\"rounds_completed\""
        );
        assert_eq!(
            serde_json::to_string(&EndReason::NoMoreQuestions).unwrap(),
            "\"no_more_questions\""
        );
    }
}
