//! The session engine: lifecycle state machine orchestrating rotation and
//! targeting.
//!
//! One `GameEngine` instance is one game container, constructed and owned by
//! the caller. All operations are synchronous transformations over engine
//! state; the engine assumes a single logical thread of control and performs
//! no locking.
//!
//! ## Round flow
//!
//! `start_game`/`next_round`/`skip_dynamic` draw a question from the
//! scheduler, resolve its targets, and hand back a [`RoundOutcome`]. Draws
//! whose targeting cannot be satisfied (blocked dynamic, no player matching a
//! gender filter) are skipped internally without consuming the round; the
//! caller only ever sees fully resolved rounds or an end-of-game signal.

use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::content::{DynamicId, DynamicRegistry};
use crate::core::{EngineError, EngineResult, GameRng, Player, PlayerId};
use crate::scheduler::{DynamicStatus, DynamicsManager, ResolvedQuestion};
use crate::targeting::TargetResolver;

use super::snapshot::{GameSnapshot, SNAPSHOT_VERSION};
use super::state::{
    EndReason, GamePhase, GameSettings, GameState, GameSummary, ResolvedRound, RoundOutcome,
    RoundRecord, RoundResult,
};

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Drives one game session over a loaded content pool.
#[derive(Clone, Debug)]
pub struct GameEngine {
    scheduler: DynamicsManager,
    resolver: TargetResolver,
    rng: GameRng,
    roster: Vec<Player>,
    settings: GameSettings,
    state: GameState,
}

impl GameEngine {
    /// Create an engine over a content pool, seeded from OS entropy.
    #[must_use]
    pub fn new(registry: DynamicRegistry) -> Self {
        Self::with_rng(registry, GameRng::from_entropy())
    }

    /// Create an engine with an injected RNG, for deterministic tests.
    #[must_use]
    pub fn with_rng(registry: DynamicRegistry, rng: GameRng) -> Self {
        Self {
            scheduler: DynamicsManager::new(registry),
            resolver: TargetResolver::new(),
            rng,
            roster: Vec::new(),
            settings: GameSettings::default(),
            state: GameState::default(),
        }
    }

    // === Read-only surface ===

    /// Observable lifecycle state.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// The active question, if a round is on display.
    #[must_use]
    pub fn current_question(&self) -> Option<&ResolvedQuestion> {
        self.state.current_question.as_ref()
    }

    /// The roster the engine is currently targeting against.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.roster
    }

    /// Per-dynamic usage report.
    #[must_use]
    pub fn dynamics_status(&self) -> Vec<DynamicStatus> {
        self.scheduler.dynamics_status()
    }

    /// Questions still drawable.
    #[must_use]
    pub fn remaining_questions(&self) -> usize {
        self.scheduler.remaining_questions()
    }

    // === Lifecycle operations ===

    /// Start a new game, discarding any previous session state.
    ///
    /// Allowed in every phase. Returns the first resolved round, or a
    /// same-turn [`RoundOutcome::GameEnded`] when the pool is empty.
    pub fn start_game(&mut self, players: Vec<Player>, settings: GameSettings) -> RoundOutcome {
        self.scheduler.reset();
        self.resolver.reset();
        self.roster = players;
        self.settings = settings;
        self.state = GameState {
            current_round: 1,
            total_rounds: settings.max_rounds,
            max_rounds: settings.max_rounds,
            phase: GamePhase::Playing,
            current_question: None,
            current_targets: None,
            started_at_ms: Some(now_ms()),
            round_history: im::Vector::new(),
        };

        self.draw_round()
    }

    /// Advance to the next round.
    ///
    /// Past the rounds budget this returns a `RoundsCompleted` signal with
    /// `can_extend = true` and leaves the phase at `Playing`: the caller
    /// decides between `extend_game` and `end_game`.
    pub fn next_round(&mut self) -> EngineResult<RoundOutcome> {
        self.require_playing("next_round")?;

        self.record_current(RoundResult::Played);
        // The played question is in the history now; drop it from display so
        // a later extension draws fresh instead of re-recording it.
        self.state.current_question = None;
        self.state.current_targets = None;
        self.state.current_round += 1;

        if self.state.current_round > self.state.total_rounds {
            return Ok(RoundOutcome::GameEnded {
                reason: EndReason::RoundsCompleted,
                can_extend: true,
            });
        }

        Ok(self.draw_round())
    }

    /// Replace the current question without advancing the round counter.
    ///
    /// Serves both the player-initiated skip and redraws after targeting
    /// failures.
    pub fn skip_dynamic(&mut self) -> EngineResult<RoundOutcome> {
        self.require_playing("skip_dynamic")?;

        self.record_current(RoundResult::Skipped);
        Ok(self.draw_round())
    }

    /// Grow the rounds budget, typically right after a `RoundsCompleted`
    /// signal.
    ///
    /// Does not reset the scheduler: an extended game may still run out of
    /// content before rounds and end with `NoMoreQuestions`.
    pub fn extend_game(&mut self, additional_rounds: u32) -> EngineResult<RoundOutcome> {
        self.require_playing("extend_game")?;

        self.state.total_rounds += additional_rounds;
        self.state.max_rounds += additional_rounds;

        match &self.state.current_question {
            Some(question) => Ok(RoundOutcome::Round(ResolvedRound {
                round: self.state.current_round,
                question: question.clone(),
                targets: self
                    .state
                    .current_targets
                    .clone()
                    .unwrap_or(crate::targeting::TargetOutcome::None),
            })),
            // The pool had also run dry at the boundary; try one more draw.
            None => Ok(self.draw_round()),
        }
    }

    /// Grow the rounds budget by the settings' `extend_by` default.
    pub fn extend_game_default(&mut self) -> EngineResult<RoundOutcome> {
        self.extend_game(self.settings.extend_by)
    }

    /// Pause a running game.
    pub fn pause_game(&mut self) -> EngineResult<()> {
        self.require_playing("pause_game")?;
        self.state.phase = GamePhase::Paused;
        Ok(())
    }

    /// Resume a paused game.
    pub fn resume_game(&mut self) -> EngineResult<()> {
        if self.state.phase != GamePhase::Paused {
            return Err(EngineError::InvalidState {
                operation: "resume_game",
                phase: self.state.phase,
            });
        }
        self.state.phase = GamePhase::Playing;
        Ok(())
    }

    /// End the game unconditionally, from any phase.
    ///
    /// History is retained; `reset` or a new `start_game` clears it.
    pub fn end_game(&mut self, reason: EndReason) -> GameSummary {
        self.state.phase = GamePhase::Finished;

        let duration_ms = self
            .state
            .started_at_ms
            .map(|start| now_ms().saturating_sub(start))
            .unwrap_or_default();

        GameSummary {
            reason,
            rounds_played: self.state.current_round.saturating_sub(1),
            duration_ms,
            questions_remaining: self.scheduler.remaining_questions(),
        }
    }

    /// Replace the roster used for targeting.
    ///
    /// Growth reopens blocked dynamics; removed players are purged from
    /// every participation ledger. Remaining players keep their history.
    pub fn update_players(&mut self, players: Vec<Player>) {
        let new_ids: HashSet<&PlayerId> = players.iter().map(|p| &p.id).collect();
        let removed: Vec<PlayerId> = self
            .roster
            .iter()
            .filter(|p| !new_ids.contains(&p.id))
            .map(|p| p.id.clone())
            .collect();

        for id in &removed {
            self.resolver.notify_player_removed(id);
        }
        if players.len() > self.roster.len() {
            self.resolver.notify_player_added();
        }

        self.roster = players;
    }

    /// Return to `Waiting` with all ledgers and history cleared.
    pub fn reset(&mut self) {
        self.scheduler.reset();
        self.resolver.reset();
        self.state = GameState::default();
    }

    // === Persistence ===

    /// Capture the full session for external storage.
    #[must_use]
    pub fn save_state(&self) -> GameSnapshot {
        GameSnapshot {
            version: SNAPSHOT_VERSION,
            settings: self.settings,
            current_round: self.state.current_round,
            total_rounds: self.state.total_rounds,
            max_rounds: self.state.max_rounds,
            phase: self.state.phase,
            current_question: self.state.current_question.clone(),
            current_targets: self.state.current_targets.clone(),
            started_at_ms: self.state.started_at_ms,
            round_history: self.state.round_history.iter().cloned().collect(),
            scheduler: self.scheduler.snapshot(),
            targeting: self.resolver.snapshot(),
            rng: self.rng.state(),
        }
    }

    /// Restore a session saved with [`save_state`](Self::save_state).
    ///
    /// The roster is caller-owned and not part of the snapshot; re-supply it
    /// via [`update_players`](Self::update_players) before drawing.
    pub fn load_state(&mut self, snapshot: GameSnapshot) -> EngineResult<()> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(EngineError::SnapshotVersion {
                found: snapshot.version,
                supported: SNAPSHOT_VERSION,
            });
        }

        self.scheduler.reset();
        self.scheduler.restore(snapshot.scheduler)?;
        self.resolver.restore(snapshot.targeting);
        self.rng = GameRng::from_state(&snapshot.rng);
        self.settings = snapshot.settings;
        self.state = GameState {
            current_round: snapshot.current_round,
            total_rounds: snapshot.total_rounds,
            max_rounds: snapshot.max_rounds,
            phase: snapshot.phase,
            current_question: snapshot.current_question,
            current_targets: snapshot.current_targets,
            started_at_ms: snapshot.started_at_ms,
            round_history: snapshot.round_history.into_iter().collect(),
        };
        Ok(())
    }

    // === Internals ===

    fn require_playing(&self, operation: &'static str) -> EngineResult<()> {
        if self.state.phase == GamePhase::Playing {
            Ok(())
        } else {
            Err(EngineError::InvalidState {
                operation,
                phase: self.state.phase,
            })
        }
    }

    fn record_current(&mut self, result: RoundResult) {
        if let Some(question) = &self.state.current_question {
            let targets = self
                .state
                .current_targets
                .as_ref()
                .map(|t| t.players())
                .unwrap_or_default();

            self.state.round_history.push_back(RoundRecord {
                round: self.state.current_round,
                dynamic_id: question.dynamic_id.clone(),
                question_id: question.id().clone(),
                targets,
                result,
                timestamp_ms: now_ms(),
            });
        }
    }

    /// Draw until a resolvable question appears or the pool gives out.
    ///
    /// Unservable draws from reusable dynamics consume nothing, so the loop
    /// tracks which dynamics have failed to resolve since the pool last
    /// shrank; only once that covers every available dynamic is nothing
    /// left servable.
    fn draw_round(&mut self) -> RoundOutcome {
        let mut unservable: HashSet<DynamicId> = HashSet::new();

        loop {
            let pool_before = self.scheduler.remaining_questions();
            let Some(question) = self.scheduler.next_question(&mut self.rng) else {
                return self.finish_no_more_questions();
            };

            let targets = self.resolver.resolve(&question, &self.roster, &mut self.rng);
            if targets.is_resolved() {
                self.state.current_question = Some(question.clone());
                self.state.current_targets = Some(targets.clone());
                return RoundOutcome::Round(ResolvedRound {
                    round: self.state.current_round,
                    question,
                    targets,
                });
            }

            // A non-reusable skip still consumed its question; what is
            // drawable changed, so every dynamic gets a fresh chance.
            if self.scheduler.remaining_questions() < pool_before {
                unservable.clear();
            }
            unservable.insert(question.dynamic_id);

            let all_unservable = self
                .scheduler
                .dynamics_status()
                .iter()
                .filter(|status| status.available)
                .all(|status| unservable.contains(&status.id));
            if all_unservable {
                return self.finish_no_more_questions();
            }
        }
    }

    fn finish_no_more_questions(&mut self) -> RoundOutcome {
        self.state.current_question = None;
        self.state.current_targets = None;
        self.state.phase = GamePhase::Finished;
        RoundOutcome::GameEnded {
            reason: EndReason::NoMoreQuestions,
            can_extend: false,
        }
    }
}
