//! Session lifecycle: the engine, its state machine, and snapshots.

mod engine;
mod snapshot;
mod state;

pub use engine::GameEngine;
pub use snapshot::{GameSnapshot, SNAPSHOT_VERSION};
pub use state::{
    EndReason, GamePhase, GameSettings, GameState, GameSummary, ResolvedRound, RoundOutcome,
    RoundRecord, RoundResult,
};
