//! # party-engine
//!
//! A session engine for multiplayer party games: a rotating sequence of
//! "dynamics" (mini-game modes) drawing non-repeating questions from a fixed
//! content pool, with per-dynamic player targeting under gender eligibility
//! rules.
//!
//! ## Design Principles
//!
//! 1. **Content-Agnostic**: Dynamics and questions are supplied as data
//!    conforming to a schema; the engine never hardcodes content.
//!
//! 2. **Caller-Owned Roster**: Players live outside the engine. Selection
//!    calls read a roster snapshot; the engine only keeps ledgers keyed by
//!    player id.
//!
//! 3. **Explicit Instances**: One `GameEngine` per game session, constructed
//!    and owned by the caller. No global state.
//!
//! ## Architecture
//!
//! - **Deterministic RNG**: Every draw flows through a seedable, serializable
//!   `GameRng`, so tests pin a seed and snapshots resume the same sequence.
//!
//! - **Plain Snapshots**: `save_state` produces one serializable object;
//!   where it is stored is the caller's concern.
//!
//! ## Modules
//!
//! - `core`: Player identity, RNG, errors
//! - `content`: Content schema and the validated registry
//! - `scheduler`: Rotation scheduler (non-repeating dynamics/questions)
//! - `targeting`: Player targeting with per-dynamic rotation ledgers
//! - `session`: Lifecycle state machine, snapshots

pub mod content;
pub mod core;
pub mod scheduler;
pub mod session;
pub mod targeting;

// Re-export commonly used types
pub use crate::core::{
    ContentError, EngineError, EngineResult, GameRng, GameRngState, Gender, Orientation, Player,
    PlayerId,
};

pub use crate::content::{
    Dynamic, DynamicId, DynamicRegistry, DynamicType, GenderRule, Question, QuestionId,
    TargetingMode,
};

pub use crate::scheduler::{DynamicStatus, DynamicsManager, ResolvedQuestion, SchedulerSnapshot};

pub use crate::targeting::{TargetList, TargetOutcome, TargetResolver, TargetingSnapshot};

pub use crate::session::{
    EndReason, GameEngine, GamePhase, GameSettings, GameSnapshot, GameState, GameSummary,
    ResolvedRound, RoundOutcome, RoundRecord, RoundResult, SNAPSHOT_VERSION,
};
