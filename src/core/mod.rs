//! Core types: player identity, RNG, errors.

mod error;
mod player;
mod rng;

pub use error::{ContentError, EngineError, EngineResult};
pub use player::{Gender, Orientation, Player, PlayerId};
pub use rng::{GameRng, GameRngState};
