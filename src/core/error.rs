//! Error types for content loading and engine operations.
//!
//! Schema violations fail fast at load time as [`ContentError`]. Running-game
//! failures are [`EngineError`]; content exhaustion is not an error (it is an
//! expected end-of-content condition surfaced through the round outcome).

use crate::content::DynamicId;
use crate::session::GamePhase;

/// Alias for `Result<T, EngineError>`.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The operation is not allowed in the current phase.
    ///
    /// Recoverable: the caller retries after transitioning correctly.
    #[error("{operation} is not allowed while the game is {phase}")]
    InvalidState {
        /// The operation that was attempted.
        operation: &'static str,
        /// The phase it was attempted in.
        phase: GamePhase,
    },

    /// The supplied content violated the schema.
    #[error(transparent)]
    Content(#[from] ContentError),

    /// A snapshot was produced by an incompatible engine version.
    #[error("unsupported snapshot version {found} (supported: {supported})")]
    SnapshotVersion {
        /// Version found in the snapshot.
        found: u32,
        /// Version this build reads and writes.
        supported: u32,
    },

    /// A snapshot referenced a dynamic missing from the loaded content pool.
    #[error("snapshot references unknown dynamic \"{0}\"")]
    UnknownDynamic(DynamicId),

    /// Snapshot bytes could not be encoded or decoded.
    #[error(transparent)]
    Codec(#[from] bincode::Error),
}

/// Content schema violations, detected when a pool is loaded.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Two dynamics share an id.
    #[error("duplicate dynamic id \"{0}\"")]
    DuplicateDynamic(String),

    /// Two questions within one dynamic share an id.
    #[error("duplicate question id \"{question}\" in dynamic \"{dynamic}\"")]
    DuplicateQuestion {
        /// The offending dynamic.
        dynamic: String,
        /// The repeated question id.
        question: String,
    },

    /// A dynamic was declared with no questions.
    #[error("dynamic \"{0}\" has no questions")]
    EmptyDynamic(String),

    /// Content JSON failed to parse.
    #[error("malformed content: {0}")]
    Malformed(String),
}
