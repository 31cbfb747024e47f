use thiserror::Error;

/// Everything that can go wrong while deciding a move.
///
/// `EmptyTargetSet` and `NoCandyReachable` never leave [`crate::Engine::decide`],
/// they only steer it towards the safety fallback. The remaining variants
/// describe malformed input and are returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("cannot measure a distance to an empty set of targets")]
    EmptyTargetSet,
    #[error("no candy is reachable from the current head")]
    NoCandyReachable,
    #[error("grid must have a positive size, got {width}x{height}")]
    InvalidGrid { width: i32, height: i32 },
    #[error("a snake needs at least one segment")]
    EmptySnake,
    #[error("at least one opponent snake is required")]
    NoOpponent,
}
