//! Move-decision engine for a snake competing against one opponent on a
//! bounded grid with candies.

pub mod agent;
pub mod astar;
pub mod config;
pub mod engine;
mod error;
pub mod grid;
pub mod safety;
pub mod search;
mod snake;

pub use agent::Agent;
pub use config::{EngineConfig, Strategy};
pub use engine::{Decision, DecisionSource, Engine};
pub use error::EngineError;
pub use grid::{Direction, GridSize, Position, collides, distance, is_on_grid, min_distance};
pub use safety::{SafeMoves, SafetyTier, safe_moves};
pub use search::{BranchResult, SearchBudget, SearchOutcome, search};
pub use snake::Snake;
