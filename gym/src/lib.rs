//! Candy Gym - A benchmarking framework for candy-engine strategies

pub mod agents;
pub mod runner;
pub mod stats;

pub use agents::{Agent, Engine, RandomAgent};
pub use runner::{AgentKind, GameConfig, Match, run_duel, run_game};
pub use stats::{AgentStats, GameResult, HeadToHeadStats, TournamentStats};
