use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::GridSize;
use crate::search::SearchBudget;

/// Which candy-seeking policy runs before the safety fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Safety filter only, ties broken at random.
    Safe,
    /// First safe move that gets closer to the nearest candy.
    Greedy,
    /// First step of an A* path to the nearest reachable candy.
    Astar,
    /// Bounded pruned search over move sequences.
    #[default]
    Search,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Safe,
        Strategy::Greedy,
        Strategy::Astar,
        Strategy::Search,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Safe => "safe",
            Strategy::Greedy => "greedy",
            Strategy::Astar => "astar",
            Strategy::Search => "search",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown strategy `{0}`, expected one of safe, greedy, astar, search")]
pub struct UnknownStrategy(pub String);

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}

/// Everything an [`crate::Engine`] needs to know before the first turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub grid: GridSize,
    pub strategy: Strategy,
    /// Reverse into our own neck once we are more than twice the opponent's length.
    pub suicide_shortcut: bool,
    pub budget: SearchBudget,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(GridSize::default(), Strategy::default())
    }
}

impl EngineConfig {
    pub fn new(grid: GridSize, strategy: Strategy) -> Self {
        Self {
            grid,
            strategy,
            suicide_shortcut: true,
            budget: SearchBudget::default(),
        }
    }

    pub fn with_budget(mut self, budget: SearchBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_suicide_shortcut(mut self, enabled: bool) -> Self {
        self.suicide_shortcut = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("astar".parse::<Strategy>(), Ok(Strategy::Astar));
        assert_eq!(" Search ".parse::<Strategy>(), Ok(Strategy::Search));
        let err = "minimax".parse::<Strategy>().unwrap_err();
        assert_eq!(err, UnknownStrategy("minimax".to_string()));
        assert_eq!(
            err.to_string(),
            "unknown strategy `minimax`, expected one of safe, greedy, astar, search"
        );
    }

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"grid":{"width":8,"height":6},"strategy":"greedy"}"#).unwrap();
        assert_eq!(config.grid, GridSize::new(8, 6).unwrap());
        assert_eq!(config.strategy, Strategy::Greedy);
        assert!(config.suicide_shortcut);
        assert_eq!(config.budget, SearchBudget::default());
    }
}
