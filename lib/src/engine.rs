//! Top-level move selection: suicide shortcut, then the configured candy
//! strategy, then the safety filter.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use tracing::debug;

use crate::astar::first_step_to_candy;
use crate::config::{EngineConfig, Strategy};
use crate::error::EngineError;
use crate::grid::{Direction, Position, distance};
use crate::safety::{SafeMoves, SafetyTier, safe_moves};
use crate::search::search;
use crate::snake::Snake;

/// Why a direction was picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    Suicide,
    Greedy,
    Pathfinder,
    Search { score: u32, paths: u64 },
    Safety(SafetyTier),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub direction: Direction,
    pub source: DecisionSource,
}

/// Stateless between turns apart from the optional tie-break generator.
pub struct Engine {
    name: String,
    config: EngineConfig,
    rng: Option<StdRng>,
}

impl Engine {
    /// A deterministic engine: ties go to the first candidate in
    /// [`Direction::ALL`] order.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            name: format!("engine-{}", config.strategy),
            config,
            rng: None,
        }
    }

    /// Breaks safety-filter ties uniformly at random.
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Some(rng);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Picks the next move for `own`. Only the first opponent is consulted.
    pub fn decide(
        &mut self,
        own: &Snake,
        opponents: &[Snake],
        candies: &[Position],
    ) -> Result<Direction, EngineError> {
        self.decide_with_reason(own, opponents, candies)
            .map(|decision| decision.direction)
    }

    pub fn decide_with_reason(
        &mut self,
        own: &Snake,
        opponents: &[Snake],
        candies: &[Position],
    ) -> Result<Decision, EngineError> {
        let opponent = opponents.first().ok_or(EngineError::NoOpponent)?;

        if self.config.suicide_shortcut && own.len() > opponent.len() * 2 {
            if let Some(direction) = own
                .neck()
                .and_then(|neck| Direction::from_delta(neck - own.head()))
            {
                debug!(own = own.len(), opponent = opponent.len(), %direction, "taking the suicide shortcut");
                return Ok(Decision {
                    direction,
                    source: DecisionSource::Suicide,
                });
            }
        }

        let size = self.config.grid;
        let preferred = match self.config.strategy {
            Strategy::Safe => None,
            Strategy::Greedy => greedy(own, &safe_moves(own, opponent, size), candies).map(|direction| Decision {
                direction,
                source: DecisionSource::Greedy,
            }),
            Strategy::Astar => match first_step_to_candy(own, opponent, candies, size) {
                Ok(direction) => Some(Decision {
                    direction,
                    source: DecisionSource::Pathfinder,
                }),
                Err(err) => {
                    debug!(%err, "pathfinder failed");
                    None
                }
            },
            Strategy::Search => {
                let outcome = search(own, opponent, candies, size, self.config.budget);
                let best = outcome.best();
                if best.is_none() {
                    debug!(nodes = outcome.nodes_visited, "search reached no candy");
                }
                best.map(|branch| Decision {
                    direction: branch.first_move,
                    source: DecisionSource::Search {
                        score: branch.best_score,
                        paths: branch.path_count,
                    },
                })
            }
        };

        let decision = match preferred {
            Some(decision) => decision,
            None => {
                let safe = safe_moves(own, opponent, size);
                Decision {
                    direction: self.tie_break(&safe.moves),
                    source: DecisionSource::Safety(safe.tier),
                }
            }
        };
        debug!(strategy = %self.config.strategy, direction = %decision.direction, source = ?decision.source, "decided");
        Ok(decision)
    }

    fn tie_break(&mut self, moves: &[Direction]) -> Direction {
        let picked = match self.rng.as_mut() {
            Some(rng) => moves.choose(rng),
            None => moves.first(),
        };
        picked.copied().unwrap_or_default()
    }
}

/// The first move of the best safety tier that strictly shortens the
/// distance to the nearest candy.
fn greedy(own: &Snake, safe: &SafeMoves, candies: &[Position]) -> Option<Direction> {
    let head = own.head();
    let candy = candies.iter().copied().min_by_key(|&candy| distance(head, candy))?;
    let before = distance(head, candy);
    safe.moves
        .iter()
        .copied()
        .find(|&dir| distance(head + dir, candy) < before)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSize;
    use crate::search::SearchBudget;

    fn snake(cells: &[(i32, i32)]) -> Snake {
        Snake::new(cells.iter().copied().map(Position::from)).unwrap()
    }

    fn engine(width: i32, height: i32, strategy: Strategy) -> Engine {
        Engine::new(EngineConfig::new(GridSize::new(width, height).unwrap(), strategy))
    }

    #[test]
    fn test_suicide_shortcut_reverses_into_neck() {
        let me = snake(&[(3, 3), (3, 2), (3, 1), (2, 1), (1, 1), (0, 1)]);
        let opponent = snake(&[(6, 6), (6, 5)]);
        for strategy in Strategy::ALL {
            let decision = engine(8, 8, strategy)
                .decide_with_reason(&me, &[opponent.clone()], &[Position::new(3, 5)])
                .unwrap();
            assert_eq!(decision.direction, Direction::Down);
            assert_eq!(decision.source, DecisionSource::Suicide);
            assert_eq!(me.head() + decision.direction, me.neck().unwrap());
        }
    }

    #[test]
    fn test_suicide_needs_strictly_more_than_double() {
        let me = snake(&[(3, 3), (3, 2), (3, 1), (2, 1)]);
        let opponent = snake(&[(6, 6), (6, 5)]);
        let decision = engine(8, 8, Strategy::Astar)
            .decide_with_reason(&me, &[opponent], &[Position::new(3, 5)])
            .unwrap();
        assert_eq!(decision.source, DecisionSource::Pathfinder);
        assert_eq!(decision.direction, Direction::Up);
    }

    #[test]
    fn test_suicide_can_be_disabled() {
        let me = snake(&[(3, 3), (3, 2), (3, 1), (2, 1), (1, 1), (0, 1)]);
        let opponent = snake(&[(6, 6), (6, 5)]);
        let config = EngineConfig::new(GridSize::new(8, 8).unwrap(), Strategy::Search)
            .with_suicide_shortcut(false);
        let direction = Engine::new(config)
            .decide(&me, &[opponent], &[Position::new(3, 5)])
            .unwrap();
        assert_eq!(direction, Direction::Up);
    }

    #[test]
    fn test_search_strategy_heads_for_candy() {
        let me = snake(&[(2, 2)]);
        let opponent = snake(&[(0, 0)]);
        let decision = engine(5, 5, Strategy::Search)
            .decide_with_reason(&me, &[opponent], &[Position::new(2, 4)])
            .unwrap();
        assert_eq!(decision.direction, Direction::Up);
        assert_eq!(decision.source, DecisionSource::Search { score: 2, paths: 1 });
    }

    #[test]
    fn test_greedy_takes_first_approaching_safe_move() {
        let me = snake(&[(2, 2), (2, 3)]);
        let opponent = snake(&[(0, 0)]);
        let decision = engine(5, 5, Strategy::Greedy)
            .decide_with_reason(&me, &[opponent], &[Position::new(4, 4), Position::new(4, 1)])
            .unwrap();
        // (4,1) is nearest; Down comes before Right in enumeration order.
        assert_eq!(decision.direction, Direction::Down);
        assert_eq!(decision.source, DecisionSource::Greedy);
    }

    #[test]
    fn test_no_candies_falls_back_to_safety_filter() {
        let me = snake(&[(0, 0), (1, 0)]);
        let opponent = snake(&[(4, 4)]);
        for strategy in Strategy::ALL {
            let decision = engine(5, 5, strategy)
                .decide_with_reason(&me, &[opponent.clone()], &[])
                .unwrap();
            assert_eq!(decision.direction, Direction::Up);
            assert_eq!(decision.source, DecisionSource::Safety(SafetyTier::NoDeadEnd));
        }
    }

    #[test]
    fn test_unreachable_candy_falls_back_to_open_space() {
        // Same pocket layout as the safety filter test; the candy sits in a
        // sealed corner.
        let me = snake(&[(2, 2)]);
        let opponent = snake(&[
            (1, 4),
            (2, 4),
            (3, 3),
            (3, 1),
            (2, 0),
            (1, 0),
            (0, 1),
            (0, 3),
            (0, 2),
            (1, 1),
            (1, 3),
        ]);
        let candies = [Position::new(0, 0)];
        for strategy in [Strategy::Astar, Strategy::Search, Strategy::Safe] {
            let mut engine = engine(6, 5, strategy);
            engine.config.budget = SearchBudget {
                max_nodes: 5_000,
                ..SearchBudget::default()
            };
            let decision = engine.decide_with_reason(&me, &[opponent.clone()], &candies).unwrap();
            assert_eq!(decision.direction, Direction::Right, "strategy {strategy}");
            assert_eq!(decision.source, DecisionSource::Safety(SafetyTier::NoDeadEnd));
        }
    }

    #[test]
    fn test_decide_is_idempotent_without_rng() {
        let me = snake(&[(4, 4), (4, 3), (3, 3)]);
        let opponents = [snake(&[(6, 6), (6, 5), (6, 4)])];
        let candies = [Position::new(1, 7), Position::new(7, 1)];
        for strategy in Strategy::ALL {
            let mut engine = engine(8, 8, strategy);
            let first = engine.decide(&me, &opponents, &candies).unwrap();
            let second = engine.decide(&me, &opponents, &candies).unwrap();
            assert_eq!(first, second, "strategy {strategy}");
        }
    }

    #[test]
    fn test_seeded_tie_break_stays_in_best_tier() {
        let me = snake(&[(2, 2)]);
        let opponent = snake(&[(0, 0)]);
        let mut engine = engine(5, 5, Strategy::Safe).with_seed(7);
        for _ in 0..32 {
            let direction = engine.decide(&me, &[opponent.clone()], &[]).unwrap();
            assert!(Direction::ALL.contains(&direction));
        }
        let me = snake(&[(0, 0), (0, 1)]);
        let opponent = snake(&[(4, 4)]);
        for _ in 0..32 {
            assert_eq!(engine.decide(&me, &[opponent.clone()], &[]).unwrap(), Direction::Right);
        }
    }

    #[test]
    fn test_injected_rng_spreads_ties_across_safe_moves() {
        let me = snake(&[(2, 2)]);
        let opponent = snake(&[(0, 0)]);
        let mut engine = engine(5, 5, Strategy::Safe).with_rng(StdRng::seed_from_u64(3));
        let mut seen = Vec::new();
        for _ in 0..64 {
            let direction = engine.decide(&me, &[opponent.clone()], &[]).unwrap();
            if !seen.contains(&direction) {
                seen.push(direction);
            }
        }
        assert!(seen.len() > 1, "always picked {seen:?}");
    }

    #[test]
    fn test_missing_opponent_is_rejected() {
        let me = snake(&[(1, 1)]);
        assert_eq!(
            engine(3, 3, Strategy::Search).decide(&me, &[], &[]),
            Err(EngineError::NoOpponent)
        );
    }
}
