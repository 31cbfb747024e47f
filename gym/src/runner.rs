use std::fmt;
use std::str::FromStr;

use candy_engine::{
    Agent, Direction, Engine, EngineConfig, EngineError, GridSize, Position, SearchBudget, Snake,
    Strategy, is_on_grid,
};
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, trace};

use crate::agents::RandomAgent;
use crate::stats::GameResult;

/// Configuration for game generation
#[derive(Clone, Debug)]
pub struct GameConfig {
    pub width: i32,
    pub height: i32,
    pub initial_length: usize,
    pub num_candies: usize,
    pub max_turns: u32,
    pub budget: SearchBudget,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 11,
            height: 11,
            initial_length: 3,
            num_candies: 3,
            max_turns: 500,
            budget: SearchBudget::default(),
        }
    }
}

impl GameConfig {
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn grid(&self) -> Result<GridSize, EngineError> {
        GridSize::new(self.width, self.height)
    }
}

/// Which agent sits in a seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AgentKind {
    Random,
    Engine(Strategy),
}

impl AgentKind {
    pub fn create(self, config: &GameConfig, seed: u64) -> Result<Box<dyn Agent>, EngineError> {
        let grid = config.grid()?;
        Ok(match self {
            AgentKind::Random => Box::new(RandomAgent::new(grid, seed)),
            AgentKind::Engine(strategy) => Box::new(
                Engine::new(EngineConfig::new(grid, strategy).with_budget(config.budget))
                    .with_seed(seed),
            ),
        })
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentKind::Random => f.write_str("random"),
            AgentKind::Engine(strategy) => write!(f, "{strategy}"),
        }
    }
}

impl FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("random") {
            return Ok(AgentKind::Random);
        }
        s.parse::<Strategy>()
            .map(AgentKind::Engine)
            .map_err(|_| format!("unknown agent `{s}`, expected random, safe, greedy, astar or search"))
    }
}

/// A two-snake game on a bounded grid.
pub struct Match {
    grid: GridSize,
    snakes: Vec<Snake>,
    alive: Vec<bool>,
    candies: Vec<Position>,
    turn: u32,
    rng: StdRng,
}

impl Match {
    /// Snakes start at a quarter and three quarters of the width, bodies
    /// trailing downwards. The starting length is capped so the body fits
    /// between the middle row and the bottom edge.
    pub fn new(config: &GameConfig, seed: u64) -> Result<Self, EngineError> {
        let grid = config.grid()?;
        let y = grid.height() / 2;
        let length = (config.initial_length as i32).clamp(1, y + 1);
        let snakes = [grid.width() / 4, grid.width() * 3 / 4]
            .into_iter()
            .map(|x| Snake::new((0..length).map(|i| Position::new(x, y - i))))
            .collect::<Result<Vec<_>, _>>()?;
        let mut game = Self::from_parts(grid, snakes, Vec::new(), seed);
        for _ in 0..config.num_candies {
            game.spawn_candy();
        }
        Ok(game)
    }

    pub fn from_parts(grid: GridSize, snakes: Vec<Snake>, candies: Vec<Position>, seed: u64) -> Self {
        Self {
            grid,
            alive: vec![true; snakes.len()],
            snakes,
            candies,
            turn: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn snakes(&self) -> &[Snake] {
        &self.snakes
    }

    pub fn candies(&self) -> &[Position] {
        &self.candies
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn is_alive(&self, seat: usize) -> bool {
        self.alive[seat]
    }

    pub fn is_over(&self) -> bool {
        self.alive.iter().any(|alive| !alive)
    }

    /// Everyone but `seat`, in seat order.
    pub fn opponents_of(&self, seat: usize) -> Vec<Snake> {
        self.snakes
            .iter()
            .enumerate()
            .filter(|&(other, _)| other != seat)
            .map(|(_, snake)| snake.clone())
            .collect()
    }

    /// Moves every snake at once, feeds them, then resolves collisions.
    pub fn step(&mut self, moves: &[Direction]) {
        let mut eaten = Vec::new();
        for (snake, &dir) in self.snakes.iter_mut().zip(moves) {
            let target = snake.head() + dir;
            if self.candies.contains(&target) {
                snake.grow_towards(dir);
                eaten.push(target);
            } else {
                snake.move_towards(dir);
            }
        }

        for seat in 0..self.snakes.len() {
            let head = self.snakes[seat].head();
            let hit = !is_on_grid(head, self.grid)
                || self.snakes.iter().enumerate().any(|(other, snake)| {
                    let skip = usize::from(other == seat);
                    snake.segments().skip(skip).any(|segment| segment == head)
                });
            if hit {
                debug!(seat, turn = self.turn, %head, "snake died");
                self.alive[seat] = false;
            }
        }

        self.candies.retain(|candy| !eaten.contains(candy));
        for _ in 0..eaten.len() {
            self.spawn_candy();
        }
        self.turn += 1;
    }

    /// A survivor scores twice its length, a dead snake only its length.
    pub fn scores(&self) -> Vec<usize> {
        self.snakes
            .iter()
            .zip(&self.alive)
            .map(|(snake, &alive)| if alive { snake.len() * 2 } else { snake.len() })
            .collect()
    }

    /// The seat with the strictly highest score, if any.
    pub fn winner(&self) -> Option<usize> {
        let scores = self.scores();
        let best = *scores.iter().max()?;
        let mut leaders = scores.iter().enumerate().filter(|&(_, &score)| score == best);
        match (leaders.next(), leaders.next()) {
            (Some((seat, _)), None) => Some(seat),
            _ => None,
        }
    }

    fn spawn_candy(&mut self) {
        let free: Vec<Position> = self
            .grid
            .cells()
            .filter(|cell| !self.candies.contains(cell))
            .filter(|&cell| !self.snakes.iter().any(|snake| snake.collides(cell)))
            .collect();
        if let Some(&cell) = free.choose(&mut self.rng) {
            self.candies.push(cell);
        }
    }
}

/// Runs a single game with the given agents, one per seat.
pub fn run_game(
    agents: &mut [Box<dyn Agent>],
    config: &GameConfig,
    seed: u64,
) -> Result<GameResult, EngineError> {
    let mut game = Match::new(config, seed)?;
    for agent in agents.iter_mut() {
        agent.reset();
    }

    while !game.is_over() && game.turn() < config.max_turns {
        let moves: Vec<Direction> = agents
            .iter_mut()
            .enumerate()
            .map(|(seat, agent)| {
                let opponents = game.opponents_of(seat);
                agent.choose_move(&game.snakes()[seat], &opponents, game.candies())
            })
            .collect();
        trace!(turn = game.turn(), ?moves, "turn");
        game.step(&moves);
    }

    Ok(GameResult {
        winner: game.winner(),
        turns: game.turn(),
        final_lengths: game.snakes().iter().map(Snake::len).collect(),
        survivors: (0..game.snakes().len()).map(|seat| game.is_alive(seat)).collect(),
    })
}

/// Builds fresh agents for both seats and plays one game.
pub fn run_duel(
    kinds: [AgentKind; 2],
    config: &GameConfig,
    seed: u64,
) -> Result<GameResult, EngineError> {
    let mut seeds = StdRng::seed_from_u64(seed);
    let mut agents = kinds
        .iter()
        .map(|kind| kind.create(config, seeds.random()))
        .collect::<Result<Vec<_>, _>>()?;
    run_game(&mut agents, config, seeds.random())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snake(cells: &[(i32, i32)]) -> Snake {
        Snake::new(cells.iter().copied().map(Position::from)).unwrap()
    }

    #[test]
    fn test_new_match_places_snakes_and_candies() {
        let config = GameConfig::default();
        let game = Match::new(&config, 1).unwrap();
        assert_eq!(game.snakes()[0].head(), Position::new(2, 5));
        assert_eq!(game.snakes()[1].head(), Position::new(8, 5));
        assert_eq!(game.snakes()[0].len(), 3);
        assert_eq!(game.candies().len(), 3);
        for candy in game.candies() {
            assert!(!game.snakes().iter().any(|s| s.collides(*candy)));
        }
    }

    #[test]
    fn test_initial_length_is_capped_by_the_grid() {
        let config = GameConfig {
            width: 6,
            height: 6,
            initial_length: 10,
            ..GameConfig::default()
        };
        let game = Match::new(&config, 2).unwrap();
        for snake in game.snakes() {
            assert_eq!(snake.len(), 4);
            let cells: Vec<Position> = snake.segments().collect();
            for (i, cell) in cells.iter().enumerate() {
                assert!(!cells[i + 1..].contains(cell), "stacked segment at {cell}");
            }
            assert_eq!(snake.tail().y, 0);
        }
    }

    #[test]
    fn test_eating_grows_and_respawns() {
        let grid = GridSize::new(6, 6).unwrap();
        let mut game = Match::from_parts(
            grid,
            vec![snake(&[(1, 1), (1, 0)]), snake(&[(4, 4), (4, 5)])],
            vec![Position::new(1, 2)],
            3,
        );
        game.step(&[Direction::Up, Direction::Down]);
        assert_eq!(game.snakes()[0].len(), 3);
        assert_eq!(game.snakes()[1].len(), 2);
        assert_eq!(game.candies().len(), 1);
        assert_ne!(game.candies()[0], Position::new(1, 2));
        assert!(!game.is_over());
    }

    #[test]
    fn test_leaving_the_grid_kills() {
        let grid = GridSize::new(4, 4).unwrap();
        let mut game = Match::from_parts(grid, vec![snake(&[(0, 0)]), snake(&[(3, 3)])], vec![], 0);
        game.step(&[Direction::Left, Direction::Down]);
        assert!(!game.is_alive(0));
        assert!(game.is_alive(1));
        assert_eq!(game.winner(), Some(1));
    }

    #[test]
    fn test_head_to_head_kills_both() {
        let grid = GridSize::new(5, 5).unwrap();
        let mut game = Match::from_parts(grid, vec![snake(&[(1, 2)]), snake(&[(3, 2)])], vec![], 0);
        game.step(&[Direction::Right, Direction::Left]);
        assert!(!game.is_alive(0));
        assert!(!game.is_alive(1));
        assert_eq!(game.winner(), None);
    }

    #[test]
    fn test_suicide_wins_when_more_than_twice_as_long() {
        let grid = GridSize::new(8, 8).unwrap();
        let long = snake(&[(3, 3), (3, 2), (3, 1), (2, 1), (1, 1)]);
        let short = snake(&[(6, 6), (6, 5)]);
        let mut game = Match::from_parts(grid, vec![long, short], vec![], 0);
        game.step(&[Direction::Down, Direction::Up]);
        assert!(!game.is_alive(0));
        assert_eq!(game.scores(), vec![5, 4]);
        assert_eq!(game.winner(), Some(0));
    }

    #[test]
    fn test_agent_kind_parsing() {
        assert_eq!("random".parse::<AgentKind>(), Ok(AgentKind::Random));
        assert_eq!("astar".parse::<AgentKind>(), Ok(AgentKind::Engine(Strategy::Astar)));
        assert!("mcts".parse::<AgentKind>().is_err());
    }

    #[test]
    fn test_duel_finishes_within_turn_cap() {
        let config = GameConfig {
            width: 7,
            height: 7,
            budget: SearchBudget {
                max_nodes: 2_000,
                ..SearchBudget::default()
            },
            ..GameConfig::default()
        }
        .with_max_turns(60);
        let result = run_duel(
            [AgentKind::Engine(Strategy::Search), AgentKind::Random],
            &config,
            11,
        )
        .unwrap();
        assert!(result.turns <= 60);
        assert_eq!(result.final_lengths.len(), 2);
    }

    #[test]
    fn test_duel_is_reproducible_from_seed() {
        let config = GameConfig::default().with_max_turns(80);
        let kinds = [AgentKind::Engine(Strategy::Greedy), AgentKind::Engine(Strategy::Astar)];
        let first = run_duel(kinds, &config, 5).unwrap();
        let second = run_duel(kinds, &config, 5).unwrap();
        assert_eq!(first, second);
    }
}
