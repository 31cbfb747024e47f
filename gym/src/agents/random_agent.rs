use candy_engine::{Agent, Direction, GridSize, Position, Snake, is_on_grid};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

/// A simple agent that picks a random on-grid move each turn.
/// Useful as a baseline for benchmarking.
pub struct RandomAgent {
    name: String,
    grid: GridSize,
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(grid: GridSize, seed: u64) -> Self {
        Self {
            name: "Random".to_string(),
            grid,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_move(&mut self, you: &Snake, _opponents: &[Snake], _candies: &[Position]) -> Direction {
        let on_grid: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|&dir| is_on_grid(you.head() + dir, self.grid))
            .collect();

        // Last resort: any direction (the grid is a single cell)
        match on_grid.choose(&mut self.rng) {
            Some(&dir) => dir,
            None => Direction::ALL[self.rng.random_range(0..4)],
        }
    }
}
