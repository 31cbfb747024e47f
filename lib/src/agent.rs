use tracing::error;

use crate::engine::Engine;
use crate::grid::{Direction, Position, is_on_grid};
use crate::snake::Snake;

/// Trait that defines a snake agent's decision-making interface.
pub trait Agent: Send {
    /// Returns the name of this agent for display purposes.
    fn name(&self) -> &str;

    /// Choose a move for `you`. Must always answer, even on bad input.
    fn choose_move(&mut self, you: &Snake, opponents: &[Snake], candies: &[Position]) -> Direction;

    /// Optional: Reset any internal state between games.
    fn reset(&mut self) {}
}

impl Agent for Box<dyn Agent> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn choose_move(&mut self, you: &Snake, opponents: &[Snake], candies: &[Position]) -> Direction {
        (**self).choose_move(you, opponents, candies)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

impl Agent for Engine {
    fn name(&self) -> &str {
        Engine::name(self)
    }

    fn choose_move(&mut self, you: &Snake, opponents: &[Snake], candies: &[Position]) -> Direction {
        match self.decide(you, opponents, candies) {
            Ok(direction) => direction,
            Err(err) => {
                error!(agent = self.name(), %err, "cannot decide, taking any on-grid move");
                let grid = self.config().grid;
                Direction::ALL
                    .into_iter()
                    .find(|&dir| is_on_grid(you.head() + dir, grid))
                    .unwrap_or_default()
            }
        }
    }
}
