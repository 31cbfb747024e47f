use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::grid::{Direction, Position};

/// An ordered body, head first. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Position>", into = "Vec<Position>")]
pub struct Snake {
    body: VecDeque<Position>,
}

impl Snake {
    pub fn new(body: impl IntoIterator<Item = Position>) -> Result<Self, EngineError> {
        let body: VecDeque<Position> = body.into_iter().collect();
        if body.is_empty() {
            return Err(EngineError::EmptySnake);
        }
        Ok(Snake { body })
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// The segment right behind the head, if the snake has one.
    pub fn neck(&self) -> Option<Position> {
        self.body.get(1).copied()
    }

    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Always false; kept for the `len`/`is_empty` pair.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = Position> + '_ {
        self.body.iter().copied()
    }

    pub fn collides(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Regular movement: new head at `head + dir`, tail dropped.
    pub fn move_towards(&mut self, dir: Direction) {
        self.grow_towards(dir);
        self.body.pop_back();
    }

    /// Movement onto a candy: new head, tail kept.
    pub fn grow_towards(&mut self, dir: Direction) {
        let head = self.head() + dir;
        self.body.push_front(head);
    }

    /// A copy of this snake after one regular move. The original is untouched.
    pub fn advanced(&self, dir: Direction) -> Snake {
        let mut next = self.clone();
        next.move_towards(dir);
        next
    }
}

impl TryFrom<Vec<Position>> for Snake {
    type Error = EngineError;

    fn try_from(body: Vec<Position>) -> Result<Self, Self::Error> {
        Snake::new(body)
    }
}

impl From<Snake> for Vec<Position> {
    fn from(snake: Snake) -> Self {
        snake.body.into()
    }
}
