//! Positions, directions and the pure predicates every strategy is built from.

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::snake::Snake;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Position { x, y }
    }
}

impl Add<Direction> for Position {
    type Output = Position;

    fn add(self, rhs: Direction) -> Position {
        let (dx, dy) = rhs.delta();
        Position::new(self.x + dx, self.y + dy)
    }
}

impl Sub for Position {
    type Output = (i32, i32);

    fn sub(self, rhs: Position) -> (i32, i32) {
        (self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Iteration order for every strategy. Only tie-breaking depends on it.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    #[inline(always)]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn from_delta(delta: (i32, i32)) -> Option<Direction> {
        Direction::ALL.into_iter().find(|dir| dir.delta() == delta)
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Board dimensions, fixed for the lifetime of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawGridSize")]
pub struct GridSize {
    width: i32,
    height: i32,
}

#[derive(Deserialize)]
struct RawGridSize {
    width: i32,
    height: i32,
}

impl TryFrom<RawGridSize> for GridSize {
    type Error = EngineError;

    fn try_from(raw: RawGridSize) -> Result<Self, Self::Error> {
        GridSize::new(raw.width, raw.height)
    }
}

impl GridSize {
    pub fn new(width: i32, height: i32) -> Result<Self, EngineError> {
        if width <= 0 || height <= 0 {
            return Err(EngineError::InvalidGrid { width, height });
        }
        Ok(GridSize { width, height })
    }

    pub const fn width(&self) -> i32 {
        self.width
    }

    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Number of cells. Also the "never reached" score of the pruned search.
    pub const fn area(&self) -> u32 {
        (self.width as u32) * (self.height as u32)
    }

    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }

    pub(crate) fn index_of(&self, pos: Position) -> usize {
        (pos.y * self.width + pos.x) as usize
    }
}

impl Default for GridSize {
    fn default() -> Self {
        GridSize {
            width: 16,
            height: 16,
        }
    }
}

#[inline]
pub fn is_on_grid(pos: Position, size: GridSize) -> bool {
    (0..size.width).contains(&pos.x) && (0..size.height).contains(&pos.y)
}

/// True if `pos` is occupied by any segment of any of `snakes`.
pub fn collides(pos: Position, snakes: &[&Snake]) -> bool {
    snakes.iter().any(|snake| snake.collides(pos))
}

/// Manhattan distance.
#[inline]
pub fn distance(a: Position, b: Position) -> u32 {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

pub fn min_distance(pos: Position, targets: &[Position]) -> Result<u32, EngineError> {
    targets
        .iter()
        .map(|&target| distance(pos, target))
        .min()
        .ok_or(EngineError::EmptyTargetSet)
}

/// A position that is on the grid and free of both snakes.
#[inline]
pub(crate) fn is_free(pos: Position, size: GridSize, snakes: &[&Snake]) -> bool {
    is_on_grid(pos, size) && !collides(pos, snakes)
}
