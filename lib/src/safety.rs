//! Tiered filtering of the four moves: on the grid, then collision free,
//! then not walking into a pocket with no follow-up move.

use serde::Serialize;

use crate::grid::{Direction, GridSize, is_free, is_on_grid};
use crate::snake::Snake;

/// How much a set of moves is guaranteed to keep the snake alive.
/// Ordered weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyTier {
    /// Nothing stays on the grid, every move is returned.
    Unrestricted,
    OnGrid,
    CollisionFree,
    /// Collision free and at least one legal move afterwards.
    NoDeadEnd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeMoves {
    pub tier: SafetyTier,
    /// Never empty, in [`Direction::ALL`] order.
    pub moves: Vec<Direction>,
}

/// Returns the most refined non-empty tier of moves for `snake`.
pub fn safe_moves(snake: &Snake, opponent: &Snake, size: GridSize) -> SafeMoves {
    let head = snake.head();
    let blockers = [snake, opponent];

    let on_grid: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|&dir| is_on_grid(head + dir, size))
        .collect();
    if on_grid.is_empty() {
        return SafeMoves {
            tier: SafetyTier::Unrestricted,
            moves: Direction::ALL.to_vec(),
        };
    }

    let collision_free: Vec<Direction> = on_grid
        .iter()
        .copied()
        .filter(|&dir| is_free(head + dir, size, &blockers))
        .collect();

    let no_dead_end: Vec<Direction> = collision_free
        .iter()
        .copied()
        .filter(|&dir| {
            let next = head + dir;
            Direction::ALL
                .into_iter()
                .any(|second| is_free(next + second, size, &blockers))
        })
        .collect();

    if !no_dead_end.is_empty() {
        SafeMoves {
            tier: SafetyTier::NoDeadEnd,
            moves: no_dead_end,
        }
    } else if !collision_free.is_empty() {
        SafeMoves {
            tier: SafetyTier::CollisionFree,
            moves: collision_free,
        }
    } else {
        SafeMoves {
            tier: SafetyTier::OnGrid,
            moves: on_grid,
        }
    }
}
