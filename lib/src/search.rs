//! Bounded, pruned depth-first search over move sequences.
//!
//! For every first move we look for the fewest steps to any candy and count
//! how many distinct minimal routes were found. A move is kept when its lower
//! bound (steps so far + distance to the nearest candy) is strictly better
//! than the best score recorded for its first move at the time the bound is
//! taken; every kept move is explored, so routes tying a score found later by
//! a sibling still add to the path count. The four first moves never share a
//! bound, so they are searched in parallel.

use std::cmp::Reverse;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::grid::{Direction, GridSize, Position, is_free, is_on_grid, min_distance};
use crate::snake::Snake;

/// Limits that keep a single decision bounded on adversarial boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchBudget {
    /// Deepest move sequence explored. `None` caps it at the grid area,
    /// which no simple path can exceed.
    pub max_depth: Option<u32>,
    /// Nodes expanded per first move.
    pub max_nodes: u64,
    /// Wall-clock limit for the whole search.
    #[serde(with = "millis")]
    pub time_limit: Option<Duration>,
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self {
            max_depth: None,
            max_nodes: 250_000,
            time_limit: None,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&(d.as_millis() as u64)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
    }
}

/// Best known route to a candy for one first move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BranchResult {
    pub first_move: Direction,
    /// Steps to the closest candy found, or the grid area if none was reached.
    pub best_score: u32,
    pub path_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// One entry per direction, in [`Direction::ALL`] order.
    pub branches: Vec<BranchResult>,
    /// The "never reached" score.
    pub sentinel: u32,
    pub nodes_visited: u64,
    pub budget_exhausted: bool,
}

impl SearchOutcome {
    /// Lowest score first, then most paths, then enumeration order.
    /// `None` when no branch reached a candy.
    pub fn best(&self) -> Option<BranchResult> {
        self.branches
            .iter()
            .filter(|branch| branch.best_score < self.sentinel)
            .min_by_key(|branch| (branch.best_score, Reverse(branch.path_count)))
            .copied()
    }
}

struct Explorer<'a> {
    opponent: &'a Snake,
    candies: &'a [Position],
    size: GridSize,
    budget: SearchBudget,
    max_depth: u32,
    deadline: Option<Instant>,
    /// Cells on the current branch, indexed by `GridSize::index_of`.
    visited: Vec<bool>,
    result: BranchResult,
    nodes: u64,
    exhausted: bool,
}

impl Explorer<'_> {
    fn out_of_budget(&mut self, depth: u32) -> bool {
        if self.exhausted {
            return true;
        }
        let over = depth >= self.max_depth
            || self.nodes >= self.budget.max_nodes
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline);
        self.exhausted = over;
        over
    }

    /// Records reaching a candy in `score` steps.
    fn record(&mut self, score: u32) {
        if score < self.result.best_score {
            self.result.best_score = score;
            self.result.path_count = 1;
        } else if score == self.result.best_score {
            self.result.path_count += 1;
        }
    }

    /// Expands `snake` whose head sits `depth` steps away from the real head.
    fn explore(&mut self, snake: Snake, depth: u32) {
        if self.out_of_budget(depth) {
            return;
        }
        self.nodes += 1;

        let head = snake.head();
        let mut candidates: Vec<(u32, Direction, Position)> = Vec::with_capacity(4);
        for dir in Direction::ALL {
            let next = head + dir;
            if !is_free(next, self.size, &[&snake, self.opponent])
                || self.visited[self.size.index_of(next)]
            {
                continue;
            }
            if self.candies.contains(&next) {
                self.record(depth + 1);
                continue;
            }
            // candies is never empty here, checked by `search`.
            let Ok(to_candy) = min_distance(next, self.candies) else {
                continue;
            };
            let bound = depth + 1 + to_candy;
            if bound < self.result.best_score {
                candidates.push((bound, dir, next));
            }
        }
        candidates.sort_by_key(|&(bound, _, _)| bound);

        for (_, dir, next) in candidates {
            let idx = self.size.index_of(next);
            self.visited[idx] = true;
            self.explore(snake.advanced(dir), depth + 1);
            self.visited[idx] = false;
        }
    }
}

/// Scores every first move from `snake`'s head. An empty candy set yields
/// sentinel scores for all branches.
pub fn search(
    snake: &Snake,
    opponent: &Snake,
    candies: &[Position],
    size: GridSize,
    budget: SearchBudget,
) -> SearchOutcome {
    let sentinel = size.area();
    let deadline = budget.time_limit.map(|limit| Instant::now() + limit);
    let head = snake.head();

    let explored: Vec<(BranchResult, u64, bool)> = Direction::ALL
        .par_iter()
        .map(|&first_move| {
            let mut explorer = Explorer {
                opponent,
                candies,
                size,
                budget,
                max_depth: budget.max_depth.unwrap_or(sentinel),
                deadline,
                visited: vec![false; sentinel as usize],
                result: BranchResult {
                    first_move,
                    best_score: sentinel,
                    path_count: 0,
                },
                nodes: 0,
                exhausted: false,
            };
            let next = head + first_move;
            if candies.is_empty() || !is_free(next, size, &[snake, opponent]) {
                return (explorer.result, 0, false);
            }
            if candies.contains(&next) {
                explorer.record(1);
                return (explorer.result, 0, false);
            }
            let bound = min_distance(next, candies).map_or(sentinel, |d| d + 1);
            if bound < sentinel {
                if is_on_grid(head, size) {
                    explorer.visited[size.index_of(head)] = true;
                }
                explorer.visited[size.index_of(next)] = true;
                explorer.explore(snake.advanced(first_move), 1);
            }
            (explorer.result, explorer.nodes, explorer.exhausted)
        })
        .collect();

    let outcome = SearchOutcome {
        branches: explored.iter().map(|(result, _, _)| *result).collect(),
        sentinel,
        nodes_visited: explored.iter().map(|(_, nodes, _)| nodes).sum(),
        budget_exhausted: explored.iter().any(|(_, _, exhausted)| *exhausted),
    };
    if outcome.budget_exhausted {
        warn!(
            nodes = outcome.nodes_visited,
            "search budget exhausted, using best result so far"
        );
    }
    trace!(nodes = outcome.nodes_visited, branches = ?outcome.branches, "pruned search finished");
    outcome
}
