//! A* towards the nearest candy, returning only the first step.
//!
//! Nodes live in an arena and point at their parent by index, the path is
//! recovered by walking those indices back to the root (the current head).

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ahash::{AHashMap, AHashSet};
use tracing::trace;

use crate::error::EngineError;
use crate::grid::{Direction, GridSize, Position, is_free, min_distance};
use crate::snake::Snake;

const ROOT: usize = 0;

#[derive(Debug, Clone, Copy)]
struct Node {
    position: Position,
    parent: Option<usize>,
    /// Steps from the head.
    cost: u32,
    /// `cost` plus the distance to the nearest candy.
    estimate: u32,
}

/// First move of a shortest path from `snake`'s head to the nearest
/// reachable candy. Both snakes are treated as static walls.
pub fn first_step_to_candy(
    snake: &Snake,
    opponent: &Snake,
    candies: &[Position],
    size: GridSize,
) -> Result<Direction, EngineError> {
    if candies.is_empty() {
        return Err(EngineError::NoCandyReachable);
    }
    let head = snake.head();
    let blockers = [snake, opponent];

    let mut arena = vec![Node {
        position: head,
        parent: None,
        cost: 0,
        estimate: min_distance(head, candies)?,
    }];
    // Frontier ordered by (estimate, discovery order). Entries whose estimate
    // no longer matches the node are stale and skipped.
    let mut frontier: BinaryHeap<Reverse<(u32, usize)>> = BinaryHeap::new();
    let mut open: AHashMap<Position, usize> = AHashMap::new();
    let mut closed: AHashSet<Position> = AHashSet::new();
    closed.insert(head);

    for dir in Direction::ALL {
        let position = head + dir;
        if !is_free(position, size, &blockers) {
            continue;
        }
        let idx = arena.len();
        arena.push(Node {
            position,
            parent: Some(ROOT),
            cost: 1,
            estimate: 1 + min_distance(position, candies)?,
        });
        open.insert(position, idx);
        frontier.push(Reverse((arena[idx].estimate, idx)));
    }

    let mut expanded = 0usize;
    while let Some(Reverse((estimate, idx))) = frontier.pop() {
        let node = arena[idx];
        if node.estimate != estimate || closed.contains(&node.position) {
            continue;
        }
        open.remove(&node.position);
        closed.insert(node.position);
        expanded += 1;

        if candies.contains(&node.position) {
            let first = first_step(&arena, idx);
            trace!(expanded, steps = node.cost, candy = %node.position, "pathfinder reached candy");
            return Direction::from_delta(arena[first].position - head)
                .ok_or(EngineError::NoCandyReachable);
        }

        for dir in Direction::ALL {
            let position = node.position + dir;
            if !is_free(position, size, &blockers) || closed.contains(&position) {
                continue;
            }
            let cost = node.cost + 1;
            match open.get(&position) {
                Some(&queued) => {
                    if cost < arena[queued].cost {
                        let queued_node = &mut arena[queued];
                        queued_node.estimate = cost + (queued_node.estimate - queued_node.cost);
                        queued_node.cost = cost;
                        queued_node.parent = Some(idx);
                        frontier.push(Reverse((queued_node.estimate, queued)));
                    }
                }
                None => {
                    let queued = arena.len();
                    arena.push(Node {
                        position,
                        parent: Some(idx),
                        cost,
                        estimate: cost + min_distance(position, candies)?,
                    });
                    open.insert(position, queued);
                    frontier.push(Reverse((arena[queued].estimate, queued)));
                }
            }
        }
    }

    trace!(expanded, "pathfinder exhausted its frontier");
    Err(EngineError::NoCandyReachable)
}

/// Walks parent links up to the node whose parent is the root.
fn first_step(arena: &[Node], mut idx: usize) -> usize {
    while let Some(parent) = arena[idx].parent {
        if parent == ROOT {
            break;
        }
        idx = parent;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::distance;

    fn snake(cells: &[(i32, i32)]) -> Snake {
        Snake::new(cells.iter().copied().map(Position::from)).unwrap()
    }

    #[test]
    fn test_straight_line_reduces_distance_by_one() {
        let size = GridSize::new(7, 7).unwrap();
        let opponent = snake(&[(6, 6)]);
        let candy = Position::new(3, 3);
        for start in [(3, 0), (0, 3), (3, 6), (6, 3), (3, 1)] {
            let me = snake(&[start]);
            let dir = first_step_to_candy(&me, &opponent, &[candy], size).unwrap();
            let before = distance(me.head(), candy);
            let after = distance(me.head() + dir, candy);
            assert_eq!(after + 1, before, "start {:?} moved {}", start, dir);
        }
    }

    #[test]
    fn test_picks_nearest_candy() {
        let size = GridSize::new(9, 9).unwrap();
        let me = snake(&[(4, 4)]);
        let opponent = snake(&[(0, 0)]);
        let candies = [Position::new(4, 8), Position::new(2, 4)];
        assert_eq!(
            first_step_to_candy(&me, &opponent, &candies, size),
            Ok(Direction::Left)
        );
    }

    #[test]
    fn test_routes_around_a_wall() {
        // Opponent wall at x = 2 from y = 0..=3; the only gap is at y = 4.
        let size = GridSize::new(5, 5).unwrap();
        let me = snake(&[(1, 1)]);
        let opponent = snake(&[(2, 0), (2, 1), (2, 2), (2, 3)]);
        let candy = Position::new(3, 1);
        assert_eq!(
            first_step_to_candy(&me, &opponent, &[candy], size),
            Ok(Direction::Up)
        );
    }

    #[test]
    fn test_own_body_blocks_the_direct_route() {
        let size = GridSize::new(5, 5).unwrap();
        let me = snake(&[(1, 2), (2, 2), (2, 1)]);
        let opponent = snake(&[(4, 4)]);
        let candy = Position::new(3, 2);
        assert_eq!(
            first_step_to_candy(&me, &opponent, &[candy], size),
            Ok(Direction::Up)
        );
    }

    #[test]
    fn test_cheaper_path_rewires_queued_node() {
        // (2,2) is first queued over the top at cost 5, then reached from
        // below at cost 3. Keeping the first parent would walk Up for a
        // 9-step route; the shortest one (7 steps) starts Down.
        let size = GridSize::new(5, 5).unwrap();
        let me = snake(&[(4, 3)]);
        let opponent = snake(&[(1, 1), (1, 3), (1, 4), (3, 3)]);
        assert_eq!(
            first_step_to_candy(&me, &opponent, &[Position::new(0, 4)], size),
            Ok(Direction::Down)
        );
    }

    #[test]
    fn test_unreachable_candy_fails() {
        let size = GridSize::new(5, 5).unwrap();
        let me = snake(&[(0, 0)]);
        // Candy at (4,4) sealed in by the opponent.
        let opponent = snake(&[(3, 4), (3, 3), (4, 3)]);
        assert_eq!(
            first_step_to_candy(&me, &opponent, &[Position::new(4, 4)], size),
            Err(EngineError::NoCandyReachable)
        );
    }

    #[test]
    fn test_no_candies_fails_without_measuring() {
        let size = GridSize::new(3, 3).unwrap();
        let me = snake(&[(1, 1)]);
        let opponent = snake(&[(0, 0)]);
        assert_eq!(
            first_step_to_candy(&me, &opponent, &[], size),
            Err(EngineError::NoCandyReachable)
        );
    }

    #[test]
    fn test_adjacent_candy_is_taken_directly() {
        let size = GridSize::new(4, 4).unwrap();
        let me = snake(&[(1, 1), (1, 2)]);
        let opponent = snake(&[(3, 3)]);
        assert_eq!(
            first_step_to_candy(&me, &opponent, &[Position::new(2, 1)], size),
            Ok(Direction::Right)
        );
    }
}
