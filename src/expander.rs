// Move expander
//
// Lists the head cells each living snake may move to next tick and walks the
// Cartesian product of those lists. Opponents far from our head get a reduced
// candidate list so that fanout stays manageable on crowded boards.

use std::collections::HashSet;

use crate::board::BoardState;
use crate::config::HeuristicsConfig;
use crate::grid::{add, manhattan, DEATH_COORD};
use crate::snake::Snake;
use crate::types::{Coord, Direction};

/// Candidate head cells per living snake, in `board.living_snakes()` order
pub fn candidate_sets(board: &BoardState, heuristics: &HeuristicsConfig) -> Vec<Vec<Coord>> {
    let living = board.living_snakes();
    let occupied: HashSet<Coord> = living
        .iter()
        .flat_map(|s| s.blocking_cells().copied())
        .collect();

    living
        .iter()
        .map(|snake| {
            let base = base_candidates(board, snake, &occupied);
            if snake.is_self {
                base
            } else {
                prune_opponent(board, snake, base, heuristics)
            }
        })
        .collect()
}

/// In-bounds neighbours not blocked by a body; `DEATH_COORD` alone when nothing is left.
///
/// Neighbours come in reverse tie-break order (Left, Down, Right, Up), so at every
/// level of the search the boards of tie-winning directions are expanded last.
pub fn base_candidates(board: &BoardState, snake: &Snake, occupied: &HashSet<Coord>) -> Vec<Coord> {
    let head = snake.head();
    let candidates: Vec<Coord> = Direction::tie_break_order()
        .iter()
        .rev()
        .map(|direction| direction.apply(&head))
        .filter(|&c| board.in_bounds(c) && !occupied.contains(&c))
        .collect();

    if candidates.is_empty() {
        vec![DEATH_COORD]
    } else {
        candidates
    }
}

/// Distant opponents are assumed to keep going straight on odd turns or to close in on us
fn prune_opponent(
    board: &BoardState,
    opponent: &Snake,
    candidates: Vec<Coord>,
    heuristics: &HeuristicsConfig,
) -> Vec<Coord> {
    let my_head = board.my_snake.head();
    let distance = manhattan(opponent.head(), my_head);

    if candidates.len() <= 1 || distance <= heuristics.opponent_prune_distance {
        return candidates;
    }

    if heuristics.straight_ahead_on_odd_turns && board.turn % 2 == 1 {
        if let Some(last_move) = opponent.last_move() {
            let straight = add(opponent.head(), last_move);
            if candidates.contains(&straight) {
                return vec![straight];
            }
        }
    }

    let approaching: Vec<Coord> = candidates
        .iter()
        .copied()
        .filter(|&c| manhattan(c, my_head) < distance)
        .collect();

    if approaching.is_empty() {
        candidates
    } else {
        approaching
    }
}

/// Iterator over the Cartesian product of per-snake candidate lists.
/// The last snake varies fastest; our snake (first list) varies slowest.
pub struct MoveTuples {
    sets: Vec<Vec<Coord>>,
    indices: Vec<usize>,
    done: bool,
}

impl MoveTuples {
    pub fn new(sets: Vec<Vec<Coord>>) -> Self {
        let done = sets.is_empty() || sets.iter().any(|s| s.is_empty());
        let indices = vec![0; sets.len()];
        MoveTuples { sets, indices, done }
    }

    /// Number of tuples the iterator yields in total
    pub fn fanout(&self) -> usize {
        if self.sets.is_empty() {
            return 0;
        }
        self.sets.iter().map(|s| s.len()).product()
    }
}

impl Iterator for MoveTuples {
    type Item = Vec<Coord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let tuple: Vec<Coord> = self
            .sets
            .iter()
            .zip(&self.indices)
            .map(|(set, &i)| set[i])
            .collect();

        let mut carry = true;
        for i in (0..self.sets.len()).rev() {
            if !carry {
                break;
            }
            self.indices[i] += 1;
            if self.indices[i] >= self.sets[i].len() {
                self.indices[i] = 0;
            } else {
                carry = false;
            }
        }
        if carry {
            self.done = true;
        }

        Some(tuple)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::collections::BTreeSet;

    fn snake(id: &str, cells: &[(i32, i32)], is_self: bool) -> Snake {
        Snake::new(
            id,
            100,
            cells.iter().map(|&(x, y)| Coord::new(x, y)).collect(),
            is_self,
        )
    }

    fn board(turn: u32, me: Snake, others: Vec<Snake>) -> BoardState {
        BoardState {
            turn,
            width: 11,
            height: 11,
            food: BTreeSet::new(),
            hazards: BTreeSet::new(),
            hazard_damage_rate: 14,
            solo: others.is_empty(),
            my_snake: me,
            other_snakes: others,
            eliminated: Vec::new(),
            score: 0.0,
            terminal_reason: None,
        }
    }

    fn heuristics() -> HeuristicsConfig {
        Config::default_hardcoded().heuristics
    }

    #[test]
    fn test_corner_candidates_skip_walls_and_neck() {
        let b = board(0, snake("me", &[(1, 10), (2, 10), (3, 10)], true), vec![]);
        let sets = candidate_sets(&b, &heuristics());
        assert_eq!(sets, vec![vec![Coord::new(0, 10), Coord::new(1, 9)]]);
    }

    #[test]
    fn test_vacating_tail_is_a_candidate() {
        let b = board(5, snake("me", &[(0, 10), (0, 9), (1, 9), (1, 10)], true), vec![]);
        let sets = candidate_sets(&b, &heuristics());
        assert_eq!(sets, vec![vec![Coord::new(1, 10)]]);
    }

    #[test]
    fn test_growing_tail_blocks() {
        let b = board(
            5,
            snake("me", &[(0, 10), (0, 9), (1, 9), (1, 10), (1, 10)], true),
            vec![],
        );
        let sets = candidate_sets(&b, &heuristics());
        assert_eq!(sets, vec![vec![DEATH_COORD]]);
    }

    #[test]
    fn test_distant_opponent_goes_straight_on_odd_turns() {
        let me = snake("me", &[(0, 0), (0, 1)], true);
        // heading right, far away
        let them = snake("them", &[(7, 7), (6, 7), (5, 7)], false);
        let b = board(3, me, vec![them]);
        let sets = candidate_sets(&b, &heuristics());
        assert_eq!(sets[1], vec![Coord::new(8, 7)]);
    }

    #[test]
    fn test_distant_opponent_approaches_on_even_turns() {
        let me = snake("me", &[(0, 0), (0, 1)], true);
        let them = snake("them", &[(7, 7), (6, 7), (5, 7)], false);
        let b = board(4, me, vec![them]);
        let sets = candidate_sets(&b, &heuristics());
        // down towards us; up/right move away and left is the neck
        assert_eq!(sets[1], vec![Coord::new(7, 6)]);
    }

    #[test]
    fn test_nearby_opponent_keeps_all_candidates() {
        let me = snake("me", &[(5, 5), (5, 4)], true);
        let them = snake("them", &[(6, 7), (6, 8)], false);
        let b = board(3, me, vec![them]);
        let sets = candidate_sets(&b, &heuristics());
        assert_eq!(sets[1].len(), 3);
    }

    #[test]
    fn test_move_tuples_cartesian_product() {
        let a = vec![Coord::new(0, 0), Coord::new(1, 0)];
        let b = vec![Coord::new(5, 5), Coord::new(6, 5), Coord::new(7, 5)];
        let tuples = MoveTuples::new(vec![a.clone(), b.clone()]);
        assert_eq!(tuples.fanout(), 6);

        let all: Vec<Vec<Coord>> = tuples.collect();
        assert_eq!(all.len(), 6);
        assert_eq!(all[0], vec![a[0], b[0]]);
        assert_eq!(all[1], vec![a[0], b[1]]);
        assert_eq!(all[5], vec![a[1], b[2]]);
    }
}
