// Properties that hold for every successor board the simulator produces
//
// Each fixture board is advanced with every combination of the four raw
// directions per snake (walls and necks included), and every successor is
// checked against the universal rules of the game and of the BFS engine.

use std::collections::{BTreeMap, HashSet, VecDeque};

use voronoi_snake::board::BoardState;
use voronoi_snake::config::{Config, GameRulesConfig};
use voronoi_snake::grid::{adjacent, manhattan, BORDER_VALUE, SNAKE_BODY};
use voronoi_snake::rules;
use voronoi_snake::snake::{EliminationCause, Snake};
use voronoi_snake::types::Coord;

fn snake(id: &str, health: i32, cells: &[(i32, i32)], is_self: bool) -> Snake {
    Snake::new(
        id,
        health,
        cells.iter().map(|&(x, y)| Coord::new(x, y)).collect(),
        is_self,
    )
}

fn board(me: Snake, others: Vec<Snake>, food: &[(i32, i32)], hazards: &[(i32, i32)]) -> BoardState {
    BoardState {
        turn: 7,
        width: 7,
        height: 7,
        food: food.iter().map(|&(x, y)| Coord::new(x, y)).collect(),
        hazards: hazards.iter().map(|&(x, y)| Coord::new(x, y)).collect(),
        hazard_damage_rate: 14,
        solo: others.is_empty(),
        my_snake: me,
        other_snakes: others,
        eliminated: Vec::new(),
        score: 0.0,
        terminal_reason: None,
    }
}

/// Boards where heads are close together, so collisions of every kind happen
fn fixtures() -> Vec<BoardState> {
    vec![
        // three snakes around a contested food cell
        board(
            snake("me", 60, &[(3, 2), (3, 1), (3, 0), (2, 0)], true),
            vec![
                snake("west", 5, &[(2, 3), (1, 3), (0, 3)], false),
                snake("north", 40, &[(3, 4), (3, 5), (3, 6), (2, 6), (1, 6)], false),
            ],
            &[(3, 3), (0, 0)],
            &[(2, 2), (4, 2)],
        ),
        // a freshly grown snake next to a short one, both low on health
        board(
            snake("me", 2, &[(1, 1), (1, 2), (1, 3), (1, 3)], true),
            vec![snake("small", 1, &[(2, 1), (3, 1)], false)],
            &[(0, 1), (2, 0)],
            &[],
        ),
        // four snakes packed in the middle
        board(
            snake("me", 90, &[(3, 3), (3, 2)], true),
            vec![
                snake("a", 90, &[(3, 5), (3, 6)], false),
                snake("b", 90, &[(1, 3), (0, 3), (0, 2)], false),
                snake("c", 90, &[(5, 3), (6, 3)], false),
            ],
            &[(3, 4), (2, 3), (4, 3)],
            &[(3, 4)],
        ),
    ]
}

/// Every combination of raw neighbour cells, one per living snake
fn all_raw_moves(board: &BoardState) -> Vec<Vec<Coord>> {
    let mut tuples: Vec<Vec<Coord>> = vec![Vec::new()];
    for snake in board.living_snakes() {
        let options = adjacent(snake.head());
        tuples = tuples
            .into_iter()
            .flat_map(|prefix| {
                options.iter().map(move |&c| {
                    let mut next = prefix.clone();
                    next.push(c);
                    next
                })
            })
            .collect();
    }
    tuples
}

fn all_snakes(board: &BoardState) -> Vec<&Snake> {
    std::iter::once(&board.my_snake)
        .chain(board.other_snakes.iter())
        .chain(board.eliminated.iter())
        .collect()
}

fn rules_config() -> GameRulesConfig {
    Config::default_hardcoded().game_rules
}

fn for_each_successor(mut check: impl FnMut(&BoardState, &[Coord], &BoardState)) {
    let rules = rules_config();
    for before in fixtures() {
        for moves in all_raw_moves(&before) {
            let after = rules::advance(&before, &moves, &rules);
            check(&before, &moves, &after);
        }
    }
}

#[test]
fn test_living_snakes_stay_well_formed() {
    for_each_successor(|_, moves, after| {
        for s in after.living_snakes() {
            assert_eq!(s.body.len(), s.length(), "{:?}", moves);
            assert!((0..=100).contains(&s.health), "{} health {}", s.id, s.health);
            assert!(s.body.iter().all(|&c| after.in_bounds(c)), "{:?}", s.body);

            let body: Vec<Coord> = s.body.iter().copied().collect();
            for pair in body.windows(2) {
                let d = manhattan(pair[0], pair[1]);
                assert!(d == 1 || (d == 0 && pair[1] == s.tail()), "{:?}", body);
            }
        }
    });
}

#[test]
fn test_head_collisions() {
    for_each_successor(|before, moves, after| {
        let movers = before.living_snakes();
        let mut by_cell: BTreeMap<Coord, Vec<&Snake>> = BTreeMap::new();
        for (snake, &head) in movers.iter().zip(moves) {
            if before.in_bounds(head) {
                by_cell.entry(head).or_default().push(*snake);
            }
        }

        let outcome = all_snakes(after);
        let find = |id: &str| *outcome.iter().find(|s| s.id == id).unwrap();

        for sharers in by_cell.values() {
            // snakes that already died this tick (starved, hit a body) do not contest the cell
            let contenders: Vec<&Snake> = sharers
                .iter()
                .copied()
                .filter(|s| {
                    find(&s.id)
                        .elimination
                        .as_ref()
                        .map_or(true, |e| e.cause == EliminationCause::HeadCollision)
                })
                .collect();
            if contenders.len() < 2 {
                continue;
            }

            let longest = contenders.iter().map(|s| s.length()).max().unwrap();
            let tied: Vec<&Snake> = contenders
                .iter()
                .copied()
                .filter(|s| s.length() == longest)
                .collect();

            if tied.len() > 1 {
                for s in &contenders {
                    assert!(!find(&s.id).is_alive(), "tied sharer {} survived {:?}", s.id, moves);
                }
                continue;
            }

            let winner = tied[0];
            let after_winner = find(&winner.id);
            assert!(after_winner.is_alive(), "unique longest {} died {:?}", winner.id, moves);
            for s in contenders.iter().filter(|s| s.id != winner.id) {
                let elimination = find(&s.id).elimination.clone().unwrap();
                assert_eq!(elimination.by.as_deref(), Some(winner.id.as_str()));
            }

            let killed = outcome
                .iter()
                .filter(|s| {
                    s.elimination.as_ref().map_or(false, |e| {
                        e.cause == EliminationCause::HeadCollision
                            && e.by.as_deref() == Some(winner.id.as_str())
                    })
                })
                .count() as u32;
            assert_eq!(after_winner.murder_count - winner.murder_count, contenders.len() as u32 - 1);
            assert_eq!(killed, contenders.len() as u32 - 1);
        }
    });
}

#[test]
fn test_food_is_conserved() {
    for_each_successor(|before, moves, after| {
        let eaten_before: usize = before.living_snakes().iter().map(|s| s.food_consumed.len()).sum();
        let eaten_after: usize = all_snakes(after).iter().map(|s| s.food_consumed.len()).sum();
        assert_eq!(
            after.food.len() + (eaten_after - eaten_before),
            before.food.len(),
            "{:?}",
            moves
        );
    });
}

#[test]
fn test_wavefront_matches_plain_bfs() {
    for_each_successor(|_, moves, after| {
        if after.my_snake.elimination.is_some() {
            return;
        }
        let snakes = after.living_snakes();
        let area = after.area_of_control();

        let mut blocked: HashSet<Coord> = HashSet::new();
        for s in &snakes {
            blocked.extend(s.body.iter().take(s.length() - 1).copied());
            blocked.insert(s.head());
        }

        for (slice, s) in area.distances.iter().zip(&snakes) {
            let expected = bfs(after, s.head(), &blocked);
            for (coord, value) in slice.interior() {
                if coord == s.head() {
                    assert_eq!(value, 0);
                } else if blocked.contains(&coord) {
                    assert_eq!(value, SNAKE_BODY, "{:?} {:?}", coord, moves);
                } else {
                    let want = expected.get(&coord).copied().unwrap_or(0);
                    assert_eq!(value, want, "{} at {:?} after {:?}", s.id, coord, moves);
                }
            }
            for row in 0..slice.rows() {
                for col in 0..slice.cols() {
                    if slice.is_border_index(row * slice.cols() + col) {
                        assert_eq!(slice.get_rc(row, col), BORDER_VALUE);
                    }
                }
            }
        }
    });
}

#[test]
fn test_area_of_control_is_strictly_first() {
    for_each_successor(|_, _, after| {
        if after.my_snake.elimination.is_some() {
            return;
        }
        let area = after.area_of_control();
        let mine = &area.distances[0];

        for (coord, value) in area.my_area.interior() {
            let my_distance = mine.get(coord);
            let strictly_first = my_distance > 0
                && area.distances[1..].iter().all(|slice| {
                    let theirs = slice.get(coord);
                    theirs <= 0 || theirs > my_distance
                });
            if strictly_first {
                assert_eq!(value, my_distance, "{:?}", coord);
            } else {
                assert_eq!(value, 0, "{:?}", coord);
            }
        }
    });
}

fn bfs(board: &BoardState, start: Coord, blocked: &HashSet<Coord>) -> BTreeMap<Coord, i16> {
    let mut distances = BTreeMap::new();
    let mut queue = VecDeque::from(vec![(start, 0i16)]);
    let mut visited: HashSet<Coord> = HashSet::from([start]);

    while let Some((cell, d)) = queue.pop_front() {
        for next in adjacent(cell) {
            if board.in_bounds(next) && !blocked.contains(&next) && visited.insert(next) {
                distances.insert(next, d + 1);
                queue.push_back((next, d + 1));
            }
        }
    }
    distances
}
