// Rules simulator: applies one tick of standard Battlesnake rules
//
// Phases run in a fixed order over snakes in board order (ours first):
// move bodies, update health, walls, body collisions, head collisions, food.
// Collision phases read a snapshot of the bodies so eliminations are simultaneous.

use std::collections::{BTreeMap, BTreeSet};

use crate::board::BoardState;
use crate::config::GameRulesConfig;
use crate::grid::{in_bounds, DEATH_COORD};
use crate::snake::{EliminationCause, Snake};
use crate::types::Coord;

/// Produces the successor of `board` given one chosen head per living snake.
///
/// `moves[i]` belongs to `board.living_snakes()[i]`. The successor's score is
/// left at 0; scoring is the evaluator's job.
pub fn advance(board: &BoardState, moves: &[Coord], rules: &GameRulesConfig) -> BoardState {
    let mut snakes: Vec<Snake> = board.living_snakes().into_iter().cloned().collect();
    debug_assert_eq!(snakes.len(), moves.len());

    let mut new_heads: Vec<Option<Coord>> = vec![None; snakes.len()];

    for (i, (snake, &head)) in snakes.iter_mut().zip(moves).enumerate() {
        if head == DEATH_COORD || !in_bounds(head, board.width, board.height) {
            snake.eliminate(EliminationCause::WallCollision, None);
            continue;
        }
        new_heads[i] = Some(head);

        let ate = board.food.contains(&head);
        snake.body.push_front(head);
        snake.body.pop_back();
        if ate {
            let tail = snake.tail();
            snake.body.push_back(tail);
        }

        snake.health -= rules.health_loss_per_turn;
        if board.hazards.contains(&head) {
            snake.health -= board.hazard_damage_rate;
        }
        if ate {
            snake.health = rules.max_health;
        }
        snake.health = snake.health.clamp(0, rules.max_health);
        if snake.health == 0 {
            snake.eliminate(EliminationCause::OutOfHealth, None);
        }
    }

    resolve_body_collisions(&mut snakes);
    resolve_head_collisions(&mut snakes, &new_heads);

    let mut food = board.food.clone();
    consume_food(&mut snakes, &new_heads, &mut food);

    let mut my_snake = None;
    let mut other_snakes = Vec::new();
    let mut eliminated = Vec::new();
    for snake in snakes {
        if snake.is_self {
            my_snake = Some(snake);
        } else if snake.is_alive() {
            other_snakes.push(snake);
        } else {
            eliminated.push(snake);
        }
    }

    let mut next = BoardState {
        turn: board.turn + 1,
        width: board.width,
        height: board.height,
        food,
        hazards: board.hazards.clone(),
        hazard_damage_rate: board.hazard_damage_rate,
        my_snake: my_snake.unwrap_or_else(|| board.my_snake.clone()),
        other_snakes,
        eliminated,
        solo: board.solo,
        score: 0.0,
        terminal_reason: None,
    };
    next.settle_terminal();
    next
}

/// Heads landing on any body segment past a head (own included) are eliminated
fn resolve_body_collisions(snakes: &mut [Snake]) {
    let standing: Vec<usize> = (0..snakes.len()).filter(|&i| snakes[i].is_alive()).collect();

    let mut hits: Vec<(usize, Option<String>)> = Vec::new();
    for &i in &standing {
        let head = snakes[i].head();
        let owner = standing
            .iter()
            .copied()
            .find(|&j| snakes[j].body.iter().skip(1).any(|&c| c == head));
        if let Some(j) = owner {
            let by = if j == i { None } else { Some(snakes[j].id.clone()) };
            hits.push((i, by));
        }
    }

    for (i, by) in hits {
        snakes[i].eliminate(EliminationCause::BodyCollision, by);
    }
}

/// Groups heads by cell; a unique strictly-longest snake survives and collects the murders
fn resolve_head_collisions(snakes: &mut [Snake], new_heads: &[Option<Coord>]) {
    let mut by_cell: BTreeMap<Coord, Vec<usize>> = BTreeMap::new();
    for (i, head) in new_heads.iter().enumerate() {
        if let Some(head) = head {
            if snakes[i].is_alive() {
                by_cell.entry(*head).or_default().push(i);
            }
        }
    }

    for sharers in by_cell.values().filter(|s| s.len() > 1) {
        let longest = sharers
            .iter()
            .map(|&i| snakes[i].length())
            .max()
            .unwrap_or(0);
        let mut tied: Vec<usize> = sharers
            .iter()
            .copied()
            .filter(|&i| snakes[i].length() == longest)
            .collect();
        tied.sort_by(|&a, &b| snakes[a].id.cmp(&snakes[b].id));

        if tied.len() == 1 {
            let winner = tied[0];
            let winner_id = snakes[winner].id.clone();
            let mut murders = 0;
            for &i in sharers.iter().filter(|&&i| i != winner) {
                snakes[i].eliminate(EliminationCause::HeadCollision, Some(winner_id.clone()));
                murders += 1;
            }
            snakes[winner].murder_count += murders;
        } else {
            // everyone dies; blame goes to the lowest-id tied opponent
            for &i in sharers {
                let by = tied
                    .iter()
                    .copied()
                    .find(|&j| j != i)
                    .map(|j| snakes[j].id.clone());
                snakes[i].eliminate(EliminationCause::HeadCollision, by);
            }
        }
    }
}

/// Food on a cell with exactly one surviving head is eaten; otherwise it stays
fn consume_food(
    snakes: &mut [Snake],
    new_heads: &[Option<Coord>],
    food: &mut BTreeSet<Coord>,
) {
    let mut eaters: BTreeMap<Coord, Vec<usize>> = BTreeMap::new();
    for (i, head) in new_heads.iter().enumerate() {
        if let Some(head) = head {
            if food.contains(head) {
                eaters.entry(*head).or_default().push(i);
            }
        }
    }

    for (cell, sharers) in eaters {
        let survivors: Vec<usize> = sharers
            .into_iter()
            .filter(|&i| snakes[i].is_alive())
            .collect();
        if survivors.len() == 1 {
            snakes[survivors[0]].food_consumed.push(cell);
            food.remove(&cell);
        }
    }
}
