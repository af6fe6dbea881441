// Board evaluator
//
// score = sum over our area of control of area_multiplier * food_weight * center_weight
//       + murder_score * murders + food_score * food eaten + health
// Terminal boards short-circuit to fixed values.

use crate::board::{center_weight_array, BoardState, TerminalReason};
use crate::config::ScoresConfig;
use crate::grid::Grid;

/// Evaluator bound to one board size, so the center weights are built once per search
pub struct Evaluator {
    scores: ScoresConfig,
    center_weights: Grid,
}

impl Evaluator {
    pub fn new(scores: &ScoresConfig, width: i32, height: i32) -> Self {
        Evaluator {
            scores: scores.clone(),
            center_weights: center_weight_array(width, height, scores.center_control_weight),
        }
    }

    pub fn evaluate(&self, board: &BoardState) -> f64 {
        match board.terminal_reason {
            Some(TerminalReason::SelfEliminated) => return self.scores.self_eliminated_score as f64,
            Some(TerminalReason::Victory) => return self.scores.win_score as f64,
            _ => {}
        }

        let area = board.area_of_control();
        let food = board.food_array(self.scores.food_weight);

        let mut weighted: i64 = 0;
        let cells = area.my_area.cells().iter().zip(food.cells()).zip(self.center_weights.cells());
        for ((&mine, &food), &center) in cells {
            if mine > 0 {
                weighted += self.scores.area_multiplier * food as i64 * center as i64;
            }
        }

        let snake = &board.my_snake;
        let total = weighted
            + self.scores.murder_score * snake.murder_count as i64
            + self.scores.food_score * snake.food_consumed.len() as i64
            + snake.health as i64;

        total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::snake::Snake;
    use crate::types::Coord;
    use std::collections::BTreeSet;

    fn board(me: Snake, others: Vec<Snake>, food: &[(i32, i32)]) -> BoardState {
        BoardState {
            turn: 0,
            width: 5,
            height: 5,
            food: food.iter().map(|&(x, y)| Coord::new(x, y)).collect(),
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

    fn snake(id: &str, health: i32, cells: &[(i32, i32)], is_self: bool) -> Snake {
        Snake::new(
            id,
            health,
            cells.iter().map(|&(x, y)| Coord::new(x, y)).collect(),
            is_self,
        )
    }

    #[test]
    fn test_solo_score_counts_every_reachable_cell() {
        let config = Config::default_hardcoded();
        let evaluator = Evaluator::new(&config.scores, 5, 5);
        // corner snake, nothing contested
        let b = board(snake("me", 50, &[(0, 0), (1, 0), (2, 0)], true), vec![], &[]);

        // 25 cells - head - (1, 0); tail (2, 0) is free. Center 3x3 fully reachable: +9
        let expected = (25 - 2) + 9 + 50;
        assert_eq!(evaluator.evaluate(&b), expected as f64);
    }

    #[test]
    fn test_food_in_area_weighs_more() {
        let config = Config::default_hardcoded();
        let evaluator = Evaluator::new(&config.scores, 5, 5);
        let without = board(snake("me", 50, &[(0, 0), (1, 0), (2, 0)], true), vec![], &[]);
        let with = board(
            snake("me", 50, &[(0, 0), (1, 0), (2, 0)], true),
            vec![],
            &[(4, 4)],
        );
        assert_eq!(evaluator.evaluate(&with) - evaluator.evaluate(&without), 4.0);
    }

    #[test]
    fn test_murders_and_food_eaten_add_flat_bonuses() {
        let config = Config::default_hardcoded();
        let evaluator = Evaluator::new(&config.scores, 5, 5);
        let base = board(snake("me", 50, &[(0, 0), (1, 0), (2, 0)], true), vec![], &[]);

        let mut bonus = base.clone();
        bonus.my_snake.murder_count = 2;
        bonus.my_snake.food_consumed.push(Coord::new(3, 3));

        assert_eq!(evaluator.evaluate(&bonus) - evaluator.evaluate(&base), 300.0);
    }

    #[test]
    fn test_terminal_scores() {
        let config = Config::default_hardcoded();
        let evaluator = Evaluator::new(&config.scores, 5, 5);

        let mut dead = board(snake("me", 0, &[(0, 0)], true), vec![], &[]);
        dead.terminal_reason = Some(TerminalReason::SelfEliminated);
        assert_eq!(evaluator.evaluate(&dead), 0.0);

        let mut won = board(snake("me", 40, &[(0, 0)], true), vec![], &[]);
        won.terminal_reason = Some(TerminalReason::Victory);
        assert_eq!(evaluator.evaluate(&won), 1000.0);
    }

    #[test]
    fn test_opponent_shrinks_area() {
        let config = Config::default_hardcoded();
        let evaluator = Evaluator::new(&config.scores, 5, 5);
        let alone = board(snake("me", 50, &[(0, 0), (1, 0)], true), vec![], &[]);
        let contested = board(
            snake("me", 50, &[(0, 0), (1, 0)], true),
            vec![snake("them", 50, &[(4, 4), (4, 3)], false)],
            &[],
        );
        assert!(evaluator.evaluate(&contested) < evaluator.evaluate(&alone));
    }
}
