// Per-turn board snapshot used by the search
//
// A `BoardState` is built once, either from a move request or by the rules
// simulator from a predecessor, and is never mutated afterwards except for its
// score and terminal marker, which the search driver owns.

use std::collections::BTreeSet;

use crate::area_control::{self, AreaOfControl};
use crate::config::GameRulesConfig;
use crate::grid::{in_bounds, Grid, MAX_DIMENSION};
use crate::snake::Snake;
use crate::types::{Battlesnake, Board, Coord, Game};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalReason {
    SelfEliminated,
    Victory,
    Duplicate,
    Dominated,
}

#[derive(Debug, Clone)]
pub struct BoardState {
    pub turn: u32,
    pub width: i32,
    pub height: i32,
    pub food: BTreeSet<Coord>,
    pub hazards: BTreeSet<Coord>,
    pub hazard_damage_rate: i32,
    pub my_snake: Snake,
    /// Living opponents in request order
    pub other_snakes: Vec<Snake>,
    /// Opponents eliminated by the tick that produced this board
    pub eliminated: Vec<Snake>,
    /// The game started without opponents, so an empty `other_snakes` is not a win
    pub solo: bool,
    pub score: f64,
    pub terminal_reason: Option<TerminalReason>,
}

/// Identity of a board for duplicate detection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey {
    turn: u32,
    food: Vec<Coord>,
    snakes: Vec<(String, i32, Vec<Coord>)>,
}

impl BoardState {
    /// Builds the root board from a move request, rejecting boards that break the game invariants
    pub fn from_api(
        game: &Game,
        turn: u32,
        board: &Board,
        you: &Battlesnake,
        rules: &GameRulesConfig,
    ) -> Result<Self, String> {
        if board.width <= 0
            || board.height <= 0
            || board.width > MAX_DIMENSION
            || board.height > MAX_DIMENSION
        {
            return Err(format!(
                "Invalid board dimensions {}x{}",
                board.width, board.height
            ));
        }

        validate_snake(you, board.width, board.height, rules.max_health)?;

        let mut other_snakes = Vec::new();
        for snake in board.snakes.iter().filter(|s| s.id != you.id) {
            validate_snake(snake, board.width, board.height, rules.max_health)?;
            if snake.health > 0 {
                other_snakes.push(Snake::from_api(snake, false));
            }
        }

        let food = collect_in_bounds(&board.food, board.width, board.height, "food")?;
        let hazards = collect_in_bounds(&board.hazards, board.width, board.height, "hazard")?;

        let hazard_damage_rate = game
            .ruleset
            .settings
            .hazard_damage_per_turn
            .unwrap_or(rules.default_hazard_damage);

        let solo = other_snakes.is_empty();
        let mut state = BoardState {
            turn,
            width: board.width,
            height: board.height,
            food,
            hazards,
            hazard_damage_rate,
            my_snake: Snake::from_api(you, true),
            other_snakes,
            eliminated: Vec::new(),
            solo,
            score: 0.0,
            terminal_reason: None,
        };
        state.settle_terminal();
        Ok(state)
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.terminal_reason.is_some()
    }

    /// Marks the board terminal when our snake died or the last opponent fell
    pub fn settle_terminal(&mut self) {
        if !self.my_snake.is_alive() || self.my_snake.health <= 0 {
            self.terminal_reason = Some(TerminalReason::SelfEliminated);
        } else if !self.solo && self.other_snakes.is_empty() {
            self.terminal_reason = Some(TerminalReason::Victory);
        }
    }

    /// Living snakes, ours first, then opponents in order
    pub fn living_snakes(&self) -> Vec<&Snake> {
        std::iter::once(&self.my_snake)
            .chain(self.other_snakes.iter())
            .filter(|s| s.is_alive())
            .collect()
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        in_bounds(coord, self.width, self.height)
    }

    /// Occupancy of every snake body
    pub fn board_array(&self) -> Grid {
        area_control::board_array(self.width, self.height, &self.living_snakes())
    }

    /// Interior 1, food cells `food_weight`
    pub fn food_array(&self, food_weight: i64) -> Grid {
        let mut grid = Grid::new(self.width, self.height, 1);
        for &food in &self.food {
            grid.set(food, food_weight as i16);
        }
        grid
    }

    /// Runs the BFS engine over the living snakes
    pub fn area_of_control(&self) -> AreaOfControl {
        AreaOfControl::compute(self.width, self.height, &self.living_snakes())
    }

    pub fn state_key(&self) -> StateKey {
        StateKey {
            turn: self.turn,
            food: self.food.iter().copied().collect(),
            snakes: self
                .living_snakes()
                .into_iter()
                .map(|s| (s.id.clone(), s.health, s.body.iter().copied().collect()))
                .collect(),
        }
    }
}

/// Interior 1, central 3x3 `weight`
pub fn center_weight_array(width: i32, height: i32, weight: i64) -> Grid {
    let mut grid = Grid::new(width, height, 1);
    let (cx, cy) = (width / 2, height / 2);
    for x in cx - 1..=cx + 1 {
        for y in cy - 1..=cy + 1 {
            grid.set(Coord { x, y }, weight as i16);
        }
    }
    grid
}

fn validate_snake(snake: &Battlesnake, width: i32, height: i32, max_health: i32) -> Result<(), String> {
    if snake.body.is_empty() {
        return Err(format!("Snake '{}' has an empty body", snake.id));
    }
    if snake.health < 0 || snake.health > max_health {
        return Err(format!(
            "Snake '{}' has health {} outside [0, {}]",
            snake.id, snake.health, max_health
        ));
    }
    if let Some(cell) = snake.body.iter().find(|c| !in_bounds(**c, width, height)) {
        return Err(format!(
            "Snake '{}' has body cell ({}, {}) outside the board",
            snake.id, cell.x, cell.y
        ));
    }
    Ok(())
}

fn collect_in_bounds(
    coords: &[Coord],
    width: i32,
    height: i32,
    what: &str,
) -> Result<BTreeSet<Coord>, String> {
    coords
        .iter()
        .map(|&c| {
            if in_bounds(c, width, height) {
                Ok(c)
            } else {
                Err(format!("{} at ({}, {}) is outside the board", what, c.x, c.y))
            }
        })
        .collect()
}
