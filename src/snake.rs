// Engine-side snake record
//
// Unlike the API `Battlesnake`, this carries the bookkeeping the search needs:
// elimination cause, murders and the food eaten along a simulated line.

use std::collections::VecDeque;

use crate::grid::sub;
use crate::types::{Battlesnake, Coord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EliminationCause {
    OutOfHealth,
    WallCollision,
    BodyCollision,
    HeadCollision,
}

impl EliminationCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            EliminationCause::OutOfHealth => "out-of-health",
            EliminationCause::WallCollision => "wall-collision",
            EliminationCause::BodyCollision => "body-collision",
            EliminationCause::HeadCollision => "head-collision",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Elimination {
    pub cause: EliminationCause,
    /// Id of the snake responsible, if any
    pub by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    pub id: String,
    pub health: i32,
    /// Head first, tail last. A duplicated last cell marks pending growth.
    pub body: VecDeque<Coord>,
    pub murder_count: u32,
    pub food_consumed: Vec<Coord>,
    pub elimination: Option<Elimination>,
    pub is_self: bool,
}

impl Snake {
    pub fn new(id: impl Into<String>, health: i32, body: Vec<Coord>, is_self: bool) -> Self {
        Snake {
            id: id.into(),
            health,
            body: body.into_iter().collect(),
            murder_count: 0,
            food_consumed: Vec::new(),
            elimination: None,
            is_self,
        }
    }

    /// Builds the engine record from an API snake
    pub fn from_api(snake: &Battlesnake, is_self: bool) -> Self {
        Snake::new(snake.id.clone(), snake.health, snake.body.clone(), is_self)
    }

    #[inline]
    pub fn head(&self) -> Coord {
        self.body[0]
    }

    #[inline]
    pub fn tail(&self) -> Coord {
        self.body[self.body.len() - 1]
    }

    #[inline]
    pub fn length(&self) -> usize {
        self.body.len()
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.elimination.is_none()
    }

    /// True when the tail cell stays occupied next turn (it was duplicated after eating)
    pub fn tail_will_grow(&self) -> bool {
        let len = self.body.len();
        len >= 2 && self.body[len - 1] == self.body[len - 2]
    }

    /// Vector of the previous move, `head - body[1]`.
    /// None for length-1 snakes and for stacked starting bodies.
    pub fn last_move(&self) -> Option<Coord> {
        if self.body.len() < 2 {
            return None;
        }
        let delta = sub(self.body[0], self.body[1]);
        if delta.x == 0 && delta.y == 0 {
            None
        } else {
            Some(delta)
        }
    }

    /// Body cells that still block movement next tick: everything but a tail that will vacate
    pub fn blocking_cells(&self) -> impl Iterator<Item = &Coord> {
        let keep = if self.tail_will_grow() {
            self.body.len()
        } else {
            self.body.len() - 1
        };
        self.body.iter().take(keep)
    }

    pub fn eliminate(&mut self, cause: EliminationCause, by: Option<String>) {
        if self.elimination.is_none() {
            self.elimination = Some(Elimination { cause, by });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(cells: &[(i32, i32)]) -> Vec<Coord> {
        cells.iter().map(|&(x, y)| Coord::new(x, y)).collect()
    }

    #[test]
    fn test_tail_will_grow_only_with_duplicated_tail() {
        let growing = Snake::new("a", 100, body(&[(2, 2), (2, 1), (2, 1)]), false);
        assert!(growing.tail_will_grow());

        let moving = Snake::new("b", 100, body(&[(2, 2), (2, 1), (2, 0)]), false);
        assert!(!moving.tail_will_grow());

        let tiny = Snake::new("c", 100, body(&[(2, 2)]), false);
        assert!(!tiny.tail_will_grow());
    }

    #[test]
    fn test_last_move() {
        let snake = Snake::new("a", 100, body(&[(3, 4), (3, 3), (2, 3)]), true);
        assert_eq!(snake.last_move(), Some(Coord::new(0, 1)));

        let stacked = Snake::new("b", 100, body(&[(1, 1), (1, 1), (1, 1)]), false);
        assert_eq!(stacked.last_move(), None);

        let single = Snake::new("c", 100, body(&[(1, 1)]), false);
        assert_eq!(single.last_move(), None);
    }

    #[test]
    fn test_blocking_cells_excludes_vacating_tail() {
        let snake = Snake::new("a", 100, body(&[(0, 0), (1, 0), (2, 0)]), false);
        let cells: Vec<Coord> = snake.blocking_cells().copied().collect();
        assert_eq!(cells, body(&[(0, 0), (1, 0)]));

        let grown = Snake::new("b", 100, body(&[(0, 0), (1, 0), (1, 0)]), false);
        assert_eq!(grown.blocking_cells().count(), 3);
    }

    #[test]
    fn test_first_elimination_sticks() {
        let mut snake = Snake::new("a", 0, body(&[(0, 0)]), false);
        snake.eliminate(EliminationCause::OutOfHealth, None);
        snake.eliminate(EliminationCause::HeadCollision, Some("b".to_string()));
        assert_eq!(
            snake.elimination.as_ref().map(|e| e.cause),
            Some(EliminationCause::OutOfHealth)
        );
        assert!(!snake.is_alive());
    }
}
