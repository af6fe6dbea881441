// Area-of-control computation
//
// One BFS slice per living snake (ours first). All slices advance in lockstep,
// one wavefront step at a time, until no slice writes a new cell. Bodies and
// the border are hard walls. The area of control is the set of cells our head
// reaches strictly before every opponent head.

use crate::grid::{Grid, BORDER_VALUE, SNAKE_BODY, UNEXPLORED};
use crate::snake::Snake;

/// Derived arrays of the BFS engine for one board
#[derive(Debug, Clone)]
pub struct AreaOfControl {
    /// `all_snake_bodies_array`: bodies marked, own head 0, rest unexplored
    pub bodies: Vec<Grid>,
    /// `all_snake_moves_array`: wavefront distance per slice, unreachable cells 0
    pub distances: Vec<Grid>,
    /// Our distance on cells we reach first, 0 elsewhere
    pub my_area: Grid,
}

impl AreaOfControl {
    /// Runs the full pipeline for `snakes`, which must be living and start with our snake
    pub fn compute(width: i32, height: i32, snakes: &[&Snake]) -> Self {
        let bodies = snake_bodies_tensor(width, height, snakes);
        let distances = wavefront(&bodies);
        let my_area = my_area_of_control(&distances);
        AreaOfControl {
            bodies,
            distances,
            my_area,
        }
    }

    /// Number of cells in our area of control
    pub fn controlled_cells(&self) -> usize {
        self.my_area.cells().iter().filter(|&&v| v > 0).count()
    }
}

/// Builds one slice per snake with every body (minus tails) blocked and the slice owner's head at 0
pub fn snake_bodies_tensor(width: i32, height: i32, snakes: &[&Snake]) -> Vec<Grid> {
    let mut blocked = Grid::new(width, height, UNEXPLORED);
    for snake in snakes {
        let keep = snake.length() - 1;
        for &cell in snake.body.iter().take(keep) {
            blocked.set(cell, SNAKE_BODY);
        }
        // a length-1 snake is all tail, but its head still occupies the cell
        blocked.set(snake.head(), SNAKE_BODY);
    }

    snakes
        .iter()
        .map(|snake| {
            let mut slice = blocked.clone();
            slice.set(snake.head(), 0);
            slice
        })
        .collect()
}

/// Multi-source wavefront over all slices at once
pub fn wavefront(bodies: &[Grid]) -> Vec<Grid> {
    let mut slices: Vec<Grid> = bodies.to_vec();

    let mut frontiers: Vec<Vec<usize>> = slices
        .iter()
        .map(|slice| {
            slice
                .cells()
                .iter()
                .enumerate()
                .filter(|(_, &v)| v == 0)
                .map(|(idx, _)| idx)
                .collect()
        })
        .collect();

    let mut step: i16 = 0;
    loop {
        let mut wrote_any = false;

        for (slice, frontier) in slices.iter_mut().zip(frontiers.iter_mut()) {
            if frontier.is_empty() {
                continue;
            }

            let mut next = Vec::with_capacity(frontier.len() * 2);
            for &idx in frontier.iter() {
                for neighbor in slice.neighbor_indices(idx) {
                    let cell = &mut slice.cells_mut()[neighbor];
                    if *cell == UNEXPLORED {
                        *cell = step + 1;
                        next.push(neighbor);
                    }
                }
            }

            wrote_any |= !next.is_empty();
            *frontier = next;
        }

        if !wrote_any {
            break;
        }
        step += 1;
    }

    for slice in &mut slices {
        for cell in slice.cells_mut() {
            if *cell == UNEXPLORED {
                *cell = 0;
            }
        }
    }

    slices
}

/// Our slice with every cell an opponent reaches at least as fast zeroed.
///
/// A zero in an opponent slice means the opponent never gets there, so it does
/// not contest the cell.
pub fn my_area_of_control(distances: &[Grid]) -> Grid {
    let mut area = match distances.first() {
        Some(mine) => mine.clone(),
        None => return Grid::new(0, 0, 0),
    };

    let opponents = &distances[1..];
    for (idx, cell) in area.cells_mut().iter_mut().enumerate() {
        if *cell <= 0 {
            *cell = 0;
            continue;
        }
        let contested = opponents.iter().any(|slice| {
            let theirs = slice.cells()[idx];
            theirs > 0 && theirs <= *cell
        });
        if contested {
            *cell = 0;
        }
    }

    area
}

/// Occupancy array: border sentinel, bodies blocked, everything else 0
pub fn board_array(width: i32, height: i32, snakes: &[&Snake]) -> Grid {
    let mut grid = Grid::new(width, height, 0);
    for snake in snakes {
        for &cell in &snake.body {
            grid.set(cell, SNAKE_BODY);
        }
    }
    grid
}

/// True for values that are never part of any wavefront
#[inline]
pub fn is_wall(value: i16) -> bool {
    value == BORDER_VALUE || value == SNAKE_BODY
}
