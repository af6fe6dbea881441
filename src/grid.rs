// Grid primitives shared by the simulator, the expander and the array computations
//
// Board arrays are (H+2) x (W+2) with a one-cell border around the playable
// area. Game coordinates have y growing upward while array row 0 is the top
// border row, so grid (x, y) lives at array (row, col) = (H - y, x + 1).

use crate::types::Coord;

/// Head position assigned to a snake that has no legal move left.
/// The simulator eliminates any snake moving here; it never takes part in geometry.
pub const DEATH_COORD: Coord = Coord { x: 1000, y: 1000 };

/// Value of every border cell in every derived array
pub const BORDER_VALUE: i16 = -128;

/// Body cell marker inside the BFS tensor
pub const SNAKE_BODY: i16 = -127;

/// Interior cell not reached (yet) by a wavefront
pub const UNEXPLORED: i16 = -1;

/// Largest accepted board side; every wavefront distance on such a board fits a cell
pub const MAX_DIMENSION: i32 = 127;

#[inline]
pub fn in_bounds(coord: Coord, width: i32, height: i32) -> bool {
    coord.x >= 0 && coord.x < width && coord.y >= 0 && coord.y < height
}

/// The four orthogonal neighbours in Up, Down, Left, Right order (may be out of bounds)
#[inline]
pub fn adjacent(coord: Coord) -> [Coord; 4] {
    [
        Coord { x: coord.x, y: coord.y + 1 },
        Coord { x: coord.x, y: coord.y - 1 },
        Coord { x: coord.x - 1, y: coord.y },
        Coord { x: coord.x + 1, y: coord.y },
    ]
}

#[inline]
pub fn manhattan(a: Coord, b: Coord) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

#[inline]
pub fn add(a: Coord, b: Coord) -> Coord {
    Coord { x: a.x + b.x, y: a.y + b.y }
}

#[inline]
pub fn sub(a: Coord, b: Coord) -> Coord {
    Coord { x: a.x - b.x, y: a.y - b.y }
}

/// Bordered 2D array of small signed values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<i16>,
}

impl Grid {
    /// Creates a grid whose interior is filled with `interior` and border with `BORDER_VALUE`
    pub fn new(width: i32, height: i32, interior: i16) -> Self {
        let cols = (width + 2) as usize;
        let rows = (height + 2) as usize;
        let mut cells = vec![BORDER_VALUE; rows * cols];

        for row in 1..=height as usize {
            let start = row * cols + 1;
            for cell in &mut cells[start..start + width as usize] {
                *cell = interior;
            }
        }

        Grid { width, height, cells }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Number of array columns including the border
    #[inline]
    pub fn cols(&self) -> usize {
        (self.width + 2) as usize
    }

    /// Number of array rows including the border
    #[inline]
    pub fn rows(&self) -> usize {
        (self.height + 2) as usize
    }

    /// Flat array index of an in-bounds board coordinate
    #[inline]
    pub fn index_of(&self, coord: Coord) -> usize {
        debug_assert!(in_bounds(coord, self.width, self.height));
        let row = (self.height - coord.y) as usize;
        let col = (coord.x + 1) as usize;
        row * self.cols() + col
    }

    /// Board coordinate of a flat index; border indices map outside the board
    #[inline]
    pub fn coord_of(&self, index: usize) -> Coord {
        let row = (index / self.cols()) as i32;
        let col = (index % self.cols()) as i32;
        Coord {
            x: col - 1,
            y: self.height - row,
        }
    }

    /// Value at a board coordinate; anything outside the board reads as border
    #[inline]
    pub fn get(&self, coord: Coord) -> i16 {
        if in_bounds(coord, self.width, self.height) {
            self.cells[self.index_of(coord)]
        } else {
            BORDER_VALUE
        }
    }

    /// Writes an in-bounds board coordinate; out-of-bounds writes are ignored
    #[inline]
    pub fn set(&mut self, coord: Coord, value: i16) {
        if in_bounds(coord, self.width, self.height) {
            let idx = self.index_of(coord);
            self.cells[idx] = value;
        }
    }

    #[inline]
    pub fn get_rc(&self, row: usize, col: usize) -> i16 {
        self.cells[row * self.cols() + col]
    }

    pub fn cells(&self) -> &[i16] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [i16] {
        &mut self.cells
    }

    /// Flat indices of the four array neighbours of an interior index
    #[inline]
    pub fn neighbor_indices(&self, index: usize) -> [usize; 4] {
        let cols = self.cols();
        [index - cols, index + cols, index - 1, index + 1]
    }

    /// Iterates interior cells as (coord, value) in row-major array order
    pub fn interior(&self) -> impl Iterator<Item = (Coord, i16)> + '_ {
        let cols = self.cols();
        let width = self.width as usize;
        (1..=self.height as usize).flat_map(move |row| {
            (1..=width).map(move |col| {
                let idx = row * cols + col;
                (self.coord_of(idx), self.cells[idx])
            })
        })
    }

    /// True if the flat index is part of the border frame
    #[inline]
    pub fn is_border_index(&self, index: usize) -> bool {
        let row = index / self.cols();
        let col = index % self.cols();
        row == 0 || col == 0 || row == self.rows() - 1 || col == self.cols() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_has_border_and_interior() {
        let grid = Grid::new(3, 2, 1);
        assert_eq!(grid.rows(), 4);
        assert_eq!(grid.cols(), 5);

        for idx in 0..grid.cells().len() {
            if grid.is_border_index(idx) {
                assert_eq!(grid.cells()[idx], BORDER_VALUE);
            } else {
                assert_eq!(grid.cells()[idx], 1);
            }
        }
        assert_eq!(grid.interior().count(), 6);
    }

    #[test]
    fn test_coordinate_mapping_flips_y() {
        let grid = Grid::new(11, 11, 0);
        // top-left playable cell is (0, 10)
        assert_eq!(grid.index_of(Coord::new(0, 10)), grid.cols() + 1);
        // bottom-right playable cell is (10, 0)
        assert_eq!(
            grid.index_of(Coord::new(10, 0)),
            11 * grid.cols() + 11
        );

        for (coord, _) in grid.interior() {
            assert_eq!(grid.coord_of(grid.index_of(coord)), coord);
        }
    }

    #[test]
    fn test_out_of_bounds_reads_border() {
        let mut grid = Grid::new(5, 5, 0);
        assert_eq!(grid.get(Coord::new(-1, 2)), BORDER_VALUE);
        assert_eq!(grid.get(DEATH_COORD), BORDER_VALUE);
        grid.set(Coord::new(5, 0), 7);
        assert!(grid.cells().iter().all(|&v| v != 7));
    }

    #[test]
    fn test_helpers() {
        let a = Coord::new(2, 3);
        assert_eq!(manhattan(a, Coord::new(5, 1)), 5);
        assert_eq!(add(a, Coord::new(-1, 1)), Coord::new(1, 4));
        assert_eq!(sub(a, Coord::new(2, 2)), Coord::new(0, 1));
        assert!(in_bounds(a, 11, 11));
        assert!(!in_bounds(Coord::new(11, 0), 11, 11));
        assert_eq!(
            adjacent(a),
            [Coord::new(2, 4), Coord::new(2, 2), Coord::new(1, 3), Coord::new(3, 3)]
        );
    }
}
