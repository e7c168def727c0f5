//! Grid - Fixed-size image buffer of pixel symbols
//!
//! Coordinates are `(row, col)` with `row` in `0..height` and `col` in
//! `0..width`. Neighbour lookups produce signed coordinates so that
//! non-wrapping lookups can fall off the edge; only range-checked reads
//! ever touch the buffer.

use super::symbol::{Direction, Symbol};
use serde::{Deserialize, Serialize};

/// Half-open rectangle `[row_start, row_end) x [col_start, col_end)`.
///
/// Corners may lie outside the grid; iteration wraps them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub row_start: i64,
    pub col_start: i64,
    pub row_end: i64,
    pub col_end: i64,
}

impl Region {
    pub fn new(row_start: i64, col_start: i64, row_end: i64, col_end: i64) -> Self {
        Self {
            row_start,
            col_start,
            row_end,
            col_end,
        }
    }

    /// Region of `rows x cols` cells anchored at its top-left corner
    pub fn at(row: i64, col: i64, rows: i64, cols: i64) -> Self {
        Self::new(row, col, row + rows, col + cols)
    }
}

/// Image buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Symbol>,
}

impl Grid {
    /// All-`'0'` grid
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, Symbol::ZERO)
    }

    pub fn filled(width: usize, height: usize, value: Symbol) -> Self {
        Self {
            width,
            height,
            cells: vec![value; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Range-checked read
    pub fn get(&self, row: i64, col: i64) -> Option<Symbol> {
        if row < 0 || col < 0 || row >= self.height as i64 || col >= self.width as i64 {
            return None;
        }
        Some(self.cells[row as usize * self.width + col as usize])
    }

    /// Read a cell known to be in range
    pub fn at(&self, row: usize, col: usize) -> Symbol {
        self.cells[row * self.width + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: Symbol) {
        let idx = row * self.width + col;
        self.cells[idx] = value;
    }

    pub fn fill(&mut self, value: Symbol) {
        self.cells.fill(value);
    }

    /// Row as a string of symbols
    pub fn row_string(&self, row: usize) -> String {
        self.cells[row * self.width..(row + 1) * self.width]
            .iter()
            .map(|s| s.as_char())
            .collect()
    }

    /// Coordinate of the neighbour `offset` steps away in `direction`.
    ///
    /// `None` (a symbol that is not a direction letter) addresses the origin.
    /// With `wrap`, both axes are reduced modulo the grid dimensions.
    pub fn neighbour_of(
        &self,
        direction: Option<Direction>,
        offset: i64,
        row: usize,
        col: usize,
        wrap: bool,
    ) -> (i64, i64) {
        let (r, c) = match direction {
            Some(dir) => {
                let (dr, dc) = dir.delta();
                (row as i64 + dr * offset, col as i64 + dc * offset)
            }
            None => (0, 0),
        };
        if wrap {
            self.wrap(r, c)
        } else {
            (r, c)
        }
    }

    /// Reduce both axes modulo the grid dimensions
    pub fn wrap(&self, row: i64, col: i64) -> (i64, i64) {
        (
            row.rem_euclid(self.height as i64),
            col.rem_euclid(self.width as i64),
        )
    }

    /// A coordinate is rejected only when BOTH axes are out of range.
    pub fn is_out_of_bounds(&self, row: i64, col: i64) -> bool {
        let row_out = row < 0 || row >= self.height as i64;
        let col_out = col < 0 || col >= self.width as i64;
        row_out && col_out
    }

    /// Count neighbours at offset 1 holding `value`
    pub fn count_neighbours(
        &self,
        row: usize,
        col: usize,
        directions: &[Symbol],
        value: Symbol,
        wrap: bool,
    ) -> usize {
        directions
            .iter()
            .map(|&d| self.neighbour_of(Direction::from_symbol(d), 1, row, col, wrap))
            .filter(|&(r, c)| !self.is_out_of_bounds(r, c))
            .filter(|&(r, c)| self.get(r, c) == Some(value))
            .count()
    }

    /// Conway-style trigger: the neighbour count of ANY of `values`
    /// appears in `thresholds`. Thresholds are read by symbol index, so
    /// 'A' stands for a count of 10 (reachable with repeated directions).
    pub fn region_matches(
        &self,
        row: usize,
        col: usize,
        directions: &[Symbol],
        thresholds: &[Symbol],
        values: &[Symbol],
        wrap: bool,
    ) -> bool {
        let mut counts: Vec<usize> = thresholds.iter().map(|s| s.index()).collect();
        counts.sort_unstable();
        values.iter().any(|&v| {
            counts
                .binary_search(&self.count_neighbours(row, col, directions, v, wrap))
                .is_ok()
        })
    }

    /// Row-major list of all coordinates
    pub fn coords(&self) -> impl Iterator<Item = (usize, usize)> {
        let width = self.width;
        (0..self.height).flat_map(move |r| (0..width).map(move |c| (r, c)))
    }

    /// Row-major coordinates of `region`, wrapped into the grid
    pub fn region_coords(&self, region: Region) -> impl Iterator<Item = (usize, usize)> {
        let (height, width) = (self.height as i64, self.width as i64);
        (region.row_start..region.row_end).flat_map(move |r| {
            (region.col_start..region.col_end)
                .map(move |c| (r.rem_euclid(height) as usize, c.rem_euclid(width) as usize))
        })
    }
}
