//! Frame capture - Classification table and rendered bitmaps
//!
//! Every symbol classifies as white, black or twinkle. Twinkle cells are
//! resolved with a fresh coin flip each time they are rendered, so two
//! captures of an unchanged grid may differ.

use super::grid::{Grid, Region};
use super::pattern::PatternContainer;
use super::symbol::{Symbol, ALPHABET_SIZE};
use crate::random::{coin_flip, RandomSource};
use serde::{Deserialize, Serialize};

/// Rendering class of a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Classification {
    #[default]
    White,
    Black,
    Twinkle,
}

/// Symbol -> class lookup, all white until a WBT command runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationTable {
    classes: Vec<Classification>,
}

impl ClassificationTable {
    pub fn new() -> Self {
        Self {
            classes: vec![Classification::White; ALPHABET_SIZE],
        }
    }

    pub fn classify(&self, symbol: Symbol) -> Classification {
        self.classes[symbol.index()]
    }

    pub fn assign(&mut self, symbols: &[Symbol], class: Classification) {
        for s in symbols {
            self.classes[s.index()] = class;
        }
    }

    /// Ink value of a symbol: black is `true`, twinkle flips a coin
    pub fn render(&self, symbol: Symbol, rng: &mut dyn RandomSource) -> bool {
        match self.classify(symbol) {
            Classification::White => false,
            Classification::Black => true,
            Classification::Twinkle => coin_flip(rng),
        }
    }

    /// Render a grid region into a pattern (`rows x cols` of the region)
    pub fn capture(
        &self,
        grid: &Grid,
        region: Region,
        rng: &mut dyn RandomSource,
    ) -> PatternContainer {
        let rows = (region.row_end - region.row_start).max(0) as usize;
        let cols = (region.col_end - region.col_start).max(0) as usize;
        let mut pattern = PatternContainer::new(rows, cols);
        for r in 0..rows {
            for c in 0..cols {
                let row = region.row_start as usize + r;
                let col = region.col_start as usize + c;
                pattern.set(r, c, self.render(grid.at(row, col), rng));
            }
        }
        pattern
    }
}

impl Default for ClassificationTable {
    fn default() -> Self {
        Self::new()
    }
}

/// One captured bilevel image; `true` is black
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl Frame {
    /// Render the whole grid
    pub fn capture(grid: &Grid, table: &ClassificationTable, rng: &mut dyn RandomSource) -> Self {
        let bits = grid
            .coords()
            .map(|(r, c)| table.render(grid.at(r, c), rng))
            .collect();
        Self {
            width: grid.width(),
            height: grid.height(),
            bits,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_black(&self, row: usize, col: usize) -> bool {
        self.bits[row * self.width + col]
    }

    pub fn is_white(&self, row: usize, col: usize) -> bool {
        !self.is_black(row, col)
    }

    /// Row-major bits
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn row(&self, row: usize) -> &[bool] {
        &self.bits[row * self.width..(row + 1) * self.width]
    }

    pub fn black_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::StdSource;

    fn sym(c: char) -> Symbol {
        Symbol::new(c).unwrap()
    }

    #[test]
    fn test_default_table_is_white() {
        let table = ClassificationTable::new();
        let grid = Grid::new(4, 3);
        let mut rng = StdSource::seeded(0);
        let frame = Frame::capture(&grid, &table, &mut rng);
        assert_eq!(frame.black_count(), 0);
        assert_eq!(frame.bits().len(), 12);
    }

    #[test]
    fn test_black_cells_render() {
        let mut table = ClassificationTable::new();
        table.assign(&[sym('1')], Classification::Black);
        let mut grid = Grid::new(3, 2);
        grid.set(1, 2, sym('1'));
        let mut rng = StdSource::seeded(0);
        let frame = Frame::capture(&grid, &table, &mut rng);
        assert!(frame.is_black(1, 2));
        assert!(frame.is_white(0, 0));
        assert_eq!(frame.row(1), &[false, false, true]);
    }

    #[test]
    fn test_twinkle_mixes() {
        let mut table = ClassificationTable::new();
        table.assign(&[sym('0')], Classification::Twinkle);
        let grid = Grid::new(40, 40);
        let mut rng = StdSource::seeded(11);
        let frame = Frame::capture(&grid, &table, &mut rng);
        let black = frame.black_count();
        assert!(black > 600 && black < 1000, "black {}", black);
    }

    #[test]
    fn test_capture_region() {
        let mut table = ClassificationTable::new();
        table.assign(&[sym('1')], Classification::Black);
        let mut grid = Grid::new(4, 4);
        grid.set(1, 2, sym('1'));
        let mut rng = StdSource::seeded(0);
        let pattern = table.capture(&grid, Region::at(1, 1, 2, 3), &mut rng);
        assert_eq!(pattern.rows(), 2);
        assert_eq!(pattern.cols(), 3);
        assert!(pattern.get(0, 1));
        assert!(!pattern.get(0, 0));
        assert!(!pattern.get(1, 1));
    }
}
