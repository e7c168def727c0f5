//! Transform - Pixel rewrite rules and their boxed variants
//!
//! ## Atomic rules
//!
//! | Rule | Rewrites a pixel when                                   |
//! |------|---------------------------------------------------------|
//! | XL   | its own event fires                                     |
//! | AXL  | its event fires AND the neighbourhood region matches    |
//! | PXL  | its event fires; result depends on a fixed neighbour    |
//!
//! ## Boxed rules
//!
//! BXL/BAXL/BPXL wrap one atomic rule and apply it only inside a tiled
//! array of rectangles, either masked by a named pattern or with each tile
//! re-rolling its own event.

use super::grid::{Grid, Region};
use super::symbol::{Direction, Symbol, ALPHABET_SIZE};
use super::variables::{Parameter, VariableStore};
use crate::error::{ExplorError, Result};
use crate::random::{event, RandomSource};
use serde::{Deserialize, Serialize};

// =============================================================================
// Translation tables
// =============================================================================

/// Symbol substitution (XLIT)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Translation {
    /// Position `i` holds the replacement for the symbol with index `i`.
    /// Symbols past the end of the table are left unchanged.
    Table(Vec<Symbol>),
    /// `(from, to)` pairs, first match wins
    Pairs(Vec<(Symbol, Symbol)>),
}

impl Translation {
    /// Positional table; `full` pads it to the whole alphabet with its
    /// last symbol (the `...` form).
    pub fn table(mut symbols: Vec<Symbol>, full: bool) -> Self {
        if full {
            if let Some(&last) = symbols.last() {
                if symbols.len() < ALPHABET_SIZE {
                    symbols.resize(ALPHABET_SIZE, last);
                }
            }
        }
        Self::Table(symbols)
    }

    pub fn parse_table(symbols: &str, full: bool) -> Result<Self> {
        Ok(Self::table(Symbol::parse_all(symbols)?, full))
    }

    /// Parse two-symbol pairs such as `["01", "1A"]`
    pub fn parse_pairs(pairs: &[&str]) -> Result<Self> {
        let pairs = pairs
            .iter()
            .map(|p| match Symbol::parse_all(p)?.as_slice() {
                [from, to] => Ok((*from, *to)),
                _ => Err(ExplorError::InvalidParameter(p.to_string())),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::Pairs(pairs))
    }

    /// Same translation, padded to the full alphabet when it is a table
    pub fn padded(self) -> Self {
        match self {
            Self::Table(symbols) => Self::table(symbols, true),
            pairs => pairs,
        }
    }

    pub fn transform(&self, value: Symbol) -> Symbol {
        match self {
            Self::Table(symbols) => symbols.get(value.index()).copied().unwrap_or(value),
            Self::Pairs(pairs) => pairs
                .iter()
                .find(|(from, _)| *from == value)
                .map(|&(_, to)| to)
                .unwrap_or(value),
        }
    }

    /// Every stored symbol, both sides of each pair included
    pub fn symbols_mut(&mut self) -> Box<dyn Iterator<Item = &mut Symbol> + '_> {
        match self {
            Self::Table(symbols) => Box::new(symbols.iter_mut()),
            Self::Pairs(pairs) => Box::new(pairs.iter_mut().flat_map(|(a, b)| [a, b])),
        }
    }
}

/// Directional substitution triples `(current, neighbour, result)` (PXLIT)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TripleTable {
    pub triples: Vec<[Symbol; 3]>,
}

impl TripleTable {
    pub fn new(triples: Vec<[Symbol; 3]>) -> Self {
        Self { triples }
    }

    /// Parse three-symbol groups such as `["010", "101"]`
    pub fn parse(groups: &[&str]) -> Result<Self> {
        let triples = groups
            .iter()
            .map(|g| match Symbol::parse_all(g)?.as_slice() {
                [a, b, c] => Ok([*a, *b, *c]),
                _ => Err(ExplorError::InvalidParameter(g.to_string())),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { triples })
    }

    pub fn transform(&self, at_direction: Symbol, current: Symbol) -> Symbol {
        self.triples
            .iter()
            .find(|t| t[0] == current && t[1] == at_direction)
            .map(|t| t[2])
            .unwrap_or(current)
    }
}

// =============================================================================
// Atomic rules
// =============================================================================

/// Services a rule needs while rewriting one pixel
pub struct Scope<'a> {
    pub grid: &'a mut Grid,
    pub rng: &'a mut dyn RandomSource,
    /// Wrap-around addressing for neighbourhood checks
    pub wrap: bool,
}

/// A rule that rewrites a single pixel in place
pub trait PixelRule {
    /// Resolve per-firing operands. `None` skips the rule for this firing.
    fn prepare(&self, variables: &mut VariableStore) -> Option<i64>;

    /// Rewrite `(row, col)` given the prepared event probability
    fn rewrite(&self, scope: &mut Scope<'_>, prob: i64, row: usize, col: usize);
}

/// Direct rewrite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Xl {
    pub prob: i64,
    pub translation: Translation,
}

impl PixelRule for Xl {
    fn prepare(&self, _variables: &mut VariableStore) -> Option<i64> {
        Some(self.prob)
    }

    fn rewrite(&self, scope: &mut Scope<'_>, prob: i64, row: usize, col: usize) {
        if event(scope.rng, prob) {
            let current = scope.grid.at(row, col);
            scope.grid.set(row, col, self.translation.transform(current));
        }
    }
}

/// Neighbourhood-conditioned rewrite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axl {
    /// Accepted neighbour counts, as digit symbols
    pub numbers: Vec<Symbol>,
    /// Direction letters to inspect
    pub directions: Vec<Symbol>,
    /// Values whose neighbour count is tested
    pub values: Vec<Symbol>,
    pub prob: Parameter,
    pub translation: Translation,
}

impl PixelRule for Axl {
    fn prepare(&self, variables: &mut VariableStore) -> Option<i64> {
        variables.resolve(&self.prob)
    }

    fn rewrite(&self, scope: &mut Scope<'_>, prob: i64, row: usize, col: usize) {
        // Event before region scan: the scan is the expensive part
        if event(scope.rng, prob)
            && scope.grid.region_matches(
                row,
                col,
                &self.directions,
                &self.numbers,
                &self.values,
                scope.wrap,
            )
        {
            let current = scope.grid.at(row, col);
            scope.grid.set(row, col, self.translation.transform(current));
        }
    }
}

/// Directional-copy rewrite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pxl {
    pub direction: Symbol,
    pub prob: i64,
    pub table: TripleTable,
}

impl PixelRule for Pxl {
    fn prepare(&self, _variables: &mut VariableStore) -> Option<i64> {
        Some(self.prob)
    }

    fn rewrite(&self, scope: &mut Scope<'_>, prob: i64, row: usize, col: usize) {
        let (nr, nc) =
            scope
                .grid
                .neighbour_of(Direction::from_symbol(self.direction), 1, row, col, true);
        if event(scope.rng, prob) && !scope.grid.is_out_of_bounds(nr, nc) {
            if let Some(neighbour) = scope.grid.get(nr, nc) {
                let current = scope.grid.at(row, col);
                scope.grid.set(row, col, self.table.transform(neighbour, current));
            }
        }
    }
}

// =============================================================================
// Boxed rules
// =============================================================================

/// Tile layout operands, each a [`Parameter`]
///
/// ```text
/// row, col          anchor of the first tile
/// tile_rows/cols    extent of one tile (w, t)
/// row_step/col_step spacing between tile anchors (h, v)
/// cols, rows        number of tiles (c, r)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoxGeometry {
    pub row: Parameter,
    pub col: Parameter,
    pub tile_rows: Parameter,
    pub tile_cols: Parameter,
    pub row_step: Parameter,
    pub col_step: Parameter,
    pub cols: Parameter,
    pub rows: Parameter,
}

impl BoxGeometry {
    /// From the eight operands in source order `x, y, w, t, h, v, c, r`
    pub fn from_params(params: [Parameter; 8]) -> Self {
        let [row, col, tile_rows, tile_cols, row_step, col_step, cols, rows] = params;
        Self {
            row,
            col,
            tile_rows,
            tile_cols,
            row_step,
            col_step,
            cols,
            rows,
        }
    }

    pub fn params(&self) -> [&Parameter; 8] {
        [
            &self.row,
            &self.col,
            &self.tile_rows,
            &self.tile_cols,
            &self.row_step,
            &self.col_step,
            &self.cols,
            &self.rows,
        ]
    }

    /// Resolve against the current variables; negative values are rejected
    pub fn resolve(&self, variables: &mut VariableStore) -> Result<Tiling> {
        let mut values = [0i64; 8];
        for (slot, param) in values.iter_mut().zip(self.params()) {
            let v = variables.require(param, "box geometry")?;
            if v < 0 {
                return Err(ExplorError::InvalidGeometry(format!(
                    "{} resolved to {}",
                    param, v
                )));
            }
            *slot = v;
        }
        let [row, col, tile_rows, tile_cols, row_step, col_step, cols, rows] = values;
        if far_edge(row, rows, row_step, tile_rows).is_none()
            || far_edge(col, cols, col_step, tile_cols).is_none()
        {
            return Err(ExplorError::InvalidGeometry(format!(
                "tiles from ({}, {}) overflow the coordinate range",
                row, col
            )));
        }
        Ok(Tiling {
            row,
            col,
            tile_rows,
            tile_cols,
            row_step,
            col_step,
            cols,
            rows,
        })
    }
}

/// Outermost coordinate reached by the last tile along one axis
fn far_edge(anchor: i64, count: i64, step: i64, extent: i64) -> Option<i64> {
    let last = match count {
        0 => anchor,
        n => (n - 1).checked_mul(step)?.checked_add(anchor)?,
    };
    last.checked_add(extent / 2)
}

/// Resolved [`BoxGeometry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tiling {
    pub row: i64,
    pub col: i64,
    pub tile_rows: i64,
    pub tile_cols: i64,
    pub row_step: i64,
    pub col_step: i64,
    pub cols: i64,
    pub rows: i64,
}

impl Tiling {
    /// Tiles in application order: tile column outer, tile row inner.
    /// Yields `(tile_row, tile_col, region)`; a tile is centred on its
    /// anchor and spans half its extent to either side.
    pub fn tiles(&self) -> impl Iterator<Item = (usize, usize, Region)> {
        let t = *self;
        (0..t.cols).flat_map(move |c| {
            (0..t.rows).map(move |r| {
                let ar = t.row + r * t.row_step;
                let ac = t.col + c * t.col_step;
                let region = Region::new(
                    ar - t.tile_rows / 2,
                    ac - t.tile_cols / 2,
                    ar + t.tile_rows / 2,
                    ac + t.tile_cols / 2,
                );
                (r as usize, c as usize, region)
            })
        })
    }
}

/// An atomic rule restricted to tiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boxed<T> {
    /// Pattern name, or a literal "1 in n" chance per tile
    pub pattern: Parameter,
    pub geometry: BoxGeometry,
    pub transform: T,
}
