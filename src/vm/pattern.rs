//! Pattern - Named boolean stamps for boxed transforms
//!
//! Patterns come from two places: literal `PAT` rows handed over by the
//! front end (octal digits, three bits each), and SVP captures of the
//! running grid. The store is append-only.

use crate::error::{ExplorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Rectangular grid of booleans
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PatternContainer {
    data: Vec<Vec<bool>>,
    cols: usize,
}

impl PatternContainer {
    /// All-false pattern of `rows x cols`
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![vec![false; cols]; rows],
            cols,
        }
    }

    /// Single-row pattern
    pub fn from_row(row: Vec<bool>) -> Self {
        Self {
            cols: row.len(),
            data: vec![row],
        }
    }

    /// Build from octal digit rows, e.g. `["52", "07"]`
    pub fn from_octal_rows(rows: &[&str]) -> Result<Self> {
        let mut iter = rows.iter();
        let first = iter
            .next()
            .ok_or_else(|| ExplorError::InvalidParameter(String::new()))?;
        let mut pattern = Self::from_row(octal_row(first)?);
        for row in iter {
            pattern.push_row("octal", octal_row(row)?)?;
        }
        Ok(pattern)
    }

    pub fn rows(&self) -> usize {
        self.data.len()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Bit at `(row, col)`; cells outside the pattern read as false
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.data
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(false)
    }

    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        if let Some(cell) = self.data.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = value;
        }
    }

    pub fn row(&self, row: usize) -> Option<&[bool]> {
        self.data.get(row).map(|r| r.as_slice())
    }

    /// Append a continuation row; `name` is only used for the error
    pub fn push_row(&mut self, name: &str, row: Vec<bool>) -> Result<()> {
        if row.len() != self.cols {
            return Err(ExplorError::PatternWidthMismatch {
                name: name.to_string(),
                expected: self.cols,
                got: row.len(),
            });
        }
        self.data.push(row);
        Ok(())
    }
}

/// Expand octal digits to bits, most significant first (`5` -> `1,0,1`)
pub fn octal_row(digits: &str) -> Result<Vec<bool>> {
    let mut bits = Vec::with_capacity(digits.len() * 3);
    for c in digits.chars() {
        let d = c
            .to_digit(8)
            .ok_or_else(|| ExplorError::InvalidParameter(digits.to_string()))?;
        bits.extend([d & 4 != 0, d & 2 != 0, d & 1 != 0]);
    }
    Ok(bits)
}

/// Append-only table of named patterns
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternStore {
    patterns: HashMap<String, PatternContainer>,
    /// Most recently defined literal pattern, target of continuation rows
    last_defined: Option<String>,
}

impl PatternStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new literal pattern with its first row
    pub fn define(&mut self, name: &str, first_row: Vec<bool>) -> Result<()> {
        if self.patterns.contains_key(name) {
            return Err(ExplorError::DuplicatePattern(name.to_string()));
        }
        self.patterns
            .insert(name.to_string(), PatternContainer::from_row(first_row));
        self.last_defined = Some(name.to_string());
        Ok(())
    }

    /// Extend the most recently defined literal pattern
    pub fn continue_last(&mut self, row: Vec<bool>) -> Result<()> {
        let name = self
            .last_defined
            .as_ref()
            .ok_or(ExplorError::OrphanPatternRow)?;
        let pattern = self
            .patterns
            .get_mut(name)
            .ok_or(ExplorError::OrphanPatternRow)?;
        pattern.push_row(name, row)
    }

    /// Store a captured pattern. An existing name keeps its first content;
    /// returns whether the pattern was stored.
    pub fn insert_captured(&mut self, name: &str, pattern: PatternContainer) -> bool {
        if self.patterns.contains_key(name) {
            return false;
        }
        self.patterns.insert(name.to_string(), pattern);
        true
    }

    pub fn get(&self, name: &str) -> Option<&PatternContainer> {
        self.patterns.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.patterns.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.patterns.keys().map(|k| k.as_str())
    }
}
