//! Symbol - Base-36 pixel values and compass directions
//!
//! Every cell of the grid, every entry of a translation table and every
//! neighbourhood descriptor (threshold digits, direction letters) is stored
//! as a [`Symbol`]. Keeping them in one alphabet is what lets XLI rewrite
//! any of those arrays through the same substitution table.
//!
//! ```text
//! 0 1 2 ... 9 A B ... Z
//! 0 1 2 ... 9 10 11 .. 35   (index)
//! ```

use crate::error::{ExplorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of distinct pixel symbols
pub const ALPHABET_SIZE: usize = 36;

/// One base-36 character (`0-9`, `A-Z`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(u8);

impl Symbol {
    /// The blank symbol every grid starts with
    pub const ZERO: Self = Self(b'0');

    pub fn new(c: char) -> Result<Self> {
        match c {
            '0'..='9' | 'A'..='Z' => Ok(Self(c as u8)),
            _ => Err(ExplorError::InvalidSymbol(c)),
        }
    }

    /// Symbol at alphabet position `index` (0-35)
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0..=9 => Some(Self(b'0' + index as u8)),
            10..=35 => Some(Self(b'A' + (index - 10) as u8)),
            _ => None,
        }
    }

    /// Parse every character of `s` as a symbol
    pub fn parse_all(s: &str) -> Result<Vec<Self>> {
        s.chars().map(Self::new).collect()
    }

    pub fn index(self) -> usize {
        match self.0 {
            b'0'..=b'9' => (self.0 - b'0') as usize,
            _ => 10 + (self.0 - b'A') as usize,
        }
    }

    pub fn as_char(self) -> char {
        self.0 as char
    }
}

impl Default for Symbol {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl TryFrom<char> for Symbol {
    type Error = ExplorError;

    fn try_from(c: char) -> Result<Self> {
        Self::new(c)
    }
}

/// Compass direction of the square neighbourhood
///
/// Deltas are `(row, column)`:
///
/// ```text
/// W(-1,-1)  L(-1, 0)  S(-1,+1)
/// A( 0,-1)     .      B( 0,+1)
/// N(+1,-1)  R(+1, 0)  E(+1,+1)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    W,
    A,
    N,
    R,
    E,
    B,
    S,
    L,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::W,
        Direction::A,
        Direction::N,
        Direction::R,
        Direction::E,
        Direction::B,
        Direction::S,
        Direction::L,
    ];

    /// Direction named by a symbol, if it is one of the eight letters
    pub fn from_symbol(symbol: Symbol) -> Option<Self> {
        match symbol.as_char() {
            'W' => Some(Self::W),
            'A' => Some(Self::A),
            'N' => Some(Self::N),
            'R' => Some(Self::R),
            'E' => Some(Self::E),
            'B' => Some(Self::B),
            'S' => Some(Self::S),
            'L' => Some(Self::L),
            _ => None,
        }
    }

    pub fn symbol(self) -> Symbol {
        let c = match self {
            Self::W => b'W',
            Self::A => b'A',
            Self::N => b'N',
            Self::R => b'R',
            Self::E => b'E',
            Self::B => b'B',
            Self::S => b'S',
            Self::L => b'L',
        };
        Symbol(c)
    }

    /// Unit `(row, column)` step
    pub fn delta(self) -> (i64, i64) {
        match self {
            Self::W => (-1, -1),
            Self::A => (0, -1),
            Self::N => (1, -1),
            Self::R => (1, 0),
            Self::E => (1, 1),
            Self::B => (0, 1),
            Self::S => (-1, 1),
            Self::L => (-1, 0),
        }
    }
}
