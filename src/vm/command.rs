//! Command - The closed set of EXPLOR command shapes
//!
//! | Group      | Kinds                | Effect                                 |
//! |------------|----------------------|----------------------------------------|
//! | Rendering  | WBT, MODE, CAM       | classification, modes, frame capture   |
//! | Transforms | XL, AXL, PXL         | whole-grid pixel rewrites              |
//! | Boxed      | BXL, BAXL, BPXL      | tiled/stamped pixel rewrites           |
//! | Control    | GOTO, IF, DO         | jumps and the one-slot subroutine call |
//! | Runtime    | SVP, CHV, CHP, XLI   | stamps, variables, self-modification   |
//!
//! Runtime self-modification (CHP, XLI) goes through fallible projections on
//! [`CommandKind`]: asking a kind for a field it does not have is an
//! [`ExplorError::IllegalMutationTarget`], never a silent no-op.

use super::symbol::Symbol;
use super::transform::{Axl, Boxed, Pxl, Translation, Xl};
use super::variables::Parameter;
use crate::error::{ExplorError, Result};
use crate::random::Probability;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label that returns from a DO subroutine when used as a GOTO target
pub const RETURN_LABEL: &str = "DONE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WrapMode {
    /// WRP - neighbours wrap around the edges
    Wrap,
    /// PLN - neighbours past the edge are skipped
    #[default]
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RenderMode {
    #[default]
    Test,
    Run,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NeighbourhoodMode {
    #[default]
    Square,
    Hex,
}

/// MODE operands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Mode {
    pub wrap: WrapMode,
    pub render: RenderMode,
    pub neighbourhood: NeighbourhoodMode,
}

/// WBT operands: which symbols render white, black or twinkle
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Wbt {
    pub white: Vec<Symbol>,
    pub black: Vec<Symbol>,
    pub twinkle: Vec<Symbol>,
}

impl Wbt {
    pub fn parse(white: &str, black: &str, twinkle: &str) -> Result<Self> {
        Ok(Self {
            white: Symbol::parse_all(white)?,
            black: Symbol::parse_all(black)?,
            twinkle: Symbol::parse_all(twinkle)?,
        })
    }
}

/// IF comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Compare {
    Eq,
    Lt,
    Gt,
}

impl Compare {
    pub fn eval(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Lt => lhs < rhs,
            Self::Gt => lhs > rhs,
        }
    }
}

/// CHV arithmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeOp {
    Set,
    Add,
    Sub,
    Mpy,
    Div,
}

/// XLI target array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    /// AXL neighbour-count thresholds
    Nums,
    /// AXL directions, PXL direction
    Dirs,
    /// AXL tested values
    Chst,
    /// BXL translation table
    Xlit,
    /// WBT symbol lists
    Wbts,
    /// PXL triples
    Tpls,
}

impl Location {
    /// Command kinds that carry this array
    pub fn allowed(self) -> &'static str {
        match self {
            Self::Nums | Self::Chst => "AXL, BAXL",
            Self::Dirs => "AXL, BAXL, PXL, BPXL",
            Self::Xlit => "BXL",
            Self::Wbts => "WBT",
            Self::Tpls => "PXL, BPXL",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Nums => "NUMS",
            Self::Dirs => "DIRS",
            Self::Chst => "CHST",
            Self::Xlit => "XLIT",
            Self::Wbts => "WBTS",
            Self::Tpls => "TPLS",
        };
        f.write_str(s)
    }
}

/// SVP operands: capture `rows x cols` at `(row, col)` into pattern `name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Svp {
    pub name: String,
    pub row: Parameter,
    pub col: Parameter,
    pub rows: Parameter,
    pub cols: Parameter,
}

/// CHV operands: `target op= from` or `target op= random(from..to)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chv {
    pub target: Parameter,
    pub op: ChangeOp,
    pub from: Parameter,
    pub to: Parameter,
}

/// CHP operands: point the boxed command labeled `instance` at `pattern`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chp {
    pub instance: String,
    pub pattern: String,
}

/// XLI operands: rewrite `location` of the command labeled `label`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Xli {
    pub label: String,
    pub location: Location,
    pub prob: i64,
    pub table: Translation,
}

impl Xli {
    /// Replacement tables are padded to the full alphabet with their last symbol
    pub fn new(label: impl Into<String>, location: Location, prob: i64, table: Translation) -> Self {
        Self {
            label: label.into(),
            location,
            prob,
            table: table.padded(),
        }
    }
}

/// Command payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandKind {
    Wbt(Wbt),
    Mode(Mode),
    Cam { frames: i64 },
    Xl(Xl),
    Axl(Axl),
    Pxl(Pxl),
    Bxl(Boxed<Xl>),
    Baxl(Boxed<Axl>),
    Bpxl(Boxed<Pxl>),
    Goto { label: String },
    If {
        lhs: Parameter,
        cmp: Compare,
        rhs: Parameter,
        label: String,
    },
    /// Call `label`; return to `resume` (or the next command) on `GOTO DONE`
    Do {
        label: String,
        resume: Option<String>,
    },
    Svp(Svp),
    Chv(Chv),
    Chp(Chp),
    Xli(Xli),
}

impl CommandKind {
    /// Source mnemonic
    pub fn name(&self) -> &'static str {
        match self {
            Self::Wbt(_) => "WBT",
            Self::Mode(_) => "MODE",
            Self::Cam { .. } => "CAM",
            Self::Xl(_) => "XL",
            Self::Axl(_) => "AXL",
            Self::Pxl(_) => "PXL",
            Self::Bxl(_) => "BXL",
            Self::Baxl(_) => "BAXL",
            Self::Bpxl(_) => "BPXL",
            Self::Goto { .. } => "GOTO",
            Self::If { .. } => "IF",
            Self::Do { .. } => "DO",
            Self::Svp(_) => "SVP",
            Self::Chv(_) => "CHV",
            Self::Chp(_) => "CHP",
            Self::Xli(_) => "XLI",
        }
    }

    pub fn is_boxed(&self) -> bool {
        matches!(self, Self::Bxl(_) | Self::Baxl(_) | Self::Bpxl(_))
    }

    /// Pattern operand of a boxed command (CHP target)
    pub fn pattern_mut(&mut self) -> Result<&mut Parameter> {
        match self {
            Self::Bxl(b) => Ok(&mut b.pattern),
            Self::Baxl(b) => Ok(&mut b.pattern),
            Self::Bpxl(b) => Ok(&mut b.pattern),
            other => Err(ExplorError::IllegalMutationTarget {
                operation: "CHP".to_string(),
                kind: other.name(),
                allowed: "BXL, BAXL, BPXL",
            }),
        }
    }

    pub fn pattern(&self) -> Option<&Parameter> {
        match self {
            Self::Bxl(b) => Some(&b.pattern),
            Self::Baxl(b) => Some(&b.pattern),
            Self::Bpxl(b) => Some(&b.pattern),
            _ => None,
        }
    }

    /// Whether XLI may target `location` on this kind
    pub fn supports(&self, location: Location) -> bool {
        matches!(
            (location, self),
            (Location::Nums | Location::Chst | Location::Dirs, Self::Axl(_) | Self::Baxl(_))
                | (Location::Dirs | Location::Tpls, Self::Pxl(_) | Self::Bpxl(_))
                | (Location::Xlit, Self::Bxl(_))
                | (Location::Wbts, Self::Wbt(_))
        )
    }

    /// Every symbol stored at `location`, in storage order (XLI target)
    pub fn symbols_at(&mut self, location: Location) -> Result<Vec<&mut Symbol>> {
        if !self.supports(location) {
            return Err(ExplorError::IllegalMutationTarget {
                operation: format!("XLI {}", location),
                kind: self.name(),
                allowed: location.allowed(),
            });
        }
        let symbols: Vec<&mut Symbol> = match (location, self) {
            (Location::Nums, Self::Axl(a)) => a.numbers.iter_mut().collect(),
            (Location::Nums, Self::Baxl(b)) => b.transform.numbers.iter_mut().collect(),
            (Location::Chst, Self::Axl(a)) => a.values.iter_mut().collect(),
            (Location::Chst, Self::Baxl(b)) => b.transform.values.iter_mut().collect(),
            (Location::Dirs, Self::Axl(a)) => a.directions.iter_mut().collect(),
            (Location::Dirs, Self::Baxl(b)) => b.transform.directions.iter_mut().collect(),
            (Location::Dirs, Self::Pxl(p)) => vec![&mut p.direction],
            (Location::Dirs, Self::Bpxl(b)) => vec![&mut b.transform.direction],
            (Location::Tpls, Self::Pxl(p)) => p.table.triples.iter_mut().flatten().collect(),
            (Location::Tpls, Self::Bpxl(b)) => {
                b.transform.table.triples.iter_mut().flatten().collect()
            }
            (Location::Xlit, Self::Bxl(b)) => b.transform.translation.symbols_mut().collect(),
            (Location::Wbts, Self::Wbt(w)) => w
                .white
                .iter_mut()
                .chain(w.black.iter_mut())
                .chain(w.twinkle.iter_mut())
                .collect(),
            _ => Vec::new(),
        };
        Ok(symbols)
    }
}

/// One program line: gate, payload, optional unconditional jump
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub probability: Probability,
    pub kind: CommandKind,
    /// Inline jump taken whenever the command fires
    pub goto: Option<String>,
}

impl Command {
    pub fn new(kind: CommandKind) -> Self {
        Self {
            probability: Probability::ALWAYS,
            kind,
            goto: None,
        }
    }

    pub fn with_probability(mut self, probability: Probability) -> Self {
        self.probability = probability;
        self
    }

    pub fn with_goto(mut self, label: impl Into<String>) -> Self {
        self.goto = Some(label.into());
        self
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

impl From<CommandKind> for Command {
    fn from(kind: CommandKind) -> Self {
        Self::new(kind)
    }
}
