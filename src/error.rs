//! Error types for explor

use thiserror::Error;

/// Explor error type
///
/// Runtime variants abort the whole run; frames captured before the
/// failing step stay in the interpreter's output.
#[derive(Debug, Error)]
pub enum ExplorError {
    /// Pattern name not found while resolving a pattern-or-integer parameter
    #[error("Unknown pattern name: {0}")]
    UnknownPatternReference(String),

    /// XLI/CHP issued against a command kind without the requested field
    #[error("Illegal mutation: {operation} cannot target {kind} (allowed: {allowed})")]
    IllegalMutationTarget {
        operation: String,
        kind: &'static str,
        allowed: &'static str,
    },

    /// SVP rectangle exceeds the grid
    #[error("Capture out of bounds: {rows}x{cols} at ({row}, {col}) exceeds {height}x{width} grid")]
    OutOfBoundsCapture {
        row: i64,
        col: i64,
        rows: i64,
        cols: i64,
        height: usize,
        width: usize,
    },

    /// A required parameter has no usable value
    #[error("Unresolved variable: {0}")]
    UnresolvedVariable(String),

    /// Label referenced by CHP/XLI does not exist
    #[error("Unknown command label: {0}")]
    UnknownCommandLabel(String),

    /// CHV DIV with a zero operand
    #[error("Division by zero while updating {0}")]
    DivisionByZero(String),

    /// Boxed transform geometry resolved to an unusable value
    #[error("Invalid box geometry: {0}")]
    InvalidGeometry(String),

    /// Character outside 0-9A-Z
    #[error("Invalid pixel symbol: {0:?}")]
    InvalidSymbol(char),

    /// Probability with a zero period or denominator
    #[error("Invalid probability ({n}, {p}): both must be at least 1")]
    InvalidProbability { n: i64, p: i64 },

    /// Token that is neither a name nor an integer
    #[error("Invalid parameter: {0:?}")]
    InvalidParameter(String),

    /// Label registered twice
    #[error("Duplicate label: {0}")]
    DuplicateLabel(String),

    /// Pattern name registered twice
    #[error("Duplicate pattern: {0}")]
    DuplicatePattern(String),

    /// Unlabeled pattern row with no pattern to continue
    #[error("Pattern row has no preceding named pattern")]
    OrphanPatternRow,

    /// Pattern row length disagrees with the pattern it continues
    #[error("Pattern {name} row has {got} columns, expected {expected}")]
    PatternWidthMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    /// Configured step budget exhausted
    #[error("Step limit of {0} exceeded")]
    StepLimitExceeded(u64),
}

pub type Result<T> = std::result::Result<T, ExplorError>;
