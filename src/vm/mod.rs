//! EXPLOR VM - Interpreter for probabilistic pixel-rewriting programs
//!
//! A program is a flat list of commands over a 2-D grid of symbols. Each
//! command carries a stochastic gate; when it fires, the command rewrites
//! pixels, captures frames, moves control or edits other commands.
//!
//! ## Symbols
//!
//! ```text
//! 0-9 A-Z        36 pixel values, index 0..35
//! W A N R E B S L  direction letters (8-neighbourhood)
//! ```
//!
//! ## Direction layout (row, col) deltas
//!
//! ```text
//!   W(-1,-1)  L(-1, 0)  S(-1,+1)
//!   A( 0,-1)     .      B( 0,+1)
//!   N(+1,-1)  R(+1, 0)  E(+1,+1)
//! ```
//!
//! ## Example
//!
//! ```text
//! WBT(white "1", black "0")   classify
//! MODE(PLN, TST, SQR)         plain edges
//! XL(1, (01))                 every '0' becomes '1'
//! CAM(1)                      one all-white frame
//! ```
//!
//! ## Module layout
//!
//! - `symbol`, `grid`: alphabet, directions and the pixel grid
//! - `variables`, `pattern`: named integers and named bit patterns
//! - `transform`: XL/AXL/PXL rules and their boxed variants
//! - `frame`: classification table and frame capture
//! - `command`, `program`: the command set and the assembled program
//! - `interpreter`: the step state machine
//! - `validator`: pre-execution diagnostics

mod command;
mod frame;
mod grid;
mod interpreter;
mod pattern;
mod program;
mod symbol;
mod transform;
mod validator;
mod variables;

pub use command::{
    ChangeOp, Chp, Chv, Command, CommandKind, Compare, Location, Mode, NeighbourhoodMode,
    RenderMode, Svp, Wbt, WrapMode, Xli, RETURN_LABEL,
};
pub use frame::{Classification, ClassificationTable, Frame};
pub use grid::{Grid, Region};
pub use interpreter::{Interpreter, StepResult};
pub use pattern::{octal_row, PatternContainer, PatternStore};
pub use program::{Line, Program};
pub use symbol::{Direction, Symbol, ALPHABET_SIZE};
pub use transform::{
    Axl, BoxGeometry, Boxed, PixelRule, Pxl, Scope, Tiling, Translation, TripleTable, Xl,
};
pub use validator::{Diagnostic, DiagnosticLevel, ProgramValidator, ValidationConfig};
pub use variables::{Parameter, VariableStore};
