//! # Explor - Probabilistic pixel-rewriting interpreter
//!
//! Runs EXPLOR programs: cellular-automaton style rules over a grid of
//! 36-symbol pixels, gated by per-command periods and chances, producing a
//! sequence of black-and-white frames.
//!
//! ## Core Components
//!
//! - **Program**: commands, labels and literal patterns, assembled by a front end
//! - **Interpreter**: the step loop, owning grid, variables, patterns and frames
//! - **Probability engine**: command gates, per-pixel events, CHV ranges
//! - **Validator**: pre-execution diagnostics for labels, targets and geometry
//!
//! ## Design Principles
//!
//! - **Reproducible**: one random source per run; a fixed seed replays it exactly
//! - **Self-modifying**: CHP/XLI rewrite commands in place while the program runs
//! - **Fail loud**: bad references abort the run; frames captured so far survive
//!
//! ## Example
//!
//! ```ignore
//! use explor::{CommandKind, ExplorConfig, Interpreter, Program, Translation, Xl};
//!
//! let mut program = Program::new();
//! program.push(CommandKind::Xl(Xl {
//!     prob: 1,
//!     translation: Translation::parse_pairs(&["01"])?,
//! }))?;
//! program.push(CommandKind::Cam { frames: 1 })?;
//!
//! let frames = Interpreter::run(program, &ExplorConfig::seeded(7))?;
//! ```

// Probability engine
pub mod random;
pub use random::{coin_flip, event, range, Probability, RandomSource, StdSource};

// EXPLOR VM
pub mod vm;
pub use vm::{
    // Program model
    Command, CommandKind, Line, Parameter, Program, Symbol,
    Axl, BoxGeometry, Boxed, Pxl, Translation, TripleTable, Xl,
    ChangeOp, Chp, Chv, Compare, Location, Mode, Svp, Wbt, Xli,
    // Execution
    Frame, Grid, Interpreter, StepResult,
    // Validation
    Diagnostic, DiagnosticLevel, ProgramValidator, ValidationConfig,
};

// Configuration
pub mod config;
pub use config::ExplorConfig;

// State inspection
pub mod snapshot;
pub use snapshot::Snapshot;

// Error types
mod error;
pub use error::{ExplorError, Result};
