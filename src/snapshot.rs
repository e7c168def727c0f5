//! Snapshot Types for Inspection
//!
//! A serializable view of interpreter state between steps: where execution
//! is, what the grid holds, and which names are bound. Frames themselves
//! are not included, only their count.

use crate::vm::{Interpreter, Mode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Interpreter state at a step boundary
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Index of the next command to execute
    pub pc: usize,

    /// Return address held by the last DO, if any
    pub pending_return: Option<usize>,

    /// Steps executed so far
    pub steps: u64,

    /// Grid contents, one string of symbols per row
    pub grid_rows: Vec<String>,

    /// Variables by name
    pub variables: BTreeMap<String, i64>,

    /// Per-command execution counters
    pub counters: Vec<u64>,

    pub mode: Mode,

    /// Frames captured so far
    pub frame_count: usize,

    /// Defined and captured pattern names, sorted
    pub pattern_names: Vec<String>,
}

impl Interpreter {
    /// Capture the current state
    pub fn snapshot(&self) -> Snapshot {
        let grid = self.grid();
        let mut pattern_names: Vec<String> =
            self.patterns().names().map(str::to_string).collect();
        pattern_names.sort();
        Snapshot {
            pc: self.pc(),
            pending_return: self.pending_return(),
            steps: self.steps(),
            grid_rows: (0..grid.height()).map(|r| grid.row_string(r)).collect(),
            variables: self
                .variables()
                .iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
            counters: (0..self.commands().len())
                .filter_map(|i| self.counter(i))
                .collect(),
            mode: self.mode(),
            frame_count: self.frames().len(),
            pattern_names,
        }
    }
}
