//! Interpreter configuration

use crate::error::{ExplorError, Result};
use crate::vm::Mode;

/// Interpreter configuration
#[derive(Debug, Clone)]
pub struct ExplorConfig {
    /// Grid columns
    pub width: usize,
    /// Grid rows
    pub height: usize,
    /// Fixed seed for reproducible runs (None = clock + OS entropy)
    pub seed: Option<u64>,
    /// Abort after this many steps (None = run until the program ends)
    pub max_steps: Option<u64>,
    /// Modes in effect before the first MODE command
    pub mode: Mode,
}

impl Default for ExplorConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            seed: None,
            max_steps: None,
            mode: Mode::default(),
        }
    }
}

impl ExplorConfig {
    /// Default grid, fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Small grid with a fixed seed and a step budget, for tests and previews
    pub fn preview(width: usize, height: usize, seed: u64) -> Self {
        Self {
            width,
            height,
            seed: Some(seed),
            max_steps: Some(100_000),
            mode: Mode::default(),
        }
    }

    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ExplorError::InvalidGeometry(format!(
                "grid must be at least 1x1, got {}x{}",
                self.height, self.width
            )));
        }
        Ok(())
    }
}
