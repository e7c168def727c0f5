//! Runtime operations: rendering, stamps, variables and self-modification
//!
//! - WBT: reassign symbol classes
//! - CAM: append frames
//! - SVP: capture a grid region as a named pattern
//! - CHV: variable arithmetic
//! - CHP: repoint a boxed command at another pattern
//! - XLI: translate symbols stored inside another command
//!
//! CHP and XLI rewrite the command arena in place; the change is seen the
//! next time the target command executes.

use super::Interpreter;
use crate::error::{ExplorError, Result};
use crate::random::{event, range};
use crate::vm::command::{ChangeOp, Chp, Chv, Svp, Wbt, Xli};
use crate::vm::frame::{Classification, Frame};
use crate::vm::grid::Region;
use crate::vm::variables::Parameter;

impl Interpreter {
    /// WBT: later lists override earlier ones for a repeated symbol
    pub(super) fn execute_wbt(&mut self, wbt: &Wbt) {
        self.classification.assign(&wbt.white, Classification::White);
        self.classification.assign(&wbt.black, Classification::Black);
        self.classification
            .assign(&wbt.twinkle, Classification::Twinkle);
    }

    pub(super) fn execute_cam(&mut self, frames: i64) {
        for _ in 0..frames.max(0) {
            let frame = Frame::capture(&self.grid, &self.classification, self.rng.as_mut());
            self.frames.push(frame);
        }
        log::trace!("CAM: {} frames captured in total", self.frames.len());
    }

    pub(super) fn execute_svp(&mut self, svp: &Svp) -> Result<()> {
        let row = self.variables.require(&svp.row, "SVP row")?;
        let col = self.variables.require(&svp.col, "SVP column")?;
        let rows = self.variables.require(&svp.rows, "SVP rows")?;
        let cols = self.variables.require(&svp.cols, "SVP columns")?;

        let (height, width) = (self.grid.height(), self.grid.width());
        let fits = |start: i64, extent: i64, limit: usize| {
            start >= 0
                && extent >= 0
                && start
                    .checked_add(extent)
                    .is_some_and(|end| end <= limit as i64)
        };
        if !fits(row, rows, height) || !fits(col, cols, width) {
            return Err(ExplorError::OutOfBoundsCapture {
                row,
                col,
                rows,
                cols,
                height,
                width,
            });
        }

        let pattern = self.classification.capture(
            &self.grid,
            Region::at(row, col, rows, cols),
            self.rng.as_mut(),
        );
        if !self.patterns.insert_captured(&svp.name, pattern) {
            log::warn!(
                "SVP: pattern {} already exists, keeping its first content",
                svp.name
            );
        }
        Ok(())
    }

    pub(super) fn execute_chv(&mut self, chv: &Chv) -> Result<()> {
        let name = chv
            .target
            .as_name()
            .ok_or_else(|| ExplorError::UnresolvedVariable(format!("CHV target {}", chv.target)))?
            .to_string();
        let to = self.variables.resolve(&chv.to);
        let from = self.variables.require(&chv.from, "CHV operand")?;
        let current = self.variables.require(&chv.target, "CHV target")?;

        let operand = match to {
            Some(to) => range(self.rng.as_mut(), from, to),
            None => from,
        };
        let value = match chv.op {
            ChangeOp::Set => operand,
            ChangeOp::Add => current.wrapping_add(operand),
            ChangeOp::Sub => current.wrapping_sub(operand),
            ChangeOp::Mpy => current.wrapping_mul(operand),
            ChangeOp::Div => {
                if operand == 0 {
                    return Err(ExplorError::DivisionByZero(name));
                }
                current.wrapping_div(operand)
            }
        };
        log::debug!("CHV: {} = {}", name, value);
        self.variables.set(&name, value);
        Ok(())
    }

    pub(super) fn execute_chp(&mut self, chp: &Chp) -> Result<()> {
        let index = self.command_index(&chp.instance)?;
        let pattern = Parameter::parse(&chp.pattern)?;
        let slot = self.commands[index].kind.pattern_mut()?;
        log::debug!("CHP: [{}] pattern {} -> {}", index, slot, pattern);
        *slot = pattern;
        Ok(())
    }

    pub(super) fn execute_xli(&mut self, xli: &Xli) -> Result<()> {
        let index = self.command_index(&xli.label)?;
        let rng = self.rng.as_mut();
        let symbols = self.commands[index].kind.symbols_at(xli.location)?;
        let mut changed = 0usize;
        for symbol in symbols {
            if event(rng, xli.prob) {
                *symbol = xli.table.transform(*symbol);
                changed += 1;
            }
        }
        log::debug!(
            "XLI: [{}] {} rewrote {} symbols",
            index,
            xli.location,
            changed
        );
        Ok(())
    }

    /// Index of the command a CHP/XLI label names
    fn command_index(&self, label: &str) -> Result<usize> {
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| ExplorError::UnknownCommandLabel(label.to_string()))
    }
}
