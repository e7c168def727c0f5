//! Control flow operation implementations for the Interpreter
//!
//! Each returns the jump target that replaces the fall-through (or the
//! inline goto) for this step; `None` keeps it.

use super::Interpreter;
use crate::error::Result;
use crate::vm::command::{Compare, RETURN_LABEL};
use crate::vm::variables::Parameter;

impl Interpreter {
    /// GOTO. `GOTO DONE` consumes the pending return; with none pending it
    /// falls through.
    pub(super) fn execute_goto(&mut self, label: &str) -> Option<usize> {
        if label == RETURN_LABEL {
            let target = self.pending_return.take();
            match target {
                Some(t) => log::debug!("Return from pc {} to {}", self.pc, t),
                None => log::debug!("DONE at pc {} with no pending return", self.pc),
            }
            return target;
        }
        self.resolve_label(label)
    }

    pub(super) fn execute_if(
        &mut self,
        lhs: &Parameter,
        cmp: Compare,
        rhs: &Parameter,
        label: &str,
    ) -> Result<Option<usize>> {
        let l = self.variables.require(lhs, "IF left operand")?;
        let r = self.variables.require(rhs, "IF right operand")?;
        if cmp.eval(l, r) {
            Ok(self.resolve_label(label))
        } else {
            Ok(None)
        }
    }

    /// DO. Only one return address is held; a nested DO replaces it.
    pub(super) fn execute_do(
        &mut self,
        index: usize,
        label: &str,
        resume: Option<&str>,
    ) -> Option<usize> {
        let return_to = resume
            .and_then(|r| self.resolve_label(r))
            .unwrap_or(index + 1);
        if let Some(previous) = self.pending_return {
            log::debug!(
                "DO at pc {} replaces pending return {} with {}",
                index,
                previous,
                return_to
            );
        }
        self.pending_return = Some(return_to);
        self.resolve_label(label)
    }
}
