//! Interpreter - Runtime execution engine for EXPLOR programs
//!
//! Executes an assembled [`Program`] against a symbol grid, producing a
//! sequence of captured frames.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  Interpreter                     │
//! ├─────────────────────────────────────────────────┤
//! │  Commands + per-command execution counters      │
//! │  Label table, pattern store, variable store     │
//! ├─────────────────────────────────────────────────┤
//! │  Grid (rows x cols symbols), classification,    │
//! │  modes, captured frames                         │
//! ├─────────────────────────────────────────────────┤
//! │  Program counter, one-slot pending return       │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! ## Step
//!
//! ```text
//! fired = probability.fires(counter[pc])
//! if fired:
//!     next = inline goto target (if any)
//!     execute payload; GOTO/DO/IF may override next
//! counter[pc] += 1
//! pc = next or pc + 1
//! ```
//!
//! Commands may be rewritten by CHP/XLI while the program runs, so each
//! step works on a clone of the current command.

mod ops_control;
mod ops_runtime;
mod ops_transform;

use super::command::{Command, CommandKind, Mode};
use super::frame::{ClassificationTable, Frame};
use super::grid::Grid;
use super::pattern::PatternStore;
use super::program::Program;
use super::variables::VariableStore;
use crate::config::ExplorConfig;
use crate::error::{ExplorError, Result};
use crate::random::{RandomSource, StdSource};
use std::collections::HashMap;

/// Result of executing a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// Command fired and ran
    Fired,
    /// Probability gate held the command back
    Skipped,
    /// Program ended (PC past end)
    Ended,
}

/// EXPLOR interpreter
pub struct Interpreter {
    commands: Vec<Command>,
    labels: HashMap<String, usize>,
    /// Per-command execution counters, starting at 1
    counters: Vec<u64>,
    patterns: PatternStore,
    variables: VariableStore,
    grid: Grid,
    classification: ClassificationTable,
    mode: Mode,
    frames: Vec<Frame>,
    pc: usize,
    pending_return: Option<usize>,
    steps: u64,
    max_steps: Option<u64>,
    rng: Box<dyn RandomSource>,
}

impl Interpreter {
    /// Create an interpreter; randomness is seeded from the config, or from
    /// the clock and OS entropy when no seed is set.
    pub fn new(program: Program, config: &ExplorConfig) -> Result<Self> {
        let rng: Box<dyn RandomSource> = match config.seed {
            Some(seed) => Box::new(StdSource::seeded(seed)),
            None => Box::new(StdSource::from_entropy()),
        };
        Self::with_source(program, config, rng)
    }

    /// Create an interpreter drawing from an explicit random source
    pub fn with_source(
        program: Program,
        config: &ExplorConfig,
        rng: Box<dyn RandomSource>,
    ) -> Result<Self> {
        config.validate()?;
        let (commands, labels, patterns) = program.into_parts();
        let counters = vec![1; commands.len()];
        log::debug!(
            "Interpreter: {} commands, {} labels, {}x{} grid",
            commands.len(),
            labels.len(),
            config.height,
            config.width
        );
        Ok(Self {
            commands,
            labels,
            counters,
            patterns,
            variables: VariableStore::new(),
            grid: Grid::new(config.width, config.height),
            classification: ClassificationTable::new(),
            mode: config.mode,
            frames: Vec::new(),
            pc: 0,
            pending_return: None,
            steps: 0,
            max_steps: config.max_steps,
            rng,
        })
    }

    /// Execute the command at the program counter
    pub fn step(&mut self) -> Result<StepResult> {
        if self.pc >= self.commands.len() {
            return Ok(StepResult::Ended);
        }
        if let Some(max) = self.max_steps {
            if self.steps >= max {
                log::warn!("Step limit of {} reached at pc {}", max, self.pc);
                return Err(ExplorError::StepLimitExceeded(max));
            }
        }
        self.steps += 1;

        let index = self.pc;
        let cmd = self.commands[index].clone();
        let fired = cmd
            .probability
            .fires(self.counters[index], self.rng.as_mut());

        let mut next = None;
        if fired {
            log::trace!("[{}] {}", index, cmd.name());
            if let Some(label) = &cmd.goto {
                next = self.resolve_label(label);
            }
            if let Some(target) = self.dispatch(index, &cmd.kind)? {
                next = Some(target);
            }
        }

        self.counters[index] += 1;
        self.pc = next.unwrap_or(index + 1);
        Ok(if fired {
            StepResult::Fired
        } else {
            StepResult::Skipped
        })
    }

    /// Run until the program counter leaves the program.
    ///
    /// On error the run stops; frames captured so far stay available.
    pub fn execute(&mut self) -> Result<()> {
        while self.step()? != StepResult::Ended {}
        log::debug!(
            "Program ended after {} steps, {} frames",
            self.steps,
            self.frames.len()
        );
        Ok(())
    }

    /// Run a program to completion and return its frames
    pub fn run(program: Program, config: &ExplorConfig) -> Result<Vec<Frame>> {
        let mut interp = Self::new(program, config)?;
        interp.execute()?;
        Ok(interp.take_frames())
    }

    /// Execute a fired payload; returns a jump target that overrides the
    /// inline goto.
    fn dispatch(&mut self, index: usize, kind: &CommandKind) -> Result<Option<usize>> {
        match kind {
            CommandKind::Wbt(wbt) => {
                self.execute_wbt(wbt);
                Ok(None)
            }
            CommandKind::Mode(mode) => {
                self.mode = *mode;
                Ok(None)
            }
            CommandKind::Cam { frames } => {
                self.execute_cam(*frames);
                Ok(None)
            }

            // Transforms (ops_transform.rs)
            CommandKind::Xl(rule) => self.apply_whole(rule).map(|_| None),
            CommandKind::Axl(rule) => self.apply_whole(rule).map(|_| None),
            CommandKind::Pxl(rule) => self.apply_whole(rule).map(|_| None),
            CommandKind::Bxl(boxed) => self.apply_boxed(boxed).map(|_| None),
            CommandKind::Baxl(boxed) => self.apply_boxed(boxed).map(|_| None),
            CommandKind::Bpxl(boxed) => self.apply_boxed(boxed).map(|_| None),

            // Control (ops_control.rs)
            CommandKind::Goto { label } => Ok(self.execute_goto(label)),
            CommandKind::If {
                lhs,
                cmp,
                rhs,
                label,
            } => self.execute_if(lhs, *cmp, rhs, label),
            CommandKind::Do { label, resume } => {
                Ok(self.execute_do(index, label, resume.as_deref()))
            }

            // Runtime (ops_runtime.rs)
            CommandKind::Svp(svp) => self.execute_svp(svp).map(|_| None),
            CommandKind::Chv(chv) => self.execute_chv(chv).map(|_| None),
            CommandKind::Chp(chp) => self.execute_chp(chp).map(|_| None),
            CommandKind::Xli(xli) => self.execute_xli(xli).map(|_| None),
        }
    }

    /// Jump target of a label; unknown labels fall through
    fn resolve_label(&self, label: &str) -> Option<usize> {
        let target = self.labels.get(label).copied();
        if target.is_none() {
            log::debug!("Unknown label {} at pc {}, falling through", label, self.pc);
        }
        target
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn is_ended(&self) -> bool {
        self.pc >= self.commands.len()
    }

    pub fn pending_return(&self) -> Option<usize> {
        self.pending_return
    }

    /// Steps executed so far, skipped commands included
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn take_frames(&mut self) -> Vec<Frame> {
        std::mem::take(&mut self.frames)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable grid, for seeding an initial image before running
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn variables(&self) -> &VariableStore {
        &self.variables
    }

    pub fn patterns(&self) -> &PatternStore {
        &self.patterns
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn classification(&self) -> &ClassificationTable {
        &self.classification
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn command(&self, index: usize) -> Option<&Command> {
        self.commands.get(index)
    }

    /// Current execution counter of a command
    pub fn counter(&self, index: usize) -> Option<u64> {
        self.counters.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::tests::ScriptedSource;
    use crate::random::Probability;
    use crate::vm::command::{ChangeOp, Chv, Compare, RenderMode, Wbt, WrapMode};
    use crate::vm::program::Line;
    use crate::vm::symbol::Symbol;
    use crate::vm::transform::{Axl, Translation, Xl};
    use crate::vm::variables::Parameter;

    fn sym(c: char) -> Symbol {
        Symbol::new(c).unwrap()
    }

    fn config(width: usize, height: usize) -> ExplorConfig {
        ExplorConfig::preview(width, height, 42)
    }

    fn cam(frames: i64) -> Command {
        Command::new(CommandKind::Cam { frames })
    }

    fn goto(label: &str) -> Command {
        Command::new(CommandKind::Goto {
            label: label.to_string(),
        })
    }

    fn chv(target: &str, op: ChangeOp, from: i64) -> Command {
        Command::new(CommandKind::Chv(Chv {
            target: Parameter::name(target),
            op,
            from: Parameter::Literal(from),
            to: Parameter::Absent,
        }))
    }

    fn do_call(label: &str) -> Command {
        Command::new(CommandKind::Do {
            label: label.to_string(),
            resume: None,
        })
    }

    #[test]
    fn test_empty_program_ends() {
        let mut interp = Interpreter::new(Program::new(), &config(4, 4)).unwrap();
        assert_eq!(interp.step().unwrap(), StepResult::Ended);
        assert!(interp.is_ended());
        assert!(interp.frames().is_empty());
    }

    #[test]
    fn test_white_frame_end_to_end() {
        let mut program = Program::new();
        program
            .push(CommandKind::Wbt(Wbt::parse("1", "0", "").unwrap()))
            .unwrap();
        program
            .push(CommandKind::Mode(Mode {
                wrap: WrapMode::Plain,
                render: RenderMode::Test,
                ..Mode::default()
            }))
            .unwrap();
        program
            .push(CommandKind::Xl(Xl {
                prob: 1,
                translation: Translation::parse_pairs(&["01"]).unwrap(),
            }))
            .unwrap();
        program.push(cam(1)).unwrap();

        let frames = Interpreter::run(program, &config(6, 5)).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].width(), 6);
        assert_eq!(frames[0].height(), 5);
        assert_eq!(frames[0].black_count(), 0);
    }

    #[test]
    fn test_inline_goto_taken_only_when_fired() {
        let build = |probability: Probability| {
            let mut program = Program::new();
            program
                .push(cam(0).with_probability(probability).with_goto("END"))
                .unwrap();
            program.push(chv("X", ChangeOp::Set, 1)).unwrap();
            program.push_labeled("END", cam(0)).unwrap();
            Interpreter::new(program, &config(2, 2)).unwrap()
        };

        let mut fired = build(Probability::ALWAYS);
        assert_eq!(fired.step().unwrap(), StepResult::Fired);
        assert_eq!(fired.pc(), 2);

        // Counter starts at 1, so a period of 2 holds the first execution back
        let mut held = build(Probability::every(2, 1).unwrap());
        assert_eq!(held.step().unwrap(), StepResult::Skipped);
        assert_eq!(held.pc(), 1);
        assert_eq!(held.counter(0), Some(2));
    }

    #[test]
    fn test_do_returns_after_done() {
        let mut program = Program::new();
        program.push(do_call("SUB")).unwrap();
        program.push(chv("X", ChangeOp::Add, 1)).unwrap();
        program.push(goto("FIN")).unwrap();
        program
            .push_labeled("SUB", chv("Y", ChangeOp::Add, 1))
            .unwrap();
        program.push(goto("DONE")).unwrap();
        program.push_labeled("FIN", cam(0)).unwrap();

        let mut interp = Interpreter::new(program, &config(2, 2)).unwrap();
        interp.step().unwrap();
        assert_eq!(interp.pc(), 3);
        assert_eq!(interp.pending_return(), Some(1));

        interp.execute().unwrap();
        assert_eq!(interp.variables().get("X"), Some(1));
        assert_eq!(interp.variables().get("Y"), Some(1));
        assert_eq!(interp.pending_return(), None);
    }

    #[test]
    fn test_nested_do_overwrites_pending_return() {
        let mut program = Program::new();
        program.push(do_call("S1")).unwrap();
        program.push(chv("A", ChangeOp::Set, 1)).unwrap();
        program.push(goto("END")).unwrap();
        program.push_labeled("S1", do_call("S2")).unwrap();
        program.push(chv("B", ChangeOp::Set, 1)).unwrap();
        program.push(goto("END")).unwrap();
        program.push_labeled("S2", goto("DONE")).unwrap();
        program.push_labeled("END", cam(0)).unwrap();

        let mut interp = Interpreter::new(program, &config(2, 2)).unwrap();
        interp.execute().unwrap();
        assert_eq!(interp.variables().get("A"), None);
        assert_eq!(interp.variables().get("B"), Some(1));
    }

    #[test]
    fn test_do_with_explicit_resume() {
        let mut program = Program::new();
        program
            .push(CommandKind::Do {
                label: "SUB".to_string(),
                resume: Some("AFTER".to_string()),
            })
            .unwrap();
        program.push(chv("SKIPPED", ChangeOp::Set, 1)).unwrap();
        program.push_labeled("AFTER", goto("END")).unwrap();
        program.push_labeled("SUB", goto("DONE")).unwrap();
        program.push_labeled("END", cam(0)).unwrap();

        let mut interp = Interpreter::new(program, &config(2, 2)).unwrap();
        interp.execute().unwrap();
        assert_eq!(interp.variables().get("SKIPPED"), None);
    }

    #[test]
    fn test_done_without_pending_falls_through() {
        let mut program = Program::new();
        program.push(goto("DONE")).unwrap();
        program.push(chv("X", ChangeOp::Set, 5)).unwrap();

        let mut interp = Interpreter::new(program, &config(2, 2)).unwrap();
        interp.execute().unwrap();
        assert_eq!(interp.variables().get("X"), Some(5));
    }

    #[test]
    fn test_if_jumps_only_when_true() {
        let mut program = Program::new();
        program
            .push_labeled("LOOP", chv("I", ChangeOp::Add, 1))
            .unwrap();
        program
            .push(chv("HITS", ChangeOp::Add, 1).with_probability(Probability::every(3, 1).unwrap()))
            .unwrap();
        program
            .push(CommandKind::If {
                lhs: Parameter::name("I"),
                cmp: Compare::Lt,
                rhs: Parameter::Literal(9),
                label: "LOOP".to_string(),
            })
            .unwrap();

        let mut interp = Interpreter::new(program, &config(2, 2)).unwrap();
        interp.execute().unwrap();
        assert_eq!(interp.variables().get("I"), Some(9));
        // Executions 3, 6 and 9 of the gated command fire
        assert_eq!(interp.variables().get("HITS"), Some(3));
        assert_eq!(interp.counter(1), Some(10));
    }

    #[test]
    fn test_step_limit() {
        let mut program = Program::new();
        program.push_labeled("SPIN", goto("SPIN")).unwrap();
        let cfg = ExplorConfig::seeded(1).with_size(2, 2).with_max_steps(50);
        let mut interp = Interpreter::new(program, &cfg).unwrap();
        assert!(matches!(
            interp.execute(),
            Err(ExplorError::StepLimitExceeded(50))
        ));
        assert_eq!(interp.steps(), 50);
    }

    #[test]
    fn test_axl_scans_in_place() {
        let mut program = Program::new();
        program
            .push(CommandKind::Axl(Axl {
                numbers: Symbol::parse_all("1").unwrap(),
                directions: Symbol::parse_all("A").unwrap(),
                values: Symbol::parse_all("1").unwrap(),
                prob: Parameter::Literal(1),
                translation: Translation::parse_table("1", false).unwrap(),
            }))
            .unwrap();

        let mut interp = Interpreter::new(program, &config(3, 1)).unwrap();
        interp.grid_mut().set(0, 0, sym('1'));
        interp.execute().unwrap();
        // Each rewrite is visible to the next pixel in scan order
        assert_eq!(interp.grid().row_string(0), "111");
    }

    #[test]
    fn test_scripted_source_gates_xl() {
        let mut program = Program::new();
        program
            .push(CommandKind::Xl(Xl {
                prob: 2,
                translation: Translation::parse_pairs(&["01"]).unwrap(),
            }))
            .unwrap();

        // The command gate takes the first draw; event(2) fires for draws <= 0.5
        let rng = Box::new(ScriptedSource::new(vec![0.1, 0.9]));
        let mut interp = Interpreter::with_source(program, &config(4, 1), rng).unwrap();
        interp.execute().unwrap();
        assert_eq!(interp.grid().row_string(0), "0101");
    }

    #[test]
    fn test_error_keeps_earlier_frames() {
        let lines = vec![
            (None, Line::Command(cam(2))),
            (None, Line::Command(chv("X", ChangeOp::Div, 0))),
            (None, Line::Command(cam(1))),
        ];
        let program = Program::from_lines(lines).unwrap();
        let mut interp = Interpreter::new(program, &config(3, 3)).unwrap();
        assert!(matches!(
            interp.execute(),
            Err(ExplorError::DivisionByZero(_))
        ));
        assert_eq!(interp.frames().len(), 2);
        assert_eq!(interp.pc(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = ExplorConfig::seeded(1).with_size(0, 0);
        assert!(Interpreter::new(Program::new(), &cfg).is_err());
    }
}
