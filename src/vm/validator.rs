//! Program Validator - Pre-execution checks
//!
//! Catches mistakes that would otherwise only surface mid-run, after frames
//! have already been captured:
//! - Control flow: jump labels resolve, obvious infinite loops
//! - Mutation targets: CHP/XLI labels resolve to compatible commands
//! - Pattern references: boxed commands name a pattern that exists or is
//!   captured by some SVP
//! - Geometry: literal rectangle operands are non-negative
//!
//! Unknown jump labels are legal at runtime (execution falls through), so
//! they are reported as warnings. Everything the interpreter would abort on
//! is an error. Patterns that only exist once an SVP has run are reported
//! as info.

use super::command::{CommandKind, Location, RETURN_LABEL};
use super::program::Program;
use super::variables::Parameter;
use std::collections::HashMap;
use std::fmt;

// =========================================================================
// Configuration
// =========================================================================

/// Controls which validation passes run.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Check GOTO/IF/DO and inline goto labels.
    pub check_control_flow: bool,
    /// Check CHP/XLI targets.
    pub check_mutation_targets: bool,
    /// Check pattern names used by boxed commands and CHP.
    pub check_pattern_refs: bool,
    /// Check literal SVP and box geometry operands.
    pub check_geometry: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            check_control_flow: true,
            check_mutation_targets: true,
            check_pattern_refs: true,
            check_geometry: true,
        }
    }
}

impl ValidationConfig {
    /// Only the checks for errors the interpreter would abort on.
    pub fn fatal_only() -> Self {
        Self {
            check_control_flow: false,
            ..Self::default()
        }
    }
}

// =========================================================================
// Diagnostics
// =========================================================================

/// Diagnostic severity level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticLevel {
    /// The program will abort when this command runs.
    Error,
    /// Runs, but probably not as intended.
    Warning,
    /// Depends on runtime order, e.g. a pattern captured by SVP.
    Info,
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    /// Command index where the issue was found (if applicable).
    pub command_idx: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    fn error(command_idx: usize, message: String) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            command_idx: Some(command_idx),
            message,
        }
    }

    fn warning(command_idx: usize, message: String) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            command_idx: Some(command_idx),
            message,
        }
    }

    fn info(command_idx: usize, message: String) -> Self {
        Self {
            level: DiagnosticLevel::Info,
            command_idx: Some(command_idx),
            message,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level_str = match self.level {
            DiagnosticLevel::Error => "ERROR",
            DiagnosticLevel::Warning => "WARN",
            DiagnosticLevel::Info => "INFO",
        };
        if let Some(idx) = self.command_idx {
            write!(f, "[{}] command {}: {}", level_str, idx, self.message)
        } else {
            write!(f, "[{}] {}", level_str, self.message)
        }
    }
}

// =========================================================================
// Validator
// =========================================================================

/// Validates EXPLOR programs before execution.
#[derive(Debug, Default)]
pub struct ProgramValidator;

impl ProgramValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a program. Returns all diagnostics found.
    pub fn validate(&self, program: &Program, config: &ValidationConfig) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        if config.check_control_flow {
            self.check_control_flow(program, &mut diagnostics);
        }
        if config.check_mutation_targets {
            self.check_mutation_targets(program, &mut diagnostics);
        }
        if config.check_pattern_refs {
            self.check_pattern_refs(program, &mut diagnostics);
        }
        if config.check_geometry {
            self.check_geometry(program, &mut diagnostics);
        }

        diagnostics
    }

    // =====================================================================
    // Control flow
    // =====================================================================

    fn check_control_flow(&self, program: &Program, diags: &mut Vec<Diagnostic>) {
        let known = |label: &str| label == RETURN_LABEL || program.index_of(label).is_some();

        for (idx, cmd) in program.commands().iter().enumerate() {
            let mut targets: Vec<&str> = Vec::new();
            if let Some(goto) = &cmd.goto {
                targets.push(goto);
            }
            match &cmd.kind {
                CommandKind::Goto { label } | CommandKind::If { label, .. } => targets.push(label),
                CommandKind::Do { label, resume } => {
                    if label == RETURN_LABEL {
                        diags.push(Diagnostic::warning(
                            idx,
                            "DO DONE clobbers the pending return".to_string(),
                        ));
                    }
                    targets.push(label);
                    if let Some(resume) = resume {
                        targets.push(resume);
                    }
                }
                _ => {}
            }

            for label in targets {
                if !known(label) {
                    diags.push(Diagnostic::warning(
                        idx,
                        format!("{} jumps to unknown label {}; execution falls through", cmd.name(), label),
                    ));
                }
            }

            if let CommandKind::Goto { label } = &cmd.kind {
                if cmd.probability.is_always() && program.index_of(label) == Some(idx) {
                    diags.push(Diagnostic::warning(
                        idx,
                        format!("GOTO {} always jumps to itself", label),
                    ));
                }
            }
        }
    }

    // =====================================================================
    // CHP / XLI
    // =====================================================================

    fn check_mutation_targets(&self, program: &Program, diags: &mut Vec<Diagnostic>) {
        for (idx, cmd) in program.commands().iter().enumerate() {
            let (label, location) = match &cmd.kind {
                CommandKind::Chp(chp) => (&chp.instance, None),
                CommandKind::Xli(xli) => (&xli.label, Some(xli.location)),
                _ => continue,
            };
            let Some(target) = program.index_of(label).and_then(|i| program.commands().get(i))
            else {
                diags.push(Diagnostic::error(
                    idx,
                    format!("{} targets unknown label {}", cmd.name(), label),
                ));
                continue;
            };
            match location {
                None if !target.kind.is_boxed() => diags.push(Diagnostic::error(
                    idx,
                    format!(
                        "CHP target {} is {}, expected BXL, BAXL or BPXL",
                        label,
                        target.name()
                    ),
                )),
                Some(location) if !target.kind.supports(location) => {
                    diags.push(Diagnostic::error(idx, incompatible_xli(label, location, target.name())))
                }
                _ => {}
            }
        }
    }

    // =====================================================================
    // Pattern references
    // =====================================================================

    fn check_pattern_refs(&self, program: &Program, diags: &mut Vec<Diagnostic>) {
        // First SVP capturing each name
        let mut captured: HashMap<&str, usize> = HashMap::new();
        for (idx, cmd) in program.commands().iter().enumerate() {
            if let CommandKind::Svp(svp) = &cmd.kind {
                captured.entry(svp.name.as_str()).or_insert(idx);
            }
        }

        for (idx, cmd) in program.commands().iter().enumerate() {
            let (name, repoint) = match &cmd.kind {
                CommandKind::Chp(chp) => match Parameter::parse(&chp.pattern) {
                    Ok(Parameter::Name(name)) => (name, true),
                    Ok(_) => continue,
                    Err(_) => {
                        diags.push(Diagnostic::error(
                            idx,
                            format!("CHP pattern {:?} is neither a name nor an integer", chp.pattern),
                        ));
                        continue;
                    }
                },
                kind => match kind.pattern().and_then(|p| p.as_name()) {
                    Some(name) => (name.to_string(), false),
                    None => continue,
                },
            };
            if program.patterns().contains(&name) {
                continue;
            }
            match captured.get(name.as_str()) {
                Some(&svp_idx) => diags.push(Diagnostic::info(
                    idx,
                    format!("pattern {} exists only after the SVP at {} runs", name, svp_idx),
                )),
                None if repoint => diags.push(Diagnostic::warning(
                    idx,
                    format!("CHP points at pattern {}, which is never defined or captured", name),
                )),
                None => diags.push(Diagnostic::error(
                    idx,
                    format!("pattern {} is never defined or captured", name),
                )),
            }
        }
    }

    // =====================================================================
    // Geometry
    // =====================================================================

    fn check_geometry(&self, program: &Program, diags: &mut Vec<Diagnostic>) {
        for (idx, cmd) in program.commands().iter().enumerate() {
            let params: Vec<&Parameter> = match &cmd.kind {
                CommandKind::Bxl(b) => b.geometry.params().to_vec(),
                CommandKind::Baxl(b) => b.geometry.params().to_vec(),
                CommandKind::Bpxl(b) => b.geometry.params().to_vec(),
                CommandKind::Svp(svp) => vec![&svp.row, &svp.col, &svp.rows, &svp.cols],
                _ => continue,
            };
            for param in params {
                if let Parameter::Literal(v) = param {
                    if *v < 0 {
                        diags.push(Diagnostic::error(
                            idx,
                            format!("{} rectangle operand {} is negative", cmd.name(), v),
                        ));
                    }
                }
            }
        }
    }

    /// Check if validation passed (no errors).
    pub fn is_valid(diagnostics: &[Diagnostic]) -> bool {
        !diagnostics.iter().any(|d| d.level == DiagnosticLevel::Error)
    }

    /// Count errors in diagnostics.
    pub fn error_count(diagnostics: &[Diagnostic]) -> usize {
        diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Error)
            .count()
    }

    /// Count warnings in diagnostics.
    pub fn warning_count(diagnostics: &[Diagnostic]) -> usize {
        diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Warning)
            .count()
    }
}

fn incompatible_xli(label: &str, location: Location, kind: &str) -> String {
    format!(
        "XLI {} target {} is {}, expected {}",
        location,
        label,
        kind,
        location.allowed()
    )
}
