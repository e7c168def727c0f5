//! Program - Command arena, label table and literal patterns
//!
//! A program is assembled line by line from the front end's output:
//!
//! ```text
//! P1     PAT 52        ; labeled pattern row: starts pattern P1
//!        PAT 07        ; unlabeled pattern row: continues P1
//! LOOP   XL (1,1) 1 (01...)
//!        CAMERA (1,1) 1
//! ```
//!
//! Commands are addressed by index; labels resolve to indices through an
//! injective map, which is how CHP/XLI reach the commands they mutate.

use super::command::Command;
use super::pattern::PatternStore;
use crate::error::{ExplorError, Result};
use std::collections::HashMap;

/// One parsed source line
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    /// Pattern row bits
    Pattern(Vec<bool>),
    Command(Command),
}

impl From<Command> for Line {
    fn from(cmd: Command) -> Self {
        Line::Command(cmd)
    }
}

/// Assembled EXPLOR program
#[derive(Debug, Clone, Default)]
pub struct Program {
    commands: Vec<Command>,
    labels: HashMap<String, usize>,
    patterns: PatternStore,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a program from `(label, line)` pairs in source order
    pub fn from_lines<'a, I>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Option<&'a str>, Line)>,
    {
        let mut program = Self::new();
        for (label, line) in lines {
            program.add_line(label, line)?;
        }
        Ok(program)
    }

    /// Append one line.
    ///
    /// A labeled pattern row starts a new pattern; an unlabeled one extends
    /// the most recently started pattern. A labeled command registers its
    /// label. Empty labels count as no label.
    pub fn add_line(&mut self, label: Option<&str>, line: Line) -> Result<()> {
        let label = label.filter(|l| !l.is_empty());
        match line {
            Line::Pattern(row) => match label {
                Some(name) => self.patterns.define(name, row),
                None => self.patterns.continue_last(row),
            },
            Line::Command(cmd) => {
                if let Some(name) = label {
                    if self.labels.contains_key(name) {
                        return Err(ExplorError::DuplicateLabel(name.to_string()));
                    }
                    self.labels.insert(name.to_string(), self.commands.len());
                }
                self.commands.push(cmd);
                Ok(())
            }
        }
    }

    /// Append an unlabeled command
    pub fn push(&mut self, cmd: impl Into<Command>) -> Result<()> {
        self.add_line(None, Line::Command(cmd.into()))
    }

    /// Append a labeled command
    pub fn push_labeled(&mut self, label: &str, cmd: impl Into<Command>) -> Result<()> {
        self.add_line(Some(label), Line::Command(cmd.into()))
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn labels(&self) -> &HashMap<String, usize> {
        &self.labels
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.get(label).copied()
    }

    pub fn patterns(&self) -> &PatternStore {
        &self.patterns
    }

    pub(crate) fn into_parts(self) -> (Vec<Command>, HashMap<String, usize>, PatternStore) {
        (self.commands, self.labels, self.patterns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::command::CommandKind;
    use crate::vm::pattern::octal_row;

    fn cam() -> Command {
        Command::new(CommandKind::Cam { frames: 1 })
    }

    #[test]
    fn test_labels_map_to_indices() {
        let mut program = Program::new();
        program.push(cam()).unwrap();
        program.push_labeled("SHOT", cam()).unwrap();
        program.add_line(Some(""), Line::Command(cam())).unwrap();
        assert_eq!(program.len(), 3);
        assert_eq!(program.index_of("SHOT"), Some(1));
        assert_eq!(program.labels().len(), 1);
    }

    #[test]
    fn test_duplicate_label() {
        let mut program = Program::new();
        program.push_labeled("A1", cam()).unwrap();
        assert!(matches!(
            program.push_labeled("A1", cam()),
            Err(ExplorError::DuplicateLabel(_))
        ));
    }

    #[test]
    fn test_pattern_lines() {
        let lines = vec![
            (Some("P1"), Line::Pattern(octal_row("52").unwrap())),
            (None, Line::Pattern(octal_row("07").unwrap())),
            (None, Line::Command(cam())),
            (Some("P2"), Line::Pattern(octal_row("1").unwrap())),
        ];
        let program = Program::from_lines(lines).unwrap();
        assert_eq!(program.len(), 1);
        let p1 = program.patterns().get("P1").unwrap();
        assert_eq!(p1.rows(), 2);
        assert!(p1.get(1, 5));
        assert_eq!(program.patterns().get("P2").unwrap().cols(), 3);
    }

    #[test]
    fn test_orphan_pattern_row() {
        let mut program = Program::new();
        assert!(matches!(
            program.add_line(None, Line::Pattern(vec![true])),
            Err(ExplorError::OrphanPatternRow)
        ));
    }
}
