//! Pixel transform implementations for the Interpreter
//!
//! Whole-grid rules scan every pixel in row-major order; boxed rules scan
//! each selected tile. Rewrites are in place, so a pixel sees the results
//! of pixels visited before it in the same pass.

use super::Interpreter;
use crate::error::{ExplorError, Result};
use crate::random::event;
use crate::vm::command::WrapMode;
use crate::vm::pattern::PatternContainer;
use crate::vm::transform::{Boxed, PixelRule, Scope};
use crate::vm::variables::Parameter;

/// What decides whether a tile is rewritten
enum Stamp {
    /// Tile `(r, c)` applies when the pattern bit is set
    Mask(PatternContainer),
    /// Every tile rolls its own "1 in n" event
    Chance(i64),
}

impl Interpreter {
    /// XL / AXL / PXL
    pub(super) fn apply_whole<T: PixelRule>(&mut self, rule: &T) -> Result<()> {
        let Some(prob) = rule.prepare(&mut self.variables) else {
            log::debug!("Transform at pc {} has no probability, skipped", self.pc);
            return Ok(());
        };
        let wrap = self.mode.wrap == WrapMode::Wrap;
        let mut scope = Scope {
            grid: &mut self.grid,
            rng: self.rng.as_mut(),
            wrap,
        };
        for (row, col) in scope.grid.coords() {
            rule.rewrite(&mut scope, prob, row, col);
        }
        Ok(())
    }

    /// BXL / BAXL / BPXL
    pub(super) fn apply_boxed<T: PixelRule>(&mut self, boxed: &Boxed<T>) -> Result<()> {
        let stamp = self.resolve_stamp(&boxed.pattern)?;
        let tiling = boxed.geometry.resolve(&mut self.variables)?;
        let Some(prob) = boxed.transform.prepare(&mut self.variables) else {
            log::debug!("Boxed transform at pc {} has no probability, skipped", self.pc);
            return Ok(());
        };

        let wrap = self.mode.wrap == WrapMode::Wrap;
        let mut scope = Scope {
            grid: &mut self.grid,
            rng: self.rng.as_mut(),
            wrap,
        };
        for (tile_row, tile_col, region) in tiling.tiles() {
            let applies = match &stamp {
                Stamp::Mask(pattern) => pattern.get(tile_row, tile_col),
                Stamp::Chance(n) => event(&mut *scope.rng, *n),
            };
            if !applies {
                continue;
            }
            for (row, col) in scope.grid.region_coords(region) {
                boxed.transform.rewrite(&mut scope, prob, row, col);
            }
        }
        Ok(())
    }

    /// Pattern-or-integer operand of a boxed transform
    fn resolve_stamp(&self, pattern: &Parameter) -> Result<Stamp> {
        match pattern {
            Parameter::Name(name) => self
                .patterns
                .get(name)
                .cloned()
                .map(Stamp::Mask)
                .ok_or_else(|| ExplorError::UnknownPatternReference(name.clone())),
            Parameter::Literal(n) => Ok(Stamp::Chance(*n)),
            Parameter::Absent => Err(ExplorError::UnresolvedVariable(
                "boxed transform pattern".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ExplorConfig;
    use crate::error::ExplorError;
    use crate::random::tests::ScriptedSource;
    use crate::vm::command::{ChangeOp, Chv, Command, CommandKind, Mode, WrapMode};
    use crate::vm::interpreter::Interpreter;
    use crate::vm::pattern::octal_row;
    use crate::vm::program::{Line, Program};
    use crate::vm::symbol::Symbol;
    use crate::vm::transform::{Axl, BoxGeometry, Boxed, Pxl, Translation, TripleTable, Xl};
    use crate::vm::variables::Parameter;

    fn sym(c: char) -> Symbol {
        Symbol::new(c).unwrap()
    }

    fn bxl(pattern: Parameter, geometry: [i64; 8]) -> Command {
        Command::new(CommandKind::Bxl(Boxed {
            pattern,
            geometry: BoxGeometry::from_params(geometry.map(Parameter::Literal)),
            transform: Xl {
                prob: 1,
                translation: Translation::parse_pairs(&["01"]).unwrap(),
            },
        }))
    }

    /// Rewrite '0' to '1' when the neighbours in `directions` hold one '1'
    fn axl(directions: &str, prob: Parameter) -> Axl {
        Axl {
            numbers: Symbol::parse_all("1").unwrap(),
            directions: Symbol::parse_all(directions).unwrap(),
            values: Symbol::parse_all("1").unwrap(),
            prob,
            translation: Translation::parse_table("1", false).unwrap(),
        }
    }

    fn ones(interp: &Interpreter) -> Vec<(usize, usize)> {
        let grid = interp.grid();
        grid.coords().filter(|&(r, c)| grid.at(r, c) == sym('1')).collect()
    }

    #[test]
    fn test_pattern_mask_selects_tiles() {
        // Row "4" = 100: only tile column 0 applies
        let lines = vec![
            (Some("P"), Line::Pattern(octal_row("4").unwrap())),
            (
                None,
                Line::Command(bxl(Parameter::name("P"), [1, 1, 2, 2, 0, 2, 3, 1])),
            ),
        ];
        let program = Program::from_lines(lines).unwrap();
        let mut interp = Interpreter::new(program, &ExplorConfig::preview(6, 6, 1)).unwrap();
        interp.execute().unwrap();
        assert_eq!(ones(&interp), vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn test_literal_chance_applies_every_tile() {
        let mut program = Program::new();
        program
            .push(bxl(Parameter::Literal(1), [1, 1, 2, 2, 0, 2, 3, 1]))
            .unwrap();
        let mut interp = Interpreter::new(program, &ExplorConfig::preview(6, 6, 1)).unwrap();
        interp.execute().unwrap();
        let set = ones(&interp);
        assert_eq!(set.len(), 12);
        assert!(set.iter().all(|&(r, _)| r < 2));
    }

    #[test]
    fn test_tiles_wrap_at_origin() {
        let mut program = Program::new();
        program
            .push(bxl(Parameter::Literal(1), [0, 0, 2, 2, 0, 0, 1, 1]))
            .unwrap();
        let mut interp = Interpreter::new(program, &ExplorConfig::preview(4, 4, 1)).unwrap();
        interp.execute().unwrap();
        assert_eq!(ones(&interp), vec![(0, 0), (0, 3), (3, 0), (3, 3)]);
    }

    #[test]
    fn test_unknown_pattern_is_fatal() {
        let mut program = Program::new();
        program
            .push(bxl(Parameter::name("NOPE"), [1, 1, 2, 2, 0, 0, 1, 1]))
            .unwrap();
        let mut interp = Interpreter::new(program, &ExplorConfig::preview(4, 4, 1)).unwrap();
        assert!(matches!(
            interp.execute(),
            Err(ExplorError::UnknownPatternReference(name)) if name == "NOPE"
        ));
    }

    #[test]
    fn test_pxl_reads_across_the_edge() {
        let mut program = Program::new();
        // Copy '1' from the column to the left (A)
        program
            .push(CommandKind::Pxl(Pxl {
                direction: sym('A'),
                prob: 1,
                table: TripleTable::parse(&["011"]).unwrap(),
            }))
            .unwrap();
        let mut interp = Interpreter::new(program, &ExplorConfig::preview(4, 1, 1)).unwrap();
        interp.grid_mut().set(0, 3, sym('1'));
        interp.execute().unwrap();
        assert_eq!(interp.grid().row_string(0), "1111");
    }

    #[test]
    fn test_baxl_checks_neighbours_inside_masked_tiles() {
        // Row "4" = 100: only tile column 0 applies
        let lines = vec![
            (Some("P"), Line::Pattern(octal_row("4").unwrap())),
            (
                None,
                Line::Command(Command::new(CommandKind::Baxl(Boxed {
                    pattern: Parameter::name("P"),
                    geometry: BoxGeometry::from_params(
                        [1, 1, 2, 2, 0, 2, 3, 1].map(Parameter::Literal),
                    ),
                    transform: axl("B", Parameter::Literal(1)),
                }))),
            ),
        ];
        let program = Program::from_lines(lines).unwrap();
        let mut interp = Interpreter::new(program, &ExplorConfig::preview(6, 2, 1)).unwrap();
        interp.grid_mut().set(0, 2, sym('1'));
        interp.grid_mut().set(0, 4, sym('1'));
        interp.execute().unwrap();
        // (0, 3) also sees a '1' to its right, but its tile is masked out
        assert_eq!(ones(&interp), vec![(0, 1), (0, 2), (0, 4)]);
    }

    #[test]
    fn test_bpxl_rolls_chance_per_tile() {
        let mut program = Program::new();
        program
            .push(CommandKind::Bpxl(Boxed {
                pattern: Parameter::Literal(2),
                geometry: BoxGeometry::from_params([1, 1, 2, 2, 0, 2, 3, 1].map(Parameter::Literal)),
                transform: Pxl {
                    direction: sym('A'),
                    prob: 1,
                    table: TripleTable::parse(&["001", "011"]).unwrap(),
                },
            }))
            .unwrap();

        // Gate draw, then one "1 in 2" draw per tile: only the middle tile fires
        let rng = Box::new(ScriptedSource::new(vec![0.0, 0.9, 0.1, 0.9]));
        let mut interp =
            Interpreter::with_source(program, &ExplorConfig::preview(6, 2, 1), rng).unwrap();
        interp.execute().unwrap();
        assert_eq!(ones(&interp), vec![(0, 2), (0, 3), (1, 2), (1, 3)]);
    }

    #[test]
    fn test_baxl_without_probability_is_skipped() {
        let baxl = |pattern: Parameter| {
            Command::new(CommandKind::Baxl(Boxed {
                pattern,
                geometry: BoxGeometry::from_params([1, 1, 2, 2, 0, 0, 1, 1].map(Parameter::Literal)),
                transform: axl("B", Parameter::Absent),
            }))
        };
        let mut program = Program::new();
        program.push(baxl(Parameter::Literal(1))).unwrap();
        program
            .push(CommandKind::Chv(Chv {
                target: Parameter::name("AFTER"),
                op: ChangeOp::Set,
                from: Parameter::Literal(1),
                to: Parameter::Absent,
            }))
            .unwrap();
        let mut interp = Interpreter::new(program, &ExplorConfig::preview(4, 4, 1)).unwrap();
        interp.grid_mut().set(0, 1, sym('1'));
        interp.execute().unwrap();
        assert_eq!(ones(&interp), vec![(0, 1)]);
        assert_eq!(interp.variables().get("AFTER"), Some(1));

        // The pattern is resolved before the probability
        let mut program = Program::new();
        program.push(baxl(Parameter::name("NOPE"))).unwrap();
        let mut interp = Interpreter::new(program, &ExplorConfig::preview(4, 4, 1)).unwrap();
        assert!(matches!(
            interp.execute(),
            Err(ExplorError::UnknownPatternReference(_))
        ));
    }

    #[test]
    fn test_axl_counts_across_the_edge_only_when_wrapping() {
        let run = |wrap: WrapMode| {
            let mut program = Program::new();
            program
                .push(CommandKind::Axl(axl("A", Parameter::Literal(1))))
                .unwrap();
            let mut config = ExplorConfig::preview(3, 1, 1);
            config.mode = Mode {
                wrap,
                ..Mode::default()
            };
            let mut interp = Interpreter::new(program, &config).unwrap();
            interp.grid_mut().set(0, 2, sym('1'));
            interp.execute().unwrap();
            interp.grid().row_string(0)
        };
        assert_eq!(run(WrapMode::Plain), "001");
        // (0, 0) sees (0, 2) on its left, then (0, 1) sees the new '1'
        assert_eq!(run(WrapMode::Wrap), "111");
    }

    #[test]
    fn test_huge_geometry_is_invalid() {
        let mut program = Program::new();
        program
            .push(bxl(Parameter::Literal(1), [i64::MAX, 0, 2, 2, 2, 0, 1, 2]))
            .unwrap();
        let mut interp = Interpreter::new(program, &ExplorConfig::preview(4, 4, 1)).unwrap();
        assert!(matches!(
            interp.execute(),
            Err(ExplorError::InvalidGeometry(_))
        ));
        assert!(ones(&interp).is_empty());
    }
}
