//! Reaching definitions (forward).
//!
//! A fact is a set of `(variable, definition id)` pairs. Definition ids are
//! function-global serial numbers assigned in source order to every
//! instruction with a destination; function parameters are virtual
//! definitions with id `-1`.

use crate::cfg::Cfg;
use crate::dfa::lattice::SetLattice;
use crate::dfa::solver::{Analysis, Direction};
use bril::{Function, Instruction};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt::{self, Display};

/// One definition point.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Definition {
    pub var: String,
    pub id: i64,
}

impl Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.var, self.id)
    }
}

pub struct ReachingDefs {
    /// `(block label, index within block) → definition id`.
    def_ids: HashMap<(String, usize), i64>,
}

impl ReachingDefs {
    pub fn new(cfg: &Cfg) -> Self {
        let mut def_ids = HashMap::new();
        let mut next = 0;
        for (label, block) in &cfg.blocks {
            for (index, instr) in block.iter().enumerate() {
                if instr.dest().is_some() {
                    def_ids.insert((label.clone(), index), next);
                    next += 1;
                }
            }
        }
        ReachingDefs { def_ids }
    }
}

impl Analysis for ReachingDefs {
    type Fact = SetLattice<Definition>;

    fn direction(&self) -> Direction {
        Direction::Forward
    }

    /// Parameters reach the entry block with the virtual id `-1`.
    fn boundary_fact(&self, function: &Function) -> Self::Fact {
        SetLattice::from_iter(
            function.args.iter().map(|arg| Definition { var: arg.name.clone(), id: -1 }),
        )
    }

    fn transfer(&self, block: &[Instruction], fact: &Self::Fact, label: &str) -> Self::Fact {
        // Local pass: the last definition of each variable in the block is
        // the one that reaches its end.
        let mut local: IndexMap<&str, i64> = IndexMap::new();
        for (index, instr) in block.iter().enumerate() {
            if let Some(dest) = instr.dest() {
                local.insert(dest, self.def_ids[&(label.to_string(), index)]);
            }
        }

        let mut result = SetLattice::from_iter(
            local.iter().map(|(var, id)| Definition { var: (*var).to_string(), id: *id }),
        );
        // Incoming definitions survive unless the block redefines the
        // variable.
        for definition in fact.iter() {
            if !local.contains_key(definition.var.as_str()) {
                result.insert(definition.clone());
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dfa::solver::WorklistSolver;
    use bril::load_program_from_read;
    use indoc::indoc;

    fn parse_function(input: &str) -> Function {
        let program = load_program_from_read(input.as_bytes()).unwrap();
        program.functions.into_iter().next().unwrap()
    }

    fn definition(var: &str, id: i64) -> Definition {
        Definition { var: var.to_string(), id }
    }

    /// Parameters reach the entry with id -1; later definitions get serial
    /// ids in source order.
    #[test]
    fn test_straight_line_definitions() {
        let function = parse_function(indoc! {r#"
            {
              "functions": [
                {
                  "name": "main",
                  "args": [{"name": "x", "type": "int"}],
                  "instrs": [
                    {"label": "entry"},
                    {"op": "const", "dest": "a", "type": "int", "value": 1},
                    {"op": "add", "dest": "b", "type": "int", "args": ["a", "x"]},
                    {"op": "ret", "args": ["b"]}
                  ]
                }
              ]
            }
        "#});
        let cfg = Cfg::new(&function).unwrap();
        let solver = WorklistSolver::new(ReachingDefs::new(&cfg));
        let result = solver.solve(&cfg, &function);

        assert_eq!(result.input["entry"], SetLattice::from_iter([definition("x", -1)]));
        assert_eq!(
            result.output["entry"],
            SetLattice::from_iter([definition("x", -1), definition("a", 0), definition("b", 1)])
        );
    }

    /// A redefinition kills the incoming definition of the same variable.
    #[test]
    fn test_redefinition_kills() {
        let function = parse_function(indoc! {r#"
            {
              "functions": [
                {
                  "name": "main",
                  "instrs": [
                    {"label": "entry"},
                    {"op": "const", "dest": "a", "type": "int", "value": 1},
                    {"op": "jmp", "labels": ["next"]},
                    {"label": "next"},
                    {"op": "const", "dest": "a", "type": "int", "value": 2},
                    {"op": "ret"}
                  ]
                }
              ]
            }
        "#});
        let cfg = Cfg::new(&function).unwrap();
        let solver = WorklistSolver::new(ReachingDefs::new(&cfg));
        let result = solver.solve(&cfg, &function);

        assert_eq!(result.input["next"], SetLattice::from_iter([definition("a", 0)]));
        assert_eq!(result.output["next"], SetLattice::from_iter([definition("a", 1)]));
    }

    /// Both branch definitions reach the join block.
    #[test]
    fn test_join_unions_definitions() {
        let function = parse_function(indoc! {r#"
            {
              "functions": [
                {
                  "name": "main",
                  "args": [{"name": "c", "type": "bool"}],
                  "instrs": [
                    {"op": "br", "args": ["c"], "labels": ["l", "r"]},
                    {"label": "l"},
                    {"op": "const", "dest": "a", "type": "int", "value": 1},
                    {"op": "jmp", "labels": ["join"]},
                    {"label": "r"},
                    {"op": "const", "dest": "a", "type": "int", "value": 2},
                    {"op": "jmp", "labels": ["join"]},
                    {"label": "join"},
                    {"op": "ret"}
                  ]
                }
              ]
            }
        "#});
        let cfg = Cfg::new(&function).unwrap();
        let solver = WorklistSolver::new(ReachingDefs::new(&cfg));
        let result = solver.solve(&cfg, &function);

        assert_eq!(
            result.input["join"],
            SetLattice::from_iter([definition("a", 0), definition("a", 1), definition("c", -1)])
        );
    }
}
