//! Live variables (backward).
//!
//! A fact is the set of variables live at a program point:
//! `in(B) = uses(B) ∪ (out(B) \ defs(B))`, where `uses(B)` are the
//! variables read before any local definition (upward exposed).

use crate::dfa::lattice::SetLattice;
use crate::dfa::solver::{Analysis, Direction};
use bril::Instruction;
use std::collections::BTreeSet;

pub struct LiveVars;

impl Analysis for LiveVars {
    type Fact = SetLattice<String>;

    fn direction(&self) -> Direction {
        Direction::Backward
    }

    fn transfer(&self, block: &[Instruction], fact: &Self::Fact, _label: &str) -> Self::Fact {
        let mut uses: BTreeSet<String> = BTreeSet::new();
        let mut defs: BTreeSet<String> = BTreeSet::new();
        for instr in block {
            for arg in instr.args() {
                if !defs.contains(arg) {
                    uses.insert(arg.clone());
                }
            }
            if let Some(dest) = instr.dest() {
                defs.insert(dest.to_string());
            }
        }

        let mut result = SetLattice { elements: uses };
        for var in fact.iter() {
            if !defs.contains(var) {
                result.insert(var.clone());
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::Cfg;
    use crate::dfa::solver::WorklistSolver;
    use bril::{Function, load_program_from_read};
    use indoc::indoc;

    fn parse_function(input: &str) -> Function {
        let program = load_program_from_read(input.as_bytes()).unwrap();
        program.functions.into_iter().next().unwrap()
    }

    /// A variable defined and consumed inside one block is never live at
    /// its boundaries.
    #[test]
    fn test_locally_consumed_variable_is_not_live() {
        let function = parse_function(indoc! {r#"
            {
              "functions": [
                {
                  "name": "main",
                  "instrs": [
                    {"label": "entry"},
                    {"op": "const", "dest": "a", "type": "int", "value": 1},
                    {"op": "print", "args": ["a"]},
                    {"op": "ret"}
                  ]
                }
              ]
            }
        "#});
        let cfg = Cfg::new(&function).unwrap();
        let result = WorklistSolver::new(LiveVars).solve(&cfg, &function);

        assert!(result.input["entry"].is_empty());
        assert!(result.output["entry"].is_empty());
    }

    /// A variable used by a later block is live across the edge.
    #[test]
    fn test_liveness_crosses_blocks() {
        let function = parse_function(indoc! {r#"
            {
              "functions": [
                {
                  "name": "main",
                  "instrs": [
                    {"label": "entry"},
                    {"op": "const", "dest": "a", "type": "int", "value": 1},
                    {"op": "const", "dest": "b", "type": "int", "value": 2},
                    {"op": "jmp", "labels": ["exit"]},
                    {"label": "exit"},
                    {"op": "print", "args": ["a"]},
                    {"op": "ret"}
                  ]
                }
              ]
            }
        "#});
        let cfg = Cfg::new(&function).unwrap();
        let result = WorklistSolver::new(LiveVars).solve(&cfg, &function);

        assert_eq!(result.output["entry"], SetLattice::from_iter(["a".to_string()]));
        assert!(result.input["entry"].is_empty());
        assert_eq!(result.input["exit"], SetLattice::from_iter(["a".to_string()]));
    }

    /// Around a loop, a variable read before being written is live on the
    /// back edge.
    #[test]
    fn test_loop_liveness() {
        let function = parse_function(indoc! {r#"
            {
              "functions": [
                {
                  "name": "main",
                  "args": [{"name": "x", "type": "int"}, {"name": "c", "type": "bool"}],
                  "instrs": [
                    {"label": "loop"},
                    {"op": "add", "dest": "x", "type": "int", "args": ["x", "x"]},
                    {"op": "br", "args": ["c"], "labels": ["loop", "end"]},
                    {"label": "end"},
                    {"op": "ret", "args": ["x"]}
                  ]
                }
              ]
            }
        "#});
        let cfg = Cfg::new(&function).unwrap();
        let result = WorklistSolver::new(LiveVars).solve(&cfg, &function);

        assert_eq!(
            result.input["loop"],
            SetLattice::from_iter(["c".to_string(), "x".to_string()])
        );
        assert_eq!(result.input["end"], SetLattice::from_iter(["x".to_string()]));
    }
}
