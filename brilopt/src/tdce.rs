//! Trivial dead-code elimination: a global sweep for unused pure values
//! and a per-block sweep for definitions that are overwritten before any
//! read. Both run to convergence.

use crate::block::form_blocks;
use bril::{Code, Function};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Remove instructions whose destination is never read anywhere in the
/// function, provided they have no side effects. Returns whether anything
/// was removed.
fn eliminate_dead_code(function: &mut Function) -> bool {
    let used: HashSet<String> = function
        .instrs
        .iter()
        .filter_map(Code::as_instruction)
        .flat_map(|instr| instr.args().iter().cloned())
        .collect();

    let before = function.instrs.len();
    function.instrs.retain(|code| match code.as_instruction() {
        Some(instr) => match instr.dest() {
            Some(dest) => !instr.is_pure() || used.contains(dest),
            None => true,
        },
        None => true,
    });
    function.instrs.len() != before
}

/// Within one block, a definition followed by a redefinition with no read
/// in between is dead. Returns whether anything was removed.
fn eliminate_redundant_stores(block: &mut Vec<Code>) -> bool {
    // Variable → index of its latest unread definition.
    let mut defined: HashMap<String, usize> = HashMap::new();
    let mut dead: Vec<usize> = Vec::new();

    for (index, code) in block.iter().enumerate() {
        let Some(instr) = code.as_instruction() else { continue };
        for arg in instr.args() {
            defined.remove(arg);
        }
        if let Some(dest) = instr.dest() {
            if let Some(previous) = defined.remove(dest) {
                dead.push(previous);
            }
            // An impure definition supersedes earlier ones but can never
            // itself be deleted.
            if instr.is_pure() {
                defined.insert(dest.to_string(), index);
            }
        }
    }

    if dead.is_empty() {
        return false;
    }
    debug!("removing {} redundant definitions", dead.len());
    let dead: HashSet<usize> = dead.into_iter().collect();
    let mut index = 0;
    block.retain(|_| {
        let keep = !dead.contains(&index);
        index += 1;
        keep
    });
    true
}

/// Run both sweeps to a joint fixed point.
pub fn tdce_function(function: &mut Function) {
    loop {
        let mut changed = false;
        while eliminate_dead_code(function) {
            changed = true;
        }

        let mut instrs = Vec::new();
        for mut block in form_blocks(function) {
            while eliminate_redundant_stores(&mut block) {
                changed = true;
            }
            instrs.extend(block);
        }
        function.instrs = instrs;

        if !changed {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bril::{Instruction, load_program_from_read};
    use indoc::indoc;

    fn parse_function(input: &str) -> Function {
        let program = load_program_from_read(input.as_bytes()).unwrap();
        program.functions.into_iter().next().unwrap()
    }

    fn dests(function: &Function) -> Vec<&str> {
        function
            .instrs
            .iter()
            .filter_map(Code::as_instruction)
            .filter_map(Instruction::dest)
            .collect()
    }

    /// An unused pure definition disappears; the used one stays.
    #[test]
    fn test_removes_unused_definition() {
        let mut function = parse_function(indoc! {r#"
            {
              "functions": [
                {
                  "name": "main",
                  "instrs": [
                    {"op": "const", "dest": "a", "type": "int", "value": 1},
                    {"op": "const", "dest": "b", "type": "int", "value": 2},
                    {"op": "print", "args": ["a"]}
                  ]
                }
              ]
            }
        "#});
        tdce_function(&mut function);
        assert_eq!(dests(&function), ["a"]);
    }

    /// Removal cascades: once `b` is gone, the definition feeding only `b`
    /// is dead too.
    #[test]
    fn test_cascading_removal() {
        let mut function = parse_function(indoc! {r#"
            {
              "functions": [
                {
                  "name": "main",
                  "instrs": [
                    {"op": "const", "dest": "a", "type": "int", "value": 1},
                    {"op": "id", "dest": "b", "type": "int", "args": ["a"]},
                    {"op": "const", "dest": "c", "type": "int", "value": 3},
                    {"op": "print", "args": ["c"]}
                  ]
                }
              ]
            }
        "#});
        tdce_function(&mut function);
        assert_eq!(dests(&function), ["c"]);
    }

    /// A definition overwritten before any read is dropped even though the
    /// variable itself is used later.
    #[test]
    fn test_redundant_store() {
        let mut function = parse_function(indoc! {r#"
            {
              "functions": [
                {
                  "name": "main",
                  "instrs": [
                    {"op": "const", "dest": "a", "type": "int", "value": 1},
                    {"op": "const", "dest": "a", "type": "int", "value": 2},
                    {"op": "print", "args": ["a"]}
                  ]
                }
              ]
            }
        "#});
        tdce_function(&mut function);

        let constants: Vec<i64> = function
            .instrs
            .iter()
            .filter_map(Code::as_instruction)
            .filter_map(|instr| match instr {
                Instruction::Constant { value, .. } => value.as_int(),
                _ => None,
            })
            .collect();
        assert_eq!(constants, [2]);
    }

    /// A read in between keeps both definitions.
    #[test]
    fn test_read_blocks_redundant_store() {
        let mut function = parse_function(indoc! {r#"
            {
              "functions": [
                {
                  "name": "main",
                  "instrs": [
                    {"op": "const", "dest": "a", "type": "int", "value": 1},
                    {"op": "print", "args": ["a"]},
                    {"op": "const", "dest": "a", "type": "int", "value": 2},
                    {"op": "print", "args": ["a"]}
                  ]
                }
              ]
            }
        "#});
        tdce_function(&mut function);
        assert_eq!(dests(&function), ["a", "a"]);
    }

    /// A call's result may be unused, but the call still happens.
    #[test]
    fn test_calls_survive() {
        let mut function = parse_function(indoc! {r#"
            {
              "functions": [
                {
                  "name": "main",
                  "instrs": [
                    {"op": "call", "dest": "r", "type": "int", "funcs": ["noisy"]},
                    {"op": "ret"}
                  ]
                }
              ]
            }
        "#});
        tdce_function(&mut function);
        assert_eq!(dests(&function), ["r"]);
    }
}
