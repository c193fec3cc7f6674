//! Integration tests driving whole programs through the transforms.

use bril::{Code, Instruction, Literal, load_program_from_read};
use brilopt::{lvn_function, tdce_function, to_ssa};
use indoc::indoc;
use std::collections::HashSet;

fn parse(input: &str) -> bril::Program {
    load_program_from_read(input.as_bytes()).unwrap()
}

fn instructions(function: &bril::Function) -> Vec<&Instruction> {
    function.instrs.iter().filter_map(Code::as_instruction).collect()
}

/// LVN folds both sums into one constant and TDCE then sweeps away the
/// inputs that fed them; only the observable behaviour survives.
#[test]
fn test_lvn_then_tdce() {
    let mut program = parse(indoc! {r#"
        {
          "functions": [
            {
              "name": "main",
              "instrs": [
                {"op": "const", "dest": "a", "type": "int", "value": 2},
                {"op": "const", "dest": "b", "type": "int", "value": 3},
                {"op": "add", "dest": "c", "type": "int", "args": ["a", "b"]},
                {"op": "add", "dest": "d", "type": "int", "args": ["b", "a"]},
                {"op": "print", "args": ["d"]}
              ]
            }
          ]
        }
    "#});

    for function in &mut program.functions {
        lvn_function(function);
        tdce_function(function);
    }

    let function = &program.functions[0];
    let instrs = instructions(function);
    assert_eq!(instrs.len(), 2);
    match instrs[0] {
        Instruction::Constant { dest, value, .. } => {
            assert_eq!(dest, "c");
            assert_eq!(*value, Literal::Int(5));
        }
        other => panic!("expected the folded constant, got {other}"),
    }
    assert_eq!(instrs[1].args(), &["c"]);
}

/// TDCE leaves a program already free of dead code untouched.
#[test]
fn test_tdce_is_idempotent() {
    let mut program = parse(indoc! {r#"
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

    for function in &mut program.functions {
        tdce_function(function);
    }
    let once = program.clone();
    for function in &mut program.functions {
        tdce_function(function);
    }
    assert_eq!(program, once);
}

/// SSA output is valid IR: it parses back through the JSON schema and
/// every variable is assigned exactly once.
#[test]
fn test_to_ssa_round_trips() {
    let mut program = parse(indoc! {r#"
        {
          "functions": [
            {
              "name": "main",
              "args": [{"name": "cond", "type": "bool"}],
              "instrs": [
                {"label": "entry"},
                {"op": "br", "args": ["cond"], "labels": ["l", "r"]},
                {"label": "l"},
                {"op": "const", "dest": "x", "type": "int", "value": 1},
                {"op": "jmp", "labels": ["join"]},
                {"label": "r"},
                {"op": "const", "dest": "x", "type": "int", "value": 2},
                {"op": "jmp", "labels": ["join"]},
                {"label": "join"},
                {"op": "print", "args": ["x"]},
                {"op": "ret"}
              ]
            }
          ]
        }
    "#});

    for function in &mut program.functions {
        to_ssa(function).unwrap();
    }

    let mut rendered = Vec::new();
    bril::output_program_to_write(&program, &mut rendered).unwrap();
    let reparsed = load_program_from_read(rendered.as_slice()).unwrap();
    assert_eq!(program, reparsed);

    let mut seen = HashSet::new();
    for instr in instructions(&program.functions[0]) {
        if let Some(dest) = instr.dest() {
            assert!(seen.insert(dest.to_string()), "{dest} assigned twice after SSA");
        }
    }
    assert!(instructions(&program.functions[0]).iter().any(|instr| instr.is_phi()));
}

/// Transform output keeps the two-space pretty-printed schema.
#[test]
fn test_output_is_pretty_printed() {
    let program = parse(r#"{"functions":[{"name":"main","instrs":[{"op":"ret"}]}]}"#);
    let mut rendered = Vec::new();
    bril::output_program_to_write(&program, &mut rendered).unwrap();
    let text = String::from_utf8(rendered).unwrap();
    assert!(text.starts_with("{\n  \"functions\""));
    assert!(text.ends_with("}\n"));
}
