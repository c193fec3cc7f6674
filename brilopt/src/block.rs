//! Basic-block construction: partition a function's flat instruction stream
//! into maximal basic blocks.

use bril::{Code, Function, Instruction};
use indexmap::IndexMap;

/// Split a function into basic blocks.
///
/// A block ends at a terminator (`jmp`, `br`, `ret`); a label closes any
/// block in progress and opens a new one that starts with the label. The
/// residual block at the end of the stream is emitted when non-empty, and
/// no empty block is ever emitted.
pub fn form_blocks(function: &Function) -> Vec<Vec<Code>> {
    let mut blocks = Vec::new();
    let mut block: Vec<Code> = Vec::new();

    for code in &function.instrs {
        match code {
            Code::Instruction(instr) => {
                block.push(code.clone());
                if instr.is_terminator() {
                    blocks.push(std::mem::take(&mut block));
                }
            }
            Code::Label { .. } => {
                if !block.is_empty() {
                    blocks.push(std::mem::take(&mut block));
                }
                block.push(code.clone());
            }
        }
    }
    if !block.is_empty() {
        blocks.push(block);
    }
    blocks
}

/// Ordered mapping from label to block body, with entry labels lifted out
/// of the instruction sequence into the keys.
///
/// A block that does not start with a label (the first block of most
/// functions, or an orphan block following a terminator) is keyed by the
/// synthetic label `label_<k>` where `k` is the number of blocks mapped so
/// far.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockMap {
    pub blocks: IndexMap<String, Vec<Instruction>>,
}

impl BlockMap {
    pub fn new(function: &Function) -> Self {
        let mut blocks = IndexMap::new();
        for block in form_blocks(function) {
            let (label, body) = match &block[0] {
                Code::Label { label } => (label.clone(), &block[1..]),
                Code::Instruction(_) => (format!("label_{}", blocks.len()), &block[..]),
            };
            let body: Vec<Instruction> = body
                .iter()
                .filter_map(|code| code.as_instruction().cloned())
                .collect();
            blocks.insert(label, body);
        }
        BlockMap { blocks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bril::load_program_from_read;
    use indoc::indoc;

    fn parse_function(input: &str) -> Function {
        let program = load_program_from_read(input.as_bytes()).unwrap();
        program.functions.into_iter().next().unwrap()
    }

    /// Block boundaries fall exactly at terminators and labels.
    #[test]
    fn test_blocks_split_at_terminators_and_labels() {
        let function = parse_function(indoc! {r#"
            {
              "functions": [
                {
                  "name": "main",
                  "instrs": [
                    {"op": "const", "dest": "a", "type": "int", "value": 1},
                    {"op": "jmp", "labels": ["next"]},
                    {"label": "next"},
                    {"op": "const", "dest": "b", "type": "int", "value": 2},
                    {"op": "print", "args": ["b"]}
                  ]
                }
              ]
            }
        "#});

        let blocks = form_blocks(&function);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].len(), 2);
        assert_eq!(blocks[1][0].as_label(), Some("next"));
        assert_eq!(blocks[1].len(), 3);

        // No instruction is lost and no label survives inside a block body.
        let map = BlockMap::new(&function);
        let total: usize = map.blocks.values().map(|block| block.len()).sum();
        assert_eq!(total, 4);
    }

    /// A label-less leading block gets a synthetic label.
    #[test]
    fn test_synthetic_labels() {
        let function = parse_function(indoc! {r#"
            {
              "functions": [
                {
                  "name": "main",
                  "instrs": [
                    {"op": "const", "dest": "a", "type": "int", "value": 1},
                    {"op": "ret"},
                    {"op": "const", "dest": "b", "type": "int", "value": 2}
                  ]
                }
              ]
            }
        "#});

        let map = BlockMap::new(&function);
        let labels: Vec<&String> = map.blocks.keys().collect();
        assert_eq!(labels, ["label_0", "label_1"]);
    }

    /// A stream with no terminators at all is one block.
    #[test]
    fn test_straight_line_is_one_block() {
        let function = parse_function(indoc! {r#"
            {
              "functions": [
                {
                  "name": "main",
                  "instrs": [
                    {"op": "const", "dest": "a", "type": "int", "value": 1},
                    {"op": "print", "args": ["a"]}
                  ]
                }
              ]
            }
        "#});
        assert_eq!(form_blocks(&function).len(), 1);
    }
}
