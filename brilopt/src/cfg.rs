//! Control-flow graph over the label-keyed block map.
//!
//! Cyclic structure is represented with indirection tables (`label →
//! [label]`), never with owned references: the block map owns the
//! instructions and everything else refers to blocks by label.

use crate::block::BlockMap;
use crate::error::OptError;
use bril::{Code, EffectOps, Function, Instruction};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Per-function CFG. All orderings are stable: blocks appear in source
/// order, successor lists follow terminator argument order (*then* before
/// *else*), and predecessor lists follow a linear scan of the successor
/// table.
#[derive(Debug, Clone, PartialEq)]
pub struct Cfg {
    pub function_name: String,
    pub blocks: IndexMap<String, Vec<Instruction>>,
    pub successors: IndexMap<String, Vec<String>>,
    pub predecessors: IndexMap<String, Vec<String>>,
}

impl Cfg {
    pub fn new(function: &Function) -> Result<Self, OptError> {
        let BlockMap { blocks } = BlockMap::new(function);
        if blocks.is_empty() {
            return Err(OptError::EmptyFunction { function: function.name.clone() });
        }

        let mut successors: IndexMap<String, Vec<String>> = IndexMap::new();
        for (index, (label, block)) in blocks.iter().enumerate() {
            let last = block.last().ok_or_else(|| OptError::EmptyBlock {
                function: function.name.clone(),
                label: label.clone(),
            })?;

            let succs = match last {
                Instruction::Effect { op: EffectOps::Jmp | EffectOps::Br, labels, .. } => {
                    labels.clone()
                }
                Instruction::Effect { op: EffectOps::Ret, .. } => Vec::new(),
                // Fall-through: the textually next block, if any.
                _ => match blocks.get_index(index + 1) {
                    Some((next, _)) => vec![next.clone()],
                    None => Vec::new(),
                },
            };
            for succ in &succs {
                if !blocks.contains_key(succ) {
                    return Err(OptError::UnknownLabel {
                        function: function.name.clone(),
                        label: succ.clone(),
                    });
                }
            }
            successors.insert(label.clone(), succs);
        }

        let mut predecessors: IndexMap<String, Vec<String>> =
            blocks.keys().map(|label| (label.clone(), Vec::new())).collect();
        for (label, succs) in &successors {
            for succ in succs {
                predecessors[succ].push(label.clone());
            }
        }

        Ok(Cfg { function_name: function.name.clone(), blocks, successors, predecessors })
    }

    /// The entry block is the first block in source order.
    pub fn entry(&self) -> &str {
        self.blocks.keys().next().expect("a CFG always has at least one block")
    }

    pub fn labels(&self) -> impl Iterator<Item = &String> {
        self.blocks.keys()
    }

    /// Postorder over the blocks reachable from the entry, computed with an
    /// explicit stack.
    pub fn postorder(&self) -> Vec<String> {
        let entry = self.entry().to_string();
        let mut visited: HashSet<String> = HashSet::from([entry.clone()]);
        let mut order = Vec::new();
        let mut stack: Vec<(String, usize)> = vec![(entry, 0)];

        while let Some((label, next_child)) = stack.last_mut() {
            let succs = &self.successors[label.as_str()];
            if let Some(succ) = succs.get(*next_child) {
                *next_child += 1;
                if visited.insert(succ.clone()) {
                    stack.push((succ.clone(), 0));
                }
            } else {
                order.push(stack.pop().expect("stack is non-empty").0);
            }
        }
        order
    }

    pub fn reverse_postorder(&self) -> Vec<String> {
        let mut order = self.postorder();
        order.reverse();
        order
    }

    /// Flatten the blocks back into an instruction stream, re-attaching each
    /// block's label.
    pub fn to_instrs(&self) -> Vec<Code> {
        let mut instrs = Vec::new();
        for (label, block) in &self.blocks {
            instrs.push(Code::Label { label: label.clone() });
            instrs.extend(block.iter().cloned().map(Code::Instruction));
        }
        instrs
    }
}
