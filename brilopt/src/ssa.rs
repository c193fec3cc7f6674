//! SSA construction: dominance-frontier-driven φ-insertion followed by
//! variable renaming along the dominator tree.

use crate::cfg::Cfg;
use crate::dom::Dominators;
use crate::error::OptError;
use bril::{Function, Instruction, Type, ValueOps};
use indexmap::{IndexMap, IndexSet};
use log::warn;
use std::collections::{HashMap, HashSet};

/// Rewrite a function into SSA form.
///
/// After the rewrite every variable in the function is the destination of
/// exactly one instruction, and every use is reached by a single
/// definition. Uses with no reaching definition at all (reads of
/// never-assigned names) are left unrenamed so downstream tools can still
/// parse the program.
pub fn to_ssa(function: &mut Function) -> Result<(), OptError> {
    let mut cfg = Cfg::new(function)?;
    let dominators = Dominators::new(&cfg);
    let assignments = variable_assignments(&cfg);
    let types = variable_types(&cfg, function);
    let params: HashSet<String> = function.args.iter().map(|arg| arg.name.clone()).collect();

    insert_phi_nodes(&mut cfg, &dominators, &assignments, &types);
    rename_variables(&mut cfg, &dominators, &params);

    function.instrs = cfg.to_instrs();
    Ok(())
}

/// Every block that assigns each variable, in source order.
fn variable_assignments(cfg: &Cfg) -> IndexMap<String, IndexSet<String>> {
    let mut assignments: IndexMap<String, IndexSet<String>> = IndexMap::new();
    for (label, block) in &cfg.blocks {
        for instr in block {
            if let Some(dest) = instr.dest() {
                assignments.entry(dest.to_string()).or_default().insert(label.clone());
            }
        }
    }
    assignments
}

/// The declared type of each variable, taken from its parameter entry or
/// its first definition. Inserted φ-nodes carry this type.
fn variable_types(cfg: &Cfg, function: &Function) -> HashMap<String, Type> {
    let mut types: HashMap<String, Type> = HashMap::new();
    for arg in &function.args {
        types.insert(arg.name.clone(), arg.typ.clone());
    }
    for block in cfg.blocks.values() {
        for instr in block {
            if let (Some(dest), Some(typ)) = (instr.dest(), instr.typ()) {
                types.entry(dest.to_string()).or_insert_with(|| typ.clone());
            }
        }
    }
    types
}

/// Insert φ-nodes at the iterated dominance frontier of each variable's
/// definition sites. `has_already` and `work` carry per-variable iteration
/// tags instead of being reset between variables.
fn insert_phi_nodes(
    cfg: &mut Cfg,
    dominators: &Dominators,
    assignments: &IndexMap<String, IndexSet<String>>,
    types: &HashMap<String, Type>,
) {
    let mut has_already: HashMap<String, usize> =
        cfg.blocks.keys().map(|label| (label.clone(), 0)).collect();
    let mut work = has_already.clone();

    for (iter_count, (var, def_blocks)) in assignments.iter().enumerate() {
        let iter_count = iter_count + 1;
        let mut worklist: Vec<String> = Vec::new();
        for block in def_blocks {
            *work.get_mut(block).expect("every block is tagged") = iter_count;
            worklist.push(block.clone());
        }

        while let Some(x) = worklist.pop() {
            for y in &dominators.frontier[&x] {
                if has_already[y] < iter_count {
                    let preds = cfg.predecessors[y].clone();
                    let phi = Instruction::Value {
                        op: ValueOps::Phi,
                        dest: var.clone(),
                        op_type: types.get(var).cloned().unwrap_or(Type::Int),
                        args: vec![var.clone(); preds.len()],
                        funcs: Vec::new(),
                        labels: preds,
                    };
                    cfg.blocks[y].insert(0, phi);
                    *has_already.get_mut(y).expect("every block is tagged") = iter_count;
                    if work[y] < iter_count {
                        *work.get_mut(y).expect("every block is tagged") = iter_count;
                        worklist.push(y.clone());
                    }
                }
            }
        }
    }
}

struct Frame {
    label: String,
    next_child: usize,
    /// Original names whose stacks were pushed in this block, one pop each
    /// on the way back up.
    introduced: Vec<String>,
}

/// Pre-order walk of the dominator tree with an explicit frame stack, so a
/// pathologically deep CFG cannot blow the call stack.
fn rename_variables(cfg: &mut Cfg, dominators: &Dominators, params: &HashSet<String>) {
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut stacks: HashMap<String, Vec<usize>> = HashMap::new();

    let entry = cfg.entry().to_string();
    let introduced = rename_block(cfg, &entry, &mut counters, &mut stacks, params);
    let mut frames = vec![Frame { label: entry, next_child: 0, introduced }];

    while let Some(frame) = frames.last_mut() {
        let label = frame.label.clone();
        let next_child = frame.next_child;
        frame.next_child += 1;

        match dominators.tree[&label].get(next_child) {
            Some(child) => {
                let child = child.clone();
                let introduced = rename_block(cfg, &child, &mut counters, &mut stacks, params);
                frames.push(Frame { label: child, next_child: 0, introduced });
            }
            None => {
                let frame = frames.pop().expect("the loop condition saw a frame");
                for var in &frame.introduced {
                    if let Some(stack) = stacks.get_mut(var) {
                        stack.pop();
                    }
                }
            }
        }
    }
}

/// Steps 1 and 2 of the renaming pass for one block: rewrite uses and
/// allocate fresh destination subscripts, then patch the φ arguments of
/// each successor along this block's incoming edge.
fn rename_block(
    cfg: &mut Cfg,
    label: &str,
    counters: &mut HashMap<String, usize>,
    stacks: &mut HashMap<String, Vec<usize>>,
    params: &HashSet<String>,
) -> Vec<String> {
    let mut introduced = Vec::new();

    let block = cfg.blocks.get_mut(label).expect("renaming only visits known blocks");
    for instr in block.iter_mut() {
        // φ arguments are patched from the predecessor side in step 2.
        if !instr.is_phi() {
            if let Some(args) = instr.args_mut() {
                for arg in args.iter_mut() {
                    match stacks.get(arg.as_str()).and_then(|stack| stack.last()) {
                        Some(subscript) => *arg = format!("{arg}_{subscript}"),
                        None => {
                            if !params.contains(arg.as_str()) {
                                warn!(
                                    "use of {arg} in .{label} has no reaching definition; \
                                     leaving it unrenamed"
                                );
                            }
                        }
                    }
                }
            }
        }

        if let Some(dest) = instr.dest().map(str::to_string) {
            let counter = counters.entry(dest.clone()).or_insert(0);
            let subscript = *counter;
            *counter += 1;
            stacks.entry(dest.clone()).or_default().push(subscript);
            instr.set_dest(format!("{dest}_{subscript}"));
            introduced.push(dest);
        }
    }

    for succ in cfg.successors[label].clone() {
        let position = cfg.predecessors[&succ]
            .iter()
            .position(|pred| pred == label)
            .expect("successor lists invert to predecessor lists");
        let block = cfg.blocks.get_mut(&succ).expect("successors are known blocks");
        for instr in block.iter_mut() {
            if !instr.is_phi() {
                // φ-nodes sit at the head of a block.
                break;
            }
            let args = instr.args_mut().expect("φ instructions carry arguments");
            let var = args[position].clone();
            match stacks.get(var.as_str()).and_then(|stack| stack.last()) {
                Some(subscript) => args[position] = format!("{var}_{subscript}"),
                None => {
                    // The value is undefined along this edge; keep the
                    // original name so the program stays parseable.
                    if !params.contains(var.as_str()) {
                        warn!(
                            "φ for {var} in .{succ} has an undefined value on the edge from \
                             .{label}"
                        );
                    }
                }
            }
        }
    }

    introduced
}
