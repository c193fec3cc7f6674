//! Local value numbering with constant folding, copy propagation and
//! commutativity-aware canonicalisation.
//!
//! Numbering is strictly per-block: each block starts with a fresh table
//! and environment, and non-local values (block live-ins, call results,
//! φ-nodes) are represented by opaque rows that never match a lookup.

use crate::block::form_blocks;
use crate::eval::eval_value_op;
use bril::{Code, ConstOps, Function, Instruction, Literal, ValueOps};
use log::debug;

fn is_commutative(op: ValueOps) -> bool {
    matches!(op, ValueOps::Add | ValueOps::Mul | ValueOps::Eq | ValueOps::And | ValueOps::Or)
}

fn is_comparison(op: ValueOps) -> bool {
    matches!(op, ValueOps::Eq | ValueOps::Lt | ValueOps::Gt | ValueOps::Le | ValueOps::Ge)
}

/// Comparing a value against itself has a fixed outcome.
fn reflexive_result(op: ValueOps) -> Option<Literal> {
    match op {
        ValueOps::Eq | ValueOps::Le | ValueOps::Ge => Some(Literal::Bool(true)),
        ValueOps::Lt | ValueOps::Gt => Some(Literal::Bool(false)),
        _ => None,
    }
}

/// Operations whose result cannot be numbered: they may produce a
/// different value on every execution or depend on control flow.
fn is_opaque_op(op: ValueOps) -> bool {
    matches!(op, ValueOps::Call | ValueOps::Phi)
}

/// Canonical representation of a computed value, independent of which
/// variable currently holds it. Arguments are table row indices.
#[derive(Clone, PartialEq, Debug)]
pub enum CanonValue {
    Const(Literal),
    Op(ValueOps, Vec<usize>),
}

impl CanonValue {
    fn is_const(&self) -> bool {
        matches!(self, CanonValue::Const(_))
    }

    fn as_const(&self) -> Option<Literal> {
        match self {
            CanonValue::Const(literal) => Some(*literal),
            CanonValue::Op(..) => None,
        }
    }

    /// `const` and `id` values can replace an `id` of the row outright.
    fn is_copy_foldable(&self) -> bool {
        matches!(self, CanonValue::Const(_) | CanonValue::Op(ValueOps::Id, _))
    }
}

#[derive(Debug, Clone)]
struct TableRow {
    idx: usize,
    /// `None` marks an opaque row.
    value: Option<CanonValue>,
    /// The variable that holds this value for the rest of the block.
    variable: String,
}

/// Value-numbering state for one basic block.
#[derive(Default)]
pub struct Lvn {
    table: Vec<TableRow>,
    /// Variable name → row index.
    environment: std::collections::HashMap<String, usize>,
    fresh_count: usize,
}

impl Lvn {
    pub fn new() -> Self {
        Lvn::default()
    }

    fn add_row(&mut self, value: Option<CanonValue>, variable: String) -> usize {
        let idx = self.table.len();
        debug!("lvn: new row {idx} for {variable} = {value:?}");
        self.table.push(TableRow { idx, value, variable });
        idx
    }

    /// Give every argument a row; arguments never seen before are
    /// non-local and get an opaque row under their own name.
    fn ensure_arg_rows(&mut self, args: &[String]) {
        for arg in args {
            if !self.environment.contains_key(arg) {
                debug!("lvn: argument {arg} is non-local");
                let idx = self.add_row(None, arg.clone());
                self.environment.insert(arg.clone(), idx);
            }
        }
    }

    fn canonical_name(&self, var: &str) -> String {
        self.table[self.environment[var]].variable.clone()
    }

    /// First row holding the canonical value, if any. Opaque rows never
    /// match.
    fn lookup(&self, value: &CanonValue) -> Option<(usize, String)> {
        self.table
            .iter()
            .find(|row| row.value.as_ref() == Some(value))
            .map(|row| (row.idx, row.variable.clone()))
    }

    /// Build the canonical value of a destination instruction; `None` for
    /// opaque operations.
    fn canonicalize(&mut self, instr: &Instruction) -> Option<CanonValue> {
        let (op, args) = match instr {
            Instruction::Constant { value, .. } => return Some(CanonValue::Const(*value)),
            Instruction::Value { op, args, .. } => (*op, args),
            Instruction::Effect { .. } => unreachable!("effects are handled by the caller"),
        };
        self.ensure_arg_rows(args);
        if is_opaque_op(op) {
            return None;
        }

        let args_idx: Vec<usize> = args.iter().map(|arg| self.environment[arg]).collect();
        let arg_values: Vec<Option<&CanonValue>> =
            args_idx.iter().map(|idx| self.table[*idx].value.as_ref()).collect();

        if op == ValueOps::Id {
            if let Some(value) = arg_values[0] {
                if value.is_copy_foldable() {
                    debug!("lvn: folding copy of row {}", args_idx[0]);
                    return Some(value.clone());
                }
            }
        }

        if arg_values.iter().all(|value| value.is_some_and(CanonValue::is_const)) {
            let literals: Vec<Literal> =
                arg_values.iter().map(|value| value.unwrap().as_const().unwrap()).collect();
            if let Some(folded) = eval_value_op(op, &literals) {
                debug!("lvn: folded {op} over constants to {folded}");
                return Some(CanonValue::Const(folded));
            }
        } else if let Some(literal) =
            arg_values.iter().flatten().find_map(|value| value.as_const())
        {
            // One constant argument can still decide a short-circuiting op.
            if (op == ValueOps::Or && literal == Literal::Bool(true))
                || (op == ValueOps::And && literal == Literal::Bool(false))
            {
                debug!("lvn: short-circuiting {op} to {literal}");
                return Some(CanonValue::Const(literal));
            }
        } else if is_comparison(op) && args_idx.len() == 2 && args_idx[0] == args_idx[1] {
            if let Some(result) = reflexive_result(op) {
                debug!("lvn: reflexive {op} folds to {result}");
                return Some(CanonValue::Const(result));
            }
        }

        let mut args_idx = args_idx;
        if is_commutative(op) {
            args_idx.sort_unstable();
        }
        Some(CanonValue::Op(op, args_idx))
    }

    /// The name the destination's row will live under: the destination
    /// itself, or a fresh `lvn.<k>` temporary when a later instruction in
    /// the block clobbers it.
    fn home_for(&mut self, block: &[Code], index: usize, dest: &str) -> String {
        let clobbered = block[index + 1..]
            .iter()
            .filter_map(Code::as_instruction)
            .any(|instr| instr.dest() == Some(dest));
        if clobbered {
            let home = format!("lvn.{}", self.fresh_count);
            self.fresh_count += 1;
            debug!("lvn: {dest} is clobbered later, renaming to {home}");
            home
        } else {
            dest.to_string()
        }
    }

    fn process(&mut self, instr: &Instruction, block: &[Code], index: usize) -> Instruction {
        let Some(dest) = instr.dest().map(str::to_string) else {
            // Effect instruction: rewrite its arguments to their canonical
            // homes and pass it through.
            let mut instr = instr.clone();
            if let Some(args) = instr.args_mut() {
                let names = args.clone();
                self.ensure_arg_rows(&names);
                for arg in args.iter_mut() {
                    *arg = self.canonical_name(arg);
                }
            }
            return instr;
        };

        let value = self.canonicalize(instr);
        let canonical_args: Vec<String> =
            instr.args().iter().map(|arg| self.canonical_name(arg)).collect();
        let typ = instr.typ().expect("destination instructions carry a type").clone();

        let Some(value) = value else {
            // Opaque: always a fresh row, never a lookup hit.
            let home = self.home_for(block, index, &dest);
            let idx = self.add_row(None, home.clone());
            self.environment.insert(dest, idx);
            let mut instr = instr.clone();
            if let Some(args) = instr.args_mut() {
                *args = canonical_args;
            }
            instr.set_dest(home);
            return instr;
        };

        if let Some((idx, variable)) = self.lookup(&value) {
            debug!("lvn: {dest} reuses row {idx}");
            self.environment.insert(dest.clone(), idx);
            return match &value {
                CanonValue::Const(literal) => Instruction::Constant {
                    op: ConstOps::Const,
                    dest,
                    const_type: typ,
                    value: *literal,
                },
                CanonValue::Op(ValueOps::Id, rows) => Instruction::Value {
                    op: ValueOps::Id,
                    dest,
                    op_type: typ,
                    args: vec![self.table[rows[0]].variable.clone()],
                    funcs: Vec::new(),
                    labels: Vec::new(),
                },
                CanonValue::Op(..) => Instruction::Value {
                    op: ValueOps::Id,
                    dest,
                    op_type: typ,
                    args: vec![variable],
                    funcs: Vec::new(),
                    labels: Vec::new(),
                },
            };
        }

        let home = self.home_for(block, index, &dest);
        let idx = self.add_row(Some(value.clone()), home.clone());
        self.environment.insert(dest, idx);
        match &value {
            CanonValue::Const(literal) => Instruction::Constant {
                op: ConstOps::Const,
                dest: home,
                const_type: typ,
                value: *literal,
            },
            CanonValue::Op(ValueOps::Id, rows) => Instruction::Value {
                op: ValueOps::Id,
                dest: home,
                op_type: typ,
                args: vec![self.table[rows[0]].variable.clone()],
                funcs: Vec::new(),
                labels: Vec::new(),
            },
            CanonValue::Op(..) => {
                let mut instr = instr.clone();
                if let Some(args) = instr.args_mut() {
                    *args = canonical_args;
                }
                instr.set_dest(home);
                instr
            }
        }
    }

    /// Number one block, emitting the rewritten instruction stream.
    pub fn reconstruct_block(&mut self, block: &[Code]) -> Vec<Code> {
        block
            .iter()
            .enumerate()
            .map(|(index, code)| match code {
                Code::Label { .. } => code.clone(),
                Code::Instruction(instr) => {
                    Code::Instruction(self.process(instr, block, index))
                }
            })
            .collect()
    }
}

/// Apply value numbering to every block of a function.
pub fn lvn_function(function: &mut Function) {
    let mut instrs = Vec::new();
    for block in form_blocks(function) {
        let mut lvn = Lvn::new();
        instrs.extend(lvn.reconstruct_block(&block));
    }
    function.instrs = instrs;
}
