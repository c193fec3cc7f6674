//! Constant propagation (forward).
//!
//! A fact maps variables to either a known literal or `?` (not a known
//! constant). Keys absent from a fact mean "no opinion": the merge keeps a
//! binding present in only some predecessors, and only a disagreement
//! forces `?`. A read of a missing key behaves like `?`.

use crate::dfa::lattice::Lattice;
use crate::dfa::solver::{Analysis, Direction};
use crate::eval::eval_value_op;
use bril::{Instruction, Literal};
use itertools::Itertools;
use std::collections::BTreeMap;
use std::fmt::{self, Display};

/// Abstract value of one variable.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ConstValue {
    Known(Literal),
    Unknown,
}

impl Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Known(literal) => write!(f, "{literal}"),
            ConstValue::Unknown => write!(f, "?"),
        }
    }
}

/// Variable-to-value environment, the analysis fact.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ConstEnv {
    pub bindings: BTreeMap<String, ConstValue>,
}

impl ConstEnv {
    pub fn get(&self, var: &str) -> Option<&ConstValue> {
        self.bindings.get(var)
    }

    fn known(&self, var: &str) -> Option<Literal> {
        match self.bindings.get(var) {
            Some(ConstValue::Known(literal)) => Some(*literal),
            _ => None,
        }
    }
}

impl Lattice for ConstEnv {
    fn bottom() -> Self {
        ConstEnv::default()
    }

    fn join(&self, other: &Self) -> Self {
        let mut bindings = self.bindings.clone();
        for (var, value) in &other.bindings {
            match bindings.get(var) {
                None => {
                    bindings.insert(var.clone(), *value);
                }
                Some(existing) if existing != value => {
                    bindings.insert(var.clone(), ConstValue::Unknown);
                }
                Some(_) => {}
            }
        }
        ConstEnv { bindings }
    }
}

impl Display for ConstEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.bindings.iter().map(|(var, value)| format!("{var}: {value}")).join(", ")
        )
    }
}

pub struct ConstProp;

impl Analysis for ConstProp {
    type Fact = ConstEnv;

    fn direction(&self) -> Direction {
        Direction::Forward
    }

    fn transfer(&self, block: &[Instruction], fact: &Self::Fact, _label: &str) -> Self::Fact {
        let mut env = fact.clone();
        for instr in block {
            let Some(dest) = instr.dest() else { continue };
            let value = match instr {
                Instruction::Constant { value, .. } => ConstValue::Known(*value),
                Instruction::Value { op, args, .. } => {
                    let literals: Option<Vec<Literal>> =
                        args.iter().map(|arg| env.known(arg)).collect();
                    match literals.and_then(|literals| eval_value_op(*op, &literals)) {
                        Some(literal) => ConstValue::Known(literal),
                        None => ConstValue::Unknown,
                    }
                }
                Instruction::Effect { .. } => unreachable!("effects have no destination"),
            };
            env.bindings.insert(dest.to_string(), value);
        }
        env
    }
}
