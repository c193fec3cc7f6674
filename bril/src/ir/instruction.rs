use crate::ir::{Literal, Type};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

//-------------------------------------------------------------------------
// Instruction stream elements
//-------------------------------------------------------------------------

/// One element of a function's `instrs` array: either a label marker or an
/// actual instruction. Labels delimit basic blocks and never execute.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
#[serde(untagged)]
pub enum Code {
    Label { label: String },
    Instruction(Instruction),
}

impl Code {
    pub fn as_instruction(&self) -> Option<&Instruction> {
        match self {
            Code::Instruction(instr) => Some(instr),
            Code::Label { .. } => None,
        }
    }

    pub fn as_label(&self) -> Option<&str> {
        match self {
            Code::Label { label } => Some(label),
            Code::Instruction(_) => None,
        }
    }
}

/// An executable instruction. The `op` field is the discriminator: `const`
/// instructions carry a literal, value instructions produce a destination,
/// effect instructions do not.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
#[serde(untagged)]
pub enum Instruction {
    Constant {
        op: ConstOps,
        dest: String,
        #[serde(rename = "type")]
        const_type: Type,
        value: Literal,
    },
    Value {
        op: ValueOps,
        dest: String,
        #[serde(rename = "type")]
        op_type: Type,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        funcs: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        labels: Vec<String>,
    },
    Effect {
        op: EffectOps,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        funcs: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        labels: Vec<String>,
    },
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy)]
pub enum ConstOps {
    #[serde(rename = "const")]
    Const,
}

/// Operations that produce a destination.
#[derive(Serialize, Deserialize, PartialEq, Eq, Hash, Debug, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ValueOps {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Lt,
    Gt,
    Le,
    Ge,
    Not,
    And,
    Or,
    Id,
    Phi,
    Call,
}

/// Operations with no destination.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum EffectOps {
    Jmp,
    Br,
    Ret,
    Print,
    Nop,
    Store,
    Call,
}

impl Instruction {
    pub fn dest(&self) -> Option<&str> {
        match self {
            Instruction::Constant { dest, .. } | Instruction::Value { dest, .. } => Some(dest),
            Instruction::Effect { .. } => None,
        }
    }

    pub fn set_dest(&mut self, new_dest: String) {
        match self {
            Instruction::Constant { dest, .. } | Instruction::Value { dest, .. } => {
                *dest = new_dest;
            }
            Instruction::Effect { .. } => {}
        }
    }

    pub fn args(&self) -> &[String] {
        match self {
            Instruction::Value { args, .. } | Instruction::Effect { args, .. } => args,
            Instruction::Constant { .. } => &[],
        }
    }

    pub fn args_mut(&mut self) -> Option<&mut Vec<String>> {
        match self {
            Instruction::Value { args, .. } | Instruction::Effect { args, .. } => Some(args),
            Instruction::Constant { .. } => None,
        }
    }

    pub fn labels(&self) -> &[String] {
        match self {
            Instruction::Value { labels, .. } | Instruction::Effect { labels, .. } => labels,
            Instruction::Constant { .. } => &[],
        }
    }

    pub fn typ(&self) -> Option<&Type> {
        match self {
            Instruction::Constant { const_type, .. } => Some(const_type),
            Instruction::Value { op_type, .. } => Some(op_type),
            Instruction::Effect { .. } => None,
        }
    }

    /// Terminators end a basic block: `jmp`, `br` and `ret`.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Instruction::Effect { op: EffectOps::Jmp | EffectOps::Br | EffectOps::Ret, .. }
        )
    }

    pub fn is_phi(&self) -> bool {
        matches!(self, Instruction::Value { op: ValueOps::Phi, .. })
    }

    /// An instruction is pure when deleting it cannot change observable
    /// behaviour. Calls keep their side effects even when the result has a
    /// destination.
    pub fn is_pure(&self) -> bool {
        match self {
            Instruction::Constant { .. } => true,
            Instruction::Value { op, .. } => *op != ValueOps::Call,
            Instruction::Effect { .. } => false,
        }
    }
}

//-------------------------------------------------------------------------
// Textual form
//-------------------------------------------------------------------------

impl Display for ValueOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueOps::Add => "add",
            ValueOps::Sub => "sub",
            ValueOps::Mul => "mul",
            ValueOps::Div => "div",
            ValueOps::Eq => "eq",
            ValueOps::Lt => "lt",
            ValueOps::Gt => "gt",
            ValueOps::Le => "le",
            ValueOps::Ge => "ge",
            ValueOps::Not => "not",
            ValueOps::And => "and",
            ValueOps::Or => "or",
            ValueOps::Id => "id",
            ValueOps::Phi => "phi",
            ValueOps::Call => "call",
        };
        write!(f, "{name}")
    }
}

impl Display for EffectOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EffectOps::Jmp => "jmp",
            EffectOps::Br => "br",
            EffectOps::Ret => "ret",
            EffectOps::Print => "print",
            EffectOps::Nop => "nop",
            EffectOps::Store => "store",
            EffectOps::Call => "call",
        };
        write!(f, "{name}")
    }
}

fn write_operands(
    f: &mut fmt::Formatter<'_>,
    args: &[String],
    funcs: &[String],
    labels: &[String],
) -> fmt::Result {
    for func in funcs {
        write!(f, " @{func}")?;
    }
    for arg in args {
        write!(f, " {arg}")?;
    }
    for label in labels {
        write!(f, " .{label}")?;
    }
    Ok(())
}

impl Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Constant { dest, const_type, value, .. } => {
                write!(f, "{dest}: {const_type} = const {value};")
            }
            Instruction::Value { op, dest, op_type, args, funcs, labels } => {
                write!(f, "{dest}: {op_type} = {op}")?;
                write_operands(f, args, funcs, labels)?;
                write!(f, ";")
            }
            Instruction::Effect { op, args, funcs, labels } => {
                write!(f, "{op}")?;
                write_operands(f, args, funcs, labels)?;
                write!(f, ";")
            }
        }
    }
}

impl Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Code::Label { label } => write!(f, ".{label}:"),
            Code::Instruction(instr) => write!(f, "{instr}"),
        }
    }
}
