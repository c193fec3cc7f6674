use crate::ir::{Code, Type};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

//-------------------------------------------------------------------------
// Programs and functions
//-------------------------------------------------------------------------

/// A whole Bril program: an ordered list of functions.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct Program {
    pub functions: Vec<Function>,
}

/// A single function: name, ordered parameters, optional return type and
/// the flat instruction stream.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct Function {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Argument>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<Type>,
    pub instrs: Vec<Code>,
}

/// A formal parameter.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct Argument {
    pub name: String,
    #[serde(rename = "type")]
    pub typ: Type,
}

impl Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.typ)
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)?;
        if !self.args.is_empty() {
            let args = self
                .args
                .iter()
                .map(|arg| arg.to_string())
                .collect::<Vec<String>>()
                .join(", ");
            write!(f, "({args})")?;
        }
        if let Some(return_type) = &self.return_type {
            write!(f, ": {return_type}")?;
        }
        writeln!(f, " {{")?;
        for code in &self.instrs {
            match code {
                Code::Label { .. } => writeln!(f, "{code}")?,
                Code::Instruction(_) => writeln!(f, "  {code}")?,
            }
        }
        write!(f, "}}")
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for function in &self.functions {
            writeln!(f, "{function}")?;
        }
        Ok(())
    }
}
