use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

//-------------------------------------------------------------------------
// Value types
//-------------------------------------------------------------------------

/// Type annotation of a destination or parameter.
///
/// Only `int` and `bool` carry semantics in the analyses; any other type
/// annotation is kept as an opaque JSON value and survives a round-trip
/// unchanged.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub enum Type {
    #[serde(rename = "int")]
    Int,
    #[serde(rename = "bool")]
    Bool,
    #[serde(untagged)]
    Opaque(serde_json::Value),
}

impl Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Bool => write!(f, "bool"),
            Type::Opaque(value) => write!(f, "{value}"),
        }
    }
}
