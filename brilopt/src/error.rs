use thiserror::Error;

/// Malformed-IR conditions detected while building per-function structures.
/// All of these abort the offending function.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptError {
    #[error("function @{function}: terminator references undefined label .{label}")]
    UnknownLabel { function: String, label: String },

    #[error("function @{function} has no instructions")]
    EmptyFunction { function: String },

    #[error("function @{function}: block .{label} is empty")]
    EmptyBlock { function: String, label: String },
}
