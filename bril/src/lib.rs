//! Bril intermediate representation: a JSON-serialised three-address IR.
//!
//! This crate provides the typed program model (programs, functions,
//! instructions, labels) together with the JSON edge used by every tool:
//! programs are read from a JSON document with a `functions` array and
//! written back in the same schema.

pub mod error;
pub mod ir;
pub mod load;

pub use error::BrilError;
pub use ir::*;
pub use load::{load_program, load_program_from_read, output_program, output_program_to_write};
