//! The Bril program model.

pub mod instruction;
pub mod literals;
pub mod program;
pub mod types;

pub use instruction::*;
pub use literals::*;
pub use program::*;
pub use types::*;
