//! Concrete data-flow analyses.

pub mod const_prop;
pub mod live_vars;
pub mod reaching_defs;

pub use const_prop::{ConstEnv, ConstProp, ConstValue};
pub use live_vars::LiveVars;
pub use reaching_defs::{Definition, ReachingDefs};
