//! Data-flow analysis framework.
//!
//! - **lattice**: the fact domain abstraction and the power-set instance
//! - **solver**: generic forward/backward worklist engine
//! - **analyses**: reaching definitions, constant propagation, live
//!   variables

pub mod analyses;
pub mod lattice;
pub mod solver;

pub use analyses::{ConstProp, LiveVars, ReachingDefs};
pub use lattice::{Lattice, SetLattice};
pub use solver::{Analysis, DataflowResult, Direction, WorklistSolver};
