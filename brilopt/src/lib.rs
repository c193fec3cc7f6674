//! Function-scoped analyses and transformations over the Bril IR.
//!
//! This crate is the middle-end kernel:
//!
//! - **block**: partition an instruction stream into maximal basic blocks
//! - **cfg**: label-keyed control-flow graph with stable orderings
//! - **dfa**: generic worklist solver plus reaching definitions, constant
//!   propagation and live variables
//! - **dom**: dominator sets, dominator tree and dominance frontier
//! - **ssa**: dominance-frontier φ-insertion and variable renaming
//! - **lvn**: local value numbering with folding and copy propagation
//! - **tdce**: trivial dead-code elimination
//! - **graphviz**: dot rendering of the CFG
//!
//! Every function is analysed independently; all per-function state is
//! created on entry and dropped when the next function starts.

pub mod block;
pub mod cfg;
pub mod dfa;
pub mod dom;
pub mod error;
pub mod eval;
pub mod graphviz;
pub mod lvn;
pub mod ssa;
pub mod tdce;

pub use block::{BlockMap, form_blocks};
pub use cfg::Cfg;
pub use dfa::analyses::{ConstProp, LiveVars, ReachingDefs};
pub use dfa::lattice::{Lattice, SetLattice};
pub use dfa::solver::{Analysis, DataflowResult, Direction, WorklistSolver};
pub use dom::Dominators;
pub use error::OptError;
pub use graphviz::render_cfg;
pub use lvn::lvn_function;
pub use ssa::to_ssa;
pub use tdce::tdce_function;
