//! Graphviz rendering of a function's CFG.

use crate::cfg::Cfg;
use itertools::Itertools;

/// Emit `digraph <function_name> { <vertex>; … <v> -> <w>; … }`.
pub fn render_cfg(cfg: &Cfg) -> String {
    let vertices = cfg.successors.keys().map(|label| format!("  {label};")).join("\n");
    let edges = cfg
        .successors
        .iter()
        .flat_map(|(label, succs)| {
            succs.iter().map(move |succ| format!("  {label} -> {succ};"))
        })
        .join("\n");
    format!("digraph {} {{\n{vertices}\n{edges}\n}}", cfg.function_name)
}
