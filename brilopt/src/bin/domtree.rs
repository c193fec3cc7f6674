//! Dump dominator sets, immediate dominators, dominator-tree children and
//! dominance frontiers for every block.

use brilopt::{Cfg, Dominators};
use clap::{Parser, crate_version};
use color_eyre::eyre::Result;
use itertools::Itertools;

#[derive(Parser, Debug)]
#[command(author,
          version = crate_version!(),
          term_width = 80,
          about = "Dominator analysis for Bril programs.",
          long_about = None)]
struct Arguments {
    /// Verbosity
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::ErrorLevel>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Arguments::parse();

    env_logger::Builder::new()
        .format_timestamp(None)
        .format_target(false)
        .filter_level(args.verbose.log_level_filter())
        .init();

    let program = bril::load_program()?;
    for function in &program.functions {
        let cfg = Cfg::new(function)?;
        let dominators = Dominators::new(&cfg);

        println!("@{}:", function.name);
        for label in cfg.labels() {
            println!("  .{label}:");
            println!("    dom:      {{{}}}", dominators.dom[label].iter().join(", "));
            match &dominators.idom[label] {
                Some(parent) => println!("    idom:     {parent}"),
                None => println!("    idom:     (none)"),
            }
            println!("    children: {{{}}}", dominators.tree[label].iter().join(", "));
            println!("    frontier: {{{}}}", dominators.frontier[label].iter().join(", "));
        }
    }
    Ok(())
}
