//! Dump live-variable facts for every block of every function.

use brilopt::{Cfg, LiveVars, WorklistSolver};
use clap::{Parser, crate_version};
use color_eyre::eyre::Result;

#[derive(Parser, Debug)]
#[command(author,
          version = crate_version!(),
          term_width = 80,
          about = "Live-variables analysis for Bril programs.",
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
        let result = WorklistSolver::new(LiveVars).solve(&cfg, function);

        println!("@{}:", function.name);
        for label in cfg.labels() {
            println!("  .{label}:");
            println!("    in:  {}", result.input[label]);
            println!("    out: {}", result.output[label]);
        }
    }
    Ok(())
}
