//! Local value numbering: read a program, number every block, print the
//! transformed program.

use brilopt::lvn_function;
use clap::{Parser, crate_version};
use color_eyre::eyre::Result;

#[derive(Parser, Debug)]
#[command(author,
          version = crate_version!(),
          term_width = 80,
          about = "Local value numbering for Bril programs.",
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

    let mut program = bril::load_program()?;
    for function in &mut program.functions {
        lvn_function(function);
    }
    bril::output_program(&program)?;
    Ok(())
}
