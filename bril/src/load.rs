//! The JSON edge: reading programs from and writing them back to the wire
//! schema described in the Bril documentation.

use crate::error::BrilError;
use crate::ir::Program;
use std::io::{Read, Write};

/// Parse a program from any reader.
pub fn load_program_from_read<R: Read>(reader: R) -> Result<Program, BrilError> {
    let program = serde_json::from_reader(reader)?;
    Ok(program)
}

/// Parse a program from standard input.
pub fn load_program() -> Result<Program, BrilError> {
    load_program_from_read(std::io::stdin().lock())
}

/// Pretty-print a program as JSON with two-space indentation.
pub fn output_program_to_write<W: Write>(program: &Program, mut writer: W) -> Result<(), BrilError> {
    serde_json::to_writer_pretty(&mut writer, program)?;
    writeln!(writer)?;
    Ok(())
}

/// Pretty-print a program to standard output.
pub fn output_program(program: &Program) -> Result<(), BrilError> {
    output_program_to_write(program, std::io::stdout().lock())
}
