// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `ir` module is responsible for lowering a validated AST into textual
//! LLVM-style IR.
//!
//! The output is a single self-contained module string: runtime declarations and
//! wrapper definitions first, then one `define` per source function. Lowering is a
//! second scope-aware walk over the same tree the analyzer validated; the generator
//! performs no checking of its own and treats any inconsistency it meets as an ICE.

mod code_buffer;
mod generator;


pub use code_buffer::{CodeBuffer, InternedString};
pub use generator::CodeGenerator;

use crate::ast::Program;

/// Lowers a semantically valid program to IR text.
pub fn generate(program: &Program) -> String {
    CodeGenerator::new().generate(program)
}
