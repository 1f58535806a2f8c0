// Copyright 2025-2026 Neil Henderson
//
//! The Mica compiler backend library.
//!
//! The library consumes the AST produced by the (external) Mica parser and runs two
//! tree-walking passes over it: semantic analysis (the [sema] module) and LLVM-style
//! IR generation (the [ir] module). The driver contract is:
//!
//! 1. [`sema::analyze`] validates the program, failing with the first [`diagnostics::SemanticError`].
//! 2. [`ir::generate`] lowers a validated program to IR text.
//!
//! [`compile`] chains the two.

#![doc(html_no_source)]

pub mod ast;
pub mod core;
pub mod diagnostics;
pub mod ir;
pub mod sema;

use ast::Program;
use diagnostics::SemanticError;

/// Analyzes the program and, if it is semantically valid, lowers it to IR text.
pub fn compile(program: &Program) -> Result<String, SemanticError> {
    sema::analyze(program)?;
    Ok(ir::generate(program))
}
