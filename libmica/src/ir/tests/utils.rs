// Copyright 2025 Neil Henderson, Blue Tarp Media.

use crate::ast::{FuncDecl, Program, Statement, Type};
use crate::ir;
use crate::sema;

/// Wraps the statements in a `void main()` and returns the one-function program.
pub fn main_program(body: Vec<Statement>) -> Program {
    Program(vec![FuncDecl::new(1, "main", Type::Void, Vec::new(), body)])
}

/// Analyzes and lowers the program, panicking if analysis rejects it. Generator tests
/// only feed it valid programs.
pub fn lower(program: &Program) -> String {
    sema::analyze(program).expect("test program must be semantically valid");
    ir::generate(program)
}

/// Counts non-overlapping occurrences of `needle` in `haystack`.
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}
