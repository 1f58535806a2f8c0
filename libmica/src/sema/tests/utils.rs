// Copyright 2025 Neil Henderson, Blue Tarp Media.

use crate::ast::{FuncDecl, Program, Statement, Type};
use crate::diagnostics::SemanticError;
use crate::sema;

/// Wraps the statements in a `void main()` and returns the one-function program.
pub fn main_program(body: Vec<Statement>) -> Program {
    Program(vec![FuncDecl::new(1, "main", Type::Void, Vec::new(), body)])
}

/// Builds a program from the given functions plus an empty `void main()`.
pub fn program_with_main(mut funcs: Vec<FuncDecl>) -> Program {
    funcs.push(FuncDecl::new(1, "main", Type::Void, Vec::new(), Vec::new()));
    Program(funcs)
}

pub fn verify_ok(program: &Program) {
    let result = sema::analyze(program);
    assert!(result.is_ok(), "expected a valid program, got {:?}", result.unwrap_err());
}

pub fn verify_error(program: &Program, expected: SemanticError) {
    let result = sema::analyze(program);
    assert_eq!(result, Err(expected));
}
