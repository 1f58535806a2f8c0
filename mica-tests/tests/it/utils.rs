// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! Shared helpers for building test programs and inspecting compiler output.

use libmica::ast::{FuncDecl, Program, Statement, Type};
use libmica::diagnostics::SemanticError;

/// Wraps the statements in a `void main()` and returns the one-function program.
pub fn main_program(body: Vec<Statement>) -> Program {
    Program(vec![FuncDecl::new(1, "main", Type::Void, Vec::new(), body)])
}

/// Compiles the program and returns the module text, panicking on a diagnostic.
pub fn compile_valid(program: &Program) -> String {
    match libmica::compile(program) {
        Ok(text) => text,
        Err(error) => panic!("expected a valid program, got: {error}"),
    }
}

/// Compiles the program and returns the diagnostic, panicking if it compiles.
pub fn compile_invalid(program: &Program) -> SemanticError {
    match libmica::compile(program) {
        Ok(_) => panic!("expected a diagnostic, but the program compiled"),
        Err(error) => error,
    }
}

/// Asserts the structural well-formedness rules every emitted module must satisfy:
/// inside a function body, a terminator is the last instruction of its block, and
/// every block ends in one.
pub fn assert_well_formed(text: &str) {
    let mut inside_function = false;
    let mut previous: Option<&str> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("define ") {
            inside_function = true;
            previous = None;
            continue;
        }
        if !inside_function || trimmed.is_empty() {
            continue;
        }

        if let Some(previous) = previous {
            if is_terminator(previous) {
                assert!(
                    trimmed == "}" || trimmed.ends_with(':'),
                    "instruction after terminator {previous:?}: {trimmed:?}\n{text}"
                );
            }
            if trimmed == "}" {
                assert!(is_terminator(previous), "block falls off the end before {trimmed:?}: {previous:?}\n{text}");
            }
        }

        if trimmed == "}" {
            inside_function = false;
        }
        previous = Some(trimmed);
    }
}

fn is_terminator(instruction: &str) -> bool {
    instruction.starts_with("ret ") || instruction == "ret" || instruction.starts_with("br ")
}
