// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! Whole programs that must be rejected with a diagnostic, and the exact wording the
//! driver will print for them.

use libmica::ast::{BinOp, Exp, Formal, FuncDecl, Program, Statement, StatementKind, Type};
use libmica::diagnostics::SemanticError;

use crate::utils::{compile_invalid, main_program};

#[test]
fn program_without_main() {
    let program = Program(vec![FuncDecl::new(
        1,
        "start",
        Type::Void,
        Vec::new(),
        vec![Statement::call(2, "print", vec![Exp::string(2, "hello")])],
    )]);

    let error = compile_invalid(&program);
    assert_eq!(error, SemanticError::MissingMain);
    assert_eq!(error.to_string(), "program is missing a 'void main()' function");
    assert_eq!(error.line(), None);
}

#[test]
fn use_of_an_undeclared_variable() {
    let program = main_program(vec![Statement::call(3, "printi", vec![Exp::id(3, "count")])]);

    let error = compile_invalid(&program);
    assert_eq!(error, SemanticError::UndefinedVariable { line: 3, name: "count".to_string() });
    assert_eq!(error.to_string(), "line 3: variable 'count' is not defined");
    assert_eq!(error.line(), Some(3));
}

#[test]
fn call_to_an_undeclared_function() {
    let program = main_program(vec![Statement::call(2, "frobnicate", Vec::new())]);

    let error = compile_invalid(&program);
    assert_eq!(error.to_string(), "line 2: function 'frobnicate' is not declared");
}

#[test]
fn variable_declared_twice_in_one_scope() {
    let program = main_program(vec![
        Statement::var_decl(2, "total", Type::Int, Some(Exp::num(2, 0))),
        Statement::var_decl(3, "total", Type::Int, Some(Exp::num(3, 1))),
    ]);

    let error = compile_invalid(&program);
    assert_eq!(error.to_string(), "line 3: symbol 'total' is already defined");
}

#[test]
fn assignment_with_mismatched_types() {
    let program = main_program(vec![
        Statement::var_decl(2, "flag", Type::Bool, Some(Exp::boolean(2, false))),
        Statement::assign(3, "flag", Exp::num(3, 1)),
    ]);

    let error = compile_invalid(&program);
    assert_eq!(error.to_string(), "line 3: type mismatch");
}

#[test]
fn byte_literal_out_of_range() {
    let program = main_program(vec![Statement::var_decl(2, "b", Type::Byte, Some(Exp::num_b(2, 300)))]);

    let error = compile_invalid(&program);
    assert_eq!(error, SemanticError::ByteValueOutOfRange { line: 2, value: 300 });
    assert_eq!(error.to_string(), "line 2: byte value 300 out of range");
}

#[test]
fn call_with_the_wrong_prototype() {
    let program = Program(vec![
        FuncDecl::new(
            1,
            "describe",
            Type::Void,
            vec![Formal::new(1, "label", Type::String), Formal::new(1, "value", Type::Int)],
            Vec::new(),
        ),
        FuncDecl::new(
            5,
            "main",
            Type::Void,
            Vec::new(),
            vec![Statement::call(6, "describe", vec![Exp::num(6, 1), Exp::num(6, 2)])],
        ),
    ]);

    let error = compile_invalid(&program);
    assert_eq!(error.to_string(), "line 6: prototype mismatch, function 'describe' expects parameters (string, int)");
}

#[test]
fn break_outside_a_loop() {
    let program = main_program(vec![Statement::new(2, StatementKind::Break)]);

    let error = compile_invalid(&program);
    assert_eq!(error.to_string(), "line 2: unexpected break statement");
}

#[test]
fn function_name_used_as_a_value() {
    let program = Program(vec![
        FuncDecl::new(1, "helper", Type::Void, Vec::new(), Vec::new()),
        FuncDecl::new(
            4,
            "main",
            Type::Void,
            Vec::new(),
            vec![Statement::var_decl(5, "x", Type::Int, Some(Exp::id(5, "helper")))],
        ),
    ]);

    let error = compile_invalid(&program);
    assert_eq!(error.to_string(), "line 5: 'helper' is a function");
}

#[test]
fn the_first_error_wins() {
    // Both statements are ill-formed; analysis stops at the first.
    let program = main_program(vec![
        Statement::assign(2, "missing", Exp::num(2, 1)),
        Statement::var_decl(3, "b", Type::Byte, Some(Exp::num_b(3, 999))),
    ]);

    let error = compile_invalid(&program);
    assert_eq!(error.line(), Some(2));
}

#[test]
fn rejected_programs_produce_no_output() {
    // compile returns Result, so a diagnostic and a module are mutually exclusive; a
    // narrowing assignment must not reach the generator.
    let program = main_program(vec![
        Statement::var_decl(2, "b", Type::Byte, Some(Exp::num_b(2, 1))),
        Statement::assign(3, "b", Exp::bin_op(3, BinOp::Add, Exp::id(3, "b"), Exp::num(3, 1))),
    ]);

    assert!(libmica::compile(&program).is_err());
}
