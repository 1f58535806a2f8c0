// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! Whole programs that must compile, and the structural properties their emitted
//! modules must satisfy.

use libmica::ast::{BinOp, Exp, Formal, FuncDecl, Program, RelOp, Statement, StatementKind, Type};

use crate::utils::{assert_well_formed, compile_valid, main_program};

#[test]
fn hello_world() {
    let program = main_program(vec![Statement::call(2, "print", vec![Exp::string(2, "Hello, world!")])]);
    let text = compile_valid(&program);

    assert!(text.contains("@.str0 = constant [14 x i8] c\"Hello, world!\\00\""));
    assert!(text.contains("define void @main() {"));
    assert!(text.contains("call void @print(i8* %t0)"));
    assert_well_formed(&text);
}

#[test]
fn countdown_loop() {
    // void main() { int n = 5; while (n > 0) { printi(n); n = n - 1; } }
    let program = main_program(vec![
        Statement::var_decl(2, "n", Type::Int, Some(Exp::num(2, 5))),
        Statement::while_stmt(
            3,
            Exp::rel_op(3, RelOp::Gt, Exp::id(3, "n"), Exp::num(3, 0)),
            Statement::block(
                3,
                vec![
                    Statement::call(4, "printi", vec![Exp::id(4, "n")]),
                    Statement::assign(5, "n", Exp::bin_op(5, BinOp::Sub, Exp::id(5, "n"), Exp::num(5, 1))),
                ],
            ),
        ),
    ]);
    let text = compile_valid(&program);

    assert!(text.contains("while_0.cond:"));
    assert!(text.contains("while_0.body:"));
    assert!(text.contains("while_0.end:"));
    assert!(text.contains("icmp sgt i32"));
    assert!(text.contains("sub i32"));
    assert_well_formed(&text);
}

#[test]
fn recursive_factorial() {
    // int fact(int n) { if (n <= 1) { return 1; } return n * fact(n - 1); }
    let program = Program(vec![
        FuncDecl::new(
            1,
            "fact",
            Type::Int,
            vec![Formal::new(1, "n", Type::Int)],
            vec![
                Statement::if_stmt(
                    2,
                    Exp::rel_op(2, RelOp::Le, Exp::id(2, "n"), Exp::num(2, 1)),
                    Statement::block(2, vec![Statement::ret(3, Some(Exp::num(3, 1)))]),
                    None,
                ),
                Statement::ret(
                    5,
                    Some(Exp::bin_op(
                        5,
                        BinOp::Mul,
                        Exp::id(5, "n"),
                        Exp::call(5, "fact", vec![Exp::bin_op(5, BinOp::Sub, Exp::id(5, "n"), Exp::num(5, 1))]),
                    )),
                ),
            ],
        ),
        FuncDecl::new(
            8,
            "main",
            Type::Void,
            Vec::new(),
            vec![Statement::call(9, "printi", vec![Exp::call(9, "fact", vec![Exp::num(9, 5)])])],
        ),
    ]);
    let text = compile_valid(&program);

    assert!(text.contains("define i32 @fact(i32) {"));
    assert!(text.contains("= call i32 @fact(i32 %t"));
    assert!(text.contains("call i32 @fact(i32 5)"));
    assert_well_formed(&text);
}

#[test]
fn byte_arithmetic_wraps_around() {
    // byte b = 250b + 10b; printi(b); -- the stored value is masked to 4.
    let program = main_program(vec![
        Statement::var_decl(
            2,
            "b",
            Type::Byte,
            Some(Exp::bin_op(2, BinOp::Add, Exp::num_b(2, 250), Exp::num_b(2, 10))),
        ),
        Statement::call(3, "printi", vec![Exp::id(3, "b")]),
    ]);
    let text = compile_valid(&program);

    assert!(text.contains("add i32 250, 10"));
    assert!(text.contains(", 255"));
    assert_well_formed(&text);
}

#[test]
fn division_by_zero_guard_keeps_the_module_well_formed() {
    let program = main_program(vec![
        Statement::var_decl(2, "x", Type::Int, Some(Exp::num(2, 7))),
        Statement::var_decl(3, "y", Type::Int, Some(Exp::bin_op(3, BinOp::Div, Exp::id(3, "x"), Exp::num(3, 0)))),
        Statement::call(4, "printi", vec![Exp::id(4, "y")]),
    ]);
    let text = compile_valid(&program);

    assert!(!text.contains("sdiv"));
    assert!(text.contains("c\"Error division by zero\\00\""));
    assert!(text.contains("call void @exit(i32 0)"));
    assert_well_formed(&text);
}

#[test]
fn early_returns_in_both_branches() {
    // int sign(int n) { if (n < 0) { return 1; } else { return 0; } }
    let program = Program(vec![
        FuncDecl::new(
            1,
            "sign",
            Type::Int,
            vec![Formal::new(1, "n", Type::Int)],
            vec![Statement::if_stmt(
                2,
                Exp::rel_op(2, RelOp::Lt, Exp::id(2, "n"), Exp::num(2, 0)),
                Statement::block(2, vec![Statement::ret(3, Some(Exp::num(3, 1)))]),
                Some(Statement::block(4, vec![Statement::ret(5, Some(Exp::num(5, 0)))])),
            )],
        ),
        FuncDecl::new(8, "main", Type::Void, Vec::new(), Vec::new()),
    ]);

    // Both arms terminate, so the merge block is empty until the synthesized return.
    assert_well_formed(&compile_valid(&program));
}

#[test]
fn break_and_continue_in_a_search_loop() {
    // while (true) { n = n + 1; if (n < 10) { continue; } break; }
    let program = main_program(vec![
        Statement::var_decl(2, "n", Type::Int, Some(Exp::num(2, 0))),
        Statement::while_stmt(
            3,
            Exp::boolean(3, true),
            Statement::block(
                3,
                vec![
                    Statement::assign(4, "n", Exp::bin_op(4, BinOp::Add, Exp::id(4, "n"), Exp::num(4, 1))),
                    Statement::if_stmt(
                        5,
                        Exp::rel_op(5, RelOp::Lt, Exp::id(5, "n"), Exp::num(5, 10)),
                        Statement::block(5, vec![Statement::new(6, StatementKind::Continue)]),
                        None,
                    ),
                    Statement::new(8, StatementKind::Break),
                ],
            ),
        ),
        Statement::call(10, "printi", vec![Exp::id(10, "n")]),
    ]);
    let text = compile_valid(&program);

    assert!(text.contains("br label %while_0.cond"));
    assert!(text.contains("br label %while_0.end"));
    assert_well_formed(&text);
}

#[test]
fn short_circuit_logic_in_a_condition() {
    // if (a > 0 && b > 0) { print("both"); }
    let program = main_program(vec![
        Statement::var_decl(2, "a", Type::Int, Some(Exp::num(2, 1))),
        Statement::var_decl(3, "b", Type::Int, Some(Exp::num(3, 2))),
        Statement::if_stmt(
            4,
            Exp::and(
                4,
                Exp::rel_op(4, RelOp::Gt, Exp::id(4, "a"), Exp::num(4, 0)),
                Exp::rel_op(4, RelOp::Gt, Exp::id(4, "b"), Exp::num(4, 0)),
            ),
            Statement::call(5, "print", vec![Exp::string(5, "both")]),
            None,
        ),
    ]);
    let text = compile_valid(&program);

    assert!(text.contains(".lhs_slot = alloca i1"));
    assert!(text.contains("and i1"));
    assert_well_formed(&text);
}

#[test]
fn shadowed_variables_resolve_to_their_own_slots() {
    let program = main_program(vec![
        Statement::var_decl(2, "x", Type::Int, Some(Exp::num(2, 1))),
        Statement::block(
            3,
            vec![
                Statement::var_decl(4, "x", Type::Int, Some(Exp::num(4, 2))),
                Statement::call(5, "printi", vec![Exp::id(5, "x")]),
            ],
        ),
        Statement::call(7, "printi", vec![Exp::id(7, "x")]),
    ]);
    let text = compile_valid(&program);

    // Two distinct slots, each read once.
    assert!(text.contains("store i32 1, i32* %t0"));
    assert!(text.contains("store i32 2, i32* %t1"));
    assert!(text.contains("load i32, i32* %t1"));
    assert!(text.contains("load i32, i32* %t0"));
    assert_well_formed(&text);
}

#[test]
fn compilation_is_deterministic() {
    let build = || {
        main_program(vec![
            Statement::call(2, "print", vec![Exp::string(2, "a")]),
            Statement::call(3, "print", vec![Exp::string(3, "b")]),
            Statement::call(4, "print", vec![Exp::string(4, "a")]),
        ])
    };

    assert_eq!(compile_valid(&build()), compile_valid(&build()));
}
