// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `ast` module defines the Mica AST that the parser produces and that both
//! compiler passes consume.
//!
//! The tree is immutable once built. Each node carries the 1-based source line it came
//! from and the raw source text it covers; both exist for diagnostics only. Neither
//! pass annotates the tree: the analyzer's resolved types and the generator's register
//! bindings are return values of each pass's own recursion, so nothing leaks from one
//! pass into the next.

use std::fmt;

/// A built-in Mica type.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Type {
    Void,
    Bool,
    Byte,
    Int,
    String,
}

impl Type {
    /// Is the type `int` or `byte`?
    pub fn is_numeric(self) -> bool {
        matches!(self, Type::Int | Type::Byte)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Type::Void => "void",
            Type::Bool => "bool",
            Type::Byte => "byte",
            Type::Int => "int",
            Type::String => "string",
        };
        write!(f, "{name}")
    }
}

/// A binary arithmetic operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// A binary relational operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RelOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

/// A function call. `Call` plays a dual role: it is both an expression
/// ([ExpKind::Call]) and a statement ([StatementKind::Call]); context decides which.
#[derive(Debug, Clone)]
pub struct CallExp {
    pub callee: String,
    pub args: Vec<Exp>,
}

/// An expression node.
#[derive(Debug, Clone)]
pub struct Exp {
    pub kind: ExpKind,
    pub line: u32,
    pub text: String,
}

/// The kind of expression.
#[derive(Debug, Clone)]
pub enum ExpKind {
    /// An `int` literal.
    Num(i64),
    /// A `byte` literal (e.g. `5b`). The analyzer rejects values above 255.
    NumB(i64),
    /// A `string` literal, without the surrounding quotes.
    Str(String),
    /// A `bool` literal.
    Bool(bool),
    /// An identifier reference.
    Id(String),
    /// Binary arithmetic.
    BinOp { op: BinOp, lhs: Box<Exp>, rhs: Box<Exp> },
    /// Binary comparison.
    RelOp { op: RelOp, lhs: Box<Exp>, rhs: Box<Exp> },
    /// Logical negation.
    Not(Box<Exp>),
    /// Short-circuit logical and.
    And { lhs: Box<Exp>, rhs: Box<Exp> },
    /// Short-circuit logical or.
    Or { lhs: Box<Exp>, rhs: Box<Exp> },
    /// An explicit cast. Only `int`/`byte` source and target types are valid.
    Cast { exp: Box<Exp>, target: Type },
    /// A call in expression position.
    Call(CallExp),
}

/// A statement node.
#[derive(Debug, Clone)]
pub struct Statement {
    pub kind: StatementKind,
    pub line: u32,
    pub text: String,
}

/// The kind of statement.
#[derive(Debug, Clone)]
pub enum StatementKind {
    /// A call in statement position.
    Call(CallExp),
    /// A braced statement list; opens a nested scope.
    Block(Vec<Statement>),
    Break,
    Continue,
    Return(Option<Exp>),
    If { cond: Exp, then: Box<Statement>, otherwise: Option<Box<Statement>> },
    While { cond: Exp, body: Box<Statement> },
    VarDecl { name: String, ty: Type, init: Option<Exp> },
    Assign { name: String, exp: Exp },
}

/// A formal function parameter.
#[derive(Debug, Clone)]
pub struct Formal {
    pub name: String,
    pub ty: Type,
    pub line: u32,
}

/// A function declaration with its body.
#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: String,
    pub return_type: Type,
    pub formals: Vec<Formal>,
    pub body: Vec<Statement>,
    pub line: u32,
}

/// The root of the AST: the program's function declarations, in source order.
#[derive(Debug, Clone)]
pub struct Program(pub Vec<FuncDecl>);

impl Exp {
    /// Creates an expression node with empty source text.
    pub fn new(line: u32, kind: ExpKind) -> Self {
        Self { kind, line, text: String::new() }
    }

    pub fn num(line: u32, value: i64) -> Self {
        Self::new(line, ExpKind::Num(value))
    }

    pub fn num_b(line: u32, value: i64) -> Self {
        Self::new(line, ExpKind::NumB(value))
    }

    pub fn string(line: u32, value: impl Into<String>) -> Self {
        Self::new(line, ExpKind::Str(value.into()))
    }

    pub fn boolean(line: u32, value: bool) -> Self {
        Self::new(line, ExpKind::Bool(value))
    }

    pub fn id(line: u32, name: impl Into<String>) -> Self {
        Self::new(line, ExpKind::Id(name.into()))
    }

    pub fn bin_op(line: u32, op: BinOp, lhs: Exp, rhs: Exp) -> Self {
        Self::new(line, ExpKind::BinOp { op, lhs: Box::new(lhs), rhs: Box::new(rhs) })
    }

    pub fn rel_op(line: u32, op: RelOp, lhs: Exp, rhs: Exp) -> Self {
        Self::new(line, ExpKind::RelOp { op, lhs: Box::new(lhs), rhs: Box::new(rhs) })
    }

    pub fn not(line: u32, exp: Exp) -> Self {
        Self::new(line, ExpKind::Not(Box::new(exp)))
    }

    pub fn and(line: u32, lhs: Exp, rhs: Exp) -> Self {
        Self::new(line, ExpKind::And { lhs: Box::new(lhs), rhs: Box::new(rhs) })
    }

    pub fn or(line: u32, lhs: Exp, rhs: Exp) -> Self {
        Self::new(line, ExpKind::Or { lhs: Box::new(lhs), rhs: Box::new(rhs) })
    }

    pub fn cast(line: u32, exp: Exp, target: Type) -> Self {
        Self::new(line, ExpKind::Cast { exp: Box::new(exp), target })
    }

    pub fn call(line: u32, callee: impl Into<String>, args: Vec<Exp>) -> Self {
        Self::new(line, ExpKind::Call(CallExp { callee: callee.into(), args }))
    }
}

impl Statement {
    /// Creates a statement node with empty source text.
    pub fn new(line: u32, kind: StatementKind) -> Self {
        Self { kind, line, text: String::new() }
    }

    pub fn call(line: u32, callee: impl Into<String>, args: Vec<Exp>) -> Self {
        Self::new(line, StatementKind::Call(CallExp { callee: callee.into(), args }))
    }

    pub fn block(line: u32, statements: Vec<Statement>) -> Self {
        Self::new(line, StatementKind::Block(statements))
    }

    pub fn var_decl(line: u32, name: impl Into<String>, ty: Type, init: Option<Exp>) -> Self {
        Self::new(line, StatementKind::VarDecl { name: name.into(), ty, init })
    }

    pub fn assign(line: u32, name: impl Into<String>, exp: Exp) -> Self {
        Self::new(line, StatementKind::Assign { name: name.into(), exp })
    }

    pub fn ret(line: u32, exp: Option<Exp>) -> Self {
        Self::new(line, StatementKind::Return(exp))
    }

    pub fn if_stmt(line: u32, cond: Exp, then: Statement, otherwise: Option<Statement>) -> Self {
        Self::new(line, StatementKind::If { cond, then: Box::new(then), otherwise: otherwise.map(Box::new) })
    }

    pub fn while_stmt(line: u32, cond: Exp, body: Statement) -> Self {
        Self::new(line, StatementKind::While { cond, body: Box::new(body) })
    }
}

impl FuncDecl {
    /// Creates a function declaration node.
    pub fn new(
        line: u32,
        name: impl Into<String>,
        return_type: Type,
        formals: Vec<Formal>,
        body: Vec<Statement>,
    ) -> Self {
        Self { name: name.into(), return_type, formals, body, line }
    }
}

impl Formal {
    /// Creates a formal parameter node.
    pub fn new(line: u32, name: impl Into<String>, ty: Type) -> Self {
        Self { name: name.into(), ty, line }
    }
}
