// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `diagnostics` module defines the fatal, user-facing errors the compiler can emit.
//!
//! Every semantic error aborts analysis at its first occurrence; there is no recovery
//! and no partial-program output. Internal invariant violations are not diagnostics,
//! they are ICEs (see the [crate::core] module).

pub mod printer;

use std::fmt;

use crate::ast::Type;

/// A fatal semantic error, carrying the 1-based source line it was detected on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    /// An identifier was referenced but never declared.
    UndefinedVariable { line: u32, name: String },
    /// A call names a function that was never declared.
    UndefinedFunction { line: u32, name: String },
    /// A name was declared twice in the same scope.
    AlreadyDefined { line: u32, name: String },
    /// A function name was used where a variable is required.
    FunctionUsedAsVariable { line: u32, name: String },
    /// A variable name was used where a function is required.
    VariableUsedAsFunction { line: u32, name: String },
    /// Operand, assignment, return, cast or condition types do not agree.
    TypeMismatch { line: u32 },
    /// A byte literal is outside [0, 255].
    ByteValueOutOfRange { line: u32, value: i64 },
    /// A call's argument count or argument types do not match the callee's signature.
    PrototypeMismatch { line: u32, name: String, expected: Vec<Type> },
    /// A `break` statement outside any loop.
    UnexpectedBreak { line: u32 },
    /// A `continue` statement outside any loop.
    UnexpectedContinue { line: u32 },
    /// The program has no `void main()` with zero parameters.
    MissingMain,
}

impl SemanticError {
    /// The source line the error was detected on, if it has one.
    pub fn line(&self) -> Option<u32> {
        match self {
            SemanticError::UndefinedVariable { line, .. }
            | SemanticError::UndefinedFunction { line, .. }
            | SemanticError::AlreadyDefined { line, .. }
            | SemanticError::FunctionUsedAsVariable { line, .. }
            | SemanticError::VariableUsedAsFunction { line, .. }
            | SemanticError::TypeMismatch { line }
            | SemanticError::ByteValueOutOfRange { line, .. }
            | SemanticError::PrototypeMismatch { line, .. }
            | SemanticError::UnexpectedBreak { line }
            | SemanticError::UnexpectedContinue { line } => Some(*line),
            SemanticError::MissingMain => None,
        }
    }
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticError::UndefinedVariable { line, name } => {
                write!(f, "line {line}: variable '{name}' is not defined")
            }
            SemanticError::UndefinedFunction { line, name } => {
                write!(f, "line {line}: function '{name}' is not declared")
            }
            SemanticError::AlreadyDefined { line, name } => {
                write!(f, "line {line}: symbol '{name}' is already defined")
            }
            SemanticError::FunctionUsedAsVariable { line, name } => {
                write!(f, "line {line}: '{name}' is a function")
            }
            SemanticError::VariableUsedAsFunction { line, name } => {
                write!(f, "line {line}: '{name}' is a variable")
            }
            SemanticError::TypeMismatch { line } => {
                write!(f, "line {line}: type mismatch")
            }
            SemanticError::ByteValueOutOfRange { line, value } => {
                write!(f, "line {line}: byte value {value} out of range")
            }
            SemanticError::PrototypeMismatch { line, name, expected } => {
                let types = expected.iter().map(Type::to_string).collect::<Vec<_>>().join(", ");
                write!(f, "line {line}: prototype mismatch, function '{name}' expects parameters ({types})")
            }
            SemanticError::UnexpectedBreak { line } => {
                write!(f, "line {line}: unexpected break statement")
            }
            SemanticError::UnexpectedContinue { line } => {
                write!(f, "line {line}: unexpected continue statement")
            }
            SemanticError::MissingMain => {
                write!(f, "program is missing a 'void main()' function")
            }
        }
    }
}

impl std::error::Error for SemanticError {}
