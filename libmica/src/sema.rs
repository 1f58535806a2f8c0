// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `sema` module is responsible for semantic analysis of the AST produced by the parser.
//!
//! Analysis is a single recursive descent that resolves every identifier against the
//! scope stack and type-checks every node. It produces no IR. The first semantic error
//! is fatal: analysis stops and the error is returned to the driver, which must not run
//! code generation (the generator assumes a valid tree).

pub mod scope;
pub mod symbol_table;

mod analyzer;


pub use analyzer::{analyze, SemanticAnalyzer};
