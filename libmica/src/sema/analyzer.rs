// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `analyzer` module implements the type-checking pass.
//!
//! The pass walks the whole tree once. Function signatures (built-ins first, then every
//! user declaration) are registered before any body is checked, so calls may reference
//! functions declared later in the file. Bodies are then checked in source order under
//! a per-function scope. Expression checking returns the expression's resolved type;
//! nothing is written back into the tree.

use crate::ast::{CallExp, Exp, ExpKind, FuncDecl, Program, Statement, StatementKind, Type};
use crate::diagnostics::SemanticError;
use crate::ICE;

use super::symbol_table::{SymbolKind, SymbolTable};

type SemanticResult<T> = Result<T, SemanticError>;

/// Checks the program, failing with the first semantic error found.
pub fn analyze(program: &Program) -> SemanticResult<()> {
    SemanticAnalyzer::new().check_program(program)
}

/// The type-checking pass. One instance checks one program.
pub struct SemanticAnalyzer {
    symbols: SymbolTable,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self { symbols: SymbolTable::new() }
    }

    /// Checks the whole program: registers signatures, enforces the `main` contract,
    /// then checks every function body.
    pub fn check_program(&mut self, program: &Program) -> SemanticResult<()> {
        self.register_builtins();

        for func in &program.0 {
            let param_types = func.formals.iter().map(|f| f.ty).collect();
            let param_names = func.formals.iter().map(|f| f.name.clone()).collect();
            self.symbols
                .declare_function(&func.name, func.return_type, param_types, param_names)
                .map_err(|_| SemanticError::AlreadyDefined { line: func.line, name: func.name.clone() })?;
        }

        self.check_main()?;

        for func in &program.0 {
            self.check_function(func)?;
        }

        debug_assert_eq!(self.symbols.depth(), 1, "unbalanced scope stack after analysis");
        Ok(())
    }

    /// Registers the runtime-provided output functions so programs can call them
    /// without declaring them.
    fn register_builtins(&mut self) {
        let builtins: [(&str, Type); 2] = [("print", Type::String), ("printi", Type::Int)];
        for (name, param) in builtins {
            if self.symbols.declare_function(name, Type::Void, vec![param], vec!["value".to_string()]).is_err() {
                ICE!("Built-in '{name}' registered twice");
            }
        }
    }

    /// `main` must exist, return `void` and take no parameters.
    fn check_main(&self) -> SemanticResult<()> {
        match self.symbols.resolve_function("main") {
            Some(main) if main.data_type == Type::Void && main.param_types.is_empty() => Ok(()),
            _ => Err(SemanticError::MissingMain),
        }
    }

    fn check_function(&mut self, func: &FuncDecl) -> SemanticResult<()> {
        self.symbols.push_scope(Some(&func.name));

        let result = self.check_function_inner(func);

        self.symbols.pop_scope();
        result
    }

    fn check_function_inner(&mut self, func: &FuncDecl) -> SemanticResult<()> {
        for formal in &func.formals {
            self.symbols
                .declare_parameter(&formal.name, formal.ty)
                .map_err(|_| SemanticError::AlreadyDefined { line: formal.line, name: formal.name.clone() })?;
        }

        for statement in &func.body {
            self.check_statement(statement)?;
        }
        Ok(())
    }

    fn check_statement(&mut self, statement: &Statement) -> SemanticResult<()> {
        match &statement.kind {
            StatementKind::Call(call) => {
                // A void result is fine in statement position; any result is discarded.
                self.check_call(call, statement.line)?;
                Ok(())
            }
            StatementKind::Block(statements) => {
                self.symbols.push_scope(None);
                let result = statements.iter().try_for_each(|s| self.check_statement(s));
                self.symbols.pop_scope();
                result
            }
            StatementKind::Break => {
                if self.symbols.current_scope().in_loop() {
                    Ok(())
                } else {
                    Err(SemanticError::UnexpectedBreak { line: statement.line })
                }
            }
            StatementKind::Continue => {
                if self.symbols.current_scope().in_loop() {
                    Ok(())
                } else {
                    Err(SemanticError::UnexpectedContinue { line: statement.line })
                }
            }
            StatementKind::Return(exp) => self.check_return(exp.as_ref(), statement.line),
            StatementKind::If { cond, then, otherwise } => {
                // The condition and the then-branch share one scope; a variable
                // declared in an unbraced then-branch is not visible in the else.
                self.symbols.push_scope(None);
                let result = self.check_condition(cond).and_then(|()| self.check_statement(then));
                self.symbols.pop_scope();
                result?;

                if let Some(otherwise) = otherwise {
                    self.symbols.push_scope(None);
                    let result = self.check_statement(otherwise);
                    self.symbols.pop_scope();
                    result?;
                }
                Ok(())
            }
            StatementKind::While { cond, body } => {
                self.symbols.push_loop_scope(None, None);
                let result = self.check_condition(cond).and_then(|()| self.check_statement(body));
                self.symbols.pop_scope();
                result
            }
            StatementKind::VarDecl { name, ty, init } => {
                // The initializer is checked before the name is declared, so
                // `int x = x;` resolves `x` against the enclosing scope (or fails).
                if let Some(init) = init {
                    let init_type = self.check_exp(init)?;
                    if !assignable(*ty, init_type) {
                        return Err(SemanticError::TypeMismatch { line: statement.line });
                    }
                }
                self.symbols
                    .declare_variable(name, *ty)
                    .map_err(|_| SemanticError::AlreadyDefined { line: statement.line, name: name.clone() })
            }
            StatementKind::Assign { name, exp } => {
                let symbol = self
                    .symbols
                    .resolve(name)
                    .ok_or_else(|| SemanticError::UndefinedVariable { line: statement.line, name: name.clone() })?;
                if symbol.kind == SymbolKind::Function {
                    return Err(SemanticError::FunctionUsedAsVariable { line: statement.line, name: name.clone() });
                }
                let target_type = symbol.data_type;

                let exp_type = self.check_exp(exp)?;
                if !assignable(target_type, exp_type) {
                    return Err(SemanticError::TypeMismatch { line: statement.line });
                }
                Ok(())
            }
        }
    }

    /// An `if`/`while` condition must be `bool`; there is no numeric truthiness.
    fn check_condition(&mut self, cond: &Exp) -> SemanticResult<()> {
        if self.check_exp(cond)? != Type::Bool {
            return Err(SemanticError::TypeMismatch { line: cond.line });
        }
        Ok(())
    }

    /// A `return` expression must match the enclosing function's return type, byte
    /// widening included; a bare `return` is a `void` expression.
    fn check_return(&mut self, exp: Option<&Exp>, line: u32) -> SemanticResult<()> {
        let func_name = self.symbols.current_scope().name().to_string();
        let return_type = match self.symbols.resolve_function(&func_name) {
            Some(symbol) => symbol.data_type,
            None => ICE!("Return statement outside any function"),
        };

        let exp_type = match exp {
            Some(exp) => self.check_exp(exp)?,
            None => Type::Void,
        };

        if !assignable(return_type, exp_type) {
            return Err(SemanticError::TypeMismatch { line });
        }
        Ok(())
    }

    fn check_exp(&mut self, exp: &Exp) -> SemanticResult<Type> {
        match &exp.kind {
            ExpKind::Num(_) => Ok(Type::Int),
            ExpKind::NumB(value) => {
                if (0..=255).contains(value) {
                    Ok(Type::Byte)
                } else {
                    Err(SemanticError::ByteValueOutOfRange { line: exp.line, value: *value })
                }
            }
            ExpKind::Str(_) => Ok(Type::String),
            ExpKind::Bool(_) => Ok(Type::Bool),
            ExpKind::Id(name) => {
                let symbol = self
                    .symbols
                    .resolve(name)
                    .ok_or_else(|| SemanticError::UndefinedVariable { line: exp.line, name: name.clone() })?;
                if symbol.kind == SymbolKind::Function {
                    return Err(SemanticError::FunctionUsedAsVariable { line: exp.line, name: name.clone() });
                }
                Ok(symbol.data_type)
            }
            ExpKind::BinOp { lhs, rhs, .. } => {
                let lhs_type = self.check_exp(lhs)?;
                let rhs_type = self.check_exp(rhs)?;
                if !lhs_type.is_numeric() || !rhs_type.is_numeric() {
                    return Err(SemanticError::TypeMismatch { line: exp.line });
                }
                // Arithmetic stays in byte only when both operands are bytes.
                if lhs_type == Type::Byte && rhs_type == Type::Byte {
                    Ok(Type::Byte)
                } else {
                    Ok(Type::Int)
                }
            }
            ExpKind::RelOp { lhs, rhs, .. } => {
                let lhs_type = self.check_exp(lhs)?;
                let rhs_type = self.check_exp(rhs)?;
                if !lhs_type.is_numeric() || !rhs_type.is_numeric() {
                    return Err(SemanticError::TypeMismatch { line: exp.line });
                }
                Ok(Type::Bool)
            }
            ExpKind::Not(operand) => {
                if self.check_exp(operand)? != Type::Bool {
                    return Err(SemanticError::TypeMismatch { line: exp.line });
                }
                Ok(Type::Bool)
            }
            ExpKind::And { lhs, rhs } | ExpKind::Or { lhs, rhs } => {
                if self.check_exp(lhs)? != Type::Bool || self.check_exp(rhs)? != Type::Bool {
                    return Err(SemanticError::TypeMismatch { line: exp.line });
                }
                Ok(Type::Bool)
            }
            ExpKind::Cast { exp: operand, target } => {
                let source = self.check_exp(operand)?;
                if !source.is_numeric() || !target.is_numeric() {
                    return Err(SemanticError::TypeMismatch { line: exp.line });
                }
                Ok(*target)
            }
            ExpKind::Call(call) => self.check_call(call, exp.line),
        }
    }

    /// Checks a call and returns the callee's return type.
    fn check_call(&mut self, call: &CallExp, line: u32) -> SemanticResult<Type> {
        let symbol = self
            .symbols
            .resolve(&call.callee)
            .ok_or_else(|| SemanticError::UndefinedFunction { line, name: call.callee.clone() })?;
        if symbol.kind != SymbolKind::Function {
            return Err(SemanticError::VariableUsedAsFunction { line, name: call.callee.clone() });
        }
        let return_type = symbol.data_type;
        let param_types = symbol.param_types.clone();

        let mismatch = || SemanticError::PrototypeMismatch {
            line,
            name: call.callee.clone(),
            expected: param_types.clone(),
        };

        if call.args.len() != param_types.len() {
            return Err(mismatch());
        }
        for (arg, &param_type) in call.args.iter().zip(&param_types) {
            let arg_type = self.check_exp(arg)?;
            if !assignable(param_type, arg_type) {
                return Err(mismatch());
            }
        }
        Ok(return_type)
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// May a value of `source` type flow into a slot of `target` type? Exact match, plus
/// the one implicit widening: byte into int.
fn assignable(target: Type, source: Type) -> bool {
    target == source || (target == Type::Int && source == Type::Byte)
}
