// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `symbol_table` module defines the [Symbol] record and the [SymbolTable] scope
//! stack shared (as a type, not an instance) by the analyzer and the code generator.
//! Each pass builds its own table while walking the tree.

use crate::ast::Type;
use crate::core::RegisterDescriptor;
use crate::ICE;

use super::scope::Scope;

/// Marker error for a same-scope redeclaration. Callers attach the line and name.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AlreadyDefined;

/// What a symbol names.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
}

/// One declared name: a variable (local or parameter) or a function.
///
/// For variables `data_type` is the declared type and `offset` the activation-record
/// slot: locals count up from 0, parameters down from −1. For functions `data_type` is
/// the return type and the parameter lists describe the signature. `register` is set by
/// the code generator only, and points at the variable's `alloca` storage.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub data_type: Type,
    pub offset: i32,
    pub param_types: Vec<Type>,
    pub param_names: Vec<String>,
    pub register: Option<RegisterDescriptor>,
}

impl Symbol {
    pub(crate) fn variable(name: &str, data_type: Type, offset: i32) -> Self {
        Self {
            name: name.to_string(),
            kind: SymbolKind::Variable,
            data_type,
            offset,
            param_types: Vec::new(),
            param_names: Vec::new(),
            register: None,
        }
    }

    pub(crate) fn function(name: &str, return_type: Type, param_types: Vec<Type>, param_names: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            kind: SymbolKind::Function,
            data_type: return_type,
            offset: 0,
            param_types,
            param_names,
            register: None,
        }
    }
}

/// A LIFO stack of scopes. Index 0 is the persistent global scope holding every
/// function symbol; it is created on construction and never popped.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self { scopes: vec![Scope::global()] }
    }

    /// The number of open scopes, the global scope included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// The innermost open scope.
    pub fn current_scope(&self) -> &Scope {
        // The global scope is never popped, so the stack is never empty.
        self.scopes.last().unwrap_or_else(|| ICE!("Symbol table has no open scope"))
    }

    fn current_scope_mut(&mut self) -> &mut Scope {
        self.scopes.last_mut().unwrap_or_else(|| ICE!("Symbol table has no open scope"))
    }

    /// Opens a nested scope. `name` overrides the inherited enclosing-function name;
    /// loop state and labels are inherited from the parent.
    pub fn push_scope(&mut self, name: Option<&str>) {
        let child = Scope::nested(self.current_scope(), name, None);
        self.scopes.push(child);
    }

    /// Opens a nested loop scope. The labels are the loop's own branch targets for
    /// `continue` and `break`; the analyzer, which has no labels, passes `None` twice.
    pub fn push_loop_scope(&mut self, condition_label: Option<String>, done_label: Option<String>) {
        let child = Scope::nested(self.current_scope(), None, Some((condition_label, done_label)));
        self.scopes.push(child);
    }

    /// Closes the innermost scope. Popping the global scope is a pass bug.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() == 1 {
            ICE!("Attempted to pop the global scope");
        }
        self.scopes.pop();
    }

    /// Declares a local variable in the current scope.
    pub fn declare_variable(&mut self, name: &str, data_type: Type) -> Result<(), AlreadyDefined> {
        self.current_scope_mut().declare_variable(name, data_type).map(|_| ())
    }

    /// Declares a function parameter in the current scope.
    pub fn declare_parameter(&mut self, name: &str, data_type: Type) -> Result<(), AlreadyDefined> {
        self.current_scope_mut().declare_parameter(name, data_type).map(|_| ())
    }

    /// Declares a function in the global scope, regardless of the current scope.
    pub fn declare_function(
        &mut self,
        name: &str,
        return_type: Type,
        param_types: Vec<Type>,
        param_names: Vec<String>,
    ) -> Result<(), AlreadyDefined> {
        self.scopes[0].declare_function(name, return_type, param_types, param_names).map(|_| ())
    }

    /// Resolves a name against the scope stack, innermost scope first.
    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Resolves a function name against the global scope only.
    pub fn resolve_function(&self, name: &str) -> Option<&Symbol> {
        self.scopes[0].get(name)
    }

    fn resolve_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.scopes.iter_mut().rev().find_map(|scope| scope.get_mut(name))
    }

    /// Records the register holding a variable's storage. Codegen only; the variable
    /// must already be declared.
    pub fn bind_register(&mut self, name: &str, register: RegisterDescriptor) {
        match self.resolve_mut(name) {
            Some(symbol) => symbol.register = Some(register),
            None => ICE!("Register bound to undeclared symbol '{name}'"),
        }
    }

    /// The register holding a variable's storage. Codegen only; resolution must
    /// succeed because the analyzer has already validated the tree.
    pub fn register_of(&self, name: &str) -> &RegisterDescriptor {
        match self.resolve(name).and_then(|symbol| symbol.register.as_ref()) {
            Some(register) => register,
            None => ICE!("No register bound for symbol '{name}'"),
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
