// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `scope` module defines the [Scope] type: one lexical region's slice of the
//! symbol table.

use std::collections::HashMap;

use super::symbol_table::{AlreadyDefined, Symbol};
use crate::ast::Type;

/// A lexical scope: a name→symbol map plus the bookkeeping both passes need.
///
/// Scopes live on the [super::symbol_table::SymbolTable]'s stack; a child scope never
/// outlives its parent. Names are unique within one scope; shadowing a name from an
/// enclosing scope is allowed and nearest-declaration wins on resolution.
#[derive(Debug)]
pub struct Scope {
    symbols: HashMap<String, Symbol>,
    next_offset: i32,
    next_param_offset: i32,
    in_loop: bool,
    name: String,
    condition_label: Option<String>,
    done_label: Option<String>,
}

impl Scope {
    /// Creates a scope with no parent (the global scope).
    pub fn global() -> Self {
        Self {
            symbols: HashMap::new(),
            next_offset: 0,
            next_param_offset: -1,
            in_loop: false,
            name: String::new(),
            condition_label: None,
            done_label: None,
        }
    }

    /// Creates a child of `parent`.
    ///
    /// The child continues the parent's local-offset counter, and inherits the parent's
    /// scope name unless `name` overrides it. When `loop_labels` is `None` and the
    /// parent is (transitively) a loop scope, the parent's loop state and labels are
    /// copied forward so `break`/`continue` nested inside non-loop blocks still
    /// resolve; `Some` labels make this a genuine loop scope with fresh labels.
    pub fn nested(parent: &Scope, name: Option<&str>, loop_labels: Option<(Option<String>, Option<String>)>) -> Self {
        let (in_loop, condition_label, done_label) = match loop_labels {
            Some((condition, done)) => (true, condition, done),
            None if parent.in_loop => (true, parent.condition_label.clone(), parent.done_label.clone()),
            None => (false, None, None),
        };

        Self {
            symbols: HashMap::new(),
            next_offset: parent.next_offset,
            next_param_offset: -1,
            in_loop,
            name: name.unwrap_or(&parent.name).to_string(),
            condition_label,
            done_label,
        }
    }

    /// Declares a local variable at the next local offset (counting up from 0).
    pub fn declare_variable(&mut self, name: &str, data_type: Type) -> Result<&Symbol, AlreadyDefined> {
        if self.symbols.contains_key(name) {
            return Err(AlreadyDefined);
        }

        let offset = self.next_offset;
        self.next_offset += 1;
        Ok(self.symbols.entry(name.to_string()).or_insert(Symbol::variable(name, data_type, offset)))
    }

    /// Declares a function parameter at the next parameter offset (counting down from −1).
    pub fn declare_parameter(&mut self, name: &str, data_type: Type) -> Result<&Symbol, AlreadyDefined> {
        if self.symbols.contains_key(name) {
            return Err(AlreadyDefined);
        }

        let offset = self.next_param_offset;
        self.next_param_offset -= 1;
        Ok(self.symbols.entry(name.to_string()).or_insert(Symbol::variable(name, data_type, offset)))
    }

    /// Declares a function symbol. Only meaningful on the global scope.
    pub fn declare_function(
        &mut self,
        name: &str,
        return_type: Type,
        param_types: Vec<Type>,
        param_names: Vec<String>,
    ) -> Result<&Symbol, AlreadyDefined> {
        if self.symbols.contains_key(name) {
            return Err(AlreadyDefined);
        }

        Ok(self
            .symbols
            .entry(name.to_string())
            .or_insert(Symbol::function(name, return_type, param_types, param_names)))
    }

    /// Returns the symbol declared in *this* scope, or `None`. (Resolution through the
    /// parent chain is the symbol table's job.)
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.symbols.get_mut(name)
    }

    /// Is this scope inside a loop (directly or transitively)?
    pub fn in_loop(&self) -> bool {
        self.in_loop
    }

    /// The name of the enclosing function, or empty for the global scope.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The nearest enclosing loop's condition label, when inside a loop during codegen.
    pub fn condition_label(&self) -> Option<&str> {
        self.condition_label.as_deref()
    }

    /// The nearest enclosing loop's done label, when inside a loop during codegen.
    pub fn done_label(&self) -> Option<&str> {
        self.done_label.as_deref()
    }
}
