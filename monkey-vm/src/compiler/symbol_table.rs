// monkey-vm - Bytecode compiler and stack-based virtual machine for the Monkey programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Lexically scoped symbol tables with automatic free-variable capture.
//!
//! Tables form an owned chain: the compiler wraps the current table on scope
//! entry and unwraps it on exit, so a REPL can take the global table back out
//! of the compiler between lines.

use std::collections::HashMap;

/// Where a resolved name lives at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolScope {
    /// Slot in the VM's globals vector.
    Global,
    /// Slot on the operand stack relative to the frame's base pointer.
    Local,
    /// Captured value in the current closure.
    Free,
    /// Entry in the process-wide builtin registry.
    Builtin,
    /// The function currently being compiled (self-recursion).
    Function,
}

/// A resolved name: where it lives and at which index.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub scope: SymbolScope,
    pub index: usize,
}

/// One lexical scope's bindings plus its free-variable bookkeeping.
#[derive(Debug, Default)]
pub struct SymbolTable {
    outer: Option<Box<SymbolTable>>,
    store: HashMap<String, Symbol>,
    /// Number of Global/Local definitions (builtins and function names are
    /// not counted; this becomes the function's `num_locals`).
    pub num_definitions: usize,
    /// Outer bindings captured by this scope, in first-reference order.
    pub free_symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    /// A fresh scope enclosing `outer`.
    pub fn enclosed(outer: SymbolTable) -> Self {
        SymbolTable {
            outer: Some(Box::new(outer)),
            ..SymbolTable::default()
        }
    }

    /// Whether this is the outermost scope.
    pub fn is_global(&self) -> bool {
        self.outer.is_none()
    }

    /// Unwrap the enclosing scope, discarding this one.
    pub fn into_outer(self) -> Option<SymbolTable> {
        self.outer.map(|outer| *outer)
    }

    /// Bind `name` in this scope, assigning the next index.
    pub fn define(&mut self, name: &str) -> Symbol {
        let scope = if self.outer.is_none() {
            SymbolScope::Global
        } else {
            SymbolScope::Local
        };
        let symbol = Symbol {
            name: name.to_string(),
            scope,
            index: self.num_definitions,
        };
        self.store.insert(name.to_string(), symbol.clone());
        self.num_definitions += 1;
        symbol
    }

    /// Bind a builtin at its registry index.
    pub fn define_builtin(&mut self, index: usize, name: &str) -> Symbol {
        let symbol = Symbol {
            name: name.to_string(),
            scope: SymbolScope::Builtin,
            index,
        };
        self.store.insert(name.to_string(), symbol.clone());
        symbol
    }

    /// Bind the name of the function whose body is being compiled.
    /// The index is irrelevant; resolution emits `CurrentClosure`.
    pub fn define_function_name(&mut self, name: &str) -> Symbol {
        let symbol = Symbol {
            name: name.to_string(),
            scope: SymbolScope::Function,
            index: 0,
        };
        self.store.insert(name.to_string(), symbol.clone());
        symbol
    }

    /// Resolve `name`, searching enclosing scopes on a miss.
    ///
    /// A hit in an outer scope that is neither Global nor Builtin is
    /// converted to a Free symbol of this scope: recorded in the free list
    /// and re-stored here, so repeated references reuse the same capture.
    pub fn resolve(&mut self, name: &str) -> Option<Symbol> {
        if let Some(symbol) = self.store.get(name) {
            return Some(symbol.clone());
        }
        let outer = self.outer.as_mut()?;
        let symbol = outer.resolve(name)?;
        match symbol.scope {
            SymbolScope::Global | SymbolScope::Builtin => Some(symbol),
            _ => Some(self.define_free(symbol)),
        }
    }

    fn define_free(&mut self, original: Symbol) -> Symbol {
        self.free_symbols.push(original.clone());
        let symbol = Symbol {
            name: original.name.clone(),
            scope: SymbolScope::Free,
            index: self.free_symbols.len() - 1,
        };
        self.store.insert(symbol.name.clone(), symbol.clone());
        symbol
    }
}
