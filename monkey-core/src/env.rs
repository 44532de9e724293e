// monkey-core - Runtime value model, builtins, and tree-walking evaluator for the Monkey programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Lexical environments for the tree-walking evaluator.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::object::Object;

/// A chain of name bindings. Cloning an `Env` yields another handle onto the
/// same scope, which is how closures share their captured environment.
#[derive(Debug, Clone, Default)]
pub struct Env(Rc<RefCell<Scope>>);

#[derive(Debug, Default)]
struct Scope {
    store: HashMap<String, Object>,
    outer: Option<Env>,
}

impl Env {
    pub fn new() -> Self {
        Env::default()
    }

    /// A fresh scope whose lookups fall through to `outer`.
    pub fn enclosed(outer: &Env) -> Self {
        Env(Rc::new(RefCell::new(Scope {
            store: HashMap::new(),
            outer: Some(outer.clone()),
        })))
    }

    pub fn get(&self, name: &str) -> Option<Object> {
        let scope = self.0.borrow();
        match scope.store.get(name) {
            Some(obj) => Some(obj.clone()),
            None => scope.outer.as_ref().and_then(|outer| outer.get(name)),
        }
    }

    pub fn set(&self, name: impl Into<String>, value: Object) {
        self.0.borrow_mut().store.insert(name.into(), value);
    }
}
