// monkey-core - Runtime value model, builtins, and tree-walking evaluator for the Monkey programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Runtime values and the tree-walking engine for Monkey.
//!
//! The [`object::Object`] sum type is shared by both execution engines; the
//! evaluator in [`eval`] is the simpler alternative to the bytecode VM in
//! `monkey-vm`.

pub mod builtins;
pub mod env;
pub mod eval;
pub mod object;

pub use builtins::{get_builtin_by_name, BUILTINS};
pub use env::Env;
pub use eval::eval_program;
pub use object::{
    Builtin, Closure, CompiledFunction, Function, HashKey, HashPair, Object, ObjectType,
};
