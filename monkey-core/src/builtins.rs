// monkey-core - Runtime value model, builtins, and tree-walking evaluator for the Monkey programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The process-wide builtin registry.
//!
//! Registry order is part of the bytecode contract: `GetBuiltin n` indexes
//! this table, so entries must not be reordered.

use im::Vector;

use crate::object::{Builtin, Object};

/// All builtins, in `GetBuiltin` index order.
pub const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "len",
        func: builtin_len,
    },
    Builtin {
        name: "puts",
        func: builtin_puts,
    },
    Builtin {
        name: "first",
        func: builtin_first,
    },
    Builtin {
        name: "last",
        func: builtin_last,
    },
    Builtin {
        name: "rest",
        func: builtin_rest,
    },
    Builtin {
        name: "push",
        func: builtin_push,
    },
];

/// Look up a builtin by name (used by the evaluator's identifier fallback).
pub fn get_builtin_by_name(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|b| b.name == name)
}

fn wrong_arity(got: usize, want: usize) -> Option<Object> {
    Some(Object::error(format!(
        "wrong number of arguments. got={}, want={}",
        got, want
    )))
}

fn builtin_len(args: &[Object]) -> Option<Object> {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Object::Array(items) => Some(Object::Integer(items.len() as i64)),
        Object::String(value) => Some(Object::Integer(value.len() as i64)),
        other => Some(Object::error(format!(
            "argument to `len` not supported, got {}",
            other.object_type()
        ))),
    }
}

fn builtin_puts(args: &[Object]) -> Option<Object> {
    for arg in args {
        println!("{}", arg.inspect());
    }
    None
}

fn builtin_first(args: &[Object]) -> Option<Object> {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Object::Array(items) => items.front().cloned(),
        Object::String(value) => value
            .as_bytes()
            .first()
            .map(|&b| Object::string((b as char).to_string())),
        other => Some(Object::error(format!(
            "argument to `first` must be ARRAY, got {}",
            other.object_type()
        ))),
    }
}

fn builtin_last(args: &[Object]) -> Option<Object> {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Object::Array(items) => items.back().cloned(),
        Object::String(value) => value
            .as_bytes()
            .last()
            .map(|&b| Object::string((b as char).to_string())),
        other => Some(Object::error(format!(
            "argument to `last` must be ARRAY, got {}",
            other.object_type()
        ))),
    }
}

fn builtin_rest(args: &[Object]) -> Option<Object> {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Object::Array(items) => {
            if items.is_empty() {
                return None;
            }
            let mut rest = items.clone();
            rest.pop_front();
            Some(Object::Array(rest))
        }
        other => Some(Object::error(format!(
            "argument to `rest` must be ARRAY, got {}",
            other.object_type()
        ))),
    }
}

fn builtin_push(args: &[Object]) -> Option<Object> {
    if args.len() != 2 {
        return wrong_arity(args.len(), 2);
    }
    match &args[0] {
        Object::Array(items) => {
            let mut pushed: Vector<Object> = items.clone();
            pushed.push_back(args[1].clone());
            Some(Object::Array(pushed))
        }
        other => Some(Object::error(format!(
            "argument to `push` must be ARRAY, got {}",
            other.object_type()
        ))),
    }
}
