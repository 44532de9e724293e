// monkey-core - Common test utilities
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Shared helpers for evaluator integration tests.
//!
//! In your test file, add:
//! ```ignore
//! mod common;
//! use common::*;
//! ```

#[allow(unused_imports)]
pub use monkey_core::{eval_program, Env, Object};
pub use monkey_parser::Parser;

/// Parse a program, panicking on parse errors.
pub fn parse(input: &str) -> monkey_parser::Program {
    let mut parser = Parser::from_source(input);
    let program = parser.parse_program();
    assert!(
        parser.errors().is_empty(),
        "parser errors for {:?}: {:?}",
        input,
        parser.errors()
    );
    program
}

/// Evaluate a source string in a fresh environment.
pub fn eval_str(input: &str) -> Object {
    let program = parse(input);
    let env = Env::new();
    eval_program(&program, &env)
}

/// Assert that evaluation produced the given integer.
#[allow(dead_code)]
pub fn assert_integer(input: &str, expected: i64) {
    match eval_str(input) {
        Object::Integer(value) => assert_eq!(value, expected, "input: {}", input),
        other => panic!("expected Integer for {:?}, got {:?}", input, other),
    }
}

/// Assert that evaluation produced the given boolean.
#[allow(dead_code)]
pub fn assert_boolean(input: &str, expected: bool) {
    match eval_str(input) {
        Object::Boolean(value) => assert_eq!(value, expected, "input: {}", input),
        other => panic!("expected Boolean for {:?}, got {:?}", input, other),
    }
}

/// Assert that evaluation produced an error with the given message.
#[allow(dead_code)]
pub fn assert_error(input: &str, expected: &str) {
    match eval_str(input) {
        Object::Error(message) => assert_eq!(message, expected, "input: {}", input),
        other => panic!("expected Error for {:?}, got {:?}", input, other),
    }
}
