// monkey-vm - Runtime error path tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

mod common;

use common::*;

fn assert_runtime_error(input: &str, expected_message: &str) {
    let err = run_error(input);
    assert_eq!(err.to_string(), expected_message, "input: {}", input);
}

#[test]
fn mixed_type_arithmetic_fails() {
    assert_runtime_error("1 + true", "unsupported types for binary operation: INTEGER BOOLEAN");
    assert_runtime_error("true + false", "unsupported types for binary operation: BOOLEAN BOOLEAN");
    assert_runtime_error(
        r#""str" + 1"#,
        "unsupported types for binary operation: STRING INTEGER",
    );
    assert_runtime_error(
        "[1] + [2]",
        "unsupported types for binary operation: ARRAY ARRAY",
    );
}

#[test]
fn mixed_type_comparison_fails() {
    assert_runtime_error("1 == true", "unsupported types for binary operation: INTEGER BOOLEAN");
    assert_runtime_error(
        r#""a" < "b""#,
        "unsupported types for binary operation: STRING STRING",
    );
}

#[test]
fn boolean_ordering_is_not_defined() {
    assert_runtime_error("true > false", "unknown operator: OpGreater (BOOLEAN BOOLEAN)");
    assert_runtime_error("true <= false", "unknown operator: OpLessEqual (BOOLEAN BOOLEAN)");
}

#[test]
fn string_operators_other_than_add_fail() {
    assert_runtime_error(r#""a" - "b""#, "unknown operator: OpSub (STRING STRING)");
}

#[test]
fn negation_requires_an_integer() {
    assert_runtime_error("-true", "unsupported negation operation: -BOOLEAN");
    assert_runtime_error(r#"-"str""#, "unsupported negation operation: -STRING");
}

#[test]
fn division_by_zero_is_fatal() {
    assert_runtime_error("5 / 0", "division by zero");
    assert_runtime_error("let zero = 0; 1 / zero", "division by zero");
}

#[test]
fn closure_calls_check_arity() {
    assert_runtime_error(
        "fn(a, b) { a + b }(1)",
        "wrong number of arguments: want=2, got=1",
    );
    assert_runtime_error("fn() { 1; }(1);", "wrong number of arguments: want=0, got=1");
    assert_runtime_error("fn(a) { a; }();", "wrong number of arguments: want=1, got=0");
}

#[test]
fn calling_a_non_function_fails() {
    assert_runtime_error("1(2)", "calling non-function");
    assert_runtime_error(r#""not a fn"()"#, "calling non-function");
    assert_runtime_error("let x = [1]; x()", "calling non-function");
}

#[test]
fn non_hashable_keys_fail() {
    assert_runtime_error("{[1]: 2}", "unusable as hash key: ARRAY");
    assert_runtime_error("{fn() { 1 }: 2}", "unusable as hash key: CLOSURE");
    assert_runtime_error(r#"{"k": 1}[fn(x) { x }]"#, "unusable as hash key: CLOSURE");
    assert_runtime_error("{1: 2}[[3]]", "unusable as hash key: ARRAY");
}

#[test]
fn indexing_unsupported_types_fails() {
    assert_runtime_error(r#""str"[0]"#, "index operator not supported: STRING");
    assert_runtime_error("5[0]", "index operator not supported: INTEGER");
    assert_runtime_error("[1, 2][true]", "index operator not supported: ARRAY");
}

#[test]
fn builtin_failures_surface_as_runtime_errors() {
    assert_runtime_error("len(1)", "argument to `len` not supported, got INTEGER");
    assert_runtime_error(
        r#"len("one", "two")"#,
        "wrong number of arguments. got=2, want=1",
    );
    assert_runtime_error("first(1)", "argument to `first` must be ARRAY, got INTEGER");
    assert_runtime_error("last(1)", "argument to `last` must be ARRAY, got INTEGER");
    assert_runtime_error("rest(1)", "argument to `rest` must be ARRAY, got INTEGER");
    assert_runtime_error("push(1, 1)", "argument to `push` must be ARRAY, got INTEGER");
}

#[test]
fn unbounded_recursion_overflows_the_frame_stack() {
    assert_runtime_error("let f = fn() { f(); }; f();", "frame stack overflow");
}

#[test]
fn pushing_past_the_stack_capacity_overflows() {
    // An array literal pushes every element before collecting them; 2100
    // pushes exceed the 2048-slot operand stack.
    let mut source = String::from("[");
    for i in 0..2100 {
        if i > 0 {
            source.push_str(", ");
        }
        source.push('1');
    }
    source.push(']');
    assert_eq!(run_error(&source), RuntimeError::StackOverflow);
}

#[test]
fn errors_abort_the_run_at_the_failing_statement() {
    // The error fires before the final statement gets a chance to run.
    let err = run_error("let x = 1 + true; 999;");
    assert_eq!(
        err.to_string(),
        "unsupported types for binary operation: INTEGER BOOLEAN"
    );
}
