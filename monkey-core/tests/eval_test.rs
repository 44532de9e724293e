// monkey-core - Tree-walking evaluator tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

mod common;

use common::*;

#[test]
fn evaluates_integer_expressions() {
    let cases = [
        ("5", 5),
        ("-5", -5),
        ("5 + 5 + 5 + 5 - 10", 10),
        ("2 * 2 * 2 * 2 * 2", 32),
        ("50 / 2 * 2 + 10", 60),
        ("3 * (3 * 3) + 10", 37),
        ("(5 + 10 * 2 + 15 / 3) * 2 + -10", 50),
    ];
    for (input, expected) in cases {
        assert_integer(input, expected);
    }
}

#[test]
fn evaluates_boolean_expressions() {
    let cases = [
        ("true", true),
        ("false", false),
        ("1 < 2", true),
        ("1 > 2", false),
        ("1 <= 1", true),
        ("1 >= 2", false),
        ("1 == 1", true),
        ("1 != 1", false),
        ("true == true", true),
        ("true != false", true),
        ("(1 < 2) == true", true),
        ("!true", false),
        ("!!true", true),
        ("!5", false),
        ("!!if (false) { 5 }", false),
    ];
    for (input, expected) in cases {
        assert_boolean(input, expected);
    }
}

#[test]
fn evaluates_conditionals() {
    assert_integer("if (true) { 10 }", 10);
    assert_integer("if (1) { 10 }", 10);
    assert_integer("if (1 < 2) { 10 } else { 20 }", 10);
    assert_integer("if (1 > 2) { 10 } else { 20 }", 20);
    assert_eq!(eval_str("if (false) { 10 }"), Object::Null);
}

#[test]
fn evaluates_return_statements() {
    let cases = [
        ("return 10;", 10),
        ("return 10; 9;", 10),
        ("return 2 * 5; 9;", 10),
        ("9; return 2 * 5; 9;", 10),
        (
            "if (10 > 1) { if (10 > 1) { return 10; } return 1; }",
            10,
        ),
    ];
    for (input, expected) in cases {
        assert_integer(input, expected);
    }
}

#[test]
fn reports_errors() {
    let cases = [
        ("5 + true;", "type mismatch: INTEGER + BOOLEAN"),
        ("5 + true; 5;", "type mismatch: INTEGER + BOOLEAN"),
        ("-true", "unknown operator: -BOOLEAN"),
        ("true + false;", "unknown operator: BOOLEAN + BOOLEAN"),
        ("5; true + false; 5", "unknown operator: BOOLEAN + BOOLEAN"),
        (
            "if (10 > 1) { true + false; }",
            "unknown operator: BOOLEAN + BOOLEAN",
        ),
        ("foobar", "identifier not found: foobar"),
        (r#""Hello" - "World""#, "unknown operator: STRING - STRING"),
        (
            r#"{"name": "Monkey"}[fn(x) { x }];"#,
            "unusable as hash key: FUNCTION",
        ),
        ("5 / 0", "division by zero"),
        ("++5", "unknown operator: ++INTEGER"),
    ];
    for (input, expected) in cases {
        assert_error(input, expected);
    }
}

#[test]
fn evaluates_let_statements() {
    assert_integer("let a = 5; a;", 5);
    assert_integer("let a = 5 * 5; a;", 25);
    assert_integer("let a = 5; let b = a; b;", 5);
    assert_integer("let a = 5; let b = a; let c = a + b + 5; c;", 15);
}

#[test]
fn evaluates_functions_and_closures() {
    assert_integer("let identity = fn(x) { x; }; identity(5);", 5);
    assert_integer("let identity = fn(x) { return x; }; identity(5);", 5);
    assert_integer("let double = fn(x) { x * 2; }; double(5);", 10);
    assert_integer("let add = fn(x, y) { x + y; }; add(5, 5);", 10);
    assert_integer("let add = fn(x, y) { x + y; }; add(5 + 5, add(5, 5));", 20);
    assert_integer("fn(x) { x; }(5)", 5);
    assert_integer(
        "let newAdder = fn(x) { fn(y) { x + y }; };
         let addTwo = newAdder(2);
         addTwo(2);",
        4,
    );
    assert_error("fn(a, b) { a + b }(1)", "wrong number of arguments: want=2, got=1");
    assert_error("5(1)", "not a function: INTEGER");
}

#[test]
fn evaluates_recursive_functions() {
    assert_integer(
        "let fib = fn(x) { if (x < 2) { x } else { fib(x - 1) + fib(x - 2) } };
         fib(10);",
        55,
    );
}

#[test]
fn evaluates_strings() {
    assert_eq!(eval_str(r#""Hello World!""#), Object::string("Hello World!"));
    assert_eq!(
        eval_str(r#""Hello" + " " + "World!""#),
        Object::string("Hello World!")
    );
}

#[test]
fn evaluates_arrays_and_indexing() {
    let result = eval_str("[1, 2 * 2, 3 + 3]");
    match result {
        Object::Array(items) => {
            assert_eq!(items.len(), 3);
            assert_eq!(items[0], Object::Integer(1));
            assert_eq!(items[1], Object::Integer(4));
            assert_eq!(items[2], Object::Integer(6));
        }
        other => panic!("expected Array, got {:?}", other),
    }

    assert_integer("[1, 2, 3][0]", 1);
    assert_integer("let i = 0; [1][i];", 1);
    assert_integer("let myArray = [1, 2, 3]; myArray[2];", 3);
    assert_eq!(eval_str("[1, 2, 3][3]"), Object::Null);
    assert_eq!(eval_str("[1, 2, 3][-1]"), Object::Null);
}

#[test]
fn evaluates_hashes_and_indexing() {
    assert_integer(
        r#"let two = "two";
        let h = {"one": 10 - 9, two: 1 + 1, "thr" + "ee": 6 / 2, 4: 4, true: 5, false: 6};
        h["one"] + h["two"] + h["three"] + h[4] + h[true] + h[false]"#,
        21,
    );
    assert_integer(r#"{"foo": 5}["foo"]"#, 5);
    assert_eq!(eval_str(r#"{"foo": 5}["bar"]"#), Object::Null);
    assert_eq!(eval_str(r#"{}["foo"]"#), Object::Null);
    assert_integer("{5: 5}[5]", 5);
    assert_integer("{true: 5}[true]", 5);
}

#[test]
fn evaluates_builtins() {
    assert_integer(r#"len("")"#, 0);
    assert_integer(r#"len("four")"#, 4);
    assert_integer(r#"len("hello world")"#, 11);
    assert_integer("len([1, 2, 3])", 3);
    assert_error("len(1)", "argument to `len` not supported, got INTEGER");
    assert_error(r#"len("one", "two")"#, "wrong number of arguments. got=2, want=1");

    assert_integer("first([10, 20, 30])", 10);
    assert_eq!(eval_str("first([])"), Object::Null);
    assert_integer("last([10, 20, 30])", 30);
    assert_eq!(eval_str("last([])"), Object::Null);

    match eval_str("rest([10, 20, 30])") {
        Object::Array(items) => {
            assert_eq!(items.len(), 2);
            assert_eq!(items[0], Object::Integer(20));
        }
        other => panic!("expected Array, got {:?}", other),
    }
    assert_eq!(eval_str("rest([])"), Object::Null);

    match eval_str("push([1, 2], 3)") {
        Object::Array(items) => {
            assert_eq!(items.len(), 3);
            assert_eq!(items[2], Object::Integer(3));
        }
        other => panic!("expected Array, got {:?}", other),
    }
    assert_error("push(1, 1)", "argument to `push` must be ARRAY, got INTEGER");
}

#[test]
fn push_does_not_mutate_its_argument() {
    assert_integer("let a = [1, 2]; let b = push(a, 3); len(a)", 2);
    assert_integer("let a = [1, 2]; let b = push(a, 3); len(b)", 3);
}

#[test]
fn rejects_for_loops() {
    assert_error(
        "for (let i = 0; i < 10; let i = i + 1) { i }",
        "for loops are not supported",
    );
}
