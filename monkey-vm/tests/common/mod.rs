// monkey-vm - Common test utilities
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Shared helpers for compiler and VM integration tests.
//!
//! In your test file, add:
//! ```ignore
//! mod common;
//! use common::*;
//! ```

#[allow(unused_imports)]
pub use monkey_code::{make, Instructions, Opcode};
#[allow(unused_imports)]
pub use monkey_core::Object;
#[allow(unused_imports)]
pub use monkey_vm::{Bytecode, CompileError, Compiler, RuntimeError, Vm};

/// Parse a program, panicking on parse errors.
pub fn parse(input: &str) -> monkey_parser::Program {
    let mut parser = monkey_parser::Parser::from_source(input);
    let program = parser.parse_program();
    assert!(
        parser.errors().is_empty(),
        "parser errors for {:?}: {:?}",
        input,
        parser.errors()
    );
    program
}

/// Compile a source string, panicking on compile errors.
pub fn compile(input: &str) -> Bytecode {
    let program = parse(input);
    let mut compiler = Compiler::new();
    compiler
        .compile(&program)
        .unwrap_or_else(|err| panic!("compiler error for {:?}: {}", input, err));
    compiler.bytecode()
}

/// Compile a source string, panicking unless it fails.
#[allow(dead_code)]
pub fn compile_error(input: &str) -> CompileError {
    let program = parse(input);
    let mut compiler = Compiler::new();
    match compiler.compile(&program) {
        Err(err) => err,
        Ok(()) => panic!("expected compile error for {:?}", input),
    }
}

/// Compile and run a source string, returning the last popped value.
#[allow(dead_code)]
pub fn run(input: &str) -> Object {
    let mut vm = Vm::new(compile(input));
    vm.run()
        .unwrap_or_else(|err| panic!("vm error for {:?}: {}", input, err));
    vm.last_popped().clone()
}

/// Compile and run a source string, panicking unless the VM fails.
#[allow(dead_code)]
pub fn run_error(input: &str) -> RuntimeError {
    let mut vm = Vm::new(compile(input));
    match vm.run() {
        Err(err) => err,
        Ok(()) => panic!("expected runtime error for {:?}", input),
    }
}

/// Assert that running `input` yields the given integer.
#[allow(dead_code)]
pub fn assert_integer(input: &str, expected: i64) {
    match run(input) {
        Object::Integer(value) => assert_eq!(value, expected, "input: {}", input),
        other => panic!("expected Integer for {:?}, got {:?}", input, other),
    }
}

/// Assert that running `input` yields the given boolean.
#[allow(dead_code)]
pub fn assert_boolean(input: &str, expected: bool) {
    match run(input) {
        Object::Boolean(value) => assert_eq!(value, expected, "input: {}", input),
        other => panic!("expected Boolean for {:?}, got {:?}", input, other),
    }
}

/// Flatten encoded instructions into one stream.
#[allow(dead_code)]
pub fn concat_instructions(pieces: &[Vec<u8>]) -> Instructions {
    let mut out = Instructions::new();
    for piece in pieces {
        out.push(piece);
    }
    out
}

/// What a constant-pool slot should hold.
#[allow(dead_code)]
#[derive(Debug)]
pub enum Constant {
    Int(i64),
    Str(&'static str),
    /// A compiled function body, as the instructions it should contain.
    Function(Vec<Vec<u8>>),
}

/// Assert instruction-level compiler output: the bytecode's main
/// instructions and its constant pool.
#[allow(dead_code)]
pub fn assert_compiles(input: &str, constants: &[Constant], instructions: &[Vec<u8>]) {
    let bytecode = compile(input);

    let expected = concat_instructions(instructions);
    assert_eq!(
        bytecode.instructions.to_string(),
        expected.to_string(),
        "wrong instructions for {:?}",
        input
    );

    assert_eq!(
        bytecode.constants.len(),
        constants.len(),
        "wrong number of constants for {:?}: {:?}",
        input,
        bytecode.constants
    );
    for (i, expected) in constants.iter().enumerate() {
        match (expected, &bytecode.constants[i]) {
            (Constant::Int(want), Object::Integer(got)) => {
                assert_eq!(got, want, "constant {} of {:?}", i, input)
            }
            (Constant::Str(want), Object::String(got)) => {
                assert_eq!(got.as_str(), *want, "constant {} of {:?}", i, input)
            }
            (Constant::Function(want), Object::CompiledFunction(got)) => {
                let want = concat_instructions(want);
                assert_eq!(
                    got.instructions.to_string(),
                    want.to_string(),
                    "constant {} of {:?}",
                    i,
                    input
                );
            }
            (want, got) => panic!(
                "constant {} of {:?}: expected {:?}, got {:?}",
                i, input, want, got
            ),
        }
    }
}
