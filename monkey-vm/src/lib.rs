// monkey-vm - Bytecode compiler and stack-based virtual machine for the Monkey programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Bytecode compiler and stack-based virtual machine for Monkey.
//!
//! This crate provides an alternative execution model to the AST-walking
//! evaluator in `monkey-core`. A program is first compiled to bytecode by a
//! single recursive pass over the AST, then executed by a stack-based VM
//! with a call-frame stack and closure objects.

pub mod compiler;
pub mod vm;

pub use compiler::{Bytecode, CompileError, Compiler, Symbol, SymbolScope, SymbolTable};
pub use vm::{RuntimeError, Vm, GLOBALS_SIZE, MAX_FRAMES, STACK_SIZE};
