// monkey-code - Bytecode instruction set and encoding for the Monkey programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Bytecode instruction definitions and the linear byte encoding.
//!
//! Instructions are a flat byte stream: a one-byte opcode followed by its
//! operands in a fixed per-opcode layout. Multi-byte operands are big-endian.
//! The byte values of the opcodes and the operand widths are part of the
//! bytecode contract and must not change.

pub mod code;

pub use code::{
    lookup, make, read_operands, read_u8, read_u16, Definition, Instructions, Opcode,
};
