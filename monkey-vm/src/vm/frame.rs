// monkey-vm - Bytecode compiler and stack-based virtual machine for the Monkey programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Call frames for the VM.

use std::rc::Rc;

use monkey_code::Instructions;
use monkey_core::object::Closure;

/// A call-activation record.
#[derive(Debug)]
pub struct Frame {
    closure: Rc<Closure>,

    /// Instruction pointer into the closure's instructions. Starts at -1;
    /// the run loop pre-increments before each fetch.
    pub ip: i64,

    /// Index of the frame's first local slot on the operand stack. Slots
    /// 0..num_parameters hold the arguments; further locals sit above.
    pub base_pointer: usize,
}

impl Frame {
    pub fn new(closure: Rc<Closure>, base_pointer: usize) -> Self {
        Frame {
            closure,
            ip: -1,
            base_pointer,
        }
    }

    #[inline]
    pub fn instructions(&self) -> &Instructions {
        &self.closure.func.instructions
    }

    #[inline]
    pub fn closure(&self) -> &Rc<Closure> {
        &self.closure
    }
}
