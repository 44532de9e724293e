// monkey-vm - Bytecode compiler and stack-based virtual machine for the Monkey programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Stack-based virtual machine executing Monkey bytecode.
//!
//! One VM owns an operand stack, a globals vector, and a call-frame stack;
//! nothing is shared between VM instances. Runtime errors are fatal to the
//! current [`Vm::run`].

pub mod frame;

use std::fmt;
use std::rc::Rc;

use im::{OrdMap, Vector};

use monkey_code::{read_u8, read_u16, Opcode};
use monkey_core::object::{Closure, CompiledFunction, HashPair, Object, ObjectType};
use monkey_core::BUILTINS;

use crate::compiler::Bytecode;

pub use frame::Frame;

/// Operand stack capacity.
pub const STACK_SIZE: usize = 2048;
/// Globals vector capacity.
pub const GLOBALS_SIZE: usize = 65536;
/// Call-frame stack capacity.
pub const MAX_FRAMES: usize = 1024;

const TRUE: Object = Object::Boolean(true);
const FALSE: Object = Object::Boolean(false);
const NULL: Object = Object::Null;

/// Runtime error during VM execution. Fatal to the current `run`.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Operand stack exceeded [`STACK_SIZE`].
    StackOverflow,
    /// Call-frame stack exceeded [`MAX_FRAMES`].
    FrameOverflow,
    /// Operand types with no binary operation.
    UnsupportedBinaryTypes { left: ObjectType, right: ObjectType },
    /// Operand types that support some operations, but not this one.
    UnknownOperator {
        op: &'static str,
        left: ObjectType,
        right: ObjectType,
    },
    /// Unary minus on a non-integer.
    UnsupportedNegation(ObjectType),
    DivisionByZero,
    /// Closure called with the wrong number of arguments.
    WrongArity { want: usize, got: usize },
    /// Call of a value that is neither closure nor builtin.
    NotCallable,
    /// Hash construction or lookup with a non-hashable key.
    UnusableHashKey(ObjectType),
    /// Index applied to a type that does not support it.
    IndexNotSupported(ObjectType),
    /// Error reported by a builtin function.
    Builtin(String),
    /// Invariant violation (corrupt bytecode, underflow).
    Internal(String),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::StackOverflow => write!(f, "stack overflow"),
            RuntimeError::FrameOverflow => write!(f, "frame stack overflow"),
            RuntimeError::UnsupportedBinaryTypes { left, right } => {
                write!(f, "unsupported types for binary operation: {} {}", left, right)
            }
            RuntimeError::UnknownOperator { op, left, right } => {
                write!(f, "unknown operator: {} ({} {})", op, left, right)
            }
            RuntimeError::UnsupportedNegation(operand) => {
                write!(f, "unsupported negation operation: -{}", operand)
            }
            RuntimeError::DivisionByZero => write!(f, "division by zero"),
            RuntimeError::WrongArity { want, got } => {
                write!(f, "wrong number of arguments: want={}, got={}", want, got)
            }
            RuntimeError::NotCallable => write!(f, "calling non-function"),
            RuntimeError::UnusableHashKey(key) => write!(f, "unusable as hash key: {}", key),
            RuntimeError::IndexNotSupported(left) => {
                write!(f, "index operator not supported: {}", left)
            }
            RuntimeError::Builtin(message) => write!(f, "{}", message),
            RuntimeError::Internal(message) => write!(f, "internal error: {}", message),
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Result type for VM operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// The Monkey virtual machine.
pub struct Vm {
    constants: Vec<Object>,

    /// Operand stack. `sp` points one past the top; the slot at `stack[sp]`
    /// after a pop keeps the popped value readable for the host.
    stack: Vec<Object>,
    sp: usize,

    globals: Vec<Object>,

    frames: Vec<Frame>,
}

impl Vm {
    pub fn new(bytecode: Bytecode) -> Self {
        Vm::with_globals(bytecode, vec![NULL; GLOBALS_SIZE])
    }

    /// A VM reusing an existing globals vector (REPL sessions keep their
    /// globals alive across lines this way).
    pub fn with_globals(bytecode: Bytecode, globals: Vec<Object>) -> Self {
        let main_fn = CompiledFunction {
            instructions: bytecode.instructions,
            num_locals: 0,
            num_parameters: 0,
        };
        let main_closure = Closure {
            func: Rc::new(main_fn),
            free: Vec::new(),
        };
        let mut frames = Vec::with_capacity(MAX_FRAMES);
        frames.push(Frame::new(Rc::new(main_closure), 0));

        Vm {
            constants: bytecode.constants,
            stack: vec![NULL; STACK_SIZE],
            sp: 0,
            globals,
            frames,
        }
    }

    /// Take the globals vector back out of a finished VM.
    pub fn into_globals(self) -> Vec<Object> {
        self.globals
    }

    /// The value most recently popped off the stack: the result of the last
    /// expression statement. Defined only after a successful [`run`](Self::run).
    pub fn last_popped(&self) -> &Object {
        &self.stack[self.sp]
    }

    /// Fetch-execute until the main frame's instructions are exhausted.
    pub fn run(&mut self) -> Result<()> {
        while self.current_frame().ip < self.current_frame().instructions().len() as i64 - 1 {
            self.current_frame_mut().ip += 1;

            let ip = self.current_frame().ip as usize;
            let op_byte = self.current_frame().instructions().0[ip];
            let op = Opcode::try_from(op_byte).map_err(RuntimeError::Internal)?;

            match op {
                Opcode::Constant => {
                    let idx = self.read_u16_operand(ip);
                    let constant = self
                        .constants
                        .get(idx)
                        .cloned()
                        .ok_or_else(|| internal("constant index out of bounds"))?;
                    self.push(constant)?;
                }
                Opcode::Pop => {
                    self.pop()?;
                }

                Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div => {
                    self.execute_binary_operation(op)?;
                }

                Opcode::Equal
                | Opcode::NotEqual
                | Opcode::Greater
                | Opcode::GreaterEqual
                | Opcode::Less
                | Opcode::LessEqual => {
                    self.execute_comparison(op)?;
                }

                Opcode::Bang => {
                    let operand = self.pop()?;
                    let result = match operand {
                        Object::Boolean(value) => native_bool(!value),
                        Object::Null => TRUE,
                        _ => FALSE,
                    };
                    self.push(result)?;
                }
                Opcode::Minus => {
                    let operand = self.pop()?;
                    match operand {
                        Object::Integer(value) => {
                            self.push(Object::Integer(value.wrapping_neg()))?
                        }
                        other => {
                            return Err(RuntimeError::UnsupportedNegation(other.object_type()))
                        }
                    }
                }

                Opcode::True => self.push(TRUE)?,
                Opcode::False => self.push(FALSE)?,
                Opcode::Null => self.push(NULL)?,

                Opcode::JumpNotTruthy => {
                    let target = self.read_u16_operand(ip);
                    let condition = self.pop()?;
                    if !condition.is_truthy() {
                        // -1 so the next pre-increment lands on the target.
                        self.current_frame_mut().ip = target as i64 - 1;
                    }
                }
                Opcode::Jump => {
                    let target = read_u16(&self.current_frame().instructions().0[ip + 1..]);
                    self.current_frame_mut().ip = target as i64 - 1;
                }

                Opcode::SetGlobal => {
                    let idx = self.read_u16_operand(ip);
                    self.globals[idx] = self.pop()?;
                }
                Opcode::GetGlobal => {
                    let idx = self.read_u16_operand(ip);
                    self.push(self.globals[idx].clone())?;
                }
                Opcode::SetLocal => {
                    let idx = self.read_u8_operand(ip);
                    let base = self.current_frame().base_pointer;
                    self.stack[base + idx] = self.pop()?;
                }
                Opcode::GetLocal => {
                    let idx = self.read_u8_operand(ip);
                    let base = self.current_frame().base_pointer;
                    self.push(self.stack[base + idx].clone())?;
                }

                Opcode::Array => {
                    let count = self.read_u16_operand(ip);
                    let array = self.build_array(self.sp - count, self.sp);
                    self.sp -= count;
                    self.push(array)?;
                }
                Opcode::Hash => {
                    let count = self.read_u16_operand(ip);
                    let hash = self.build_hash(self.sp - count, self.sp)?;
                    self.sp -= count;
                    self.push(hash)?;
                }
                Opcode::Index => {
                    let index = self.pop()?;
                    let left = self.pop()?;
                    self.execute_index_expression(left, index)?;
                }

                Opcode::Call => {
                    let num_args = self.read_u8_operand(ip);
                    self.execute_call(num_args)?;
                }
                Opcode::ReturnValue => {
                    let return_value = self.pop()?;
                    let frame = self.pop_frame()?;
                    if self.frames.is_empty() {
                        // A top-level `return` ends the program; leave the
                        // value in the last-popped slot.
                        self.push(return_value)?;
                        self.pop()?;
                        return Ok(());
                    }
                    self.sp = frame.base_pointer - 1;
                    self.push(return_value)?;
                }
                Opcode::Return => {
                    let frame = self.pop_frame()?;
                    if self.frames.is_empty() {
                        self.push(NULL)?;
                        self.pop()?;
                        return Ok(());
                    }
                    self.sp = frame.base_pointer - 1;
                    self.push(NULL)?;
                }

                Opcode::GetBuiltin => {
                    let idx = self.read_u8_operand(ip);
                    let builtin = BUILTINS
                        .get(idx)
                        .ok_or_else(|| internal("builtin index out of bounds"))?;
                    self.push(Object::Builtin(*builtin))?;
                }
                Opcode::Closure => {
                    let const_idx = self.read_u16_operand(ip);
                    let num_free = self.read_u8_operand(ip + 2);
                    self.push_closure(const_idx, num_free)?;
                }
                Opcode::GetFree => {
                    let idx = self.read_u8_operand(ip);
                    let free = self
                        .current_frame()
                        .closure()
                        .free
                        .get(idx)
                        .cloned()
                        .ok_or_else(|| internal("free variable index out of bounds"))?;
                    self.push(free)?;
                }
                Opcode::CurrentClosure => {
                    let closure = Rc::clone(self.current_frame().closure());
                    self.push(Object::Closure(closure))?;
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Operand decoding
    // =========================================================================

    /// Read a u16 operand at `ip + 1` and advance past it.
    fn read_u16_operand(&mut self, ip: usize) -> usize {
        let operand = read_u16(&self.current_frame().instructions().0[ip + 1..]) as usize;
        self.current_frame_mut().ip += 2;
        operand
    }

    /// Read a u8 operand at `ip + 1` and advance past it.
    fn read_u8_operand(&mut self, ip: usize) -> usize {
        let operand = read_u8(&self.current_frame().instructions().0[ip + 1..]) as usize;
        self.current_frame_mut().ip += 1;
        operand
    }

    // =========================================================================
    // Stack
    // =========================================================================

    fn push(&mut self, obj: Object) -> Result<()> {
        if self.sp >= STACK_SIZE {
            return Err(RuntimeError::StackOverflow);
        }
        self.stack[self.sp] = obj;
        self.sp += 1;
        Ok(())
    }

    fn pop(&mut self) -> Result<Object> {
        if self.sp == 0 {
            return Err(internal("stack underflow"));
        }
        self.sp -= 1;
        Ok(self.stack[self.sp].clone())
    }

    // =========================================================================
    // Frames
    // =========================================================================

    fn current_frame(&self) -> &Frame {
        self.frames.last().expect("no active frame")
    }

    fn current_frame_mut(&mut self) -> &mut Frame {
        self.frames.last_mut().expect("no active frame")
    }

    fn push_frame(&mut self, frame: Frame) -> Result<()> {
        if self.frames.len() >= MAX_FRAMES {
            return Err(RuntimeError::FrameOverflow);
        }
        self.frames.push(frame);
        Ok(())
    }

    fn pop_frame(&mut self) -> Result<Frame> {
        self.frames.pop().ok_or_else(|| internal("no frame to pop"))
    }

    // =========================================================================
    // Dispatch helpers
    // =========================================================================

    fn execute_binary_operation(&mut self, op: Opcode) -> Result<()> {
        let right = self.pop()?;
        let left = self.pop()?;
        match (&left, &right) {
            (Object::Integer(l), Object::Integer(r)) => {
                self.execute_binary_integer_operation(op, *l, *r)
            }
            (Object::String(l), Object::String(r)) => {
                if op != Opcode::Add {
                    return Err(RuntimeError::UnknownOperator {
                        op: op.definition().name,
                        left: ObjectType::String,
                        right: ObjectType::String,
                    });
                }
                self.push(Object::string(format!("{}{}", l, r)))
            }
            _ => Err(RuntimeError::UnsupportedBinaryTypes {
                left: left.object_type(),
                right: right.object_type(),
            }),
        }
    }

    fn execute_binary_integer_operation(&mut self, op: Opcode, left: i64, right: i64) -> Result<()> {
        let result = match op {
            Opcode::Add => left.wrapping_add(right),
            Opcode::Sub => left.wrapping_sub(right),
            Opcode::Mul => left.wrapping_mul(right),
            Opcode::Div => {
                if right == 0 {
                    return Err(RuntimeError::DivisionByZero);
                }
                left.wrapping_div(right)
            }
            _ => return Err(internal("non-arithmetic opcode in binary operation")),
        };
        self.push(Object::Integer(result))
    }

    fn execute_comparison(&mut self, op: Opcode) -> Result<()> {
        let right = self.pop()?;
        let left = self.pop()?;
        match (&left, &right) {
            (Object::Integer(l), Object::Integer(r)) => {
                let result = match op {
                    Opcode::Equal => l == r,
                    Opcode::NotEqual => l != r,
                    Opcode::Greater => l > r,
                    Opcode::GreaterEqual => l >= r,
                    Opcode::Less => l < r,
                    Opcode::LessEqual => l <= r,
                    _ => return Err(internal("non-comparison opcode in comparison")),
                };
                self.push(native_bool(result))
            }
            (Object::Boolean(l), Object::Boolean(r)) => {
                let result = match op {
                    Opcode::Equal => l == r,
                    Opcode::NotEqual => l != r,
                    _ => {
                        return Err(RuntimeError::UnknownOperator {
                            op: op.definition().name,
                            left: ObjectType::Boolean,
                            right: ObjectType::Boolean,
                        })
                    }
                };
                self.push(native_bool(result))
            }
            _ => Err(RuntimeError::UnsupportedBinaryTypes {
                left: left.object_type(),
                right: right.object_type(),
            }),
        }
    }

    fn build_array(&self, start: usize, end: usize) -> Object {
        let mut items = Vector::new();
        for i in start..end {
            items.push_back(self.stack[i].clone());
        }
        Object::Array(items)
    }

    fn build_hash(&self, start: usize, end: usize) -> Result<Object> {
        let mut pairs = OrdMap::new();
        let mut i = start;
        while i < end {
            let key = self.stack[i].clone();
            let value = self.stack[i + 1].clone();
            let hash_key = key
                .hash_key()
                .ok_or_else(|| RuntimeError::UnusableHashKey(key.object_type()))?;
            pairs.insert(hash_key, HashPair { key, value });
            i += 2;
        }
        Ok(Object::Hash(pairs))
    }

    fn execute_index_expression(&mut self, left: Object, index: Object) -> Result<()> {
        match (&left, &index) {
            (Object::Array(items), Object::Integer(i)) => {
                let result = if *i < 0 || *i as usize >= items.len() {
                    NULL
                } else {
                    items[*i as usize].clone()
                };
                self.push(result)
            }
            (Object::Hash(pairs), _) => {
                let key = index
                    .hash_key()
                    .ok_or_else(|| RuntimeError::UnusableHashKey(index.object_type()))?;
                let result = pairs
                    .get(&key)
                    .map(|pair| pair.value.clone())
                    .unwrap_or(NULL);
                self.push(result)
            }
            _ => Err(RuntimeError::IndexNotSupported(left.object_type())),
        }
    }

    fn execute_call(&mut self, num_args: usize) -> Result<()> {
        let callee = self.stack[self.sp - 1 - num_args].clone();
        match callee {
            Object::Closure(closure) => self.call_closure(closure, num_args),
            Object::Builtin(builtin) => {
                let args = &self.stack[self.sp - num_args..self.sp];
                let result = (builtin.func)(args);
                self.sp = self.sp - num_args - 1;
                match result {
                    Some(Object::Error(message)) => Err(RuntimeError::Builtin(message)),
                    Some(value) => self.push(value),
                    None => self.push(NULL),
                }
            }
            _ => Err(RuntimeError::NotCallable),
        }
    }

    fn call_closure(&mut self, closure: Rc<Closure>, num_args: usize) -> Result<()> {
        if num_args != closure.func.num_parameters {
            return Err(RuntimeError::WrongArity {
                want: closure.func.num_parameters,
                got: num_args,
            });
        }

        let base_pointer = self.sp - num_args;
        let next_sp = base_pointer + closure.func.num_locals;
        if next_sp > STACK_SIZE {
            return Err(RuntimeError::StackOverflow);
        }

        self.push_frame(Frame::new(closure, base_pointer))?;
        // Arguments already occupy the first local slots; reserve the rest.
        self.sp = next_sp;
        Ok(())
    }

    fn push_closure(&mut self, const_idx: usize, num_free: usize) -> Result<()> {
        let constant = self
            .constants
            .get(const_idx)
            .cloned()
            .ok_or_else(|| internal("closure constant index out of bounds"))?;
        let Object::CompiledFunction(func) = constant else {
            return Err(internal("closure constant is not a function"));
        };

        let free = self.stack[self.sp - num_free..self.sp].to_vec();
        self.sp -= num_free;

        self.push(Object::Closure(Rc::new(Closure { func, free })))
    }
}

fn native_bool(value: bool) -> Object {
    if value {
        TRUE
    } else {
        FALSE
    }
}

fn internal(message: &str) -> RuntimeError {
    RuntimeError::Internal(message.to_string())
}
