// monkey-core - Runtime value model, builtins, and tree-walking evaluator for the Monkey programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The Monkey runtime value: a single tagged sum with flat match dispatch.
//!
//! Heap payloads sit behind `Rc`, and aggregates use `im` persistent
//! collections, so cloning a value is cheap and values never form reference
//! cycles (closures capture by value of the current binding).

use std::fmt;
use std::rc::Rc;

use im::{OrdMap, Vector};

use monkey_code::Instructions;
use monkey_parser::ast::{BlockStatement, Identifier};

use crate::env::Env;

/// Type tag of a runtime value, as it appears in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Integer,
    Boolean,
    Null,
    String,
    Array,
    Hash,
    Function,
    CompiledFunction,
    Closure,
    Builtin,
    ReturnValue,
    Error,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObjectType::Integer => "INTEGER",
            ObjectType::Boolean => "BOOLEAN",
            ObjectType::Null => "NULL",
            ObjectType::String => "STRING",
            ObjectType::Array => "ARRAY",
            ObjectType::Hash => "HASH",
            ObjectType::Function => "FUNCTION",
            ObjectType::CompiledFunction => "COMPILED_FUNCTION_OBJ",
            ObjectType::Closure => "CLOSURE",
            ObjectType::Builtin => "BUILTIN",
            ObjectType::ReturnValue => "RETURN_VALUE",
            ObjectType::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// A Monkey runtime value.
#[derive(Debug, Clone)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    Null,
    String(Rc<String>),
    Array(Vector<Object>),
    Hash(OrdMap<HashKey, HashPair>),
    /// Tree-walker function: parameters, body, and the captured environment.
    Function(Rc<Function>),
    CompiledFunction(Rc<CompiledFunction>),
    Closure(Rc<Closure>),
    Builtin(Builtin),
    /// Sentinel wrapping a `return`ed value while it unwinds the evaluator.
    /// The VM never produces this.
    ReturnValue(Box<Object>),
    /// Evaluator error carrier. The VM signals errors out-of-band.
    Error(String),
}

impl Object {
    pub fn string(s: impl Into<String>) -> Object {
        Object::String(Rc::new(s.into()))
    }

    pub fn error(message: impl Into<String>) -> Object {
        Object::Error(message.into())
    }

    /// The value's type tag.
    pub fn object_type(&self) -> ObjectType {
        match self {
            Object::Integer(_) => ObjectType::Integer,
            Object::Boolean(_) => ObjectType::Boolean,
            Object::Null => ObjectType::Null,
            Object::String(_) => ObjectType::String,
            Object::Array(_) => ObjectType::Array,
            Object::Hash(_) => ObjectType::Hash,
            Object::Function(_) => ObjectType::Function,
            Object::CompiledFunction(_) => ObjectType::CompiledFunction,
            Object::Closure(_) => ObjectType::Closure,
            Object::Builtin(_) => ObjectType::Builtin,
            Object::ReturnValue(_) => ObjectType::ReturnValue,
            Object::Error(_) => ObjectType::Error,
        }
    }

    /// Human-readable rendering, as printed by the REPL and `puts`.
    pub fn inspect(&self) -> String {
        match self {
            Object::Integer(value) => value.to_string(),
            Object::Boolean(value) => value.to_string(),
            Object::Null => "null".to_string(),
            Object::String(value) => value.as_ref().clone(),
            Object::Array(items) => {
                let items: Vec<String> = items.iter().map(|o| o.inspect()).collect();
                format!("[{}]", items.join(", "))
            }
            Object::Hash(pairs) => {
                let pairs: Vec<String> = pairs
                    .values()
                    .map(|p| format!("{}: {}", p.key.inspect(), p.value.inspect()))
                    .collect();
                format!("{{{}}}", pairs.join(", "))
            }
            Object::Function(func) => {
                let params: Vec<String> =
                    func.parameters.iter().map(|p| p.to_string()).collect();
                format!("fn({}) {{\n{}\n}}", params.join(", "), func.body)
            }
            Object::CompiledFunction(func) => {
                format!("CompiledFunction[{:p}]", Rc::as_ptr(func))
            }
            Object::Closure(closure) => format!("Closure[{:p}]", Rc::as_ptr(closure)),
            Object::Builtin(_) => "builtin function".to_string(),
            Object::ReturnValue(value) => value.inspect(),
            Object::Error(message) => format!("ERROR: {}", message),
        }
    }

    /// The hash key of a hashable value (Integer, Boolean, String).
    /// Returns `None` for every other variant.
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Object::Integer(value) => Some(HashKey {
                tag: HashKeyTag::Integer,
                value: *value as u64,
            }),
            Object::Boolean(value) => Some(HashKey {
                tag: HashKeyTag::Boolean,
                value: u64::from(*value),
            }),
            Object::String(value) => Some(HashKey {
                tag: HashKeyTag::String,
                value: fnv1a(value.as_bytes()),
            }),
            _ => None,
        }
    }

    /// Null and `false` are the only non-truthy values.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Null | Object::Boolean(false))
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Integer(a), Object::Integer(b)) => a == b,
            (Object::Boolean(a), Object::Boolean(b)) => a == b,
            (Object::Null, Object::Null) => true,
            (Object::String(a), Object::String(b)) => a == b,
            (Object::Array(a), Object::Array(b)) => a == b,
            (Object::Hash(a), Object::Hash(b)) => a == b,
            (Object::Function(a), Object::Function(b)) => Rc::ptr_eq(a, b),
            (Object::CompiledFunction(a), Object::CompiledFunction(b)) => Rc::ptr_eq(a, b),
            (Object::Closure(a), Object::Closure(b)) => Rc::ptr_eq(a, b),
            (Object::Builtin(a), Object::Builtin(b)) => a == b,
            (Object::ReturnValue(a), Object::ReturnValue(b)) => a == b,
            (Object::Error(a), Object::Error(b)) => a == b,
            _ => false,
        }
    }
}

/// Which hashable variant a [`HashKey`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HashKeyTag {
    Integer,
    Boolean,
    String,
}

/// Key of a hash entry: the variant tag plus a 64-bit payload (integer bit
/// pattern, boolean 0/1, or FNV-1a of the string bytes). Equal values of the
/// same variant always produce equal keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HashKey {
    pub tag: HashKeyTag,
    pub value: u64,
}

/// 64-bit FNV-1a.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = OFFSET_BASIS;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// One hash entry: the original key object alongside its value.
#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Object,
    pub value: Object,
}

/// A function value in the tree-walking engine.
#[derive(Debug)]
pub struct Function {
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
    pub env: Env,
}

/// A compiled function body: instructions plus frame-layout bookkeeping.
/// Lives in the constant pool; closures wrap it at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFunction {
    pub instructions: Instructions,
    pub num_locals: usize,
    pub num_parameters: usize,
}

/// A compiled function together with the free values captured when the
/// `Closure` instruction executed.
#[derive(Debug)]
pub struct Closure {
    pub func: Rc<CompiledFunction>,
    pub free: Vec<Object>,
}

/// Signature of a native builtin. Returns `None` when the builtin produces
/// no value (the caller substitutes Null); failures come back as
/// [`Object::Error`].
pub type BuiltinFunction = fn(&[Object]) -> Option<Object>;

/// A named native function from the process-wide registry.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFunction,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builtin").field("name", &self.name).finish()
    }
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.func as usize == other.func as usize
    }
}
