// monkey-vm - Bytecode compiler and stack-based virtual machine for the Monkey programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! One-pass bytecode compiler: a single recursive walk over the AST.
//!
//! Each function body is compiled in its own [`CompilationScope`]; the
//! constant pool is shared across scopes. Compilation stops at the first
//! error and returns no partial bytecode.

pub mod symbol_table;

use std::fmt;
use std::rc::Rc;

use monkey_code::{make, Instructions, Opcode};
use monkey_core::object::{CompiledFunction, Object};
use monkey_core::BUILTINS;
use monkey_parser::ast::{BlockStatement, Expression, Program, Statement};

pub use symbol_table::{Symbol, SymbolScope, SymbolTable};

/// Constant pool indices are u16 operands.
const MAX_CONSTANTS: usize = 65536;
/// Local slots are u8 operands; this cap is part of the bytecode contract.
const MAX_LOCALS: usize = 256;
/// Global slots are u16 operands.
const MAX_GLOBALS: usize = 65536;

/// Error during compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Identifier that resolves nowhere.
    UndefinedVariable(String),
    /// Infix operator with no opcode.
    UnknownOperator(String),
    /// Prefix operator with no opcode (`++`, `--`, ...).
    UnknownPrefixOperator(String),
    /// Surface syntax the bytecode pipeline rejects (for loops).
    UnsupportedConstruct(&'static str),
    /// Constant pool exceeded the u16 operand range.
    TooManyConstants,
    /// More than 256 locals in one function.
    TooManyLocals,
    /// More than 65536 global bindings.
    TooManyGlobals,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::UndefinedVariable(name) => write!(f, "undefined variable {}", name),
            CompileError::UnknownOperator(op) => write!(f, "unknown operator {}", op),
            CompileError::UnknownPrefixOperator(op) => {
                write!(f, "unknown prefix operator {}", op)
            }
            CompileError::UnsupportedConstruct(what) => {
                write!(f, "{} are not supported", what)
            }
            CompileError::TooManyConstants => write!(f, "too many constants"),
            CompileError::TooManyLocals => write!(f, "too many local variables in function"),
            CompileError::TooManyGlobals => write!(f, "too many global bindings"),
        }
    }
}

impl std::error::Error for CompileError {}

/// Result type for compilation.
pub type Result<T> = std::result::Result<T, CompileError>;

/// The compiler's output: the top-level instruction stream plus the shared
/// constant pool (compiled function bodies live inside the pool).
#[derive(Debug, Clone)]
pub struct Bytecode {
    pub instructions: Instructions,
    pub constants: Vec<Object>,
}

/// Opcode and byte position of an emitted instruction.
#[derive(Debug, Clone, Copy)]
struct EmittedInstruction {
    opcode: Opcode,
    position: usize,
}

/// Per-function emission state: the instruction buffer and the last two
/// emitted instructions (for tail-`Pop` rewriting).
#[derive(Debug, Default)]
struct CompilationScope {
    instructions: Instructions,
    last_instruction: Option<EmittedInstruction>,
    prev_instruction: Option<EmittedInstruction>,
}

pub struct Compiler {
    constants: Vec<Object>,
    symbol_table: SymbolTable,
    scopes: Vec<CompilationScope>,
    scope_index: usize,
}

impl Compiler {
    pub fn new() -> Self {
        let mut symbol_table = SymbolTable::new();
        for (i, builtin) in BUILTINS.iter().enumerate() {
            symbol_table.define_builtin(i, builtin.name);
        }
        Compiler {
            constants: Vec::new(),
            symbol_table,
            scopes: vec![CompilationScope::default()],
            scope_index: 0,
        }
    }

    /// Resume compilation with a symbol table and constant pool carried over
    /// from an earlier unit. Previously interned constants keep their
    /// indices.
    pub fn with_state(symbol_table: SymbolTable, constants: Vec<Object>) -> Self {
        Compiler {
            constants,
            symbol_table,
            scopes: vec![CompilationScope::default()],
            scope_index: 0,
        }
    }

    /// Tear the compiler down into its reusable state.
    pub fn into_state(self) -> (SymbolTable, Vec<Object>) {
        (self.symbol_table, self.constants)
    }

    pub fn compile(&mut self, program: &Program) -> Result<()> {
        for statement in &program.statements {
            self.compile_statement(statement)?;
        }
        Ok(())
    }

    /// The compiled artifact. Valid once [`compile`](Self::compile) has
    /// returned without error.
    pub fn bytecode(&self) -> Bytecode {
        Bytecode {
            instructions: self.current_instructions().clone(),
            constants: self.constants.clone(),
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn compile_statement(&mut self, statement: &Statement) -> Result<()> {
        match statement {
            Statement::Expression { expression } => {
                self.compile_expression(expression)?;
                self.emit(Opcode::Pop, &[]);
            }
            Statement::Let { name, value } => {
                self.compile_expression(value)?;
                let symbol = self.symbol_table.define(&name.value);
                match symbol.scope {
                    SymbolScope::Local => {
                        if symbol.index >= MAX_LOCALS {
                            return Err(CompileError::TooManyLocals);
                        }
                        self.emit(Opcode::SetLocal, &[symbol.index]);
                    }
                    _ => {
                        if symbol.index >= MAX_GLOBALS {
                            return Err(CompileError::TooManyGlobals);
                        }
                        self.emit(Opcode::SetGlobal, &[symbol.index]);
                    }
                }
            }
            Statement::Return { return_value } => {
                self.compile_expression(return_value)?;
                self.emit(Opcode::ReturnValue, &[]);
            }
        }
        Ok(())
    }

    fn compile_block(&mut self, block: &BlockStatement) -> Result<()> {
        for statement in &block.statements {
            self.compile_statement(statement)?;
        }
        Ok(())
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn compile_expression(&mut self, expression: &Expression) -> Result<()> {
        match expression {
            Expression::IntegerLiteral(value) => {
                let integer = Object::Integer(*value);
                let idx = self.add_constant(integer)?;
                self.emit(Opcode::Constant, &[idx]);
            }
            Expression::StringLiteral(value) => {
                let string = Object::string(value.clone());
                let idx = self.add_constant(string)?;
                self.emit(Opcode::Constant, &[idx]);
            }
            Expression::Boolean(true) => {
                self.emit(Opcode::True, &[]);
            }
            Expression::Boolean(false) => {
                self.emit(Opcode::False, &[]);
            }
            Expression::Identifier(ident) => {
                let symbol = self
                    .symbol_table
                    .resolve(&ident.value)
                    .ok_or_else(|| CompileError::UndefinedVariable(ident.value.clone()))?;
                self.load_symbol(&symbol);
            }
            Expression::Prefix { operator, right } => {
                self.compile_expression(right)?;
                match operator.as_str() {
                    "!" => self.emit(Opcode::Bang, &[]),
                    "-" => self.emit(Opcode::Minus, &[]),
                    other => {
                        return Err(CompileError::UnknownPrefixOperator(other.to_string()))
                    }
                };
            }
            Expression::Infix {
                operator,
                left,
                right,
            } => {
                self.compile_expression(left)?;
                self.compile_expression(right)?;
                let op = match operator.as_str() {
                    "+" => Opcode::Add,
                    "-" => Opcode::Sub,
                    "*" => Opcode::Mul,
                    "/" => Opcode::Div,
                    ">" => Opcode::Greater,
                    ">=" => Opcode::GreaterEqual,
                    "<" => Opcode::Less,
                    "<=" => Opcode::LessEqual,
                    "==" => Opcode::Equal,
                    "!=" => Opcode::NotEqual,
                    other => return Err(CompileError::UnknownOperator(other.to_string())),
                };
                self.emit(op, &[]);
            }
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                self.compile_expression(condition)?;

                // Placeholder target, patched once the consequence is known.
                let jump_not_truthy_pos = self.emit(Opcode::JumpNotTruthy, &[9999]);

                self.compile_block(consequence)?;
                if self.last_instruction_is(Opcode::Pop) {
                    self.remove_last_pop();
                }

                let jump_pos = self.emit(Opcode::Jump, &[9999]);

                let after_consequence = self.current_instructions().len();
                self.change_operand(jump_not_truthy_pos, after_consequence);

                match alternative {
                    None => {
                        self.emit(Opcode::Null, &[]);
                    }
                    Some(alternative) => {
                        self.compile_block(alternative)?;
                        if self.last_instruction_is(Opcode::Pop) {
                            self.remove_last_pop();
                        }
                    }
                }

                let after_alternative = self.current_instructions().len();
                self.change_operand(jump_pos, after_alternative);
            }
            Expression::ArrayLiteral { items } => {
                for item in items {
                    self.compile_expression(item)?;
                }
                self.emit(Opcode::Array, &[items.len()]);
            }
            Expression::HashLiteral { pairs } => {
                // Emit keys in source-text order so bytecode is deterministic
                // regardless of how the pairs were collected.
                let mut sorted: Vec<&(Expression, Expression)> = pairs.iter().collect();
                sorted.sort_by_key(|(key, _)| key.to_string());
                for (key, value) in sorted {
                    self.compile_expression(key)?;
                    self.compile_expression(value)?;
                }
                self.emit(Opcode::Hash, &[pairs.len() * 2]);
            }
            Expression::IndexExpression { left, index } => {
                self.compile_expression(left)?;
                self.compile_expression(index)?;
                self.emit(Opcode::Index, &[]);
            }
            Expression::FunctionLiteral {
                name,
                parameters,
                body,
            } => {
                self.compile_function_literal(name.as_deref(), parameters, body)?;
            }
            Expression::Call {
                function,
                arguments,
            } => {
                self.compile_expression(function)?;
                for argument in arguments {
                    self.compile_expression(argument)?;
                }
                self.emit(Opcode::Call, &[arguments.len()]);
            }
            Expression::ForLoop { .. } => {
                return Err(CompileError::UnsupportedConstruct("for loops"));
            }
        }
        Ok(())
    }

    fn compile_function_literal(
        &mut self,
        name: Option<&str>,
        parameters: &[monkey_parser::ast::Identifier],
        body: &BlockStatement,
    ) -> Result<()> {
        self.enter_scope();

        if let Some(name) = name {
            self.symbol_table.define_function_name(name);
        }
        for parameter in parameters {
            self.symbol_table.define(&parameter.value);
        }

        self.compile_block(body)?;

        if self.last_instruction_is(Opcode::Pop) {
            self.replace_last_pop_with_return();
        }
        if !self.last_instruction_is(Opcode::ReturnValue) {
            self.emit(Opcode::Return, &[]);
        }

        let free_symbols = self.symbol_table.free_symbols.clone();
        let num_locals = self.symbol_table.num_definitions;
        let instructions = self.leave_scope();

        if num_locals > MAX_LOCALS {
            return Err(CompileError::TooManyLocals);
        }

        // Load each captured value in the enclosing scope, in free-list
        // order; the Closure instruction pops them into the closure.
        for free in &free_symbols {
            self.load_symbol(free);
        }

        let compiled = CompiledFunction {
            instructions,
            num_locals,
            num_parameters: parameters.len(),
        };
        let idx = self.add_constant(Object::CompiledFunction(Rc::new(compiled)))?;
        self.emit(Opcode::Closure, &[idx, free_symbols.len()]);
        Ok(())
    }

    fn load_symbol(&mut self, symbol: &Symbol) {
        match symbol.scope {
            SymbolScope::Global => self.emit(Opcode::GetGlobal, &[symbol.index]),
            SymbolScope::Local => self.emit(Opcode::GetLocal, &[symbol.index]),
            SymbolScope::Builtin => self.emit(Opcode::GetBuiltin, &[symbol.index]),
            SymbolScope::Free => self.emit(Opcode::GetFree, &[symbol.index]),
            SymbolScope::Function => self.emit(Opcode::CurrentClosure, &[]),
        };
    }

    // =========================================================================
    // Emission
    // =========================================================================

    /// Intern a constant, returning its pool index.
    fn add_constant(&mut self, obj: Object) -> Result<usize> {
        if self.constants.len() >= MAX_CONSTANTS {
            return Err(CompileError::TooManyConstants);
        }
        self.constants.push(obj);
        Ok(self.constants.len() - 1)
    }

    /// Encode and append an instruction, returning its byte position.
    fn emit(&mut self, op: Opcode, operands: &[usize]) -> usize {
        let ins = make(op, operands);
        let position = self.scopes[self.scope_index].instructions.push(&ins);
        self.set_last_instruction(op, position);
        position
    }

    fn set_last_instruction(&mut self, opcode: Opcode, position: usize) {
        let scope = &mut self.scopes[self.scope_index];
        scope.prev_instruction = scope.last_instruction;
        scope.last_instruction = Some(EmittedInstruction { opcode, position });
    }

    fn last_instruction_is(&self, op: Opcode) -> bool {
        self.scopes[self.scope_index]
            .last_instruction
            .map(|last| last.opcode == op)
            .unwrap_or(false)
    }

    /// Drop a trailing `Pop` so the expression's value survives as the value
    /// of the surrounding `if` arm.
    fn remove_last_pop(&mut self) {
        let scope = &mut self.scopes[self.scope_index];
        let last = scope.last_instruction.expect("no instruction to remove");
        scope.instructions.0.truncate(last.position);
        scope.last_instruction = scope.prev_instruction;
    }

    fn replace_instruction(&mut self, position: usize, new_instruction: &[u8]) {
        let instructions = &mut self.scopes[self.scope_index].instructions.0;
        instructions[position..position + new_instruction.len()]
            .copy_from_slice(new_instruction);
    }

    /// Back-patch the operand of the (single-operand) instruction at
    /// `position`.
    fn change_operand(&mut self, position: usize, operand: usize) {
        let op = Opcode::try_from(self.scopes[self.scope_index].instructions.0[position])
            .expect("patching an undefined opcode");
        let new_instruction = make(op, &[operand]);
        self.replace_instruction(position, &new_instruction);
    }

    /// Rewrite a trailing `Pop` into `ReturnValue` (same width), making the
    /// function body's final expression its return value.
    fn replace_last_pop_with_return(&mut self) {
        let last_pos = self.scopes[self.scope_index]
            .last_instruction
            .expect("no instruction to replace")
            .position;
        let new_instruction = make(Opcode::ReturnValue, &[]);
        self.replace_instruction(last_pos, &new_instruction);
        if let Some(last) = &mut self.scopes[self.scope_index].last_instruction {
            last.opcode = Opcode::ReturnValue;
        }
    }

    fn current_instructions(&self) -> &Instructions {
        &self.scopes[self.scope_index].instructions
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    fn enter_scope(&mut self) {
        self.scopes.push(CompilationScope::default());
        self.scope_index += 1;
        let outer = std::mem::take(&mut self.symbol_table);
        self.symbol_table = SymbolTable::enclosed(outer);
    }

    fn leave_scope(&mut self) -> Instructions {
        let scope = self.scopes.pop().expect("leaving with no scope");
        self.scope_index -= 1;
        let table = std::mem::take(&mut self.symbol_table);
        self.symbol_table = table.into_outer().expect("leaving the global scope");
        scope.instructions
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}
