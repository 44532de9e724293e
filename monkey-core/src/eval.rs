// monkey-core - Runtime value model, builtins, and tree-walking evaluator for the Monkey programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Tree-walking evaluator: the simpler of the two execution engines.
//!
//! Errors travel as [`Object::Error`] values and short-circuit every
//! surrounding construct; `return` travels as [`Object::ReturnValue`] and is
//! unwrapped at function and program boundaries.

use std::rc::Rc;

use im::{OrdMap, Vector};

use monkey_parser::ast::{BlockStatement, Expression, Program, Statement};

use crate::builtins::get_builtin_by_name;
use crate::env::Env;
use crate::object::{Function, HashPair, Object};

const NULL: Object = Object::Null;
const TRUE: Object = Object::Boolean(true);
const FALSE: Object = Object::Boolean(false);

/// Evaluate a whole program, unwrapping a top-level `return`.
pub fn eval_program(program: &Program, env: &Env) -> Object {
    let mut result = NULL;
    for statement in &program.statements {
        result = eval_statement(statement, env);
        match result {
            Object::ReturnValue(value) => return *value,
            Object::Error(_) => return result,
            _ => {}
        }
    }
    result
}

fn eval_statement(statement: &Statement, env: &Env) -> Object {
    match statement {
        Statement::Expression { expression } => eval_expression(expression, env),
        Statement::Return { return_value } => {
            let value = eval_expression(return_value, env);
            if is_error(&value) {
                return value;
            }
            Object::ReturnValue(Box::new(value))
        }
        Statement::Let { name, value } => {
            let value = eval_expression(value, env);
            if is_error(&value) {
                return value;
            }
            env.set(name.value.clone(), value);
            NULL
        }
    }
}

fn eval_block(block: &BlockStatement, env: &Env) -> Object {
    let mut result = NULL;
    for statement in &block.statements {
        result = eval_statement(statement, env);
        if matches!(result, Object::ReturnValue(_) | Object::Error(_)) {
            return result;
        }
    }
    result
}

fn eval_expression(expression: &Expression, env: &Env) -> Object {
    match expression {
        Expression::IntegerLiteral(value) => Object::Integer(*value),
        Expression::Boolean(value) => native_bool(*value),
        Expression::StringLiteral(value) => Object::string(value.clone()),
        Expression::Identifier(ident) => eval_identifier(&ident.value, env),
        Expression::Prefix { operator, right } => {
            let right = eval_expression(right, env);
            if is_error(&right) {
                return right;
            }
            eval_prefix_expression(operator, right)
        }
        Expression::Infix {
            operator,
            left,
            right,
        } => {
            let left = eval_expression(left, env);
            if is_error(&left) {
                return left;
            }
            let right = eval_expression(right, env);
            if is_error(&right) {
                return right;
            }
            eval_infix_expression(operator, left, right)
        }
        Expression::If {
            condition,
            consequence,
            alternative,
        } => {
            let condition = eval_expression(condition, env);
            if is_error(&condition) {
                return condition;
            }
            if condition.is_truthy() {
                eval_block(consequence, env)
            } else if let Some(alternative) = alternative {
                eval_block(alternative, env)
            } else {
                NULL
            }
        }
        Expression::FunctionLiteral {
            parameters, body, ..
        } => Object::Function(Rc::new(Function {
            parameters: parameters.clone(),
            body: body.clone(),
            env: env.clone(),
        })),
        Expression::Call {
            function,
            arguments,
        } => {
            let function = eval_expression(function, env);
            if is_error(&function) {
                return function;
            }
            let mut args = Vec::with_capacity(arguments.len());
            for argument in arguments {
                let arg = eval_expression(argument, env);
                if is_error(&arg) {
                    return arg;
                }
                args.push(arg);
            }
            apply_function(function, &args)
        }
        Expression::ArrayLiteral { items } => {
            let mut elements = Vector::new();
            for item in items {
                let element = eval_expression(item, env);
                if is_error(&element) {
                    return element;
                }
                elements.push_back(element);
            }
            Object::Array(elements)
        }
        Expression::HashLiteral { pairs } => eval_hash_literal(pairs, env),
        Expression::IndexExpression { left, index } => {
            let left = eval_expression(left, env);
            if is_error(&left) {
                return left;
            }
            let index = eval_expression(index, env);
            if is_error(&index) {
                return index;
            }
            eval_index_expression(left, index)
        }
        Expression::ForLoop { .. } => Object::error("for loops are not supported"),
    }
}

fn eval_identifier(name: &str, env: &Env) -> Object {
    if let Some(value) = env.get(name) {
        return value;
    }
    if let Some(builtin) = get_builtin_by_name(name) {
        return Object::Builtin(*builtin);
    }
    Object::error(format!("identifier not found: {}", name))
}

fn eval_prefix_expression(operator: &str, right: Object) -> Object {
    match operator {
        "!" => eval_bang_expression(right),
        "-" => eval_minus_expression(right),
        _ => Object::error(format!(
            "unknown operator: {}{}",
            operator,
            right.object_type()
        )),
    }
}

fn eval_bang_expression(right: Object) -> Object {
    match right {
        Object::Boolean(value) => native_bool(!value),
        Object::Null => TRUE,
        _ => FALSE,
    }
}

fn eval_minus_expression(right: Object) -> Object {
    match right {
        Object::Integer(value) => Object::Integer(value.wrapping_neg()),
        other => Object::error(format!("unknown operator: -{}", other.object_type())),
    }
}

fn eval_infix_expression(operator: &str, left: Object, right: Object) -> Object {
    match (&left, &right) {
        (Object::Integer(l), Object::Integer(r)) => {
            eval_integer_infix_expression(operator, *l, *r)
        }
        (Object::Boolean(l), Object::Boolean(r)) => match operator {
            "==" => native_bool(l == r),
            "!=" => native_bool(l != r),
            _ => Object::error(format!(
                "unknown operator: {} {} {}",
                left.object_type(),
                operator,
                right.object_type()
            )),
        },
        (Object::String(l), Object::String(r)) => match operator {
            "+" => Object::string(format!("{}{}", l, r)),
            _ => Object::error(format!(
                "unknown operator: {} {} {}",
                left.object_type(),
                operator,
                right.object_type()
            )),
        },
        _ => Object::error(format!(
            "type mismatch: {} {} {}",
            left.object_type(),
            operator,
            right.object_type()
        )),
    }
}

fn eval_integer_infix_expression(operator: &str, left: i64, right: i64) -> Object {
    match operator {
        "+" => Object::Integer(left.wrapping_add(right)),
        "-" => Object::Integer(left.wrapping_sub(right)),
        "*" => Object::Integer(left.wrapping_mul(right)),
        "/" => {
            if right == 0 {
                Object::error("division by zero")
            } else {
                Object::Integer(left.wrapping_div(right))
            }
        }
        "<" => native_bool(left < right),
        "<=" => native_bool(left <= right),
        ">" => native_bool(left > right),
        ">=" => native_bool(left >= right),
        "==" => native_bool(left == right),
        "!=" => native_bool(left != right),
        _ => Object::error(format!("unknown operator: INTEGER {} INTEGER", operator)),
    }
}

fn eval_hash_literal(pairs: &[(Expression, Expression)], env: &Env) -> Object {
    let mut hash = OrdMap::new();
    for (key_expr, value_expr) in pairs {
        let key = eval_expression(key_expr, env);
        if is_error(&key) {
            return key;
        }
        let Some(hash_key) = key.hash_key() else {
            return Object::error(format!("unusable as hash key: {}", key.object_type()));
        };
        let value = eval_expression(value_expr, env);
        if is_error(&value) {
            return value;
        }
        hash.insert(hash_key, HashPair { key, value });
    }
    Object::Hash(hash)
}

fn eval_index_expression(left: Object, index: Object) -> Object {
    match (&left, &index) {
        (Object::Array(items), Object::Integer(i)) => {
            if *i < 0 || *i as usize >= items.len() {
                NULL
            } else {
                items[*i as usize].clone()
            }
        }
        (Object::Array(_), _) => Object::error(format!(
            "index operator not supported: {}",
            index.object_type()
        )),
        (Object::Hash(pairs), _) => match index.hash_key() {
            Some(key) => pairs
                .get(&key)
                .map(|pair| pair.value.clone())
                .unwrap_or(NULL),
            None => Object::error(format!("unusable as hash key: {}", index.object_type())),
        },
        _ => Object::error(format!(
            "index operator not supported: {}",
            left.object_type()
        )),
    }
}

fn apply_function(function: Object, args: &[Object]) -> Object {
    match function {
        Object::Function(func) => {
            if args.len() != func.parameters.len() {
                return Object::error(format!(
                    "wrong number of arguments: want={}, got={}",
                    func.parameters.len(),
                    args.len()
                ));
            }
            let call_env = Env::enclosed(&func.env);
            for (param, arg) in func.parameters.iter().zip(args) {
                call_env.set(param.value.clone(), arg.clone());
            }
            match eval_block(&func.body, &call_env) {
                Object::ReturnValue(value) => *value,
                other => other,
            }
        }
        Object::Builtin(builtin) => (builtin.func)(args).unwrap_or(NULL),
        other => Object::error(format!("not a function: {}", other.object_type())),
    }
}

fn native_bool(value: bool) -> Object {
    if value {
        TRUE
    } else {
        FALSE
    }
}

fn is_error(obj: &Object) -> bool {
    matches!(obj, Object::Error(_))
}
