// monkey-parser - Lexer, AST, and Pratt parser for the Monkey programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Abstract syntax tree for Monkey programs.
//!
//! Every node renders its source-level text via `Display`. The bytecode
//! compiler relies on this rendering to order hash-literal keys
//! deterministically, so the formats here are load-bearing.

use std::fmt;

/// A complete parsed program: a sequence of statements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.statements {
            write!(f, "{}", s)?;
        }
        Ok(())
    }
}

/// A braced sequence of statements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.statements {
            write!(f, "{}", s)?;
        }
        Ok(())
    }
}

/// A name occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub value: String,
}

impl Identifier {
    pub fn new(value: impl Into<String>) -> Self {
        Identifier {
            value: value.into(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `let <name> = <value>;`
    Let {
        name: Identifier,
        value: Expression,
    },
    /// `return <value>;`
    Return { return_value: Expression },
    /// An expression in statement position.
    Expression { expression: Expression },
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let { name, value } => write!(f, "let {} = {};", name, value),
            Statement::Return { return_value } => write!(f, "return {};", return_value),
            Statement::Expression { expression } => write!(f, "{}", expression),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    IntegerLiteral(i64),
    Boolean(bool),
    StringLiteral(String),
    Prefix {
        operator: String,
        right: Box<Expression>,
    },
    Infix {
        operator: String,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    If {
        condition: Box<Expression>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },
    /// `fn(<params>) { <body> }`. `name` is filled in when the literal is
    /// the right-hand side of a `let`, enabling self-recursion.
    FunctionLiteral {
        name: Option<String>,
        parameters: Vec<Identifier>,
        body: BlockStatement,
    },
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    ArrayLiteral { items: Vec<Expression> },
    /// Pairs in source order; emission order is decided by the consumer.
    HashLiteral {
        pairs: Vec<(Expression, Expression)>,
    },
    IndexExpression {
        left: Box<Expression>,
        index: Box<Expression>,
    },
    /// Parsed but carries no semantics; both engines reject it.
    ForLoop {
        init: Box<Statement>,
        test: Box<Expression>,
        update: Box<Statement>,
        body: BlockStatement,
    },
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(ident) => write!(f, "{}", ident),
            Expression::IntegerLiteral(value) => write!(f, "{}", value),
            Expression::Boolean(value) => write!(f, "{}", value),
            Expression::StringLiteral(value) => f.write_str(value),
            Expression::Prefix { operator, right } => write!(f, "({}{})", operator, right),
            Expression::Infix {
                operator,
                left,
                right,
            } => write!(f, "({} {} {})", left, operator, right),
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if{} {}", condition, consequence)?;
                if let Some(alt) = alternative {
                    write!(f, "else {}", alt)?;
                }
                Ok(())
            }
            Expression::FunctionLiteral {
                name,
                parameters,
                body,
            } => {
                let params: Vec<String> = parameters.iter().map(|p| p.to_string()).collect();
                match name {
                    Some(name) => write!(f, "fn<{}>({}) {}", name, params.join(", "), body),
                    None => write!(f, "fn({}) {}", params.join(", "), body),
                }
            }
            Expression::Call {
                function,
                arguments,
            } => {
                let args: Vec<String> = arguments.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", function, args.join(", "))
            }
            Expression::ArrayLiteral { items } => {
                let items: Vec<String> = items.iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Expression::HashLiteral { pairs } => {
                let pairs: Vec<String> =
                    pairs.iter().map(|(k, v)| format!("{}:{}", k, v)).collect();
                write!(f, "{{{}}}", pairs.join(", "))
            }
            Expression::IndexExpression { left, index } => write!(f, "({}[{}])", left, index),
            Expression::ForLoop {
                init,
                test,
                update,
                body,
            } => write!(f, "for ({} {}; {}) {}", init, test, update, body),
        }
    }
}
