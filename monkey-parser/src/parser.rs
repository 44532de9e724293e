// monkey-parser - Lexer, AST, and Pratt parser for the Monkey programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Pratt parser for Monkey.
//!
//! Parse failures never abort the walk: errors are collected as strings and
//! the caller inspects [`Parser::errors`] after [`Parser::parse_program`].

use crate::ast::{BlockStatement, Expression, Identifier, Program, Statement};
use crate::lexer::Lexer;
use crate::token::{Token, TokenType};

/// Operator binding strength, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    /// `==` `!=`
    Equals,
    /// `<` `>` `<=` `>=`
    LessGreater,
    /// `+` `-`
    Sum,
    /// `*` `/`
    Product,
    /// `-x` `!x`
    Prefix,
    /// `f(x)`
    Call,
    /// `array[index]`
    Index,
}

fn precedence_of(token_type: TokenType) -> Precedence {
    match token_type {
        TokenType::Eq | TokenType::NotEq => Precedence::Equals,
        TokenType::Lt | TokenType::Gt | TokenType::LtEq | TokenType::GtEq => {
            Precedence::LessGreater
        }
        TokenType::Plus | TokenType::Minus => Precedence::Sum,
        TokenType::Slash | TokenType::Asterisk => Precedence::Product,
        TokenType::Lparen => Precedence::Call,
        TokenType::Lbracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

pub struct Parser {
    lexer: Lexer,
    errors: Vec<String>,

    curr_token: Token,
    peek_token: Token,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        let mut parser = Parser {
            lexer,
            errors: Vec::new(),
            curr_token: Token::default(),
            peek_token: Token::default(),
        };
        parser.next_token();
        parser.next_token();
        parser
    }

    /// Convenience constructor from source text.
    pub fn from_source(input: &str) -> Self {
        Parser::new(Lexer::new(input))
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();
        while !self.curr_token_is(TokenType::Eof) {
            if let Some(statement) = self.parse_statement() {
                program.statements.push(statement);
            }
            self.next_token();
        }
        program
    }

    fn next_token(&mut self) {
        self.curr_token = std::mem::replace(&mut self.peek_token, self.lexer.next_token());
    }

    fn curr_token_is(&self, t: TokenType) -> bool {
        self.curr_token.token_type == t
    }

    fn peek_token_is(&self, t: TokenType) -> bool {
        self.peek_token.token_type == t
    }

    fn expect_peek(&mut self, t: TokenType) -> bool {
        if self.peek_token_is(t) {
            self.next_token();
            true
        } else {
            self.peek_error(t);
            false
        }
    }

    fn peek_error(&mut self, t: TokenType) {
        self.errors.push(format!(
            "expected next token to be {}, got {} instead",
            t, self.peek_token.token_type
        ));
    }

    fn peek_precedence(&self) -> Precedence {
        precedence_of(self.peek_token.token_type)
    }

    fn curr_precedence(&self) -> Precedence {
        precedence_of(self.curr_token.token_type)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.curr_token.token_type {
            TokenType::Let => self.parse_let_statement(),
            TokenType::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        if !self.expect_peek(TokenType::Ident) {
            return None;
        }
        let name = Identifier::new(self.curr_token.literal.clone());
        if !self.expect_peek(TokenType::Assign) {
            return None;
        }
        self.next_token();
        let mut value = self.parse_expression(Precedence::Lowest)?;
        // A named function literal can refer to itself.
        if let Expression::FunctionLiteral { name: fn_name, .. } = &mut value {
            *fn_name = Some(name.value.clone());
        }
        while self.peek_token_is(TokenType::Semicolon) {
            self.next_token();
        }
        Some(Statement::Let { name, value })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        self.next_token();
        let return_value = self.parse_expression(Precedence::Lowest)?;
        while self.peek_token_is(TokenType::Semicolon) {
            self.next_token();
        }
        Some(Statement::Return { return_value })
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expression = self.parse_expression(Precedence::Lowest)?;
        while self.peek_token_is(TokenType::Semicolon) {
            self.next_token();
        }
        Some(Statement::Expression { expression })
    }

    fn parse_block_statement(&mut self) -> BlockStatement {
        let mut block = BlockStatement::default();
        self.next_token();
        while !self.curr_token_is(TokenType::Rbrace) && !self.curr_token_is(TokenType::Eof) {
            if let Some(statement) = self.parse_statement() {
                block.statements.push(statement);
            }
            self.next_token();
        }
        block
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let mut left = self.parse_prefix()?;

        while !self.peek_token_is(TokenType::Semicolon) && precedence < self.peek_precedence() {
            if !has_infix(self.peek_token.token_type) {
                return Some(left);
            }
            self.next_token();
            left = self.parse_infix(left)?;
        }

        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expression> {
        match self.curr_token.token_type {
            TokenType::Ident => Some(Expression::Identifier(Identifier::new(
                self.curr_token.literal.clone(),
            ))),
            TokenType::Int => self.parse_integer_literal(),
            TokenType::String => Some(Expression::StringLiteral(self.curr_token.literal.clone())),
            TokenType::Bang
            | TokenType::Minus
            | TokenType::PlusPlus
            | TokenType::MinusMinus => self.parse_prefix_expression(),
            TokenType::True | TokenType::False => {
                Some(Expression::Boolean(self.curr_token_is(TokenType::True)))
            }
            TokenType::Lparen => self.parse_grouped_expression(),
            TokenType::If => self.parse_if_expression(),
            TokenType::Function => self.parse_function_literal(),
            TokenType::Lbracket => self.parse_array_literal(),
            TokenType::Lbrace => self.parse_hash_literal(),
            TokenType::For => self.parse_for_loop(),
            other => {
                self.errors
                    .push(format!("no prefix parse function for {} found", other));
                None
            }
        }
    }

    fn parse_infix(&mut self, left: Expression) -> Option<Expression> {
        match self.curr_token.token_type {
            TokenType::Lparen => self.parse_call_expression(left),
            TokenType::Lbracket => self.parse_index_expression(left),
            _ => self.parse_infix_expression(left),
        }
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        match self.curr_token.literal.parse::<i64>() {
            Ok(value) => Some(Expression::IntegerLiteral(value)),
            Err(_) => {
                self.errors.push(format!(
                    "could not parse {:?} as integer",
                    self.curr_token.literal
                ));
                None
            }
        }
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let operator = self.curr_token.literal.clone();
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expression::Prefix {
            operator,
            right: Box::new(right),
        })
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let operator = self.curr_token.literal.clone();
        let precedence = self.curr_precedence();
        self.next_token();
        let right = self.parse_expression(precedence)?;
        Some(Expression::Infix {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let expression = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenType::Rparen) {
            return None;
        }
        Some(expression)
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        if !self.expect_peek(TokenType::Lparen) {
            return None;
        }
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenType::Rparen) {
            return None;
        }
        if !self.expect_peek(TokenType::Lbrace) {
            return None;
        }
        let consequence = self.parse_block_statement();

        let mut alternative = None;
        if self.peek_token_is(TokenType::Else) {
            self.next_token();
            if !self.expect_peek(TokenType::Lbrace) {
                return None;
            }
            alternative = Some(self.parse_block_statement());
        }

        Some(Expression::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    /// Parse `for (<init> <test>; <update>) { <body> }`.
    ///
    /// The node has no semantics downstream; both engines reject it.
    fn parse_for_loop(&mut self) -> Option<Expression> {
        if !self.expect_peek(TokenType::Lparen) {
            return None;
        }
        self.next_token();
        let init = self.parse_let_statement()?;
        self.next_token();
        let test = self.parse_expression(Precedence::Lowest)?;
        while self.peek_token_is(TokenType::Semicolon) {
            self.next_token();
        }
        self.next_token();
        let update = self.parse_let_statement()?;
        if !self.expect_peek(TokenType::Rparen) {
            return None;
        }
        if !self.expect_peek(TokenType::Lbrace) {
            return None;
        }
        let body = self.parse_block_statement();
        Some(Expression::ForLoop {
            init: Box::new(init),
            test: Box::new(test),
            update: Box::new(update),
            body,
        })
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        if !self.expect_peek(TokenType::Lparen) {
            return None;
        }
        let parameters = self.parse_function_parameters()?;
        if !self.expect_peek(TokenType::Lbrace) {
            return None;
        }
        let body = self.parse_block_statement();
        Some(Expression::FunctionLiteral {
            name: None,
            parameters,
            body,
        })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Identifier>> {
        let mut parameters = Vec::new();
        if self.peek_token_is(TokenType::Rparen) {
            self.next_token();
            return Some(parameters);
        }
        self.next_token();
        parameters.push(Identifier::new(self.curr_token.literal.clone()));
        while self.peek_token_is(TokenType::Comma) {
            self.next_token();
            self.next_token();
            parameters.push(Identifier::new(self.curr_token.literal.clone()));
        }
        if !self.expect_peek(TokenType::Rparen) {
            return None;
        }
        Some(parameters)
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let arguments = self.parse_expression_list(TokenType::Rparen)?;
        Some(Expression::Call {
            function: Box::new(function),
            arguments,
        })
    }

    fn parse_array_literal(&mut self) -> Option<Expression> {
        let items = self.parse_expression_list(TokenType::Rbracket)?;
        Some(Expression::ArrayLiteral { items })
    }

    fn parse_expression_list(&mut self, end: TokenType) -> Option<Vec<Expression>> {
        let mut list = Vec::new();
        if self.peek_token_is(end) {
            self.next_token();
            return Some(list);
        }
        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);
        while self.peek_token_is(TokenType::Comma) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }
        if !self.expect_peek(end) {
            return None;
        }
        Some(list)
    }

    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenType::Rbracket) {
            return None;
        }
        Some(Expression::IndexExpression {
            left: Box::new(left),
            index: Box::new(index),
        })
    }

    fn parse_hash_literal(&mut self) -> Option<Expression> {
        let mut pairs = Vec::new();
        while !self.peek_token_is(TokenType::Rbrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;
            if !self.expect_peek(TokenType::Colon) {
                return None;
            }
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));
            if !self.peek_token_is(TokenType::Rbrace) && !self.expect_peek(TokenType::Comma) {
                return None;
            }
        }
        if !self.expect_peek(TokenType::Rbrace) {
            return None;
        }
        Some(Expression::HashLiteral { pairs })
    }
}

/// Whether the token type has an infix parse rule.
fn has_infix(token_type: TokenType) -> bool {
    matches!(
        token_type,
        TokenType::Plus
            | TokenType::Minus
            | TokenType::Slash
            | TokenType::Asterisk
            | TokenType::Eq
            | TokenType::NotEq
            | TokenType::Lt
            | TokenType::Gt
            | TokenType::LtEq
            | TokenType::GtEq
            | TokenType::Lparen
            | TokenType::Lbracket
    )
}
