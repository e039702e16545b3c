// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Recursive descent parser.
//!
//! Precedence, loosest first: `OR`, `AND`, `NOT`, comparison, `||`,
//! `+ -`, `* / %`, unary minus.

use crate::errors::EvalError;
use crate::expression::ast::Expression;
use crate::expression::lexer::{tokenize, Spanned, Token};
use crate::model::Value;

pub fn parse(text: &str) -> Result<Expression, EvalError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser {
        tokens,
        index: 0,
        end: text.len(),
    };
    if parser.tokens.is_empty() {
        return Err(EvalError::Parse {
            position: 0,
            message: "empty expression".to_string(),
        });
    }
    let expression = parser.or()?;
    match parser.peek() {
        None => Ok(expression),
        Some(_) => Err(parser.error("unexpected trailing input")),
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    index: usize,
    end: usize,
}

type BinaryBuilder = fn(Box<Expression>, Box<Expression>) -> Expression;

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index).map(|s| &s.token)
    }

    fn position(&self) -> usize {
        self.tokens.get(self.index).map(|s| s.position).unwrap_or(self.end)
    }

    fn error(&self, message: &str) -> EvalError {
        let found = match self.peek() {
            Some(token) => format!("{}, found {:?}", message, token),
            None => format!("{}, found end of expression", message),
        };
        EvalError::Parse {
            position: self.position(),
            message: found,
        }
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).map(|s| s.token.clone());
        self.index += 1;
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token, message: &str) -> Result<(), EvalError> {
        if self.eat(&expected) {
            Ok(())
        } else {
            Err(self.error(message))
        }
    }

    fn or(&mut self) -> Result<Expression, EvalError> {
        let mut left = self.and()?;
        while self.eat(&Token::Or) {
            let right = self.and()?;
            left = Expression::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Expression, EvalError> {
        let mut left = self.not()?;
        while self.eat(&Token::And) {
            let right = self.not()?;
            left = Expression::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn not(&mut self) -> Result<Expression, EvalError> {
        if self.eat(&Token::Not) {
            let operand = self.not()?;
            return Ok(Expression::Not(Box::new(operand)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expression, EvalError> {
        let left = self.concat()?;
        let builder: BinaryBuilder = match self.peek() {
            Some(Token::Equal) => Expression::Equal,
            Some(Token::NotEqual) => Expression::NotEqual,
            Some(Token::Less) => Expression::LessThan,
            Some(Token::LessEqual) => Expression::LessThanOrEqual,
            Some(Token::Greater) => Expression::GreaterThan,
            Some(Token::GreaterEqual) => Expression::GreaterThanOrEqual,
            _ => return Ok(left),
        };
        self.index += 1;
        let right = self.concat()?;
        Ok(builder(Box::new(left), Box::new(right)))
    }

    fn concat(&mut self) -> Result<Expression, EvalError> {
        let mut left = self.additive()?;
        while self.eat(&Token::Concat) {
            let right = self.additive()?;
            left = Expression::Concat(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn additive(&mut self) -> Result<Expression, EvalError> {
        let mut left = self.multiplicative()?;
        loop {
            let builder: BinaryBuilder = match self.peek() {
                Some(Token::Plus) => Expression::Add,
                Some(Token::Minus) => Expression::Subtract,
                _ => return Ok(left),
            };
            self.index += 1;
            let right = self.multiplicative()?;
            left = builder(Box::new(left), Box::new(right));
        }
    }

    fn multiplicative(&mut self) -> Result<Expression, EvalError> {
        let mut left = self.unary()?;
        loop {
            let builder: BinaryBuilder = match self.peek() {
                Some(Token::Star) => Expression::Multiply,
                Some(Token::Slash) => Expression::Divide,
                Some(Token::Percent) => Expression::Modulo,
                _ => return Ok(left),
            };
            self.index += 1;
            let right = self.unary()?;
            left = builder(Box::new(left), Box::new(right));
        }
    }

    fn unary(&mut self) -> Result<Expression, EvalError> {
        if self.eat(&Token::Minus) {
            let operand = self.unary()?;
            return Ok(Expression::Negate(Box::new(operand)));
        }
        if self.eat(&Token::Plus) {
            return self.unary();
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expression, EvalError> {
        let position = self.position();
        match self.advance() {
            Some(Token::Integer(i)) => Ok(Expression::Literal(Value::Int(i))),
            Some(Token::Double(d)) => Ok(Expression::Literal(Value::Double(d))),
            Some(Token::Str(s)) => Ok(Expression::Literal(Value::String(s))),
            Some(Token::True) => Ok(Expression::Literal(Value::Bool(true))),
            Some(Token::False) => Ok(Expression::Literal(Value::Bool(false))),
            Some(Token::Null) => Ok(Expression::Literal(Value::Null)),
            Some(Token::Variable(name)) => Ok(Expression::Variable(name)),
            Some(Token::Identifier(name)) => {
                self.expect(Token::LeftParen, "expected '(' after function name")?;
                let mut args = Vec::new();
                if !self.eat(&Token::RightParen) {
                    loop {
                        args.push(self.or()?);
                        if self.eat(&Token::RightParen) {
                            break;
                        }
                        self.expect(Token::Comma, "expected ',' or ')' in argument list")?;
                    }
                }
                Ok(Expression::Function {
                    name: name.to_ascii_lowercase(),
                    args,
                })
            }
            Some(Token::LeftParen) => {
                let inner = self.or()?;
                self.expect(Token::RightParen, "expected ')'")?;
                Ok(inner)
            }
            Some(token) => Err(EvalError::Parse {
                position,
                message: format!("unexpected token {:?}", token),
            }),
            None => Err(EvalError::Parse {
                position,
                message: "unexpected end of expression".to_string(),
            }),
        }
    }
}
