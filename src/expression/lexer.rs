// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Tokenizer for the expression language, built on logos.
//!
//! Keywords are case-insensitive. Strings use single quotes, with a doubled
//! quote standing for one quote character.

use logos::Logos;

use crate::errors::EvalError;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"\s+")]
pub enum Token {
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Integer(i64),

    #[regex(r"[0-9]+\.[0-9]*", |lex| lex.slice().parse::<f64>().ok())]
    Double(f64),

    #[regex(r"'([^']|'')*'", |lex| unquote(lex.slice()))]
    Str(String),

    #[regex(r"@[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice()[1..].to_string())]
    Variable(String),

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    #[token("true", ignore(ascii_case))]
    True,
    #[token("false", ignore(ascii_case))]
    False,
    #[token("null", ignore(ascii_case))]
    Null,
    #[token("and", ignore(ascii_case))]
    And,
    #[token("or", ignore(ascii_case))]
    Or,
    #[token("not", ignore(ascii_case))]
    Not,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("||")]
    Concat,
    #[token("=")]
    #[token("==")]
    Equal,
    #[token("!=")]
    #[token("<>")]
    NotEqual,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEqual,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEqual,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token(",")]
    Comma,
}

/// A token with the byte offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub position: usize,
}

pub fn tokenize(text: &str) -> Result<Vec<Spanned>, EvalError> {
    let mut tokens = Vec::new();

    for (result, span) in Token::lexer(text).spanned() {
        match result {
            Ok(token) => tokens.push(Spanned {
                token,
                position: span.start,
            }),
            Err(()) => return Err(lex_error(text, span.start, &text[span.clone()])),
        }
    }

    Ok(tokens)
}

fn unquote(slice: &str) -> String {
    slice[1..slice.len() - 1].replace("''", "'")
}

fn lex_error(text: &str, position: usize, slice: &str) -> EvalError {
    let rest = &text[position..];
    let message = match rest.chars().next() {
        Some('\'') => "unterminated string literal".to_string(),
        Some(c) if c.is_ascii_digit() => format!("invalid number '{}'", slice),
        Some(c) => format!("unexpected character '{}'", c),
        None => "unexpected end of input".to_string(),
    };
    EvalError::Parse { position, message }
}
