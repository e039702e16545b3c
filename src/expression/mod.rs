// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Expression language used by expression parameter sources and by the
//! built-in condition algorithms.
//!
//! Supports literals (`1`, `2.5`, `'text'`, `TRUE`, `FALSE`, `NULL`),
//! variables (`@name`), arithmetic, `||` concatenation, comparisons,
//! `AND`/`OR`/`NOT` and a small function library. Failures are returned as
//! [`EvalError`] values, never raised.

pub mod ast;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod scope;

pub use ast::Expression;
pub use parser::parse;
pub use scope::ExpressionScope;

use crate::errors::EvalError;
use crate::model::Value;

/// Parses and evaluates `text` against `scope`.
pub fn evaluate(text: &str, scope: &ExpressionScope) -> Result<Value, EvalError> {
    let expression = parse(text)?;
    evaluator::evaluate(&expression, scope)
}
