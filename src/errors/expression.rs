// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors raised while parsing or evaluating an expression string.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("Variable '@{0}' is not defined")]
    UnknownVariable(String),

    #[error("Function '{0}' is not known")]
    UnknownFunction(String),

    #[error("Function '{function}' expects {expected} argument(s), got {found}")]
    WrongArgumentCount {
        function: String,
        expected: String,
        found: usize,
    },

    #[error("Type mismatch during '{operation}': expected {expected}, but found {found}")]
    TypeMismatch {
        operation: String,
        expected: String,
        found: String,
    },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Integer overflow during '{0}'")]
    IntegerOverflow(String),
}
