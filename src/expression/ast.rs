// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeSet;
use std::fmt;

use crate::model::Value;

/// Parsed form of an expression string.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    // Arithmetic
    Add(Box<Expression>, Box<Expression>),
    Subtract(Box<Expression>, Box<Expression>),
    Multiply(Box<Expression>, Box<Expression>),
    Divide(Box<Expression>, Box<Expression>),
    Modulo(Box<Expression>, Box<Expression>),
    Negate(Box<Expression>),

    // Strings
    Concat(Box<Expression>, Box<Expression>),

    // Logical
    Not(Box<Expression>),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),

    // Comparison
    Equal(Box<Expression>, Box<Expression>),
    NotEqual(Box<Expression>, Box<Expression>),
    GreaterThan(Box<Expression>, Box<Expression>),
    GreaterThanOrEqual(Box<Expression>, Box<Expression>),
    LessThan(Box<Expression>, Box<Expression>),
    LessThanOrEqual(Box<Expression>, Box<Expression>),

    // Leaf nodes
    Literal(Value),
    Variable(String),
    Function { name: String, args: Vec<Expression> },
}

impl Expression {
    /// Collects the names of every `@variable` the expression reads.
    pub fn referenced_variables(&self, variables: &mut BTreeSet<String>) {
        match self {
            Expression::Variable(name) => {
                variables.insert(name.clone());
            }
            Expression::Add(l, r)
            | Expression::Subtract(l, r)
            | Expression::Multiply(l, r)
            | Expression::Divide(l, r)
            | Expression::Modulo(l, r)
            | Expression::Concat(l, r)
            | Expression::And(l, r)
            | Expression::Or(l, r)
            | Expression::Equal(l, r)
            | Expression::NotEqual(l, r)
            | Expression::GreaterThan(l, r)
            | Expression::GreaterThanOrEqual(l, r)
            | Expression::LessThan(l, r)
            | Expression::LessThanOrEqual(l, r) => {
                l.referenced_variables(variables);
                r.referenced_variables(variables);
            }
            Expression::Negate(v) | Expression::Not(v) => v.referenced_variables(variables),
            Expression::Function { args, .. } => {
                for arg in args {
                    arg.referenced_variables(variables);
                }
            }
            Expression::Literal(_) => {}
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Add(l, r) => write!(f, "({} + {})", l, r),
            Expression::Subtract(l, r) => write!(f, "({} - {})", l, r),
            Expression::Multiply(l, r) => write!(f, "({} * {})", l, r),
            Expression::Divide(l, r) => write!(f, "({} / {})", l, r),
            Expression::Modulo(l, r) => write!(f, "({} % {})", l, r),
            Expression::Negate(v) => write!(f, "-{}", v),
            Expression::Concat(l, r) => write!(f, "({} || {})", l, r),
            Expression::Not(v) => write!(f, "NOT {}", v),
            Expression::And(l, r) => write!(f, "({} AND {})", l, r),
            Expression::Or(l, r) => write!(f, "({} OR {})", l, r),
            Expression::Equal(l, r) => write!(f, "({} = {})", l, r),
            Expression::NotEqual(l, r) => write!(f, "({} <> {})", l, r),
            Expression::GreaterThan(l, r) => write!(f, "({} > {})", l, r),
            Expression::GreaterThanOrEqual(l, r) => write!(f, "({} >= {})", l, r),
            Expression::LessThan(l, r) => write!(f, "({} < {})", l, r),
            Expression::LessThanOrEqual(l, r) => write!(f, "({} <= {})", l, r),
            Expression::Literal(Value::String(s)) => write!(f, "'{}'", s.replace('\'', "''")),
            Expression::Literal(Value::Null) => write!(f, "NULL"),
            Expression::Literal(Value::Bool(b)) => {
                write!(f, "{}", if *b { "TRUE" } else { "FALSE" })
            }
            Expression::Literal(v) => write!(f, "{}", v),
            Expression::Variable(name) => write!(f, "@{}", name),
            Expression::Function { name, args } => {
                let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", name, args.join(", "))
            }
        }
    }
}
