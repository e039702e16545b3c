// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Tree walking evaluator.
//!
//! NULL propagates through arithmetic, concatenation and comparisons.
//! `AND` and `OR` short-circuit on their left operand.

use std::cmp::Ordering;

use crate::errors::EvalError;
use crate::expression::ast::Expression;
use crate::expression::scope::ExpressionScope;
use crate::model::Value;

pub fn evaluate(expression: &Expression, scope: &ExpressionScope) -> Result<Value, EvalError> {
    match expression {
        Expression::Literal(value) => Ok(value.clone()),
        Expression::Variable(name) => scope
            .variable(name)
            .cloned()
            .ok_or_else(|| EvalError::UnknownVariable(name.clone())),

        Expression::Add(l, r) => arithmetic("+", l, r, scope),
        Expression::Subtract(l, r) => arithmetic("-", l, r, scope),
        Expression::Multiply(l, r) => arithmetic("*", l, r, scope),
        Expression::Divide(l, r) => arithmetic("/", l, r, scope),
        Expression::Modulo(l, r) => arithmetic("%", l, r, scope),
        Expression::Negate(v) => match evaluate(v, scope)? {
            Value::Null => Ok(Value::Null),
            Value::Int(i) => i
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| EvalError::IntegerOverflow("-".to_string())),
            other => number("-", &other).map(|d| Value::Double(-d)),
        },

        Expression::Concat(l, r) => {
            let left = evaluate(l, scope)?;
            let right = evaluate(r, scope)?;
            if left.is_null() || right.is_null() {
                Ok(Value::Null)
            } else {
                Ok(Value::String(format!("{}{}", left, right)))
            }
        }

        Expression::Not(v) => match evaluate(v, scope)? {
            Value::Null => Ok(Value::Null),
            other => Ok(Value::Bool(!other.is_truthy())),
        },
        Expression::And(l, r) => {
            let left = evaluate(l, scope)?;
            if !left.is_null() && !left.is_truthy() {
                return Ok(Value::Bool(false));
            }
            let right = evaluate(r, scope)?;
            match (left.is_null(), right.is_null()) {
                (_, false) if !right.is_truthy() => Ok(Value::Bool(false)),
                (false, false) => Ok(Value::Bool(true)),
                _ => Ok(Value::Null),
            }
        }
        Expression::Or(l, r) => {
            let left = evaluate(l, scope)?;
            if left.is_truthy() {
                return Ok(Value::Bool(true));
            }
            let right = evaluate(r, scope)?;
            match (left.is_null(), right.is_null()) {
                (_, false) if right.is_truthy() => Ok(Value::Bool(true)),
                (false, false) => Ok(Value::Bool(false)),
                _ => Ok(Value::Null),
            }
        }

        Expression::Equal(l, r) => compare(l, r, scope, |o| o == Ordering::Equal),
        Expression::NotEqual(l, r) => compare(l, r, scope, |o| o != Ordering::Equal),
        Expression::GreaterThan(l, r) => compare(l, r, scope, |o| o == Ordering::Greater),
        Expression::GreaterThanOrEqual(l, r) => compare(l, r, scope, |o| o != Ordering::Less),
        Expression::LessThan(l, r) => compare(l, r, scope, |o| o == Ordering::Less),
        Expression::LessThanOrEqual(l, r) => compare(l, r, scope, |o| o != Ordering::Greater),

        Expression::Function { name, args } => call(name, args, scope),
    }
}

fn number(operation: &str, value: &Value) -> Result<f64, EvalError> {
    value.as_f64().ok_or_else(|| EvalError::TypeMismatch {
        operation: operation.to_string(),
        expected: "number".to_string(),
        found: value.type_name().to_string(),
    })
}

fn arithmetic(
    operation: &str,
    l: &Expression,
    r: &Expression,
    scope: &ExpressionScope,
) -> Result<Value, EvalError> {
    let left = evaluate(l, scope)?;
    let right = evaluate(r, scope)?;
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }

    if let (Value::Int(a), Value::Int(b)) = (&left, &right) {
        let (a, b) = (*a, *b);
        return match operation {
            "+" => Ok(Value::Int(a.wrapping_add(b))),
            "-" => Ok(Value::Int(a.wrapping_sub(b))),
            "*" => Ok(Value::Int(a.wrapping_mul(b))),
            "%" if b == 0 => Err(EvalError::DivisionByZero),
            "%" => a
                .checked_rem(b)
                .map(Value::Int)
                .ok_or_else(|| EvalError::IntegerOverflow("%".to_string())),
            "/" if b == 0 => Err(EvalError::DivisionByZero),
            "/" => match a.checked_rem(b) {
                Some(0) => a
                    .checked_div(b)
                    .map(Value::Int)
                    .ok_or_else(|| EvalError::IntegerOverflow("/".to_string())),
                Some(_) => Ok(Value::Double(a as f64 / b as f64)),
                None => Err(EvalError::IntegerOverflow("/".to_string())),
            },
            _ => Ok(Value::Double(a as f64 / b as f64)),
        };
    }

    let a = number(operation, &left)?;
    let b = number(operation, &right)?;
    match operation {
        "+" => Ok(Value::Double(a + b)),
        "-" => Ok(Value::Double(a - b)),
        "*" => Ok(Value::Double(a * b)),
        "/" | "%" if b == 0.0 => Err(EvalError::DivisionByZero),
        "/" => Ok(Value::Double(a / b)),
        _ => Ok(Value::Double(a % b)),
    }
}

fn compare(
    l: &Expression,
    r: &Expression,
    scope: &ExpressionScope,
    accept: fn(Ordering) -> bool,
) -> Result<Value, EvalError> {
    let left = evaluate(l, scope)?;
    let right = evaluate(r, scope)?;
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }

    let ordering = match (&left, &right) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            _ => left.to_string().cmp(&right.to_string()),
        },
    };
    Ok(Value::Bool(accept(ordering)))
}

fn expect_args(name: &str, args: &[Expression], expected: usize) -> Result<(), EvalError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(EvalError::WrongArgumentCount {
            function: name.to_string(),
            expected: expected.to_string(),
            found: args.len(),
        })
    }
}

fn call(name: &str, args: &[Expression], scope: &ExpressionScope) -> Result<Value, EvalError> {
    match name {
        "coalesce" => {
            for arg in args {
                let value = evaluate(arg, scope)?;
                if !value.is_null() {
                    return Ok(value);
                }
            }
            Ok(Value::Null)
        }
        "concat" => {
            let mut text = String::new();
            for arg in args {
                let value = evaluate(arg, scope)?;
                if !value.is_null() {
                    text.push_str(&value.to_string());
                }
            }
            Ok(Value::String(text))
        }
        "if" => {
            expect_args(name, args, 3)?;
            if evaluate(&args[0], scope)?.is_truthy() {
                evaluate(&args[1], scope)
            } else {
                evaluate(&args[2], scope)
            }
        }
        "upper" | "lower" | "length" | "abs" | "to_string" | "to_int" | "to_real" => {
            expect_args(name, args, 1)?;
            let value = evaluate(&args[0], scope)?;
            if value.is_null() {
                return Ok(Value::Null);
            }
            single_argument(name, value)
        }
        _ => Err(EvalError::UnknownFunction(name.to_string())),
    }
}

fn single_argument(name: &str, value: Value) -> Result<Value, EvalError> {
    let mismatch = |expected: &str, value: &Value| EvalError::TypeMismatch {
        operation: name.to_string(),
        expected: expected.to_string(),
        found: value.type_name().to_string(),
    };

    match name {
        "upper" => Ok(Value::String(value.to_string().to_uppercase())),
        "lower" => Ok(Value::String(value.to_string().to_lowercase())),
        "length" => Ok(Value::Int(value.to_string().chars().count() as i64)),
        "to_string" => Ok(Value::String(value.to_string())),
        "abs" => match value {
            Value::Int(i) => i
                .checked_abs()
                .map(Value::Int)
                .ok_or_else(|| EvalError::IntegerOverflow(name.to_string())),
            other => number(name, &other).map(|d| Value::Double(d.abs())),
        },
        "to_int" => match &value {
            Value::Double(d) => Ok(Value::Int(d.round() as i64)),
            other => other
                .as_i64()
                .or_else(|| other.as_f64().map(|d| d.round() as i64))
                .map(Value::Int)
                .ok_or_else(|| mismatch("integer", other)),
        },
        _ => value
            .as_f64()
            .map(Value::Double)
            .ok_or_else(|| mismatch("number", &value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::parse;

    fn eval(text: &str) -> Result<Value, EvalError> {
        let scope = ExpressionScope::new()
            .with_variable("n", 10)
            .with_variable("name", "roads")
            .with_variable("flag", true)
            .with_variable("empty", Value::Null);
        evaluate(&parse(text)?, &scope)
    }

    #[test]
    fn test_evaluation_table() {
        let cases: Vec<(&str, Value)> = vec![
            ("1 + 2 * 3", Value::Int(7)),
            ("7 / 2", Value::Double(3.5)),
            ("8 / 2", Value::Int(4)),
            ("7 % 3", Value::Int(1)),
            ("1.5 + 1", Value::Double(2.5)),
            ("-@n + 4", Value::Int(-6)),
            ("@n > 5 AND @flag", Value::Bool(true)),
            ("@n < 5 OR NOT @flag", Value::Bool(false)),
            ("@name = 'roads'", Value::Bool(true)),
            ("@name <> 'roads'", Value::Bool(false)),
            ("@name || '_' || @n", Value::from("roads_10")),
            ("@empty || 'x'", Value::Null),
            ("@empty = 1", Value::Null),
            ("coalesce(@empty, @name)", Value::from("roads")),
            ("concat(@name, @empty, 1)", Value::from("roads1")),
            ("upper(@name)", Value::from("ROADS")),
            ("length(@name)", Value::Int(5)),
            ("abs(-3)", Value::Int(3)),
            ("to_int('42')", Value::Int(42)),
            ("to_real('2.5')", Value::Double(2.5)),
            ("to_string(12)", Value::from("12")),
            ("if(@n >= 10, 'big', 'small')", Value::from("big")),
            ("FALSE AND @missing", Value::Bool(false)),
            ("TRUE OR @missing", Value::Bool(true)),
        ];

        for (text, expected) in cases {
            assert_eq!(eval(text), Ok(expected), "expression: {}", text);
        }
    }

    #[test]
    fn test_evaluation_errors() {
        assert_eq!(eval("@missing"), Err(EvalError::UnknownVariable("missing".to_string())));
        assert_eq!(eval("nope(1)"), Err(EvalError::UnknownFunction("nope".to_string())));
        assert_eq!(eval("1 / 0"), Err(EvalError::DivisionByZero));
        assert!(matches!(eval("'a' * 2"), Err(EvalError::TypeMismatch { .. })));
        assert!(matches!(eval("upper()"), Err(EvalError::WrongArgumentCount { found: 0, .. })));
    }

    #[test]
    fn test_integer_overflow_is_an_error() {
        let min = "(-9223372036854775807 - 1)";
        assert_eq!(
            eval(&format!("{} % -1", min)),
            Err(EvalError::IntegerOverflow("%".to_string()))
        );
        assert_eq!(
            eval(&format!("{} / -1", min)),
            Err(EvalError::IntegerOverflow("/".to_string()))
        );
        assert_eq!(
            eval(&format!("-{}", min)),
            Err(EvalError::IntegerOverflow("-".to_string()))
        );
        assert_eq!(
            eval(&format!("abs({})", min)),
            Err(EvalError::IntegerOverflow("abs".to_string()))
        );
        assert_eq!(eval(&format!("{} / 2", min)), Ok(Value::Int(i64::MIN / 2)));
    }
}
