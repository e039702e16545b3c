// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod calculate_expression;
pub mod condition;
pub mod filter_layers_by_type;
pub mod raise_exception;
pub mod raise_warning;
pub mod rename_layer;
pub mod string_concatenation;

pub use calculate_expression::*;
pub use condition::*;
pub use filter_layers_by_type::*;
pub use raise_exception::*;
pub use raise_warning::*;
pub use rename_layer::*;
pub use string_concatenation::*;

use crate::engine::ProcessingContext;
use crate::errors::AlgorithmError;
use crate::expression::{self, ExpressionScope};
use crate::model::{LayerHandle, Value};
use crate::traits::AlgorithmParameters;

/// String value of a parameter. Null and missing parameters are `None`.
pub(crate) fn parameter_as_string(parameters: &AlgorithmParameters, name: &str) -> Option<String> {
    match parameters.get(name) {
        None | Some(Value::Null) => None,
        Some(Value::Property(text)) => Some(text.clone()),
        Some(value) => Some(value.to_string()),
    }
}

/// Layer value of a parameter, looking identifiers up in the context.
pub(crate) fn parameter_as_layer(
    parameters: &AlgorithmParameters,
    name: &str,
    context: &ProcessingContext,
) -> Result<LayerHandle, AlgorithmError> {
    match parameters.get(name) {
        Some(Value::Layer(layer)) => Ok(layer.clone()),
        Some(Value::String(identifier)) => {
            context.get_map_layer(identifier).cloned().ok_or_else(|| {
                AlgorithmError::InvalidParameterValue {
                    parameter: name.to_string(),
                    reason: format!("could not load layer '{}'", identifier),
                }
            })
        }
        None | Some(Value::Null) => Err(AlgorithmError::MissingParameter(name.to_string())),
        Some(other) => Err(AlgorithmError::InvalidParameterValue {
            parameter: name.to_string(),
            reason: format!("expected a layer, found {}", other.type_name()),
        }),
    }
}

/// Evaluates an optional condition expression. An absent or blank
/// condition always holds.
pub(crate) fn condition_holds(
    condition: Option<&str>,
    scope: &ExpressionScope,
) -> Result<bool, AlgorithmError> {
    match condition.map(str::trim).filter(|c| !c.is_empty()) {
        None => Ok(true),
        Some(text) => expression::evaluate(text, scope)
            .map(|value| value.is_truthy())
            .map_err(|e| AlgorithmError::InvalidParameterValue {
                parameter: "CONDITION".to_string(),
                reason: e.to_string(),
            }),
    }
}
