// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Builds the expression scope a child algorithm's expressions see.
//!
//! Variables, later entries winning over earlier ones:
//!
//! * model variables
//! * `model_name` and `model_group`
//! * every model input by name, plus `<name>_minx`, `<name>_miny`,
//!   `<name>_maxx` and `<name>_maxy` for layer inputs with a known extent
//! * `<child>_<output>` for every output of the children that already ran,
//!   with the same extent variables for layer outputs

use std::collections::BTreeMap;

use crate::engine::context::ProcessingContext;
use crate::expression::ExpressionScope;
use crate::model::{Extent, ProcessingModel, Value};
use crate::traits::AlgorithmResults;

pub fn create_expression_scope(
    model: &ProcessingModel,
    inputs: &BTreeMap<String, Value>,
    child_results: &BTreeMap<String, AlgorithmResults>,
    context: &ProcessingContext,
) -> ExpressionScope {
    let mut scope = ExpressionScope::new();

    for (name, value) in &model.variables {
        scope.set_variable(name.clone(), value.clone());
    }
    scope.set_variable("model_name", model.name.clone());
    scope.set_variable("model_group", model.group.clone());

    for parameter in model.parameter_components() {
        let definition = &parameter.definition;
        let value = inputs
            .get(&definition.name)
            .filter(|v| !v.is_null())
            .or(definition.default_value.as_ref())
            .cloned()
            .unwrap_or(Value::Null);

        if definition.parameter_type.is_layer() {
            if let Some(extent) = layer_extent(&value, context) {
                add_extent_variables(&mut scope, &definition.name, extent);
            }
        }
        scope.set_variable(definition.name.clone(), value);
    }

    for (child_id, results) in child_results {
        for (output, value) in results {
            let name = format!("{}_{}", child_id, output);
            if let Some(extent) = layer_extent(value, context) {
                add_extent_variables(&mut scope, &name, extent);
            }
            scope.set_variable(name, value.clone());
        }
    }

    scope
}

/// Extent of a layer value, looking string values up in the context.
fn layer_extent(value: &Value, context: &ProcessingContext) -> Option<Extent> {
    match value {
        Value::Layer(layer) => layer.extent,
        Value::String(identifier) => context.get_map_layer(identifier).and_then(|l| l.extent),
        _ => None,
    }
}

fn add_extent_variables(scope: &mut ExpressionScope, name: &str, extent: Extent) {
    scope.set_variable(format!("{}_minx", name), extent.x_min);
    scope.set_variable(format!("{}_miny", name), extent.y_min);
    scope.set_variable(format!("{}_maxx", name), extent.x_max);
    scope.set_variable(format!("{}_maxy", name), extent.y_max);
}
