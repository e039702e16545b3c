// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Turns a child's parameter sources into concrete algorithm parameters.

use std::collections::BTreeMap;

use crate::errors::ExecutionError;
use crate::expression::{self, ExpressionScope};
use crate::model::{ChildAlgorithm, ParameterSource, ProcessingModel, SourceKind, Value};
use crate::traits::{AlgorithmHandle, AlgorithmParameters, AlgorithmResults};

/// Resolves sources against the model inputs and the results gathered so
/// far in a run.
pub struct ParameterResolver<'a> {
    model: &'a ProcessingModel,
    inputs: &'a BTreeMap<String, Value>,
    child_results: &'a BTreeMap<String, AlgorithmResults>,
    scope: &'a ExpressionScope,
}

impl<'a> ParameterResolver<'a> {
    pub fn new(
        model: &'a ProcessingModel,
        inputs: &'a BTreeMap<String, Value>,
        child_results: &'a BTreeMap<String, AlgorithmResults>,
        scope: &'a ExpressionScope,
    ) -> Self {
        Self {
            model,
            inputs,
            child_results,
            scope,
        }
    }

    /// Builds the full parameter map for `child`.
    ///
    /// Bound sources are resolved; unbound parameters with a default get it.
    /// Model outputs take the destination supplied for `child:output` in the
    /// run inputs, when there is one.
    pub fn resolve_child_parameters(
        &self,
        child: &ChildAlgorithm,
        algorithm: &AlgorithmHandle,
    ) -> Result<AlgorithmParameters, ExecutionError> {
        let mut parameters = AlgorithmParameters::new();

        for definition in algorithm.parameter_definitions() {
            if !child.parameter_sources.contains_key(&definition.name) {
                if let Some(default) = definition.default_value {
                    parameters.insert(definition.name, default);
                }
            }
        }

        for (name, sources) in &child.parameter_sources {
            let value = self
                .resolve_sources(sources)
                .map_err(|reason| ExecutionError::Resolution {
                    child_id: child.child_id.clone(),
                    parameter: name.clone(),
                    reason,
                })?;
            parameters.insert(name.clone(), value);
        }

        for output in child.model_outputs.values() {
            let destination = self.inputs.get(&output.result_key()).filter(|v| !v.is_null());
            if let Some(destination) = destination {
                parameters.insert(output.child_output_name.clone(), destination.clone());
            }
        }

        Ok(parameters)
    }

    /// A single source yields its value; several yield a list, with list
    /// values flattened into it.
    pub fn resolve_sources(&self, sources: &[ParameterSource]) -> Result<Value, String> {
        if let [source] = sources {
            return self.resolve_source(source);
        }

        let mut values = Vec::with_capacity(sources.len());
        for source in sources {
            match self.resolve_source(source)? {
                Value::List(items) => values.extend(items),
                value => values.push(value),
            }
        }
        Ok(Value::List(values))
    }

    pub fn resolve_source(&self, source: &ParameterSource) -> Result<Value, String> {
        match source.kind() {
            SourceKind::StaticValue => Ok(source.static_value().clone()),
            SourceKind::ModelParameter => self.model_input(source.parameter_name()),
            SourceKind::ChildOutput => {
                self.child_output(source.output_child_id(), source.output_name())
            }
            SourceKind::Expression => expression::evaluate(source.expression(), self.scope)
                .map_err(|e| format!("expression '{}' failed: {}", source.expression(), e)),
        }
    }

    fn model_input(&self, name: &str) -> Result<Value, String> {
        let definition = self
            .model
            .parameter_definition(name)
            .ok_or_else(|| format!("model input '{}' does not exist", name))?;

        let supplied = self
            .inputs
            .get(name)
            .or_else(|| self.inputs.get(&definition.name))
            .filter(|v| !v.is_null());

        match (supplied, &definition.default_value) {
            (Some(value), _) => Ok(value.clone()),
            (None, Some(default)) => Ok(default.clone()),
            (None, None) if definition.optional => Ok(Value::Null),
            (None, None) => Err(format!(
                "no value was supplied for model input '{}'",
                definition.name
            )),
        }
    }

    fn child_output(&self, child_id: &str, output_name: &str) -> Result<Value, String> {
        let results = self
            .child_results
            .get(child_id)
            .ok_or_else(|| format!("child algorithm '{}' has no results", child_id))?;
        results
            .get(output_name)
            .cloned()
            .ok_or_else(|| {
                format!(
                    "child algorithm '{}' did not produce output '{}'",
                    child_id, output_name
                )
            })
    }
}
