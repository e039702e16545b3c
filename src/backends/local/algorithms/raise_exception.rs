// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use super::{condition_holds, parameter_as_string};
use crate::engine::{Feedback, ProcessingContext};
use crate::errors::AlgorithmError;
use crate::model::{OutputDefinition, ParameterDefinition, ParameterType};
use crate::traits::{Algorithm, AlgorithmParameters, AlgorithmResults};

/// Fails the run with `MESSAGE`, unless an optional `CONDITION` evaluates
/// false.
#[derive(Debug, Default)]
pub struct RaiseExceptionAlgorithm;

impl RaiseExceptionAlgorithm {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Algorithm for RaiseExceptionAlgorithm {
    fn name(&self) -> &'static str {
        "raiseexception"
    }

    fn display_name(&self) -> String {
        "Raise exception".to_string()
    }

    fn parameter_definitions(&self) -> Vec<ParameterDefinition> {
        vec![
            ParameterDefinition::new("MESSAGE", ParameterType::String).with_description("Message"),
            ParameterDefinition::new("CONDITION", ParameterType::Expression)
                .with_description("Condition")
                .optional(),
        ]
    }

    fn output_definitions(&self) -> Vec<OutputDefinition> {
        Vec::new()
    }

    async fn process_algorithm(
        &self,
        parameters: &AlgorithmParameters,
        context: &mut ProcessingContext,
        _feedback: &dyn Feedback,
    ) -> Result<AlgorithmResults, AlgorithmError> {
        let condition = parameter_as_string(parameters, "CONDITION");
        if !condition_holds(condition.as_deref(), context.expression_scope())? {
            return Ok(AlgorithmResults::new());
        }
        let message = parameter_as_string(parameters, "MESSAGE").unwrap_or_default();
        Err(AlgorithmError::Validation(message))
    }
}
