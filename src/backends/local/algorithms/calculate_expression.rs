// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use super::parameter_as_string;
use crate::engine::{Feedback, ProcessingContext};
use crate::errors::AlgorithmError;
use crate::expression;
use crate::model::{OutputDefinition, OutputType, ParameterDefinition, ParameterType};
use crate::traits::{Algorithm, AlgorithmParameters, AlgorithmResults};

/// Evaluates `INPUT` against the current expression scope.
#[derive(Debug, Default)]
pub struct CalculateExpressionAlgorithm;

impl CalculateExpressionAlgorithm {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Algorithm for CalculateExpressionAlgorithm {
    fn name(&self) -> &'static str {
        "calculateexpression"
    }

    fn display_name(&self) -> String {
        "Calculate expression".to_string()
    }

    fn parameter_definitions(&self) -> Vec<ParameterDefinition> {
        vec![ParameterDefinition::new("INPUT", ParameterType::Expression).with_description("Input")]
    }

    fn output_definitions(&self) -> Vec<OutputDefinition> {
        vec![OutputDefinition::new("OUTPUT", OutputType::Variant)]
    }

    async fn process_algorithm(
        &self,
        parameters: &AlgorithmParameters,
        context: &mut ProcessingContext,
        _feedback: &dyn Feedback,
    ) -> Result<AlgorithmResults, AlgorithmError> {
        let text = parameter_as_string(parameters, "INPUT")
            .ok_or_else(|| AlgorithmError::MissingParameter("INPUT".to_string()))?;
        let value = expression::evaluate(&text, context.expression_scope()).map_err(|e| {
            AlgorithmError::InvalidParameterValue {
                parameter: "INPUT".to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(AlgorithmResults::from([("OUTPUT".to_string(), value)]))
    }
}
