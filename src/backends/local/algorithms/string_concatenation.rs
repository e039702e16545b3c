// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use super::parameter_as_string;
use crate::engine::{Feedback, ProcessingContext};
use crate::errors::AlgorithmError;
use crate::model::{OutputDefinition, OutputType, ParameterDefinition, ParameterType, Value};
use crate::traits::{Algorithm, AlgorithmParameters, AlgorithmResults};

#[derive(Debug, Default)]
pub struct StringConcatenationAlgorithm;

impl StringConcatenationAlgorithm {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Algorithm for StringConcatenationAlgorithm {
    fn name(&self) -> &'static str {
        "stringconcatenation"
    }

    fn display_name(&self) -> String {
        "String concatenation".to_string()
    }

    fn parameter_definitions(&self) -> Vec<ParameterDefinition> {
        vec![
            ParameterDefinition::new("INPUT_1", ParameterType::String).with_description("Input 1"),
            ParameterDefinition::new("INPUT_2", ParameterType::String).with_description("Input 2"),
        ]
    }

    fn output_definitions(&self) -> Vec<OutputDefinition> {
        vec![OutputDefinition::new("CONCATENATION", OutputType::String)]
    }

    async fn process_algorithm(
        &self,
        parameters: &AlgorithmParameters,
        _context: &mut ProcessingContext,
        _feedback: &dyn Feedback,
    ) -> Result<AlgorithmResults, AlgorithmError> {
        let first = parameter_as_string(parameters, "INPUT_1").unwrap_or_default();
        let second = parameter_as_string(parameters, "INPUT_2").unwrap_or_default();
        Ok(AlgorithmResults::from([(
            "CONCATENATION".to_string(),
            Value::String(first + &second),
        )]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ProcessingFeedback;

    #[tokio::test]
    async fn test_concatenates_inputs() {
        let parameters = AlgorithmParameters::from([
            ("INPUT_1".to_string(), Value::from("flood_")),
            ("INPUT_2".to_string(), Value::from(2024)),
        ]);
        let results = StringConcatenationAlgorithm::new()
            .process_algorithm(
                &parameters,
                &mut ProcessingContext::default(),
                &ProcessingFeedback::new(false),
            )
            .await
            .unwrap();
        assert_eq!(results.get("CONCATENATION"), Some(&Value::from("flood_2024")));
    }
}
