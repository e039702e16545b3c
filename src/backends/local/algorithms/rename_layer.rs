// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use super::{parameter_as_layer, parameter_as_string};
use crate::engine::{Feedback, ProcessingContext};
use crate::errors::AlgorithmError;
use crate::model::{OutputDefinition, OutputType, ParameterDefinition, ParameterType, Value};
use crate::traits::{Algorithm, AlgorithmParameters, AlgorithmResults};

/// Gives a layer a new name.
///
/// A layer queued to load on completion keeps its own name and has the new
/// name recorded in its load details instead.
#[derive(Debug, Default)]
pub struct RenameLayerAlgorithm;

impl RenameLayerAlgorithm {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Algorithm for RenameLayerAlgorithm {
    fn name(&self) -> &'static str {
        "renamelayer"
    }

    fn display_name(&self) -> String {
        "Rename layer".to_string()
    }

    fn parameter_definitions(&self) -> Vec<ParameterDefinition> {
        vec![
            ParameterDefinition::new("INPUT", ParameterType::MapLayer).with_description("Layer"),
            ParameterDefinition::new("NAME", ParameterType::String).with_description("New name"),
        ]
    }

    fn output_definitions(&self) -> Vec<OutputDefinition> {
        vec![OutputDefinition::new("OUTPUT", OutputType::MapLayer)]
    }

    async fn process_algorithm(
        &self,
        parameters: &AlgorithmParameters,
        context: &mut ProcessingContext,
        feedback: &dyn Feedback,
    ) -> Result<AlgorithmResults, AlgorithmError> {
        let mut layer = parameter_as_layer(parameters, "INPUT", context)?;
        let name = parameter_as_string(parameters, "NAME")
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AlgorithmError::InvalidParameterValue {
                parameter: "NAME".to_string(),
                reason: "a new name is required".to_string(),
            })?;

        match context.layer_to_load_on_completion_details(&layer.id) {
            Some(details) => details.name = name.clone(),
            None => layer.name = name.clone(),
        }
        feedback.push_debug_info(&format!("Renamed layer '{}' to '{}'", layer.id, name));

        Ok(AlgorithmResults::from([("OUTPUT".to_string(), Value::Layer(layer))]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{LayerDetails, ProcessingFeedback};
    use crate::model::LayerHandle;

    fn parameters(input: Value, name: &str) -> AlgorithmParameters {
        AlgorithmParameters::from([
            ("INPUT".to_string(), input),
            ("NAME".to_string(), Value::from(name)),
        ])
    }

    #[tokio::test]
    async fn test_renames_layer() {
        let results = RenameLayerAlgorithm::new()
            .process_algorithm(
                &parameters(Value::Layer(LayerHandle::vector("v1", "roads")), "streets"),
                &mut ProcessingContext::default(),
                &ProcessingFeedback::new(false),
            )
            .await
            .unwrap();
        let layer = results.get("OUTPUT").and_then(Value::as_layer).unwrap();
        assert_eq!(layer.id, "v1");
        assert_eq!(layer.name, "streets");
    }

    #[tokio::test]
    async fn test_layer_loaded_on_completion_updates_details() {
        let mut context = ProcessingContext::default();
        context
            .temporary_layer_store_mut()
            .add_layer(LayerHandle::vector("tmp_1", "output"));
        context.add_layer_to_load_on_completion("tmp_1", LayerDetails::new("Buffered", "OUTPUT"));

        let results = RenameLayerAlgorithm::new()
            .process_algorithm(
                &parameters(Value::from("tmp_1"), "Final"),
                &mut context,
                &ProcessingFeedback::new(false),
            )
            .await
            .unwrap();

        assert_eq!(context.layers_to_load_on_completion()["tmp_1"].name, "Final");
        let layer = results.get("OUTPUT").and_then(Value::as_layer).unwrap();
        assert_eq!(layer.name, "output");
    }

    #[tokio::test]
    async fn test_empty_name_is_rejected() {
        let result = RenameLayerAlgorithm::new()
            .process_algorithm(
                &parameters(Value::Layer(LayerHandle::vector("v1", "roads")), ""),
                &mut ProcessingContext::default(),
                &ProcessingFeedback::new(false),
            )
            .await;
        assert!(matches!(result, Err(AlgorithmError::InvalidParameterValue { .. })));
    }
}
