// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use super::parameter_as_layer;
use crate::engine::{Feedback, ProcessingContext};
use crate::errors::AlgorithmError;
use crate::model::{
    LayerKind, OutputDefinition, OutputType, ParameterDefinition, ParameterType, Value,
};
use crate::traits::{Algorithm, AlgorithmParameters, AlgorithmResults};

/// Routes a layer to its `VECTOR` or `RASTER` output.
///
/// Only the output matching the layer's kind is set, so steps hanging off
/// the other output are pruned.
#[derive(Debug, Default)]
pub struct FilterLayersByTypeAlgorithm;

impl FilterLayersByTypeAlgorithm {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Algorithm for FilterLayersByTypeAlgorithm {
    fn name(&self) -> &'static str {
        "filterlayersbytype"
    }

    fn display_name(&self) -> String {
        "Filter layers by type".to_string()
    }

    fn parameter_definitions(&self) -> Vec<ParameterDefinition> {
        vec![
            ParameterDefinition::new("INPUT", ParameterType::MapLayer).with_description("Input layer"),
        ]
    }

    fn output_definitions(&self) -> Vec<OutputDefinition> {
        vec![
            OutputDefinition::new("VECTOR", OutputType::VectorLayer),
            OutputDefinition::new("RASTER", OutputType::RasterLayer),
        ]
    }

    fn prunes_branches(&self) -> bool {
        true
    }

    async fn process_algorithm(
        &self,
        parameters: &AlgorithmParameters,
        context: &mut ProcessingContext,
        _feedback: &dyn Feedback,
    ) -> Result<AlgorithmResults, AlgorithmError> {
        let layer = parameter_as_layer(parameters, "INPUT", context)?;
        let input = parameters.get("INPUT").cloned().unwrap_or(Value::Null);

        let mut results = AlgorithmResults::new();
        match layer.kind {
            LayerKind::Vector => {
                results.insert("VECTOR".to_string(), input);
            }
            LayerKind::Raster => {
                results.insert("RASTER".to_string(), input);
            }
            LayerKind::Mesh | LayerKind::PointCloud => {}
        }
        Ok(results)
    }
}
