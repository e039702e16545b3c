// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::sync::Arc;

use super::algorithms::*;
use crate::model::Value;
use crate::traits::{Algorithm, AlgorithmProvider};

pub const NATIVE_PROVIDER_ID: &str = "native";

/// Provider of the built-in algorithms, addressed as `native:<name>`.
#[derive(Debug, Default)]
pub struct NativeProvider;

impl NativeProvider {
    pub fn new() -> Self {
        Self
    }
}

impl AlgorithmProvider for NativeProvider {
    fn id(&self) -> &str {
        NATIVE_PROVIDER_ID
    }

    fn name(&self) -> &str {
        "Built-in"
    }

    fn algorithm_names(&self) -> Vec<&'static str> {
        vec![
            "calculateexpression",
            "condition",
            "filterlayersbytype",
            "raiseexception",
            "raisewarning",
            "renamelayer",
            "stringconcatenation",
        ]
    }

    /// Creates a built-in algorithm:
    /// - "condition" -> ConditionAlgorithm (branches from `conditions` configuration)
    /// - "filterlayersbytype" -> FilterLayersByTypeAlgorithm
    /// - everything else ignores the configuration
    fn create_algorithm(
        &self,
        name: &str,
        configuration: &BTreeMap<String, Value>,
    ) -> Option<Arc<dyn Algorithm>> {
        match name {
            "calculateexpression" => Some(Arc::new(CalculateExpressionAlgorithm::new())),
            "condition" => Some(Arc::new(ConditionAlgorithm::from_configuration(configuration))),
            "filterlayersbytype" => Some(Arc::new(FilterLayersByTypeAlgorithm::new())),
            "raiseexception" => Some(Arc::new(RaiseExceptionAlgorithm::new())),
            "raisewarning" => Some(Arc::new(RaiseWarningAlgorithm::new())),
            "renamelayer" => Some(Arc::new(RenameLayerAlgorithm::new())),
            "stringconcatenation" => Some(Arc::new(StringConcatenationAlgorithm::new())),
            _ => None,
        }
    }
}
