// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Test-only provider, addressed as `test:<name>`.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::engine::{Feedback, ProcessingContext};
use crate::errors::AlgorithmError;
use crate::model::{OutputDefinition, OutputType, ParameterDefinition, ParameterType, Value};
use crate::traits::{Algorithm, AlgorithmParameters, AlgorithmProvider, AlgorithmResults};

/// Copies `INPUT` to `OUTPUT`.
pub struct PassthroughAlgorithm;

#[async_trait]
impl Algorithm for PassthroughAlgorithm {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn parameter_definitions(&self) -> Vec<ParameterDefinition> {
        vec![ParameterDefinition::new("INPUT", ParameterType::Any).optional()]
    }

    fn output_definitions(&self) -> Vec<OutputDefinition> {
        vec![OutputDefinition::new("OUTPUT", OutputType::Variant)]
    }

    async fn process_algorithm(
        &self,
        parameters: &AlgorithmParameters,
        _context: &mut ProcessingContext,
        feedback: &dyn Feedback,
    ) -> Result<AlgorithmResults, AlgorithmError> {
        feedback.set_progress(100.0);
        let value = parameters.get("INPUT").cloned().unwrap_or(Value::Null);
        Ok(AlgorithmResults::from([("OUTPUT".to_string(), value)]))
    }
}

/// Always fails, for testing failure scenarios.
pub struct FailingAlgorithm;

#[async_trait]
impl Algorithm for FailingAlgorithm {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn parameter_definitions(&self) -> Vec<ParameterDefinition> {
        vec![ParameterDefinition::new("INPUT", ParameterType::Any).optional()]
    }

    fn output_definitions(&self) -> Vec<OutputDefinition> {
        vec![OutputDefinition::new("OUTPUT", OutputType::Variant)]
    }

    async fn process_algorithm(
        &self,
        _parameters: &AlgorithmParameters,
        _context: &mut ProcessingContext,
        _feedback: &dyn Feedback,
    ) -> Result<AlgorithmResults, AlgorithmError> {
        Err(AlgorithmError::Validation("Simulated algorithm failure".to_string()))
    }
}

/// Cancels its feedback, as a user pressing cancel mid-run would. With
/// `interrupt` set it also stops with a cancellation error.
pub struct CancelingAlgorithm {
    interrupt: bool,
}

#[async_trait]
impl Algorithm for CancelingAlgorithm {
    fn name(&self) -> &'static str {
        if self.interrupt {
            "interrupt"
        } else {
            "cancel"
        }
    }

    fn parameter_definitions(&self) -> Vec<ParameterDefinition> {
        vec![ParameterDefinition::new("INPUT", ParameterType::Any).optional()]
    }

    fn output_definitions(&self) -> Vec<OutputDefinition> {
        vec![OutputDefinition::new("OUTPUT", OutputType::Variant)]
    }

    async fn process_algorithm(
        &self,
        parameters: &AlgorithmParameters,
        _context: &mut ProcessingContext,
        feedback: &dyn Feedback,
    ) -> Result<AlgorithmResults, AlgorithmError> {
        feedback.cancel();
        if self.interrupt {
            return Err(AlgorithmError::Canceled);
        }
        let value = parameters.get("INPUT").cloned().unwrap_or(Value::Null);
        Ok(AlgorithmResults::from([("OUTPUT".to_string(), value)]))
    }
}

#[derive(Debug, Default)]
pub struct StubProvider;

impl StubProvider {
    pub fn new() -> Self {
        Self
    }
}

impl AlgorithmProvider for StubProvider {
    fn id(&self) -> &str {
        "test"
    }

    fn name(&self) -> &str {
        "Test algorithms"
    }

    fn algorithm_names(&self) -> Vec<&'static str> {
        vec!["cancel", "failing", "interrupt", "passthrough"]
    }

    fn create_algorithm(
        &self,
        name: &str,
        _configuration: &BTreeMap<String, Value>,
    ) -> Option<Arc<dyn Algorithm>> {
        match name {
            "cancel" => Some(Arc::new(CancelingAlgorithm { interrupt: false })),
            "failing" => Some(Arc::new(FailingAlgorithm)),
            "interrupt" => Some(Arc::new(CancelingAlgorithm { interrupt: true })),
            "passthrough" => Some(Arc::new(PassthroughAlgorithm)),
            _ => None,
        }
    }
}
