// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::engine::{Feedback, ProcessingContext};
use crate::errors::AlgorithmError;
use crate::model::{OutputDefinition, OutputType, ParameterDefinition, Value};

/// Parameter values handed to an algorithm, keyed by parameter name.
pub type AlgorithmParameters = BTreeMap<String, Value>;

/// Result map produced by an algorithm, keyed by output name.
pub type AlgorithmResults = BTreeMap<String, Value>;

/// An executable algorithm invoked by a child step of a model.
///
/// Implementations are created by an [`AlgorithmProvider`](super::AlgorithmProvider)
/// and shared through an [`AlgorithmHandle`]. The engine only routes values;
/// reading or writing layer data is up to the implementation.
#[async_trait]
pub trait Algorithm: Send + Sync {
    /// Name of the algorithm within its provider, e.g. `renamelayer`.
    fn name(&self) -> &'static str;

    fn display_name(&self) -> String {
        self.name().to_string()
    }

    fn parameter_definitions(&self) -> Vec<ParameterDefinition>;

    fn output_definitions(&self) -> Vec<OutputDefinition>;

    fn parameter_definition(&self, name: &str) -> Option<ParameterDefinition> {
        self.parameter_definitions()
            .into_iter()
            .find(|definition| definition.name == name)
    }

    fn output_definition(&self, name: &str) -> Option<OutputDefinition> {
        self.output_definitions()
            .into_iter()
            .find(|definition| definition.name == name)
    }

    /// When true every declared output acts as a branch: outputs missing
    /// from the results prune the steps that depend on them.
    fn prunes_branches(&self) -> bool {
        false
    }

    /// Names of the branches this algorithm can take.
    fn branch_names(&self) -> Vec<String> {
        let prunes = self.prunes_branches();
        self.output_definitions()
            .into_iter()
            .filter(|definition| {
                prunes || definition.output_type == OutputType::ConditionalBranch
            })
            .map(|definition| definition.name)
            .collect()
    }

    async fn process_algorithm(
        &self,
        parameters: &AlgorithmParameters,
        context: &mut ProcessingContext,
        feedback: &dyn Feedback,
    ) -> Result<AlgorithmResults, AlgorithmError>;
}

/// A resolved algorithm together with its fully qualified id (`provider:name`).
#[derive(Clone)]
pub struct AlgorithmHandle {
    id: String,
    algorithm: Arc<dyn Algorithm>,
}

impl AlgorithmHandle {
    pub fn new(id: impl Into<String>, algorithm: Arc<dyn Algorithm>) -> Self {
        Self {
            id: id.into(),
            algorithm,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Deref for AlgorithmHandle {
    type Target = dyn Algorithm;

    fn deref(&self) -> &Self::Target {
        self.algorithm.as_ref()
    }
}

impl fmt::Debug for AlgorithmHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgorithmHandle").field("id", &self.id).finish()
    }
}
