// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// Structural problems found in a processing model before it runs.
///
/// These are definition errors: they are collected and reported, never
/// raised while editing. The caller decides whether to proceed.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A circular dependency was detected between child algorithms
    CyclicDependency {
        /// The cycle path showing the circular dependency
        cycle: Vec<String>,
    },
    /// A child declares a dependency on a child id that doesn't exist
    UnresolvedDependency {
        child_id: String,
        missing_dependency: String,
    },
    /// The child's algorithm id could not be resolved through the registry
    UnknownAlgorithm {
        child_id: String,
        algorithm_id: String,
    },
    /// A mandatory algorithm parameter has no source bound to it
    MissingParameterValue { child_id: String, parameter: String },
    /// A source references a model parameter that doesn't exist
    UnknownModelParameter {
        child_id: String,
        parameter: String,
        model_parameter: String,
    },
    /// A source reads the output of a child that doesn't exist
    MissingSourceChild {
        child_id: String,
        parameter: String,
        source_child: String,
    },
    /// A source reads an output the source child's algorithm does not declare
    UnknownChildOutput {
        child_id: String,
        parameter: String,
        source_child: String,
        output: String,
    },
    /// A bound source can never produce a value the parameter accepts
    IncompatibleSource {
        child_id: String,
        parameter: String,
        reason: String,
    },
}

impl ValidationError {
    /// Child id the problem belongs to, when it is local to one child.
    pub fn child_id(&self) -> Option<&str> {
        match self {
            ValidationError::CyclicDependency { .. } => None,
            ValidationError::UnresolvedDependency { child_id, .. }
            | ValidationError::UnknownAlgorithm { child_id, .. }
            | ValidationError::MissingParameterValue { child_id, .. }
            | ValidationError::UnknownModelParameter { child_id, .. }
            | ValidationError::MissingSourceChild { child_id, .. }
            | ValidationError::UnknownChildOutput { child_id, .. }
            | ValidationError::IncompatibleSource { child_id, .. } => Some(child_id),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::CyclicDependency { cycle } => {
                write!(f, "Cyclic dependency detected: {}", cycle.join(" -> "))
            }
            ValidationError::UnresolvedDependency {
                child_id,
                missing_dependency,
            } => {
                write!(
                    f,
                    "Child algorithm '{}' depends on '{}' which does not exist",
                    child_id, missing_dependency
                )
            }
            ValidationError::UnknownAlgorithm {
                child_id,
                algorithm_id,
            } => {
                write!(
                    f,
                    "Algorithm '{}' used by child '{}' is not available",
                    algorithm_id, child_id
                )
            }
            ValidationError::MissingParameterValue { parameter, .. } => {
                write!(f, "Parameter '{}' is mandatory but has no value", parameter)
            }
            ValidationError::UnknownModelParameter {
                parameter,
                model_parameter,
                ..
            } => {
                write!(
                    f,
                    "Parameter '{}' is bound to model input '{}' which does not exist",
                    parameter, model_parameter
                )
            }
            ValidationError::MissingSourceChild {
                parameter,
                source_child,
                ..
            } => {
                write!(
                    f,
                    "Parameter '{}' reads from child algorithm '{}' which does not exist",
                    parameter, source_child
                )
            }
            ValidationError::UnknownChildOutput {
                parameter,
                source_child,
                output,
                ..
            } => {
                write!(
                    f,
                    "Parameter '{}' reads output '{}' which child algorithm '{}' does not produce",
                    parameter, output, source_child
                )
            }
            ValidationError::IncompatibleSource {
                parameter, reason, ..
            } => {
                write!(f, "Parameter '{}' has an incompatible value: {}", parameter, reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}
