// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use super::ValidationError;

/// Failures raised by an algorithm invocation.
///
/// Distinguishes the invalid geometry abort policy from the algorithm's own
/// validation failures and from cancellation.
#[derive(Error, Debug)]
pub enum AlgorithmError {
    #[error("{}", invalid_geometry_message(.feature_id, .source_name))]
    InvalidGeometry {
        feature_id: i64,
        source_name: Option<String>,
    },

    #[error("{0}")]
    Validation(String),

    #[error("Missing parameter value for {0}")]
    MissingParameter(String),

    #[error("Invalid value for parameter '{parameter}': {reason}")]
    InvalidParameterValue { parameter: String, reason: String },

    #[error("Algorithm execution was canceled")]
    Canceled,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failures that abort a model run.
///
/// Cancellation is not an error; see `RunStatus::Canceled`.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Model input '{parameter}' is mandatory but no value was supplied")]
    MissingModelInput { parameter: String },

    #[error("Model cannot be executed: {}", format_validation_errors(.errors))]
    InvalidModel { errors: Vec<ValidationError> },

    #[error("Child algorithm '{child_id}' uses algorithm '{algorithm_id}' which is not available")]
    AlgorithmNotFound {
        child_id: String,
        algorithm_id: String,
    },

    #[error("Could not resolve parameter '{parameter}' of child algorithm '{child_id}': {reason}")]
    Resolution {
        child_id: String,
        parameter: String,
        reason: String,
    },

    #[error("Error encountered while running {description}: {source}")]
    AlgorithmFailed {
        child_id: String,
        description: String,
        #[source]
        source: AlgorithmError,
    },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

fn invalid_geometry_message(feature_id: &i64, source_name: &Option<String>) -> String {
    match source_name.as_deref() {
        Some(name) if !name.is_empty() => format!(
            "Feature ({}) from “{}” has invalid geometry. Please fix the geometry or change the Processing setting to the “Ignore invalid input features” option.",
            feature_id, name
        ),
        _ => format!(
            "Feature ({}) has invalid geometry. Please fix the geometry or change the Processing setting to the “Ignore invalid input features” option.",
            feature_id
        ),
    }
}

pub(crate) fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
