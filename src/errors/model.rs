// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use super::execution::format_validation_errors;
use super::ValidationError;

/// Errors from editing, loading or saving a processing model.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("A model parameter named '{0}' already exists")]
    DuplicateParameter(String),

    #[error("Model parameter '{0}' is still used by child algorithms")]
    ParameterInUse(String),

    #[error("Model parameter '{0}' does not exist")]
    UnknownParameter(String),

    #[error("Unsupported model document format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Model validation failed: {}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}
