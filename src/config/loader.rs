// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fs;
use std::path::Path;

use crate::config::AlgorithmRegistry;
use crate::errors::ModelError;
use crate::model::ProcessingModel;
use crate::observability::messages::validation::ModelValidationFailed;
use crate::observability::messages::StructuredLog;

/// On-disk encoding of a model document, chosen by file extension.
///
/// # Example
/// ```yaml
/// name: "Type filter"
/// group: "examples"
/// parameter_components:
///   - definition:
///       name: "layer"
///       type: map_layer
/// children:
///   filter:
///     algorithm_id: "native:filterlayersbytype"
///     parameter_sources:
///       INPUT:
///         - source: model_parameter
///           parameter_name: "layer"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "yaml" | "yml" => Ok(DocumentFormat::Yaml),
            "json" => Ok(DocumentFormat::Json),
            _ => Err(ModelError::UnsupportedFormat(extension)),
        }
    }
}

/// Parses a model document.
pub fn model_from_str(text: &str, format: DocumentFormat) -> Result<ProcessingModel, ModelError> {
    let model = match format {
        DocumentFormat::Yaml => serde_yaml::from_str(text)?,
        DocumentFormat::Json => serde_json::from_str(text)?,
    };
    Ok(model)
}

/// Serializes a model document.
pub fn model_to_string(
    model: &ProcessingModel,
    format: DocumentFormat,
) -> Result<String, ModelError> {
    let text = match format {
        DocumentFormat::Yaml => serde_yaml::to_string(model)?,
        DocumentFormat::Json => serde_json::to_string_pretty(model)?,
    };
    Ok(text)
}

/// Load a model from a YAML or JSON file. Algorithms stay detached.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<ProcessingModel, ModelError> {
    let format = DocumentFormat::from_path(&path)?;
    let content = fs::read_to_string(path)?;
    model_from_str(&content, format)
}

/// Load a model, attach its algorithms and validate it
///
/// Every validation problem is reported at once in
/// [`ModelError::Validation`].
pub fn load_and_validate_model<P: AsRef<Path>>(
    path: P,
    registry: &AlgorithmRegistry,
) -> Result<ProcessingModel, ModelError> {
    let mut model = load_model(path)?;
    model.reattach(registry);

    let report = model.validate(registry);
    if !report.is_valid() {
        let errors = report.errors();
        ModelValidationFailed {
            model_name: &model.name,
            error_count: errors.len(),
        }
        .log();
        return Err(ModelError::Validation(errors));
    }

    Ok(model)
}

/// Write a model to a YAML or JSON file.
pub fn save_model<P: AsRef<Path>>(model: &ProcessingModel, path: P) -> Result<(), ModelError> {
    let format = DocumentFormat::from_path(&path)?;
    fs::write(path, model_to_string(model, format)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChildAlgorithm, ParameterSource};

    #[test]
    fn format_from_extension() {
        assert_eq!(DocumentFormat::from_path("a/model.yaml").unwrap(), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path("model.YML").unwrap(), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path("model.json").unwrap(), DocumentFormat::Json);
        assert!(matches!(
            DocumentFormat::from_path("model.model3"),
            Err(ModelError::UnsupportedFormat(ext)) if ext == "model3"
        ));
    }

    #[test]
    fn parse_basic_model() {
        let yaml = r#"
name: basic
group: tests
children:
  rename:
    algorithm_id: "native:renamelayer"
    parameter_sources:
      NAME:
        - source: static_value
          static_value: { type: string, value: "roads" }
"#;
        let model = model_from_str(yaml, DocumentFormat::Yaml).unwrap();
        assert_eq!(model.name, "basic");
        let child = model.child("rename").unwrap();
        assert_eq!(child.child_id, "rename");
        assert!(child.active);
        assert_eq!(
            child.parameter_sources["NAME"],
            vec![ParameterSource::from_static_value("roads")]
        );
    }

    #[test]
    fn json_and_yaml_agree() {
        let mut model = ProcessingModel::new("round trip", "tests");
        model.add_child(
            ChildAlgorithm::new("native:stringconcatenation")
                .with_parameter("INPUT_1", ParameterSource::from_expression("@model_name")),
        );

        for format in [DocumentFormat::Yaml, DocumentFormat::Json] {
            let text = model_to_string(&model, format).unwrap();
            assert_eq!(model_from_str(&text, format).unwrap(), model);
        }
    }
}
