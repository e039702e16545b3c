// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use crate::model::child::Point;
use crate::model::value::{LayerKind, Value};

/// Type of a parameter, shared by model inputs and algorithm parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    Boolean,
    Number,
    String,
    Enum,
    Expression,
    MapLayer,
    VectorLayer,
    RasterLayer,
    FeatureSource,
    MultipleLayers,
    /// Output location chosen by the caller (sink, raster or file destination)
    Destination,
    Any,
}

impl ParameterType {
    pub fn is_layer(&self) -> bool {
        matches!(
            self,
            ParameterType::MapLayer
                | ParameterType::VectorLayer
                | ParameterType::RasterLayer
                | ParameterType::FeatureSource
                | ParameterType::MultipleLayers
        )
    }

    /// Whether a model input of type `other` may feed a parameter of this type.
    pub fn accepts_parameter(&self, other: ParameterType) -> bool {
        use ParameterType::*;
        match (self, other) {
            (Any, _) | (_, Any) => true,
            (a, b) if *a == b => true,
            (String | Expression | Enum, Number | String | Expression | Enum | Boolean) => true,
            (Number, String | Enum) => true,
            (MapLayer | MultipleLayers, b) => b.is_layer(),
            (VectorLayer | FeatureSource, VectorLayer | FeatureSource | MapLayer) => true,
            (RasterLayer, RasterLayer | MapLayer) => true,
            (Destination, String) => true,
            _ => false,
        }
    }

    /// Whether a child output of type `output` may feed a parameter of this type.
    pub fn accepts_output(&self, output: OutputType) -> bool {
        use ParameterType::*;
        match (self, output) {
            (Any, _) | (_, OutputType::Variant) => true,
            (_, OutputType::ConditionalBranch) => false,
            (MapLayer | MultipleLayers, o) => o.is_layer(),
            (VectorLayer | FeatureSource, OutputType::VectorLayer | OutputType::MapLayer) => true,
            (RasterLayer, OutputType::RasterLayer | OutputType::MapLayer) => true,
            (Number, OutputType::Number) => true,
            (Boolean, OutputType::Boolean) => true,
            (String | Expression | Enum, OutputType::String | OutputType::Number) => true,
            (String, OutputType::VectorLayer | OutputType::RasterLayer | OutputType::MapLayer) => {
                true
            }
            _ => false,
        }
    }

    /// Whether a concrete value is acceptable for this type.
    pub fn accepts_value(&self, value: &Value) -> bool {
        use ParameterType::*;
        match (self, value) {
            (_, Value::Null) => false,
            (_, Value::Property(_)) => true,
            (Any, _) => true,
            (Boolean, Value::Bool(_) | Value::Int(_)) => true,
            (Number, v) => v.as_f64().is_some(),
            (String | Expression, Value::String(_) | Value::Int(_) | Value::Double(_)) => true,
            (Enum, Value::Int(_) | Value::String(_) | Value::List(_)) => true,
            (MapLayer | FeatureSource | Destination, Value::String(_)) => true,
            (VectorLayer | RasterLayer | MultipleLayers, Value::String(_)) => true,
            (MapLayer, Value::Layer(_)) => true,
            (VectorLayer | FeatureSource, Value::Layer(l)) => l.kind == LayerKind::Vector,
            (RasterLayer, Value::Layer(l)) => l.kind == LayerKind::Raster,
            (MultipleLayers, Value::Layer(_) | Value::List(_)) => true,
            (Destination, Value::Map(_)) => true,
            _ => false,
        }
    }
}

/// Declared parameter of an algorithm or of the model itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub parameter_type: ParameterType,
    #[serde(default)]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub optional: bool,
}

impl ParameterDefinition {
    pub fn new(name: impl Into<String>, parameter_type: ParameterType) -> Self {
        let name = name.into();
        Self {
            description: name.clone(),
            name,
            parameter_type,
            default_value: None,
            optional: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Mandatory parameters need a bound value: not optional and no default.
    pub fn is_mandatory(&self) -> bool {
        !self.optional && self.default_value.is_none()
    }
}

/// Type of an algorithm output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputType {
    MapLayer,
    VectorLayer,
    RasterLayer,
    Number,
    String,
    Boolean,
    /// A named branch; a truthy result value means the branch was taken
    ConditionalBranch,
    Variant,
}

impl OutputType {
    pub fn is_layer(&self) -> bool {
        matches!(
            self,
            OutputType::MapLayer | OutputType::VectorLayer | OutputType::RasterLayer
        )
    }
}

/// Declared output of an algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub output_type: OutputType,
}

impl OutputDefinition {
    pub fn new(name: impl Into<String>, output_type: OutputType) -> Self {
        let name = name.into();
        Self {
            description: name.clone(),
            name,
            output_type,
        }
    }

    pub fn branch(name: impl Into<String>) -> Self {
        Self::new(name, OutputType::ConditionalBranch)
    }
}

/// A model level input together with its designer placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameter {
    pub definition: ParameterDefinition,
    #[serde(default)]
    pub position: Point,
    #[serde(default)]
    pub comment: String,
}

impl ModelParameter {
    pub fn new(definition: ParameterDefinition) -> Self {
        Self {
            definition,
            position: Point::default(),
            comment: String::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }
}
