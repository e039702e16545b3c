// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Where a child algorithm parameter gets its value from.

use serde::{Deserialize, Serialize};

use crate::model::value::Value;

/// Discriminant of a [`ParameterSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    StaticValue,
    ModelParameter,
    ChildOutput,
    Expression,
}

/// Source of one value bound to a child algorithm parameter.
///
/// Exactly one payload is active at a time, selected by [`SourceKind`].
/// Setters switch the kind to match the payload they write. Payloads of
/// other kinds are kept so that a document written after the kind changed
/// still carries them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterSource {
    #[serde(rename = "source")]
    kind: SourceKind,
    #[serde(default)]
    static_value: Value,
    #[serde(default)]
    parameter_name: String,
    #[serde(default)]
    child_id: String,
    #[serde(default)]
    output_name: String,
    #[serde(default)]
    expression: String,
}

impl ParameterSource {
    pub fn from_static_value(value: impl Into<Value>) -> Self {
        Self {
            kind: SourceKind::StaticValue,
            static_value: value.into(),
            ..Self::default()
        }
    }

    pub fn from_model_parameter(parameter_name: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::ModelParameter,
            parameter_name: parameter_name.into(),
            ..Self::default()
        }
    }

    pub fn from_child_output(child_id: impl Into<String>, output_name: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::ChildOutput,
            child_id: child_id.into(),
            output_name: output_name.into(),
            ..Self::default()
        }
    }

    pub fn from_expression(expression: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Expression,
            expression: expression.into(),
            ..Self::default()
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn static_value(&self) -> &Value {
        &self.static_value
    }

    pub fn set_static_value(&mut self, value: impl Into<Value>) {
        self.kind = SourceKind::StaticValue;
        self.static_value = value.into();
    }

    pub fn parameter_name(&self) -> &str {
        &self.parameter_name
    }

    pub fn set_parameter_name(&mut self, name: impl Into<String>) {
        self.kind = SourceKind::ModelParameter;
        self.parameter_name = name.into();
    }

    pub fn output_child_id(&self) -> &str {
        &self.child_id
    }

    pub fn set_output_child_id(&mut self, child_id: impl Into<String>) {
        self.kind = SourceKind::ChildOutput;
        self.child_id = child_id.into();
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    pub fn set_output_name(&mut self, output_name: impl Into<String>) {
        self.kind = SourceKind::ChildOutput;
        self.output_name = output_name.into();
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn set_expression(&mut self, expression: impl Into<String>) {
        self.kind = SourceKind::Expression;
        self.expression = expression.into();
    }

    /// Child id this source reads from, if it reads a child output.
    pub fn referenced_child(&self) -> Option<&str> {
        match self.kind {
            SourceKind::ChildOutput => Some(&self.child_id),
            _ => None,
        }
    }

    /// Generic key/value form used in model documents.
    pub fn to_variant(&self) -> serde_json::Value {
        // Plain data; serializing it into a json value cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn load_variant(variant: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(variant)
    }

    /// Binary stream form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Renders the source as a script expression.
    ///
    /// `friendly_name` maps a child id to the variable name holding that
    /// child's outputs in the generated script.
    pub fn as_script_code(&self, friendly_name: impl Fn(&str) -> String) -> String {
        match self.kind {
            SourceKind::StaticValue => value_as_script_literal(&self.static_value),
            SourceKind::ModelParameter => {
                format!("parameters['{}']", escape_quotes(&self.parameter_name))
            }
            SourceKind::ChildOutput => format!(
                "outputs['{}']['{}']",
                escape_quotes(&friendly_name(&self.child_id)),
                escape_quotes(&self.output_name)
            ),
            SourceKind::Expression => format!(
                "evaluate_expression('{}', context)",
                escape_quotes(&self.expression)
            ),
        }
    }
}

impl PartialEq for ParameterSource {
    /// Compares the kind and the payload that kind selects.
    fn eq(&self, other: &Self) -> bool {
        if self.kind != other.kind {
            return false;
        }
        match self.kind {
            SourceKind::StaticValue => self.static_value == other.static_value,
            SourceKind::ModelParameter => self.parameter_name == other.parameter_name,
            SourceKind::ChildOutput => {
                self.child_id == other.child_id && self.output_name == other.output_name
            }
            SourceKind::Expression => self.expression == other.expression,
        }
    }
}

pub(crate) fn escape_quotes(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', "\\'")
}

pub(crate) fn value_as_script_literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Int(i) => i.to_string(),
        Value::Double(_) => value.to_string(),
        Value::String(s) => format!("'{}'", escape_quotes(s)),
        Value::List(items) => {
            let parts: Vec<String> = items.iter().map(value_as_script_literal).collect();
            format!("[{}]", parts.join(","))
        }
        Value::Map(map) => {
            let parts: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("'{}':{}", escape_quotes(k), value_as_script_literal(v)))
                .collect();
            format!("{{{}}}", parts.join(","))
        }
        Value::Binary(bytes) => format!("b'<{} bytes>'", bytes.len()),
        Value::Layer(layer) => format!("'{}'", escape_quotes(&layer.source)),
        Value::Property(expression) => format!("Property('{}')", escape_quotes(expression)),
    }
}
