// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::config::AlgorithmRegistry;
use crate::model::dependency::ChildDependency;
use crate::model::source::ParameterSource;
use crate::model::value::Value;
use crate::traits::AlgorithmHandle;

/// Designer canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Default for Size {
    fn default() -> Self {
        Self {
            width: 200.0,
            height: 30.0,
        }
    }
}

/// A child output exposed as an output of the whole model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    /// Name of the output at model level
    pub name: String,
    #[serde(default)]
    pub child_id: String,
    /// Output of the child algorithm this model output is taken from
    pub child_output_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub mandatory: bool,
}

impl ModelOutput {
    pub fn new(name: impl Into<String>, child_output_name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            description: name.clone(),
            name,
            child_id: String::new(),
            child_output_name: child_output_name.into(),
            default_value: None,
            mandatory: false,
        }
    }

    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Key under which the value appears in model results, `child:output`.
    pub fn result_key(&self) -> String {
        format!("{}:{}", self.child_id, self.name)
    }
}

/// One step of a processing model: an algorithm invocation with bound parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildAlgorithm {
    #[serde(default)]
    pub child_id: String,
    pub algorithm_id: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub position: Point,
    #[serde(default)]
    pub size: Size,
    #[serde(default)]
    pub parameter_sources: BTreeMap<String, Vec<ParameterSource>>,
    #[serde(default)]
    pub dependencies: Vec<ChildDependency>,
    #[serde(default)]
    pub model_outputs: BTreeMap<String, ModelOutput>,
    /// Per instance algorithm configuration, e.g. condition branch definitions
    #[serde(default)]
    pub configuration: BTreeMap<String, Value>,
    /// Variable name used for this step in generated scripts
    #[serde(default)]
    pub friendly_identifier: Option<String>,
    #[serde(skip)]
    algorithm: Option<AlgorithmHandle>,
}

fn default_active() -> bool {
    true
}

impl ChildAlgorithm {
    pub fn new(algorithm_id: impl Into<String>) -> Self {
        Self {
            child_id: String::new(),
            algorithm_id: algorithm_id.into(),
            active: true,
            description: String::new(),
            comment: String::new(),
            position: Point::default(),
            size: Size::default(),
            parameter_sources: BTreeMap::new(),
            dependencies: Vec::new(),
            model_outputs: BTreeMap::new(),
            configuration: BTreeMap::new(),
            friendly_identifier: None,
            algorithm: None,
        }
    }

    pub fn with_child_id(mut self, child_id: impl Into<String>) -> Self {
        self.set_child_id(child_id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, source: ParameterSource) -> Self {
        self.add_parameter_source(name, source);
        self
    }

    pub fn with_dependency(mut self, dependency: ChildDependency) -> Self {
        self.add_dependency(dependency);
        self
    }

    pub fn with_model_output(mut self, output: ModelOutput) -> Self {
        self.add_model_output(output);
        self
    }

    pub fn with_configuration(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.configuration.insert(key.into(), value.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Renames the child. Model outputs follow the new id.
    pub fn set_child_id(&mut self, child_id: impl Into<String>) {
        self.child_id = child_id.into();
        for output in self.model_outputs.values_mut() {
            output.child_id = self.child_id.clone();
        }
    }

    /// Description when set, else the child id.
    pub fn display_description(&self) -> &str {
        if self.description.is_empty() {
            &self.child_id
        } else {
            &self.description
        }
    }

    /// Appends one more source for a parameter.
    pub fn add_parameter_source(&mut self, name: impl Into<String>, source: ParameterSource) {
        self.parameter_sources.entry(name.into()).or_default().push(source);
    }

    pub fn set_parameter_sources(
        &mut self,
        name: impl Into<String>,
        sources: Vec<ParameterSource>,
    ) {
        self.parameter_sources.insert(name.into(), sources);
    }

    /// Adds an explicit dependency unless an identical one is already present.
    pub fn add_dependency(&mut self, dependency: ChildDependency) {
        if !self.dependencies.contains(&dependency) {
            self.dependencies.push(dependency);
        }
    }

    pub fn add_model_output(&mut self, mut output: ModelOutput) {
        output.child_id = self.child_id.clone();
        self.model_outputs.insert(output.name.clone(), output);
    }

    pub fn set_model_outputs(&mut self, outputs: BTreeMap<String, ModelOutput>) {
        self.model_outputs = outputs;
        for output in self.model_outputs.values_mut() {
            output.child_id = self.child_id.clone();
        }
    }

    /// Children this step reads outputs from through its parameter sources.
    pub fn source_children(&self) -> BTreeSet<&str> {
        self.parameter_sources
            .values()
            .flatten()
            .filter_map(ParameterSource::referenced_child)
            .collect()
    }

    /// Every predecessor, explicit dependencies and implicit ones from sources.
    pub fn predecessors(&self) -> BTreeSet<&str> {
        let mut predecessors = self.source_children();
        predecessors.extend(self.dependencies.iter().map(|d| d.child_id.as_str()));
        predecessors
    }

    /// Variable name for this step in generated scripts.
    pub fn script_variable(&self) -> &str {
        match self.friendly_identifier.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.child_id,
        }
    }

    /// The cached algorithm, if the last reattach succeeded.
    pub fn algorithm(&self) -> Option<&AlgorithmHandle> {
        self.algorithm.as_ref()
    }

    /// Re-resolves the algorithm through the registry, replacing any cached handle.
    pub fn reattach(&mut self, registry: &AlgorithmRegistry) -> bool {
        self.algorithm = registry.create(&self.algorithm_id, &self.configuration);
        self.algorithm.is_some()
    }

    pub fn to_variant(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Rebuilds a child from its document form. The algorithm stays detached.
    pub fn load_variant(variant: &serde_json::Value) -> Result<Self, serde_json::Error> {
        let mut child = Self::deserialize(variant)?;
        let child_id = child.child_id.clone();
        child.set_child_id(child_id);
        Ok(child)
    }
}

impl PartialEq for ChildAlgorithm {
    /// Compares the authored definition; the cached algorithm is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.child_id == other.child_id
            && self.algorithm_id == other.algorithm_id
            && self.active == other.active
            && self.description == other.description
            && self.comment == other.comment
            && self.position == other.position
            && self.size == other.size
            && self.parameter_sources == other.parameter_sources
            && self.dependencies == other.dependencies
            && self.model_outputs == other.model_outputs
            && self.configuration == other.configuration
            && self.friendly_identifier == other.friendly_identifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_child() -> ChildAlgorithm {
        let mut child = ChildAlgorithm::new("native:renamelayer")
            .with_child_id("rename")
            .with_description("Rename the layer")
            .with_parameter("INPUT", ParameterSource::from_child_output("filter", "VECTOR"))
            .with_parameter("NAME", ParameterSource::from_expression("'renamed_' || @name"))
            .with_dependency(ChildDependency::on_branch("filter", "VECTOR"))
            .with_model_output(ModelOutput::new("renamed", "OUTPUT").mandatory());
        child.position = Point::new(120.0, 40.0);
        child.comment = "renames things".to_string();
        child.active = false;
        child
    }

    #[test]
    fn test_variant_round_trip() {
        let child = sample_child();
        let restored = ChildAlgorithm::load_variant(&child.to_variant()).unwrap();

        assert_eq!(restored, child);
        assert_eq!(restored.child_id, "rename");
        assert!(!restored.active);
        assert_eq!(restored.dependencies, vec![ChildDependency::on_branch("filter", "VECTOR")]);
        assert_eq!(restored.model_outputs["renamed"].child_id, "rename");
        assert!(restored.model_outputs["renamed"].mandatory);
    }

    #[test]
    fn test_model_outputs_follow_child_id() {
        let mut child = sample_child();
        child.set_child_id("renamed_2");
        assert_eq!(child.model_outputs["renamed"].result_key(), "renamed_2:renamed");
    }

    #[test]
    fn test_predecessors_combine_sources_and_dependencies() {
        let child = sample_child().with_dependency(ChildDependency::new("other"));
        let predecessors: Vec<&str> = child.predecessors().into_iter().collect();
        assert_eq!(predecessors, vec!["filter", "other"]);
    }

    #[test]
    fn test_duplicate_dependencies_are_ignored() {
        let mut child = ChildAlgorithm::new("native:raisewarning");
        child.add_dependency(ChildDependency::new("a"));
        child.add_dependency(ChildDependency::new("a"));
        child.add_dependency(ChildDependency::on_branch("a", "TRUE"));
        assert_eq!(child.dependencies.len(), 2);
    }

    #[test]
    fn test_reattach() {
        let registry = AlgorithmRegistry::with_native_provider();
        let mut child = ChildAlgorithm::new("native:renamelayer");
        assert!(child.algorithm().is_none());
        assert!(child.reattach(&registry));
        assert_eq!(child.algorithm().map(|a| a.id()), Some("native:renamelayer"));

        child.algorithm_id = "native:unknown".to_string();
        assert!(!child.reattach(&registry));
        assert!(child.algorithm().is_none());
    }

    #[test]
    fn test_script_variable() {
        let mut child = ChildAlgorithm::new("native:renamelayer").with_child_id("alg_1");
        assert_eq!(child.script_variable(), "alg_1");
        child.friendly_identifier = Some("Rename".to_string());
        assert_eq!(child.script_variable(), "Rename");
    }
}
