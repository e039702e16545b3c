// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The processing model: model inputs, child steps and the structural
//! queries editors and the executor rely on.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::config::{validate_dependency_graph, AlgorithmRegistry};
use crate::errors::{ModelError, ValidationError};
use crate::expression;
use crate::model::child::ChildAlgorithm;
use crate::model::parameter::{ModelParameter, ParameterDefinition, ParameterType};
use crate::model::script;
use crate::model::source::{ParameterSource, SourceKind};
use crate::model::value::Value;
use crate::traits::AlgorithmHandle;

/// Report key for problems that belong to the model as a whole.
pub const MODEL_REPORT_KEY: &str = "Model";

/// Definition errors found by [`ProcessingModel::validate`], keyed by the
/// description of the child they belong to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    issues: BTreeMap<String, Vec<ValidationError>>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &BTreeMap<String, Vec<ValidationError>> {
        &self.issues
    }

    pub fn errors_for(&self, key: &str) -> &[ValidationError] {
        self.issues.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn errors(&self) -> Vec<ValidationError> {
        self.issues.values().flatten().cloned().collect()
    }

    /// One human readable line per problem, prefixed with its key.
    pub fn messages(&self) -> Vec<String> {
        self.issues
            .iter()
            .flat_map(|(key, errors)| errors.iter().map(move |e| format!("{}: {}", key, e)))
            .collect()
    }

    fn push(&mut self, key: &str, error: ValidationError) {
        self.issues.entry(key.to_string()).or_default().push(error);
    }
}

/// A graph of child algorithms wired together by parameter sources and
/// explicit dependencies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ModelDocument")]
pub struct ProcessingModel {
    pub name: String,
    pub group: String,
    pub help: BTreeMap<String, String>,
    /// Static variables available to every expression
    pub variables: BTreeMap<String, Value>,
    parameter_components: Vec<ModelParameter>,
    children: BTreeMap<String, ChildAlgorithm>,
    #[serde(skip)]
    destination_parameters: Vec<ParameterDefinition>,
}

#[derive(Deserialize)]
struct ModelDocument {
    #[serde(default)]
    name: String,
    #[serde(default)]
    group: String,
    #[serde(default)]
    help: BTreeMap<String, String>,
    #[serde(default)]
    variables: BTreeMap<String, Value>,
    #[serde(default)]
    parameter_components: Vec<ModelParameter>,
    #[serde(default)]
    children: BTreeMap<String, ChildAlgorithm>,
}

impl From<ModelDocument> for ProcessingModel {
    fn from(document: ModelDocument) -> Self {
        let children = document
            .children
            .into_iter()
            .map(|(key, mut child)| {
                // the map key is authoritative for the child id
                child.set_child_id(key.clone());
                (key, child)
            })
            .collect();

        let mut model = Self {
            name: document.name,
            group: document.group,
            help: document.help,
            variables: document.variables,
            parameter_components: document.parameter_components,
            children,
            destination_parameters: Vec::new(),
        };
        model.update_destination_parameters();
        model
    }
}

impl ProcessingModel {
    pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            ..Self::default()
        }
    }

    // ---- model parameters ----

    pub fn parameter_components(&self) -> &[ModelParameter] {
        &self.parameter_components
    }

    pub fn parameter_definitions(&self) -> Vec<&ParameterDefinition> {
        self.parameter_components.iter().map(|p| &p.definition).collect()
    }

    /// Looks up a model input. An exact match wins over a case-insensitive one.
    pub fn parameter_definition(&self, name: &str) -> Option<&ParameterDefinition> {
        self.parameter_definitions()
            .into_iter()
            .find(|p| p.name == name)
            .or_else(|| {
                self.parameter_definitions()
                    .into_iter()
                    .find(|p| p.name.eq_ignore_ascii_case(name))
            })
    }

    pub fn add_parameter(&mut self, parameter: ModelParameter) -> Result<(), ModelError> {
        if self.parameter_components.iter().any(|p| p.name() == parameter.name()) {
            return Err(ModelError::DuplicateParameter(parameter.name().to_string()));
        }
        self.parameter_components.push(parameter);
        Ok(())
    }

    /// Removes a model input. Rejected while any child still binds it.
    pub fn remove_parameter(&mut self, name: &str) -> Result<(), ModelError> {
        if !self.child_algorithms_depend_on_parameter(name).is_empty() {
            return Err(ModelError::ParameterInUse(name.to_string()));
        }
        let before = self.parameter_components.len();
        self.parameter_components.retain(|p| p.name() != name);
        if self.parameter_components.len() == before {
            return Err(ModelError::UnknownParameter(name.to_string()));
        }
        Ok(())
    }

    /// Ids of children with a source bound to the named model input.
    pub fn child_algorithms_depend_on_parameter(&self, name: &str) -> BTreeSet<String> {
        self.children
            .values()
            .filter(|child| {
                child
                    .parameter_sources
                    .values()
                    .flatten()
                    .any(|s| s.kind() == SourceKind::ModelParameter && s.parameter_name() == name)
            })
            .map(|child| child.child_id.clone())
            .collect()
    }

    /// Output parameters synthesized from child model outputs, named `child:output`.
    pub fn destination_parameters(&self) -> &[ParameterDefinition] {
        &self.destination_parameters
    }

    /// Rebuilds the cached destination parameters. Called after every change
    /// made through the model; call it yourself after editing via `child_mut`.
    pub fn update_destination_parameters(&mut self) {
        self.destination_parameters = self
            .children
            .values()
            .flat_map(|child| child.model_outputs.values())
            .map(|output| {
                let mut definition =
                    ParameterDefinition::new(output.result_key(), ParameterType::Destination)
                        .with_description(output.description.clone());
                definition.default_value = output.default_value.clone();
                definition.optional = !output.mandatory;
                definition
            })
            .collect();
    }

    // ---- children ----

    pub fn children(&self) -> &BTreeMap<String, ChildAlgorithm> {
        &self.children
    }

    pub fn child(&self, child_id: &str) -> Option<&ChildAlgorithm> {
        self.children.get(child_id)
    }

    pub fn child_mut(&mut self, child_id: &str) -> Option<&mut ChildAlgorithm> {
        self.children.get_mut(child_id)
    }

    /// Inserts a child and returns its id. An empty or already used id is
    /// replaced by a generated `algorithmId_N` one.
    pub fn add_child(&mut self, mut child: ChildAlgorithm) -> String {
        if child.child_id.is_empty() || self.children.contains_key(&child.child_id) {
            let child_id = self.generate_child_id(&child.algorithm_id);
            child.set_child_id(child_id);
        }
        let child_id = child.child_id.clone();
        self.children.insert(child_id.clone(), child);
        self.update_destination_parameters();
        child_id
    }

    /// Replaces the child with the same id, inserting it when absent.
    pub fn set_child(&mut self, child: ChildAlgorithm) {
        self.children.insert(child.child_id.clone(), child);
        self.update_destination_parameters();
    }

    pub fn set_children(&mut self, children: Vec<ChildAlgorithm>) {
        self.children = children
            .into_iter()
            .map(|child| (child.child_id.clone(), child))
            .collect();
        self.update_destination_parameters();
    }

    /// Removes a child. Fails when other children still depend on it.
    pub fn remove_child(&mut self, child_id: &str) -> bool {
        if !self.children.contains_key(child_id)
            || !self.dependent_child_algorithms(child_id).is_empty()
        {
            return false;
        }
        self.children.remove(child_id);
        self.update_destination_parameters();
        true
    }

    /// Deactivates a child together with everything depending on it.
    pub fn deactivate_child(&mut self, child_id: &str) -> bool {
        if !self.children.contains_key(child_id) {
            return false;
        }
        let mut affected = self.dependent_child_algorithms(child_id);
        affected.insert(child_id.to_string());
        for id in affected {
            if let Some(child) = self.children.get_mut(&id) {
                child.active = false;
            }
        }
        true
    }

    /// Activates a child together with everything it depends on.
    pub fn activate_child(&mut self, child_id: &str) -> bool {
        if !self.children.contains_key(child_id) {
            return false;
        }
        let mut affected = self.depends_on_child_algorithms(child_id);
        affected.insert(child_id.to_string());
        for id in affected {
            if let Some(child) = self.children.get_mut(&id) {
                child.active = true;
            }
        }
        true
    }

    fn generate_child_id(&self, algorithm_id: &str) -> String {
        (1..)
            .map(|n| format!("{}_{}", algorithm_id, n))
            .find(|candidate| !self.children.contains_key(candidate))
            .unwrap_or_default()
    }

    // ---- structural queries ----

    /// Every child that transitively depends on `child_id`, through explicit
    /// dependencies or child output sources alike.
    pub fn dependent_child_algorithms(&self, child_id: &str) -> BTreeSet<String> {
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for child in self.children.values() {
            for predecessor in child.predecessors() {
                dependents.entry(predecessor).or_default().push(&child.child_id);
            }
        }
        walk(child_id, |id| dependents.get(id).cloned().unwrap_or_default())
    }

    /// Every existing child `child_id` transitively depends on.
    pub fn depends_on_child_algorithms(&self, child_id: &str) -> BTreeSet<String> {
        walk(child_id, |id| {
            self.children
                .get(id)
                .map(|child| {
                    child
                        .predecessors()
                        .into_iter()
                        .filter(|p| self.children.contains_key(*p))
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    /// Children `child_id` could depend on without introducing a cycle.
    pub fn available_dependencies_for_child_algorithm(&self, child_id: &str) -> BTreeSet<String> {
        let dependents = self.dependent_child_algorithms(child_id);
        self.children
            .keys()
            .filter(|id| id.as_str() != child_id && !dependents.contains(*id))
            .cloned()
            .collect()
    }

    /// Whether an active child reads `output_name` of `child_id`.
    pub fn child_output_is_required(&self, child_id: &str, output_name: &str) -> bool {
        self.children
            .values()
            .filter(|child| child.active)
            .flat_map(|child| child.parameter_sources.values().flatten())
            .any(|source| {
                source.kind() == SourceKind::ChildOutput
                    && source.output_child_id() == child_id
                    && source.output_name() == output_name
            })
    }

    /// Children in an order that respects every dependency; ties go by id.
    ///
    /// Fails with the offending cycle when the graph is not acyclic.
    pub fn topological_order(&self) -> Result<Vec<String>, ValidationError> {
        let mut remaining: BTreeMap<&str, BTreeSet<&str>> = self
            .children
            .values()
            .map(|child| {
                let predecessors = child
                    .predecessors()
                    .into_iter()
                    .filter(|p| self.children.contains_key(*p))
                    .collect();
                (child.child_id.as_str(), predecessors)
            })
            .collect();

        let mut order = Vec::with_capacity(remaining.len());
        while !remaining.is_empty() {
            let next = remaining
                .iter()
                .find(|(_, predecessors)| predecessors.is_empty())
                .map(|(id, _)| *id);
            let Some(next) = next else {
                let cycle = remaining.keys().map(|id| id.to_string()).collect();
                return Err(ValidationError::CyclicDependency { cycle });
            };
            remaining.remove(next);
            for predecessors in remaining.values_mut() {
                predecessors.remove(next);
            }
            order.push(next.to_string());
        }
        Ok(order)
    }

    // ---- algorithm resolution and validation ----

    /// True when every active child's algorithm resolves through the registry.
    pub fn can_execute(&self, registry: &AlgorithmRegistry) -> bool {
        self.unavailable_algorithms(registry).is_empty()
    }

    /// Active children whose algorithm cannot be resolved.
    pub fn unavailable_algorithms(&self, registry: &AlgorithmRegistry) -> Vec<ValidationError> {
        self.children
            .values()
            .filter(|child| child.active)
            .filter(|child| {
                registry
                    .create(&child.algorithm_id, &child.configuration)
                    .is_none()
            })
            .map(|child| ValidationError::UnknownAlgorithm {
                child_id: child.child_id.clone(),
                algorithm_id: child.algorithm_id.clone(),
            })
            .collect()
    }

    /// Re-resolves every child's algorithm. Returns true when all resolved.
    pub fn reattach(&mut self, registry: &AlgorithmRegistry) -> bool {
        self.children
            .values_mut()
            .fold(true, |all, child| child.reattach(registry) && all)
    }

    /// Collects every definition error of the active children, plus
    /// graph level problems such as dangling dependencies and cycles.
    pub fn validate(&self, registry: &AlgorithmRegistry) -> ValidationReport {
        let mut report = ValidationReport::default();

        for child in self.children.values().filter(|child| child.active) {
            for error in self.validate_child(child, registry) {
                report.push(child.display_description(), error);
            }
        }

        if let Err(errors) = validate_dependency_graph(self) {
            for error in errors {
                let key = error
                    .child_id()
                    .and_then(|id| self.children.get(id))
                    .map(|child| child.display_description().to_string())
                    .unwrap_or_else(|| MODEL_REPORT_KEY.to_string());
                report.push(&key, error);
            }
        }
        report
    }

    fn validate_child(
        &self,
        child: &ChildAlgorithm,
        registry: &AlgorithmRegistry,
    ) -> Vec<ValidationError> {
        let Some(algorithm) = registry.create(&child.algorithm_id, &child.configuration) else {
            return vec![ValidationError::UnknownAlgorithm {
                child_id: child.child_id.clone(),
                algorithm_id: child.algorithm_id.clone(),
            }];
        };

        let mut errors = Vec::new();
        for definition in algorithm.parameter_definitions() {
            let sources = child
                .parameter_sources
                .get(&definition.name)
                .map(Vec::as_slice)
                .unwrap_or(&[]);

            if sources.is_empty() {
                if definition.is_mandatory()
                    && definition.parameter_type != ParameterType::Destination
                {
                    errors.push(ValidationError::MissingParameterValue {
                        child_id: child.child_id.clone(),
                        parameter: definition.name.clone(),
                    });
                }
                continue;
            }

            for source in sources {
                if let Some(error) = self.check_source(child, &definition, source, registry) {
                    errors.push(error);
                }
            }
        }
        errors
    }

    fn check_source(
        &self,
        child: &ChildAlgorithm,
        definition: &ParameterDefinition,
        source: &ParameterSource,
        registry: &AlgorithmRegistry,
    ) -> Option<ValidationError> {
        let child_id = child.child_id.clone();
        let parameter = definition.name.clone();
        let incompatible = |reason: String| ValidationError::IncompatibleSource {
            child_id: child_id.clone(),
            parameter: parameter.clone(),
            reason,
        };

        match source.kind() {
            SourceKind::StaticValue => {
                let value = source.static_value();
                if value.is_null() {
                    definition.is_mandatory().then(|| ValidationError::MissingParameterValue {
                        child_id: child_id.clone(),
                        parameter: parameter.clone(),
                    })
                } else if !definition.parameter_type.accepts_value(value) {
                    Some(incompatible(format!(
                        "a {} value is not accepted by a {:?} parameter",
                        value.type_name(),
                        definition.parameter_type
                    )))
                } else {
                    None
                }
            }
            SourceKind::ModelParameter => match self.parameter_definition(source.parameter_name()) {
                None => Some(ValidationError::UnknownModelParameter {
                    child_id: child_id.clone(),
                    parameter: parameter.clone(),
                    model_parameter: source.parameter_name().to_string(),
                }),
                Some(input)
                    if !definition.parameter_type.accepts_parameter(input.parameter_type) =>
                {
                    Some(incompatible(format!(
                        "model input '{}' of type {:?} cannot feed a {:?} parameter",
                        input.name, input.parameter_type, definition.parameter_type
                    )))
                }
                Some(_) => None,
            },
            SourceKind::ChildOutput => {
                let source_child_id = source.output_child_id();
                let Some(source_child) = self.children.get(source_child_id) else {
                    return Some(ValidationError::MissingSourceChild {
                        child_id: child_id.clone(),
                        parameter: parameter.clone(),
                        source_child: source_child_id.to_string(),
                    });
                };
                let source_algorithm: AlgorithmHandle =
                    registry.create(&source_child.algorithm_id, &source_child.configuration)?;
                match source_algorithm.output_definition(source.output_name()) {
                    None => Some(ValidationError::UnknownChildOutput {
                        child_id: child_id.clone(),
                        parameter: parameter.clone(),
                        source_child: source_child_id.to_string(),
                        output: source.output_name().to_string(),
                    }),
                    Some(output)
                        if !definition.parameter_type.accepts_output(output.output_type) =>
                    {
                        Some(incompatible(format!(
                            "output '{}' of type {:?} cannot feed a {:?} parameter",
                            output.name, output.output_type, definition.parameter_type
                        )))
                    }
                    Some(_) => None,
                }
            }
            SourceKind::Expression => expression::parse(source.expression())
                .err()
                .map(|e| incompatible(format!("invalid expression: {}", e))),
        }
    }

    // ---- serialization ----

    pub fn to_variant(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn load_variant(variant: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(variant)
    }

    /// Renders the model as an equivalent script.
    pub fn as_script_code(&self) -> String {
        script::model_as_script(self)
    }
}

/// Breadth first closure from `start` over `next`, excluding `start` itself.
fn walk<'a, F>(start: &'a str, next: F) -> BTreeSet<String>
where
    F: Fn(&str) -> Vec<&'a str>,
{
    let mut seen = BTreeSet::new();
    let mut queue = VecDeque::from([start.to_string()]);
    while let Some(id) = queue.pop_front() {
        for neighbor in next(&id) {
            if neighbor != start && seen.insert(neighbor.to_string()) {
                queue.push_back(neighbor.to_string());
            }
        }
    }
    seen
}
