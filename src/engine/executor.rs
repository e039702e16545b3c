// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Sequential model executor with branch pruning.
//!
//! Every child moves through a small state machine:
//!
//! ```text
//! Pending -> Ready -> Running -> Succeeded
//!                             \-> Failed
//! Pending -> Skipped
//! ```
//!
//! A child becomes ready once every predecessor succeeded. Inactive children
//! and their dependents are skipped before the run starts. When a child
//! finishes, each of its branches that is not present with a truthy value
//! in the results prunes the children that depend on that branch, through a
//! conditional dependency or by reading the branch output, together with
//! everything downstream of them.
//!
//! Ready children run one at a time in ascending child id order, so runs
//! are deterministic. Cancellation is checked before each child starts.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use crate::config::validation::validate_dependency_graph;
use crate::config::AlgorithmRegistry;
use crate::engine::context::ProcessingContext;
use crate::engine::feedback::{Feedback, MultiStepFeedback};
use crate::engine::resolver::ParameterResolver;
use crate::engine::scope::create_expression_scope;
use crate::errors::{AlgorithmError, ExecutionError, ValidationError};
use crate::model::{ChildAlgorithm, ProcessingModel, SourceKind, Value};
use crate::observability::messages::algorithm::{
    AlgorithmCompleted, AlgorithmFailed, AlgorithmStarted,
};
use crate::observability::messages::engine::{
    BranchesPruned, ChildSkipped, RunCanceled, RunCompleted, RunStarted,
};
use crate::observability::messages::validation::ModelValidationFailed;
use crate::observability::messages::StructuredLog;
use crate::traits::{AlgorithmHandle, AlgorithmResults};

/// Scheduling state of one child during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildState {
    Pending,
    Ready,
    Running,
    Succeeded,
    Failed,
    Skipped,
}

/// How a run that did not error ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Succeeded,
    Canceled,
}

/// Everything a finished or canceled run produced.
#[derive(Debug, Clone)]
pub struct ModelRunResult {
    pub status: RunStatus,
    /// Model outputs keyed `child:output`
    pub outputs: BTreeMap<String, Value>,
    /// Raw results of every child that succeeded
    pub child_results: BTreeMap<String, AlgorithmResults>,
    /// Child ids in execution order
    pub executed: Vec<String>,
    pub skipped: BTreeSet<String>,
    pub states: BTreeMap<String, ChildState>,
}

impl ModelRunResult {
    pub fn state(&self, child_id: &str) -> Option<ChildState> {
        self.states.get(child_id).copied()
    }

    pub fn output(&self, key: &str) -> Option<&Value> {
        self.outputs.get(key)
    }
}

/// Runs processing models against the algorithms of a registry.
#[derive(Debug, Clone, Default)]
pub struct ModelExecutor {
    registry: AlgorithmRegistry,
}

struct RunState<'m> {
    model: &'m ProcessingModel,
    states: BTreeMap<String, ChildState>,
    child_results: BTreeMap<String, AlgorithmResults>,
    executed: Vec<String>,
}

impl<'m> RunState<'m> {
    fn new(model: &'m ProcessingModel) -> Self {
        Self {
            model,
            states: model
                .children()
                .keys()
                .map(|id| (id.clone(), ChildState::Pending))
                .collect(),
            child_results: BTreeMap::new(),
            executed: Vec::new(),
        }
    }

    fn state(&self, child_id: &str) -> ChildState {
        self.states.get(child_id).copied().unwrap_or(ChildState::Skipped)
    }

    fn set(&mut self, child_id: &str, state: ChildState) {
        if let Some(slot) = self.states.get_mut(child_id) {
            *slot = state;
        }
    }

    fn skip(&mut self, child_id: &str, reason: &str) {
        if self.state(child_id) == ChildState::Pending {
            self.set(child_id, ChildState::Skipped);
            ChildSkipped { child_id, reason }.log();
        }
    }

    /// Skips `child_id` and every pending child downstream of it.
    fn prune(&mut self, child_id: &str, reason: &str) -> usize {
        let mut pruned = 0;
        if self.state(child_id) == ChildState::Pending {
            self.skip(child_id, reason);
            pruned += 1;
        }
        for dependent in self.model.dependent_child_algorithms(child_id) {
            if self.state(&dependent) == ChildState::Pending {
                let reason = format!("depends on pruned child '{}'", child_id);
                self.skip(&dependent, &reason);
                pruned += 1;
            }
        }
        pruned
    }

    /// Skips inactive children and, repeatedly, anything with a skipped
    /// predecessor.
    fn skip_unreachable(&mut self) {
        for child in self.model.children().values() {
            if !child.active {
                self.skip(&child.child_id, "inactive");
            }
        }

        loop {
            let blocked: Vec<(String, String)> = self
                .model
                .children()
                .values()
                .filter(|child| self.state(&child.child_id) == ChildState::Pending)
                .filter_map(|child| {
                    child
                        .predecessors()
                        .into_iter()
                        .find(|p| self.state(p) == ChildState::Skipped)
                        .map(|p| (child.child_id.clone(), p.to_string()))
                })
                .collect();
            if blocked.is_empty() {
                break;
            }
            for (child_id, predecessor) in blocked {
                let reason = format!("depends on skipped child '{}'", predecessor);
                self.skip(&child_id, &reason);
            }
        }
    }

    /// First pending child, by id, whose predecessors all succeeded.
    fn next_ready(&self) -> Option<&'m ChildAlgorithm> {
        self.model.children().values().find(|child| {
            self.state(&child.child_id) == ChildState::Pending
                && child
                    .predecessors()
                    .iter()
                    .all(|p| self.state(p) == ChildState::Succeeded)
        })
    }

    fn skipped(&self) -> BTreeSet<String> {
        self.ids_in(ChildState::Skipped)
    }

    fn ids_in(&self, state: ChildState) -> BTreeSet<String> {
        self.states
            .iter()
            .filter(|(_, s)| **s == state)
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn pending_count(&self) -> usize {
        self.ids_in(ChildState::Pending).len()
    }
}

impl ModelExecutor {
    pub fn new(registry: AlgorithmRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &AlgorithmRegistry {
        &self.registry
    }

    /// Runs `model` with the given inputs.
    ///
    /// Inputs are keyed by model parameter name; destinations for model
    /// outputs are keyed `child:output`. Returns an error when the model
    /// cannot run or a child fails. Cancellation ends the run early with
    /// [`RunStatus::Canceled`] and whatever was produced so far.
    pub async fn run(
        &self,
        model: &ProcessingModel,
        inputs: &BTreeMap<String, Value>,
        context: &mut ProcessingContext,
        feedback: &dyn Feedback,
    ) -> Result<ModelRunResult, ExecutionError> {
        let started = Instant::now();
        let algorithms = self.prepare(model, inputs)?;

        let mut run = RunState::new(model);
        run.skip_unreachable();
        let step_count = run.pending_count();

        let active_count = model.children().values().filter(|c| c.active).count();
        RunStarted {
            model_name: &model.name,
            child_count: model.children().len(),
            active_count,
        }
        .log();

        let steps = MultiStepFeedback::new(step_count, feedback);
        let mut outputs = BTreeMap::new();
        let mut step = 0;

        while let Some(child) = run.next_ready() {
            if steps.is_canceled() {
                RunCanceled {
                    model_name: &model.name,
                    executed: run.executed.len(),
                }
                .log();
                return Ok(Self::finish(run, outputs, RunStatus::Canceled));
            }

            let algorithm = algorithms.get(&child.child_id).ok_or_else(|| {
                ExecutionError::InternalError {
                    message: format!("no algorithm prepared for child '{}'", child.child_id),
                }
            })?;

            run.set(&child.child_id, ChildState::Ready);
            steps.set_current_step(step);
            run.set(&child.child_id, ChildState::Running);
            step += 1;

            let results = match self
                .run_child(&run, child, algorithm, model, inputs, context, &steps, step, step_count)
                .await
            {
                Ok(results) => results,
                Err(ExecutionError::AlgorithmFailed {
                    source: AlgorithmError::Canceled,
                    ..
                }) if steps.is_canceled() => {
                    run.set(&child.child_id, ChildState::Failed);
                    RunCanceled {
                        model_name: &model.name,
                        executed: run.executed.len(),
                    }
                    .log();
                    return Ok(Self::finish(run, outputs, RunStatus::Canceled));
                }
                Err(error) => {
                    run.set(&child.child_id, ChildState::Failed);
                    return Err(error);
                }
            };

            for output in child.model_outputs.values() {
                let value = results
                    .get(&output.child_output_name)
                    .cloned()
                    .or_else(|| output.default_value.clone());
                if let Some(value) = value {
                    outputs.insert(output.result_key(), value);
                }
            }

            run.set(&child.child_id, ChildState::Succeeded);
            run.executed.push(child.child_id.clone());
            Self::prune_branches(&mut run, child, algorithm, &results);
            run.child_results.insert(child.child_id.clone(), results);
        }

        if run.pending_count() > 0 {
            return Err(ExecutionError::InternalError {
                message: format!(
                    "children never became ready: {}",
                    run.ids_in(ChildState::Pending).into_iter().collect::<Vec<_>>().join(", ")
                ),
            });
        }

        feedback.set_progress(100.0);
        RunCompleted {
            model_name: &model.name,
            executed: run.executed.len(),
            skipped: run.skipped().len(),
            duration: started.elapsed(),
        }
        .log();

        Ok(Self::finish(run, outputs, RunStatus::Succeeded))
    }

    /// Checks inputs and graph, then resolves every active child's algorithm.
    fn prepare(
        &self,
        model: &ProcessingModel,
        inputs: &BTreeMap<String, Value>,
    ) -> Result<BTreeMap<String, AlgorithmHandle>, ExecutionError> {
        for definition in model.parameter_definitions() {
            let supplied = inputs.get(&definition.name).is_some_and(|v| !v.is_null());
            if definition.is_mandatory() && !supplied {
                return Err(ExecutionError::MissingModelInput {
                    parameter: definition.name.clone(),
                });
            }
        }

        let mut errors = validate_dependency_graph(model).err().unwrap_or_default();
        errors.extend(missing_source_children(model));
        if !errors.is_empty() {
            ModelValidationFailed {
                model_name: &model.name,
                error_count: errors.len(),
            }
            .log();
            return Err(ExecutionError::InvalidModel { errors });
        }

        let mut algorithms = BTreeMap::new();
        for child in model.children().values().filter(|c| c.active) {
            let handle = self
                .registry
                .create(&child.algorithm_id, &child.configuration)
                .ok_or_else(|| ExecutionError::AlgorithmNotFound {
                    child_id: child.child_id.clone(),
                    algorithm_id: child.algorithm_id.clone(),
                })?;
            algorithms.insert(child.child_id.clone(), handle);
        }
        Ok(algorithms)
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_child(
        &self,
        run: &RunState<'_>,
        child: &ChildAlgorithm,
        algorithm: &AlgorithmHandle,
        model: &ProcessingModel,
        inputs: &BTreeMap<String, Value>,
        context: &mut ProcessingContext,
        feedback: &MultiStepFeedback<'_>,
        step: usize,
        step_count: usize,
    ) -> Result<AlgorithmResults, ExecutionError> {
        let scope = create_expression_scope(model, inputs, &run.child_results, context);
        let parameters = ParameterResolver::new(model, inputs, &run.child_results, &scope)
            .resolve_child_parameters(child, algorithm)?;
        context.set_expression_scope(scope);

        AlgorithmStarted {
            child_id: &child.child_id,
            algorithm_id: algorithm.id(),
            step,
            step_count,
        }
        .log();
        feedback.push_info(&format!("Prepare algorithm: {}", child.child_id));
        feedback.push_command_info(&format!(
            "Input Parameters:\n{}",
            format_parameters(&parameters)
        ));

        let started = Instant::now();
        match algorithm.process_algorithm(&parameters, context, feedback).await {
            Ok(results) => {
                AlgorithmCompleted {
                    child_id: &child.child_id,
                    output_count: results.len(),
                    duration: started.elapsed(),
                }
                .log();
                feedback.push_info(&format!(
                    "OK. Execution took {:.3} seconds ({} outputs).",
                    started.elapsed().as_secs_f64(),
                    results.len()
                ));
                Ok(results)
            }
            Err(error) => {
                AlgorithmFailed {
                    child_id: &child.child_id,
                    algorithm_id: algorithm.id(),
                    error: &error,
                }
                .log();
                feedback.report_error(&error.to_string(), true);
                Err(ExecutionError::AlgorithmFailed {
                    child_id: child.child_id.clone(),
                    description: child.display_description().to_string(),
                    source: error,
                })
            }
        }
    }

    /// Prunes the dependents of every branch `child` did not take.
    fn prune_branches(
        run: &mut RunState<'_>,
        child: &ChildAlgorithm,
        algorithm: &AlgorithmHandle,
        results: &AlgorithmResults,
    ) {
        let taken_branch = |name: &str| results.get(name).is_some_and(Value::is_truthy);
        let branches = algorithm.branch_names();
        let (taken, not_taken): (Vec<String>, Vec<String>) =
            branches.iter().cloned().partition(|b| taken_branch(b.as_str()));

        let model = run.model;
        let mut pruned_count = 0;
        for dependent in model.children().values() {
            let conditional_miss = dependent.dependencies.iter().find_map(|d| {
                (d.child_id == child.child_id)
                    .then_some(d.conditional_branch.as_deref())
                    .flatten()
                    .filter(|branch| !taken_branch(*branch))
            });
            let reads_missing_branch = dependent
                .parameter_sources
                .values()
                .flatten()
                .filter(|s| {
                    s.kind() == SourceKind::ChildOutput && s.output_child_id() == child.child_id
                })
                .map(|s| s.output_name())
                .find(|output| not_taken.iter().any(|b| b.as_str() == *output));

            if let Some(branch) = conditional_miss.or(reads_missing_branch) {
                let reason = format!("branch '{}' of '{}' was not taken", branch, child.child_id);
                pruned_count += run.prune(&dependent.child_id, &reason);
            }
        }

        if !branches.is_empty() || pruned_count > 0 {
            BranchesPruned {
                child_id: &child.child_id,
                taken: &taken,
                not_taken: &not_taken,
                pruned_count,
            }
            .log();
        }
    }

    fn finish(
        run: RunState<'_>,
        outputs: BTreeMap<String, Value>,
        status: RunStatus,
    ) -> ModelRunResult {
        ModelRunResult {
            status,
            outputs,
            skipped: run.skipped(),
            child_results: run.child_results,
            executed: run.executed,
            states: run.states,
        }
    }
}

/// Child output sources that name a child missing from the model.
fn missing_source_children(model: &ProcessingModel) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for child in model.children().values().filter(|c| c.active) {
        for (parameter, sources) in &child.parameter_sources {
            for source in sources {
                if source.kind() == SourceKind::ChildOutput
                    && model.child(source.output_child_id()).is_none()
                {
                    errors.push(ValidationError::MissingSourceChild {
                        child_id: child.child_id.clone(),
                        parameter: parameter.clone(),
                        source_child: source.output_child_id().to_string(),
                    });
                }
            }
        }
    }
    errors
}

fn format_parameters(parameters: &BTreeMap<String, Value>) -> String {
    parameters
        .iter()
        .map(|(name, value)| format!("{{ '{}': {} }}", name, value))
        .collect::<Vec<_>>()
        .join("\n")
}
